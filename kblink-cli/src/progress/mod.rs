//! Progress reporting module

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for multi-document runs
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(quiet: bool) -> Self {
        Self {
            progress_bar: None,
            quiet,
        }
    }

    /// Show a progress bar over `total_documents`; single documents get none
    pub fn init_documents(&mut self, total_documents: u64) {
        if self.quiet || total_documents < 2 {
            return;
        }

        let pb = ProgressBar::new(total_documents);
        match ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} documents {msg}")
        {
            Ok(style) => pb.set_style(style.progress_chars("##-")),
            Err(e) => log::debug!("default progress style: {e}"),
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        self.progress_bar = Some(pb);
    }

    /// Record a linked document
    pub fn document_completed(&self, name: &str, linked: usize) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("{name}: {linked} linked"));
            pb.inc(1);
        }
    }

    /// Finish progress reporting
    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("done");
        }
    }
}
