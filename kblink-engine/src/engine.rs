//! Linking engine facade and builder

use crate::error::{EngineError, Result};
use crate::linked_entity::LinkingOutput;
use crate::linker::EntityLinker;
use kblink_core::config::embedded_default;
use kblink_core::{AnalysedText, EntitySearcher, LabelTokenizer, LinkerConfig, LinkingConfig, TokenizerTable};
use std::sync::Arc;

/// Links documents against one vocabulary
///
/// Every call to [`LinkingEngine::link`] runs a fresh [`EntityLinker`], so
/// no state is shared between documents apart from the searcher and the
/// tokenizer.
pub struct LinkingEngine {
    searcher: Arc<dyn EntitySearcher>,
    tokenizer: Arc<dyn LabelTokenizer>,
    config: LinkingConfig,
    threads: Option<usize>,
}

impl std::fmt::Debug for LinkingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkingEngine")
            .field("config", &self.config)
            .field("threads", &self.threads)
            .finish_non_exhaustive()
    }
}

impl LinkingEngine {
    /// Start building an engine
    pub fn builder() -> LinkingEngineBuilder {
        LinkingEngineBuilder::new()
    }

    /// The configuration used for every document
    pub fn config(&self) -> &LinkingConfig {
        &self.config
    }

    /// Link one document
    pub fn link(&self, text: &AnalysedText) -> Result<LinkingOutput> {
        let linker = EntityLinker::new(
            text,
            self.searcher.as_ref(),
            self.tokenizer.as_ref(),
            &self.config,
        );
        Ok(linker.process()?)
    }

    /// Link many documents, each with its own linker
    ///
    /// Results are returned in input order. With the `parallel` feature,
    /// documents are linked on a thread pool of the configured size.
    pub fn link_batch(&self, texts: &[AnalysedText]) -> Vec<Result<LinkingOutput>> {
        #[cfg(feature = "parallel")]
        {
            if texts.len() > 1 && self.threads != Some(1) {
                match self.link_parallel(texts) {
                    Ok(results) => return results,
                    Err(err) => log::warn!("{err}; linking sequentially"),
                }
            }
        }
        texts.iter().map(|text| self.link(text)).collect()
    }

    #[cfg(feature = "parallel")]
    fn link_parallel(&self, texts: &[AnalysedText]) -> Result<Vec<Result<LinkingOutput>>> {
        use rayon::prelude::*;

        let threads = self.threads.unwrap_or_else(num_cpus::get);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| EngineError::Parallel(e.to_string()))?;
        log::debug!("linking {} documents on {threads} threads", texts.len());
        Ok(pool.install(|| texts.par_iter().map(|text| self.link(text)).collect()))
    }
}

/// Builder for [`LinkingEngine`]
#[derive(Default)]
pub struct LinkingEngineBuilder {
    searcher: Option<Arc<dyn EntitySearcher>>,
    tokenizer: Option<Arc<dyn LabelTokenizer>>,
    config: Option<LinkingConfig>,
    threads: Option<usize>,
}

impl LinkingEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vocabulary backend (required)
    pub fn searcher(mut self, searcher: impl EntitySearcher + 'static) -> Self {
        self.searcher = Some(Arc::new(searcher));
        self
    }

    /// Set a shared vocabulary backend (required)
    pub fn shared_searcher(mut self, searcher: Arc<dyn EntitySearcher>) -> Self {
        self.searcher = Some(searcher);
        self
    }

    /// Set the label tokenizer; defaults to [`TokenizerTable::with_defaults`]
    pub fn tokenizer(mut self, tokenizer: impl LabelTokenizer + 'static) -> Self {
        self.tokenizer = Some(Arc::new(tokenizer));
        self
    }

    /// Set the configuration; defaults to the embedded default configuration
    pub fn config(mut self, config: LinkingConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace only the linker part of the configuration
    pub fn linker_config(mut self, linker: LinkerConfig) -> Self {
        let mut config = self.config.take().unwrap_or_default();
        config.linker = linker;
        self.config = Some(config);
        self
    }

    /// Use the strict linker preset
    pub fn strict(self) -> Self {
        self.linker_config(LinkerConfig::strict())
    }

    /// Use the lenient linker preset
    pub fn lenient(self) -> Self {
        self.linker_config(LinkerConfig::lenient())
    }

    /// Set the thread count for batch linking; `None` uses all cores
    pub fn threads(mut self, count: Option<usize>) -> Self {
        self.threads = count;
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<LinkingEngine> {
        let searcher = self.searcher.ok_or(EngineError::MissingComponent {
            component: "searcher",
        })?;
        if self.threads == Some(0) {
            return Err(EngineError::Config(kblink_core::ConfigError::InvalidValue {
                field: "threads",
                reason: "must be at least 1".to_string(),
            }));
        }
        let config = match self.config {
            Some(config) => config,
            None => embedded_default()?.clone(),
        };
        config.validate()?;
        let tokenizer = self
            .tokenizer
            .unwrap_or_else(|| Arc::new(TokenizerTable::with_defaults()));
        Ok(LinkingEngine {
            searcher,
            tokenizer,
            config,
            threads: self.threads,
        })
    }
}
