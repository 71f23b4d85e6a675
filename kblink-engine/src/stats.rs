//! Linking statistics, for observability only

use serde::Serialize;
use std::time::Duration;

/// Counters and timings of one linking run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkingStats {
    /// Sections holding at least one linkable token
    pub sections: usize,
    /// Linkable tokens processed
    pub linkable_tokens: usize,
    /// Lookups sent to the backend
    pub lookups: usize,
    /// Lookups answered from the cache
    pub cache_hits: usize,
    /// Redirect targets fetched from the backend
    pub entity_fetches: usize,
    /// Redirect targets answered from the cache
    pub entity_cache_hits: usize,
    /// Single-token lookups after a window without label matches
    pub fallback_queries: usize,
    /// Candidates returned by lookups
    pub candidates: usize,
    /// Suggestions kept after ranking
    pub suggestions: usize,
    /// Distinct selected texts
    pub linked_entities: usize,
    /// Occurrences over all linked entities
    pub occurrences: usize,
    /// Time spent waiting for the backend
    pub search_time: Duration,
    /// Time spent aligning labels
    pub matching_time: Duration,
    /// Time spent ranking suggestions
    pub ranking_time: Duration,
    /// Time spent resolving redirects
    pub redirect_time: Duration,
    /// Wall time of the whole run
    pub total_time: Duration,
}

impl LinkingStats {
    /// Log a one-line summary at debug level
    pub fn log_summary(&self) {
        log::debug!(
            "linked {} texts ({} occurrences) from {} tokens in {} sections: \
             {} lookups, {} cache hits, {} entity fetches, {} entity cache hits, \
             {} fallbacks, {} candidates, {} suggestions; \
             search {:?}, matching {:?}, ranking {:?}, redirects {:?}, total {:?}",
            self.linked_entities,
            self.occurrences,
            self.linkable_tokens,
            self.sections,
            self.lookups,
            self.cache_hits,
            self.entity_fetches,
            self.entity_cache_hits,
            self.fallback_queries,
            self.candidates,
            self.suggestions,
            self.search_time,
            self.matching_time,
            self.ranking_time,
            self.redirect_time,
            self.total_time
        );
    }
}
