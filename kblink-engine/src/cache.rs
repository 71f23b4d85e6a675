//! Per-document lookup cache
//!
//! Owned by one linker; never shared between documents.

use kblink_core::{Entity, Iri, SearchError};
use std::collections::HashMap;

/// Caches lookups by search-string list and fetched redirect targets by IRI
#[derive(Debug, Default)]
pub struct LookupCache {
    lookups: HashMap<Vec<String>, Vec<Entity>>,
    entities: HashMap<Iri, Option<Entity>>,
    lookup_hits: usize,
    lookup_misses: usize,
    entity_hits: usize,
    entity_misses: usize,
}

impl LookupCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached candidates for `search_strings`, running `lookup` on a miss
    ///
    /// Failed lookups are not cached.
    pub fn lookup<F>(&mut self, search_strings: &[String], lookup: F) -> Result<Vec<Entity>, SearchError>
    where
        F: FnOnce() -> Result<Vec<Entity>, SearchError>,
    {
        if let Some(candidates) = self.lookups.get(search_strings) {
            self.lookup_hits += 1;
            log::debug!("lookup cache hit for {search_strings:?}");
            return Ok(candidates.clone());
        }
        self.lookup_misses += 1;
        log::debug!("lookup cache miss for {search_strings:?}");
        let candidates = lookup()?;
        self.lookups
            .insert(search_strings.to_vec(), candidates.clone());
        Ok(candidates)
    }

    /// Cached entity `id`, running `fetch` on a miss
    pub fn entity<F>(&mut self, id: &Iri, fetch: F) -> Result<Option<Entity>, SearchError>
    where
        F: FnOnce() -> Result<Option<Entity>, SearchError>,
    {
        if let Some(entity) = self.entities.get(id) {
            self.entity_hits += 1;
            return Ok(entity.clone());
        }
        self.entity_misses += 1;
        let entity = fetch()?;
        self.entities.insert(id.clone(), entity.clone());
        Ok(entity)
    }

    /// Lookups answered from the cache
    pub fn lookup_hits(&self) -> usize {
        self.lookup_hits
    }

    /// Lookups passed to the backend
    pub fn lookup_misses(&self) -> usize {
        self.lookup_misses
    }

    /// Entity fetches answered from the cache
    pub fn entity_hits(&self) -> usize {
        self.entity_hits
    }

    /// Entity fetches passed to the backend
    pub fn entity_misses(&self) -> usize {
        self.entity_misses
    }
}
