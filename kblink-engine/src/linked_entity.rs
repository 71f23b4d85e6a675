//! Aggregated linking results

use crate::stats::LinkingStats;
use kblink_core::{Iri, LinkerConfig, Suggestion};
use serde::Serialize;
use std::collections::HashMap;

/// One place in the document where a selected text was linked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// Section (sentence) index
    pub section: usize,
    /// First token of the match (section token index)
    pub start_token: usize,
    /// Last token of the match (section token index)
    pub end_token: usize,
    /// Start byte offset in the document
    pub start: usize,
    /// End byte offset in the document (exclusive)
    pub end: usize,
    /// Text of the section
    pub context: String,
}

/// A selected text with its suggestions and all of its occurrences
///
/// Suggestions and types are taken from the first occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedEntity {
    selected_text: String,
    suggestions: Vec<Suggestion>,
    occurrences: Vec<Occurrence>,
    types: Vec<Iri>,
}

impl LinkedEntity {
    /// Create a linked entity from its first occurrence
    pub fn new(
        selected_text: impl Into<String>,
        suggestions: Vec<Suggestion>,
        occurrence: Occurrence,
        config: &LinkerConfig,
    ) -> Self {
        let types = infer_types(&suggestions, config);
        Self {
            selected_text: selected_text.into(),
            suggestions,
            occurrences: vec![occurrence],
            types,
        }
    }

    /// The linked text
    pub fn selected_text(&self) -> &str {
        &self.selected_text
    }

    /// Ranked suggestions, best first
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// The best suggestion
    pub fn best(&self) -> Option<&Suggestion> {
        self.suggestions.first()
    }

    /// Occurrences in document order
    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// Types of the top scored suggestions, after type mapping
    pub fn types(&self) -> &[Iri] {
        &self.types
    }

    /// Record another occurrence of the same text
    pub fn add_occurrence(&mut self, occurrence: Occurrence) {
        self.occurrences.push(occurrence);
    }
}

/// Mapped types of all suggestions sharing the top score
///
/// Falls back to the configured default type when none carries a type.
fn infer_types(suggestions: &[Suggestion], config: &LinkerConfig) -> Vec<Iri> {
    let mut types: Vec<Iri> = Vec::new();
    if let Some(top) = suggestions.first().map(Suggestion::score) {
        for suggestion in suggestions.iter().take_while(|s| s.score() >= top) {
            for entity_type in suggestion.effective_entity().references(&config.type_field) {
                let mapped = config.map_type(entity_type);
                if !types.contains(mapped) {
                    types.push(mapped.clone());
                }
            }
        }
    }
    if types.is_empty() {
        types.extend(config.default_type.iter().cloned());
    }
    types
}

/// Linked entities of one document, in order of first occurrence
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkingOutput {
    entities: Vec<LinkedEntity>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    stats: LinkingStats,
}

impl LinkingOutput {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add an occurrence of `selected_text`, creating the entity on first sight
    ///
    /// `suggestions` is only consulted on first sight. Returns `true` if a new
    /// entity was created.
    pub(crate) fn record(
        &mut self,
        selected_text: &str,
        suggestions: impl FnOnce() -> Vec<Suggestion>,
        occurrence: Occurrence,
        config: &LinkerConfig,
    ) -> bool {
        if let Some(&i) = self.index.get(selected_text) {
            self.entities[i].add_occurrence(occurrence);
            return false;
        }
        self.index
            .insert(selected_text.to_string(), self.entities.len());
        self.entities.push(LinkedEntity::new(
            selected_text,
            suggestions(),
            occurrence,
            config,
        ));
        true
    }

    pub(crate) fn stats_mut(&mut self) -> &mut LinkingStats {
        &mut self.stats
    }

    /// The linked entity for `selected_text`
    pub fn get(&self, selected_text: &str) -> Option<&LinkedEntity> {
        self.index.get(selected_text).map(|&i| &self.entities[i])
    }

    /// Linked entities in order of first occurrence
    pub fn entities(&self) -> &[LinkedEntity] {
        &self.entities
    }

    /// Consume the output, keeping only the entities
    pub fn into_entities(self) -> Vec<LinkedEntity> {
        self.entities
    }

    /// Number of distinct selected texts
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// `true` if nothing was linked
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Statistics of the run that produced this output
    pub fn stats(&self) -> &LinkingStats {
        &self.stats
    }
}
