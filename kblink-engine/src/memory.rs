//! In-memory vocabulary backend
//!
//! Holds a small vocabulary as a list of [`Entity`] values and answers
//! lookups by word overlap. Loaded from JSON:
//!
//! ```json
//! [
//!   {
//!     "id": "http://dbpedia.org/resource/Paris",
//!     "ranking": 0.9,
//!     "labels": [{ "text": "Paris", "lang": "en" }],
//!     "types": ["http://dbpedia.org/ontology/City"],
//!     "redirects": [],
//!     "properties": { "http://xmlns.com/foaf/0.1/page": ["http://paris.fr"] }
//!   }
//! ]
//! ```
//!
//! Property values given as strings are references; values given as
//! `{ "text", "lang" }` objects are literals.

use crate::error::{EngineError, Result};
use kblink_core::lang::{primary_subtag, same_language};
use kblink_core::matching::normalize_token;
use kblink_core::{Entity, EntitySearcher, Iri, LinkerConfig, Literal, LookupRequest, SearchError, Term};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// One vocabulary entry of the JSON format
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VocabularyEntry {
    /// Entity IRI
    pub id: String,
    /// Entity ranking (e.g. popularity)
    #[serde(default)]
    pub ranking: Option<f64>,
    /// Labels, stored under the configured name field
    #[serde(default)]
    pub labels: Vec<Literal>,
    /// Type IRIs, stored under the configured type field
    #[serde(default)]
    pub types: Vec<String>,
    /// Redirect target IRIs, stored under the configured redirect field
    #[serde(default)]
    pub redirects: Vec<String>,
    /// Further values by property IRI
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<PropertyValue>>,
}

/// A value of [`VocabularyEntry::properties`]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A literal value
    Literal(Literal),
    /// A reference to another resource
    Reference(String),
}

/// A vocabulary held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySearcher {
    entities: Vec<Entity>,
    limit: Option<usize>,
}

impl InMemorySearcher {
    /// Create a searcher over `entities`
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            limit: None,
        }
    }

    /// Cap the number of results of every lookup
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Build a searcher from parsed entries, storing labels, types and
    /// redirects under the fields configured in `config`
    pub fn from_entries(entries: Vec<VocabularyEntry>, config: &LinkerConfig) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut entities = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.id.trim().is_empty() {
                return Err(EngineError::Vocabulary {
                    reason: "entry with an empty id".to_string(),
                });
            }
            if !seen.insert(entry.id.clone()) {
                return Err(EngineError::Vocabulary {
                    reason: format!("duplicate entry '{}'", entry.id),
                });
            }
            let mut entity = Entity::new(entry.id.as_str());
            if let Some(ranking) = entry.ranking {
                if !ranking.is_finite() {
                    return Err(EngineError::Vocabulary {
                        reason: format!("ranking of '{}' is not a finite number", entry.id),
                    });
                }
                entity = entity.with_ranking(ranking);
            }
            for label in entry.labels {
                entity = entity.with_text(&config.name_field, label);
            }
            for entity_type in entry.types {
                entity = entity.with_reference(&config.type_field, entity_type);
            }
            for target in entry.redirects {
                entity = entity.with_reference(&config.redirect_field, target);
            }
            for (property, values) in entry.properties {
                let property = Iri::new(property);
                for value in values {
                    let object = match value {
                        PropertyValue::Literal(literal) => Term::Literal(literal),
                        PropertyValue::Reference(iri) => Term::Iri(Iri::new(iri)),
                    };
                    entity.add_value(property.clone(), object);
                }
            }
            entities.push(entity);
        }
        log::debug!("loaded vocabulary of {} entities", entities.len());
        Ok(Self::new(entities))
    }

    /// Parse a JSON vocabulary
    pub fn from_json_str(json: &str, config: &LinkerConfig) -> Result<Self> {
        let entries: Vec<VocabularyEntry> =
            serde_json::from_str(json).map_err(|e| EngineError::Vocabulary {
                reason: e.to_string(),
            })?;
        Self::from_entries(entries, config)
    }

    /// Load a JSON vocabulary file
    pub fn from_file(path: impl AsRef<Path>, config: &LinkerConfig) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json, config)
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// `true` if the vocabulary holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn label_words(label: &str) -> impl Iterator<Item = String> + '_ {
    label
        .split(|c: char| !(c.is_alphanumeric() || c == '.'))
        .map(|word| normalize_token(word, false))
        .filter(|word| !word.is_empty())
}

/// Lookup language match: tags equal or sharing the primary subtag
fn language_matches(label: Option<&str>, requested: Option<&str>) -> bool {
    match (label, requested) {
        (Some(label), Some(requested)) => {
            primary_subtag(label).eq_ignore_ascii_case(primary_subtag(requested))
        }
        _ => same_language(label, requested),
    }
}

/// Copy of `entity` restricted to `fields`; all fields if `fields` is empty
fn select_fields(entity: &Entity, fields: &[Iri]) -> Entity {
    if fields.is_empty() {
        return entity.clone();
    }
    let mut selected = Entity::new(entity.id().clone());
    if let Some(ranking) = entity.ranking() {
        selected = selected.with_ranking(ranking);
    }
    selected.data_mut().extend(
        entity
            .data()
            .iter()
            .filter(|t| fields.contains(&t.predicate))
            .cloned(),
    );
    selected
}

fn rank_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl EntitySearcher for InMemorySearcher {
    fn lookup(&self, request: &LookupRequest<'_>) -> std::result::Result<Vec<Entity>, SearchError> {
        let wanted: Vec<String> = request
            .search_strings
            .iter()
            .map(|s| normalize_token(s, false))
            .filter(|s| !s.is_empty())
            .collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<(usize, &Entity)> = self
            .entities
            .iter()
            .filter_map(|entity| {
                let words: HashSet<String> = entity
                    .text(request.name_field)
                    .filter(|label| {
                        request.languages.is_empty()
                            || label.language().is_none()
                            || request
                                .languages
                                .iter()
                                .any(|lang| language_matches(label.language(), lang.as_deref()))
                    })
                    .flat_map(|label| label_words(&label.text))
                    .collect();
                let matched = wanted.iter().filter(|w| words.contains(*w)).count();
                (matched > 0).then_some((matched, entity))
            })
            .collect();
        hits.sort_by(|(count_a, a), (count_b, b)| {
            count_b
                .cmp(count_a)
                .then_with(|| rank_desc(a.ranking(), b.ranking()))
                .then_with(|| a.id().cmp(b.id()))
        });

        let limit = self.limit.map_or(request.limit, |l| l.min(request.limit));
        Ok(hits
            .into_iter()
            .skip(request.offset)
            .take(limit)
            .map(|(_, entity)| select_fields(entity, request.selected_fields))
            .collect())
    }

    fn get(&self, id: &Iri, fields: &[Iri]) -> std::result::Result<Option<Entity>, SearchError> {
        Ok(self
            .entities
            .iter()
            .find(|e| e.id() == id)
            .map(|e| select_fields(e, fields)))
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOCABULARY: &str = r#"[
        {
            "id": "urn:paris",
            "ranking": 0.9,
            "labels": [{ "text": "Paris", "lang": "en" }, { "text": "Parigi", "lang": "it" }],
            "types": ["urn:City"],
            "properties": { "urn:page": ["http://paris.fr"], "urn:motto": [{ "text": "Fluctuat nec mergitur" }] }
        },
        { "id": "urn:paris-hilton", "ranking": 0.5, "labels": [{ "text": "Paris Hilton", "lang": "en" }] },
        { "id": "urn:france", "labels": [{ "text": "France" }] },
        { "id": "urn:us", "labels": [{ "text": "U.S." }] }
    ]"#;

    fn searcher() -> InMemorySearcher {
        InMemorySearcher::from_json_str(VOCABULARY, &LinkerConfig::default()).unwrap()
    }

    fn lookup(searcher: &InMemorySearcher, words: &[&str], languages: &[Option<String>]) -> Vec<String> {
        let config = LinkerConfig::default();
        let strings: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        let request = LookupRequest {
            name_field: &config.name_field,
            selected_fields: &[],
            search_strings: &strings,
            languages,
            limit: 10,
            offset: 0,
        };
        searcher
            .lookup(&request)
            .unwrap()
            .iter()
            .map(|e| e.id().to_string())
            .collect()
    }

    #[test]
    fn test_lookup_orders_by_matched_strings_then_ranking() {
        let searcher = searcher();
        let en = vec![Some("en".to_string())];
        assert_eq!(
            lookup(&searcher, &["Paris"], &en),
            vec!["urn:paris", "urn:paris-hilton"]
        );
        assert_eq!(
            lookup(&searcher, &["Paris", "Hilton"], &en),
            vec!["urn:paris-hilton", "urn:paris"]
        );
    }

    #[test]
    fn test_lookup_respects_languages() {
        let searcher = searcher();
        assert!(lookup(&searcher, &["Parigi"], &[Some("en".to_string())]).is_empty());
        assert_eq!(
            lookup(&searcher, &["Parigi"], &[Some("it-IT".to_string())]),
            vec!["urn:paris"]
        );
        // untagged labels are always searched
        assert_eq!(
            lookup(&searcher, &["france"], &[Some("de".to_string())]),
            vec!["urn:france"]
        );
    }

    #[test]
    fn test_lookup_normalises_periods() {
        assert_eq!(lookup(&searcher(), &["US"], &[]), vec!["urn:us"]);
    }

    #[test]
    fn test_limit_and_offset() {
        let searcher = searcher().with_limit(1);
        assert_eq!(searcher.limit(), Some(1));
        let config = LinkerConfig::default();
        let strings = vec!["Paris".to_string()];
        let mut request = LookupRequest {
            name_field: &config.name_field,
            selected_fields: &[],
            search_strings: &strings,
            languages: &[],
            limit: 10,
            offset: 1,
        };
        let found = searcher.lookup(&request).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id().as_str(), "urn:paris-hilton");
        request.offset = 2;
        assert!(searcher.lookup(&request).unwrap().is_empty());
    }

    #[test]
    fn test_get_selects_fields() {
        let config = LinkerConfig::default();
        let searcher = searcher();
        let paris = searcher
            .get(&Iri::new("urn:paris"), &[config.type_field.clone()])
            .unwrap()
            .unwrap();
        assert_eq!(paris.ranking(), Some(0.9));
        assert_eq!(paris.data().len(), 1);
        assert!(searcher.get(&Iri::new("urn:nowhere"), &[]).unwrap().is_none());
    }

    #[test]
    fn test_properties_become_triples() {
        let paris = searcher().get(&Iri::new("urn:paris"), &[]).unwrap().unwrap();
        let page_field = Iri::new("urn:page");
        let page: Vec<_> = paris.references(&page_field).collect();
        assert_eq!(page, vec![&Iri::new("http://paris.fr")]);
        let motto_field = Iri::new("urn:motto");
        let motto: Vec<_> = paris.text(&motto_field).collect();
        assert_eq!(motto[0].text, "Fluctuat nec mergitur");
    }

    #[test]
    fn test_invalid_vocabularies() {
        let config = LinkerConfig::default();
        for json in [
            r#"[{ "id": "urn:a" }, { "id": "urn:a" }]"#,
            r#"[{ "id": " " }]"#,
            r#"[{ "id": "urn:a", "label": [] }]"#,
            r#"{ "id": "urn:a" }"#,
        ] {
            assert!(matches!(
                InMemorySearcher::from_json_str(json, &config),
                Err(EngineError::Vocabulary { .. })
            ));
        }
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vocabulary.json");
        std::fs::write(&path, VOCABULARY).unwrap();

        let searcher = InMemorySearcher::from_file(&path, &LinkerConfig::default()).unwrap();
        assert_eq!(searcher.len(), 4);

        let missing = InMemorySearcher::from_file(dir.path().join("missing.json"), &LinkerConfig::default());
        assert!(matches!(missing, Err(EngineError::Io(_))));
    }
}
