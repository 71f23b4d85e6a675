//! Knowledge-base entities and the vocabulary search capability
//!
//! The linker never talks to a concrete store. It consumes candidates through
//! [`EntitySearcher`] and reads their labels, types and redirects from the
//! entity's triples.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Well-known property IRIs used by the default configuration
pub mod vocab {
    /// `rdfs:label`
    pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    /// `rdf:type`
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `rdfs:seeAlso`, used for redirects by default
    pub const RDFS_SEE_ALSO: &str = "http://www.w3.org/2000/01/rdf-schema#seeAlso";
}

/// An IRI identifying an entity, a property or a type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    /// Create an IRI from its string form
    pub fn new(iri: impl Into<String>) -> Self {
        Iri(iri.into())
    }

    /// The string form of this IRI
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(iri: &str) -> Self {
        Iri(iri.to_string())
    }
}

impl From<String> for Iri {
    fn from(iri: String) -> Self {
        Iri(iri)
    }
}

/// A text literal with an optional language tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// Lexical form
    pub text: String,
    /// Language tag (e.g. `en`, `en-GB`); `None` for untagged literals
    #[serde(default, rename = "lang", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Literal {
    /// Create a language tagged literal
    pub fn new(text: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            text: text.into(),
            language: language.map(str::to_string),
        }
    }

    /// Create an untagged literal
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    /// Language tag of this literal
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

/// Object position of a triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    /// Reference to another resource
    Iri(Iri),
    /// Text value
    Literal(Literal),
}

/// A single statement about a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// The described resource
    pub subject: Iri,
    /// The property
    pub predicate: Iri,
    /// The value
    pub object: Term,
}

impl Triple {
    /// Create a triple
    pub fn new(subject: Iri, predicate: Iri, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// A knowledge-base candidate returned by an [`EntitySearcher`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: Iri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ranking: Option<f64>,
    #[serde(default)]
    data: Vec<Triple>,
}

impl Entity {
    /// Create an entity without any data
    pub fn new(id: impl Into<Iri>) -> Self {
        Self {
            id: id.into(),
            ranking: None,
            data: Vec::new(),
        }
    }

    /// Set the entity ranking (e.g. a popularity score)
    pub fn with_ranking(mut self, ranking: f64) -> Self {
        self.ranking = Some(ranking);
        self
    }

    /// Add a literal value for `field`
    pub fn with_text(mut self, field: &Iri, literal: Literal) -> Self {
        self.add_value(field.clone(), Term::Literal(literal));
        self
    }

    /// Add a reference value for `field`
    pub fn with_reference(mut self, field: &Iri, target: impl Into<Iri>) -> Self {
        self.add_value(field.clone(), Term::Iri(target.into()));
        self
    }

    /// The entity IRI
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// The entity ranking, if the backend provides one
    pub fn ranking(&self) -> Option<f64> {
        self.ranking
    }

    /// Literal values of `field` for this entity
    pub fn text<'a>(&'a self, field: &'a Iri) -> impl Iterator<Item = &'a Literal> + 'a {
        self.values(field).filter_map(|term| match term {
            Term::Literal(literal) => Some(literal),
            Term::Iri(_) => None,
        })
    }

    /// Referenced IRIs of `field` for this entity
    pub fn references<'a>(&'a self, field: &'a Iri) -> impl Iterator<Item = &'a Iri> + 'a {
        self.values(field).filter_map(|term| match term {
            Term::Iri(iri) => Some(iri),
            Term::Literal(_) => None,
        })
    }

    fn values<'a>(&'a self, field: &'a Iri) -> impl Iterator<Item = &'a Term> + 'a {
        self.data
            .iter()
            .filter(move |t| t.subject == self.id && &t.predicate == field)
            .map(|t| &t.object)
    }

    /// All triples known for this entity
    pub fn data(&self) -> &[Triple] {
        &self.data
    }

    /// Mutable access to the triples, used when merging redirect targets
    pub fn data_mut(&mut self) -> &mut Vec<Triple> {
        &mut self.data
    }

    /// Add `(id, predicate, object)` unless it is already present.
    ///
    /// Returns `true` if the triple was added.
    pub fn add_value(&mut self, predicate: Iri, object: Term) -> bool {
        let triple = Triple::new(self.id.clone(), predicate, object);
        if self.data.contains(&triple) {
            false
        } else {
            self.data.push(triple);
            true
        }
    }
}

/// Parameters of a single candidate lookup
#[derive(Debug, Clone, Copy)]
pub struct LookupRequest<'a> {
    /// Property holding the labels to search
    pub name_field: &'a Iri,
    /// Properties the returned entities should carry
    pub selected_fields: &'a [Iri],
    /// Search strings, in text order
    pub search_strings: &'a [String],
    /// Languages of interest; `None` stands for untagged labels
    pub languages: &'a [Option<String>],
    /// Maximum number of results
    pub limit: usize,
    /// Number of results to skip
    pub offset: usize,
}

/// Failure reported by a vocabulary backend
#[derive(Debug, Error)]
pub enum SearchError {
    /// A candidate lookup failed
    #[error("lookup failed: {reason}")]
    Lookup {
        /// Backend supplied reason
        reason: String,
    },

    /// Fetching a single entity failed
    #[error("failed to get entity {iri}: {reason}")]
    Get {
        /// Requested entity
        iri: Iri,
        /// Backend supplied reason
        reason: String,
    },

    /// The backend cannot serve requests at all
    #[error("search backend unavailable: {reason}")]
    Unavailable {
        /// Backend supplied reason
        reason: String,
    },
}

/// Vocabulary search capability consumed by the linker
///
/// Implementations must be safe for concurrent calls if a single searcher is
/// shared between documents linked in parallel. Calls are blocking; the core
/// never retries a failed call.
pub trait EntitySearcher: Send + Sync {
    /// Look up candidate entities whose labels match the search strings
    fn lookup(&self, request: &LookupRequest<'_>) -> Result<Vec<Entity>, SearchError>;

    /// Fetch a single entity by IRI
    fn get(&self, id: &Iri, fields: &[Iri]) -> Result<Option<Entity>, SearchError>;

    /// Maximum number of results the backend returns per lookup, if limited
    fn limit(&self) -> Option<usize> {
        None
    }
}
