//! Ranked entity suggestions and their orderings

use crate::entity::Entity;
use crate::matching::{LabelMatch, MatchType};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::cmp::Ordering;

/// One candidate entity for a text span
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    entity: Entity,
    label_matches: Vec<LabelMatch>,
    score: f64,
    override_match: Option<MatchType>,
    redirect: Option<Entity>,
    redirect_processed: bool,
}

impl Suggestion {
    /// Create a suggestion from the label matches of `entity`
    ///
    /// The initial score is the match score of the best label match.
    pub fn new(entity: Entity, mut label_matches: Vec<LabelMatch>) -> Self {
        label_matches.sort_by(LabelMatch::best_first);
        let score = label_matches.first().map_or(0.0, LabelMatch::match_score);
        Self {
            entity,
            label_matches,
            score,
            override_match: None,
            redirect: None,
            redirect_processed: false,
        }
    }

    /// The suggested candidate
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Mutable candidate, used when merging redirect values
    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    /// Label matches, best first
    pub fn label_matches(&self) -> &[LabelMatch] {
        &self.label_matches
    }

    /// The best label match
    pub fn best_match(&self) -> Option<&LabelMatch> {
        self.label_matches.first()
    }

    /// Match type of the best label match unless overridden by ranking
    pub fn match_type(&self) -> MatchType {
        self.override_match.unwrap_or_else(|| {
            self.best_match()
                .map_or(MatchType::None, LabelMatch::match_type)
        })
    }

    /// Matched token count of the best label match
    pub fn match_count(&self) -> usize {
        self.best_match().map_or(0, LabelMatch::match_count)
    }

    /// Ranking score
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Replace the ranking score
    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    /// Report this suggestion as [`MatchType::Partial`] regardless of its label matches
    pub fn downgrade_to_partial(&mut self) {
        self.override_match = Some(MatchType::Partial);
    }

    /// The redirect target, when redirects are followed
    pub fn redirect(&self) -> Option<&Entity> {
        self.redirect.as_ref()
    }

    /// Set the followed redirect target
    pub fn set_redirect(&mut self, target: Entity) {
        self.redirect = Some(target);
    }

    /// `true` once redirects of this suggestion were processed
    pub fn is_redirect_processed(&self) -> bool {
        self.redirect_processed
    }

    /// Mark redirects of this suggestion as processed
    pub fn mark_redirect_processed(&mut self) {
        self.redirect_processed = true;
    }

    /// The entity reported for this suggestion: the redirect target if one
    /// was followed, else the candidate
    pub fn effective_entity(&self) -> &Entity {
        self.redirect.as_ref().unwrap_or(&self.entity)
    }

    /// Ranking of the effective entity
    pub fn entity_ranking(&self) -> Option<f64> {
        self.effective_entity().ranking()
    }
}

impl Serialize for Suggestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_struct("Suggestion", 6)?;
        out.serialize_field("entity", self.effective_entity().id())?;
        out.serialize_field("label", &self.best_match().map(LabelMatch::label))?;
        out.serialize_field("match", &self.match_type())?;
        out.serialize_field("score", &self.score)?;
        out.serialize_field("ranking", &self.entity_ranking())?;
        out.serialize_field(
            "redirected_from",
            &self.redirect.as_ref().map(|_| self.entity.id()),
        )?;
        out.end()
    }
}

/// Entity ranking descending; suggestions without ranking last
pub fn entity_rank_order(a: &Suggestion, b: &Suggestion) -> Ordering {
    match (a.entity_ranking(), b.entity_ranking()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Match type descending, then match count descending, then [`entity_rank_order`]
pub fn match_type_order(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.match_type()
        .cmp(&a.match_type())
        .then_with(|| b.match_count().cmp(&a.match_count()))
        .then_with(|| entity_rank_order(a, b))
}

/// Score descending, then [`match_type_order`]
pub fn score_order(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| match_type_order(a, b))
}
