//! Ranking of the suggestions found for one search window
//!
//! Ranking runs in a fixed order:
//!
//! 1. sort by match type, match count and entity ranking
//! 2. split off suggestions matching more tokens than the best one
//! 3. downgrade (or drop) suggestions matching fewer tokens than the best one
//! 4. score relative to the best match count and sort by score
//! 5. truncate to `max_suggestions`, keeping ties if configured
//! 6. separate equal scores by entity ranking, if configured
//!
//! The longer-span group goes through steps 4 to 6 on its own.

use kblink_core::suggestion::{entity_rank_order, match_type_order, score_order};
use kblink_core::{LinkerConfig, Suggestion};

/// Suggestions of one window after ranking
#[derive(Debug, Default)]
pub struct Ranked {
    /// Suggestions for the span of the best match, best first
    pub suggestions: Vec<Suggestion>,
    /// Suggestions matching more tokens than the best match, best first
    pub longer_spans: Vec<Suggestion>,
}

/// Rank the suggestions of one window
pub fn rank(mut suggestions: Vec<Suggestion>, config: &LinkerConfig) -> Ranked {
    suggestions.sort_by(match_type_order);
    let (main, longer) = partition_longer_spans(suggestions, config.min_found_tokens);
    Ranked {
        suggestions: finish(main, config),
        longer_spans: finish(longer, config),
    }
}

fn finish(mut suggestions: Vec<Suggestion>, config: &LinkerConfig) -> Vec<Suggestion> {
    score_suggestions(&mut suggestions);
    truncate(
        &mut suggestions,
        config.max_suggestions,
        config.include_suggestions_with_similar_score,
    );
    if config.rank_equal_scores_by_entity_ranking {
        nudge_equal_scores(&mut suggestions, config.max_rank_adjustment);
    }
    suggestions
}

/// Split `sorted` at the match count of its first suggestion
///
/// Suggestions matching more tokens go to the second list unchanged.
/// Suggestions matching fewer tokens are downgraded to partial matches, or
/// dropped when they match fewer than `min_found_tokens`.
pub fn partition_longer_spans(
    sorted: Vec<Suggestion>,
    min_found_tokens: usize,
) -> (Vec<Suggestion>, Vec<Suggestion>) {
    let best_count = sorted.first().map_or(0, Suggestion::match_count);
    let mut main = Vec::with_capacity(sorted.len());
    let mut longer = Vec::new();
    for mut suggestion in sorted {
        let count = suggestion.match_count();
        if count > best_count {
            longer.push(suggestion);
        } else if count < best_count {
            if count < min_found_tokens {
                log::trace!(
                    "dropping {} ({count} of {best_count} tokens matched)",
                    suggestion.entity().id()
                );
                continue;
            }
            suggestion.downgrade_to_partial();
            main.push(suggestion);
        } else {
            main.push(suggestion);
        }
    }
    (main, longer)
}

/// Score each suggestion as `(count / best_count)² × match score` and sort by score
pub fn score_suggestions(suggestions: &mut [Suggestion]) {
    let best_count = suggestions
        .iter()
        .map(Suggestion::match_count)
        .max()
        .unwrap_or(0);
    if best_count == 0 {
        return;
    }
    for suggestion in suggestions.iter_mut() {
        let ratio = suggestion.match_count() as f64 / best_count as f64;
        let match_score = suggestion
            .best_match()
            .map_or(0.0, |m| m.match_score());
        suggestion.set_score(ratio * ratio * match_score);
    }
    suggestions.sort_by(score_order);
}

/// Keep the first `max` suggestions of a score-sorted list
///
/// With `keep_ties`, suggestions scoring the same as the last kept one stay too.
pub fn truncate(suggestions: &mut Vec<Suggestion>, max: usize, keep_ties: bool) {
    if suggestions.len() <= max {
        return;
    }
    let mut keep = max;
    if keep_ties && max > 0 {
        let cutoff = suggestions[max - 1].score();
        keep += suggestions[max..]
            .iter()
            .take_while(|s| s.score() >= cutoff)
            .count();
    }
    suggestions.truncate(keep);
}

/// Separate runs of equal scores by entity ranking
///
/// A run of `n` distinct ranking levels loses `adjust · level / n` per level,
/// where `adjust` is `max_adjustment` capped by the distance to the next lower
/// score. The best ranked entities keep their score and the run stays above
/// the next lower score.
pub fn nudge_equal_scores(suggestions: &mut [Suggestion], max_adjustment: f64) {
    let mut start = 0;
    while start < suggestions.len() {
        let score = suggestions[start].score();
        let end = start
            + suggestions[start..]
                .iter()
                .take_while(|s| s.score() == score)
                .count();
        if end - start > 1 {
            let next_lower = suggestions.get(end).map_or(0.0, Suggestion::score);
            nudge_run(&mut suggestions[start..end], score, max_adjustment.min(score - next_lower));
        }
        start = end;
    }
    suggestions.sort_by(score_order);
}

fn nudge_run(run: &mut [Suggestion], score: f64, adjust: f64) {
    if adjust <= 0.0 {
        return;
    }
    run.sort_by(entity_rank_order);
    let mut levels = Vec::with_capacity(run.len());
    let mut level = 0usize;
    for i in 0..run.len() {
        if i > 0 && run[i].entity_ranking() != run[i - 1].entity_ranking() {
            level += 1;
        }
        levels.push(level);
    }
    let level_count = level + 1;
    if level_count < 2 {
        return;
    }
    for (suggestion, level) in run.iter_mut().zip(levels) {
        suggestion.set_score(score - adjust * level as f64 / level_count as f64);
    }
}
