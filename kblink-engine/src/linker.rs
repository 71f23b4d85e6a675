//! Entity linking of a single document
//!
//! [`EntityLinker`] walks the linkable tokens of a document, looks up
//! candidates for a window of tokens around each, aligns the candidates'
//! labels with the text and aggregates the ranked suggestions by selected
//! text. It owns a per-document [`LookupCache`] and is consumed by
//! [`EntityLinker::process`].

use crate::cache::LookupCache;
use crate::linked_entity::{LinkingOutput, Occurrence};
use crate::ranking;
use crate::redirect::process_redirects;
use kblink_core::lang::language_buckets;
use kblink_core::{
    AnalysedText, EntitySearcher, Iri, LabelMatcher, LabelTokenizer, LinkerConfig, LinkingConfig,
    LookupRequest, ProcessingState, Result, Suggestion,
};
use std::time::Instant;

/// Indices of the tokens searched together with the current token, in text order
///
/// Tokens are added alternating after and before the current token, skipping
/// tokens without alphanumeric characters. Each direction tolerates one
/// non-matchable token and closes at the second; the backward direction also
/// closes at the consumed index. The window never exceeds
/// `max_search_tokens` or `max_search_distance`.
pub fn search_window(state: &ProcessingState<'_>, config: &LinkerConfig) -> Vec<usize> {
    let Some(current) = state.token_index() else {
        return Vec::new();
    };
    let tokens = state.tokens();
    let consumed = state.consumed_index();

    let mut before = Vec::new();
    let mut after = Vec::new();
    let (mut forward_open, mut backward_open) = (true, true);
    let (mut forward_gaps, mut backward_gaps) = (0, 0);
    let full = |before: &Vec<usize>, after: &Vec<usize>| {
        1 + before.len() + after.len() >= config.max_search_tokens
    };

    for distance in 1..=config.max_search_distance {
        if full(&before, &after) || !(forward_open || backward_open) {
            break;
        }
        if forward_open {
            match tokens.get(current + distance) {
                None => forward_open = false,
                Some(token) if !token.has_alpha_numeric => {}
                Some(token) if token.is_matchable => after.push(current + distance),
                Some(_) => {
                    forward_gaps += 1;
                    forward_open = forward_gaps < 2;
                }
            }
        }
        if full(&before, &after) {
            break;
        }
        if backward_open {
            if distance > current || (current - distance) as isize <= consumed {
                backward_open = false;
            } else {
                let token = &tokens[current - distance];
                if token.is_matchable {
                    before.push(current - distance);
                } else if token.has_alpha_numeric {
                    backward_gaps += 1;
                    backward_open = backward_gaps < 2;
                }
            }
        }
    }

    before.reverse();
    before.push(current);
    before.extend(after);
    before
}

/// Links the entities of one document
pub struct EntityLinker<'a> {
    text: &'a AnalysedText,
    searcher: &'a dyn EntitySearcher,
    tokenizer: &'a dyn LabelTokenizer,
    config: &'a LinkingConfig,
    cache: LookupCache,
    output: LinkingOutput,
}

impl<'a> EntityLinker<'a> {
    /// Create a linker for `text`
    pub fn new(
        text: &'a AnalysedText,
        searcher: &'a dyn EntitySearcher,
        tokenizer: &'a dyn LabelTokenizer,
        config: &'a LinkingConfig,
    ) -> Self {
        Self {
            text,
            searcher,
            tokenizer,
            config,
            cache: LookupCache::new(),
            output: LinkingOutput::new(),
        }
    }

    /// Link the document
    ///
    /// Backend failures abort linking and are returned unchanged.
    pub fn process(mut self) -> Result<LinkingOutput> {
        let started = Instant::now();
        self.text.validate()?;

        let text = self.text;
        let config: &'a LinkingConfig = self.config;
        let linker_config = &config.linker;
        let language = text.language();
        let processing = config.processing.for_language(language);
        let unicase = config.processing.is_unicase(language);
        let languages = language_buckets(language, linker_config.default_language.as_deref());
        let matcher = LabelMatcher::new(linker_config, self.tokenizer);
        log::debug!(
            "linking document of {} bytes, language {:?}, label languages {:?}",
            text.text.len(),
            language,
            languages
        );

        let mut state = ProcessingState::new(text, processing, unicase);
        let mut section = None;
        while state.next() {
            let Some(current) = state.token_index() else {
                break;
            };
            let section_index = state.section().map(|s| s.section_index());
            if section_index != section {
                section = section_index;
                self.output.stats_mut().sections += 1;
            }
            self.output.stats_mut().linkable_tokens += 1;

            let window = search_window(&state, linker_config);
            let suggestions = match self.suggest(&state, &matcher, &window, &languages)? {
                Some(suggestions) => suggestions,
                None if window.len() > 1 => {
                    log::debug!(
                        "no label matched window {window:?}; retrying token {current} alone"
                    );
                    self.output.stats_mut().fallback_queries += 1;
                    self.suggest(&state, &matcher, &[current], &languages)?
                        .unwrap_or_default()
                }
                None => Vec::new(),
            };
            if suggestions.is_empty() {
                continue;
            }

            let ranking_started = Instant::now();
            let mut ranked = ranking::rank(suggestions, linker_config);
            self.output.stats_mut().ranking_time += ranking_started.elapsed();

            let redirect_started = Instant::now();
            self.resolve_redirects(&mut ranked.suggestions)?;
            self.resolve_redirects(&mut ranked.longer_spans)?;
            self.output.stats_mut().redirect_time += redirect_started.elapsed();

            if let Some(end_token) = self.aggregate(&state, ranked.suggestions) {
                state.set_consumed(end_token as isize)?;
            }
            self.aggregate(&state, ranked.longer_spans);
        }

        let cache = &self.cache;
        let (cache_hits, entity_fetches, entity_cache_hits) =
            (cache.lookup_hits(), cache.entity_misses(), cache.entity_hits());
        let mut output = self.output;
        let linked = output.len();
        let occurrences = output.entities().iter().map(|e| e.occurrences().len()).sum();
        let stats = output.stats_mut();
        stats.cache_hits = cache_hits;
        stats.entity_fetches = entity_fetches;
        stats.entity_cache_hits = entity_cache_hits;
        stats.linked_entities = linked;
        stats.occurrences = occurrences;
        stats.total_time = started.elapsed();
        stats.log_summary();
        Ok(output)
    }

    /// Suggestions for `window`
    ///
    /// `None` if the lookup returned candidates but no label matched; an
    /// empty list if the lookup returned nothing.
    fn suggest(
        &mut self,
        state: &ProcessingState<'_>,
        matcher: &LabelMatcher<'_>,
        window: &[usize],
        languages: &[Option<String>],
    ) -> Result<Option<Vec<Suggestion>>> {
        let config = &self.config.linker;
        let tokens = state.tokens();
        let search_strings: Vec<String> = window
            .iter()
            .map(|&i| tokens[i].search_text(config.lemma_matching).to_string())
            .collect();
        let selected_fields = config.selected_fields();
        let request = LookupRequest {
            name_field: &config.name_field,
            selected_fields: &selected_fields,
            search_strings: &search_strings,
            languages,
            limit: config.effective_lookup_limit(self.searcher.limit()),
            offset: 0,
        };

        let searcher = self.searcher;
        let misses = self.cache.lookup_misses();
        let search_started = Instant::now();
        let candidates = self
            .cache
            .lookup(&search_strings, || searcher.lookup(&request))?;
        let stats = self.output.stats_mut();
        stats.search_time += search_started.elapsed();
        stats.lookups += self.cache.lookup_misses() - misses;
        stats.candidates += candidates.len();
        log::debug!(
            "lookup {:?} returned {} candidates",
            search_strings,
            candidates.len()
        );
        if candidates.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let matching_started = Instant::now();
        let mut suggestions = Vec::new();
        for entity in candidates {
            if !config.accepts_types(entity.references(&config.type_field)) {
                log::trace!("{} filtered by type", entity.id());
                continue;
            }
            let matches = matcher.match_entity(state, window, &entity, languages)?;
            if !matches.is_empty() {
                suggestions.push(Suggestion::new(entity, matches));
            }
        }
        self.output.stats_mut().matching_time += matching_started.elapsed();

        Ok((!suggestions.is_empty()).then_some(suggestions))
    }

    fn resolve_redirects(&mut self, suggestions: &mut [Suggestion]) -> Result<()> {
        let config = &self.config.linker;
        let fields = config.selected_fields();
        let searcher = self.searcher;
        let cache = &mut self.cache;
        for suggestion in suggestions.iter_mut() {
            process_redirects(suggestion, config, |id: &Iri| {
                cache.entity(id, || searcher.get(id, &fields))
            })?;
        }
        Ok(())
    }

    /// Record the ranked `suggestions` as an occurrence of their best match
    ///
    /// Returns the last token of the match if it consumes the covered tokens.
    fn aggregate(&mut self, state: &ProcessingState<'_>, suggestions: Vec<Suggestion>) -> Option<usize> {
        let top = suggestions.first()?;
        let best = top.best_match()?;
        let section = state.section()?;
        let tokens = state.tokens();
        let (start_token, end_token) = (best.start(), best.end());
        let (start, end) = (tokens.get(start_token)?.start, tokens.get(end_token)?.end);
        let consumes = top.match_type().is_full();
        let selected_text = self.text.span_text(start, end).to_string();
        let occurrence = Occurrence {
            section: section.section_index(),
            start_token,
            end_token,
            start,
            end,
            context: section.text().to_string(),
        };

        let count = suggestions.len();
        let config = &self.config.linker;
        if self
            .output
            .record(&selected_text, || suggestions, occurrence, config)
        {
            log::debug!("linked '{selected_text}' [{start}, {end}) with {count} suggestions");
            self.output.stats_mut().suggestions += count;
        } else {
            log::debug!("another occurrence of '{selected_text}' at [{start}, {end})");
        }
        consumes.then_some(end_token)
    }
}
