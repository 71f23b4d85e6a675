//! Redirect processing for ranked suggestions

use kblink_core::{Entity, Iri, LinkerConfig, RedirectMode, SearchError, Suggestion};

/// Process the redirects of `suggestion` according to the configured mode
///
/// `fetch` resolves a redirect target; unresolvable targets are skipped.
/// A suggestion is processed at most once.
pub fn process_redirects<F>(
    suggestion: &mut Suggestion,
    config: &LinkerConfig,
    mut fetch: F,
) -> Result<(), SearchError>
where
    F: FnMut(&Iri) -> Result<Option<Entity>, SearchError>,
{
    if config.redirect_mode == RedirectMode::Ignore || suggestion.is_redirect_processed() {
        return Ok(());
    }
    let targets: Vec<Iri> = suggestion
        .entity()
        .references(&config.redirect_field)
        .cloned()
        .collect();

    match config.redirect_mode {
        RedirectMode::Ignore => {}
        RedirectMode::AddValues => {
            for target in &targets {
                let Some(resolved) = fetch(target)? else {
                    log::debug!("redirect target {target} not found");
                    continue;
                };
                let entity = suggestion.entity_mut();
                let added = resolved
                    .data()
                    .iter()
                    .filter(|t| &t.subject == resolved.id())
                    .filter(|t| entity.add_value(t.predicate.clone(), t.object.clone()))
                    .count();
                log::debug!("merged {added} values of {target} into {}", entity.id());
            }
        }
        RedirectMode::Follow => {
            let mut followed = None;
            for target in &targets {
                match fetch(target)? {
                    Some(resolved) => followed = Some(resolved),
                    None => log::debug!("redirect target {target} not found"),
                }
            }
            if let Some(resolved) = followed {
                log::debug!("{} redirects to {}", suggestion.entity().id(), resolved.id());
                suggestion.set_redirect(resolved);
            }
        }
    }
    suggestion.mark_redirect_processed();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kblink_core::entity::{vocab, Literal};
    use kblink_core::matching::{LabelMatch, MatchWindow};

    fn suggestion(entity: Entity) -> Suggestion {
        let label_match = LabelMatch::new(
            Literal::plain("x"),
            1,
            MatchWindow {
                start: 0,
                span: 1,
                processable_match_count: 1,
                match_count: 1,
                token_match_score: 1.0,
                window_matchable_count: 1,
                labels_covered: true,
                exact: true,
            },
        )
        .unwrap();
        Suggestion::new(entity, vec![label_match])
    }

    fn see_also() -> Iri {
        Iri::new(vocab::RDFS_SEE_ALSO)
    }

    fn config(mode: RedirectMode) -> LinkerConfig {
        LinkerConfig {
            redirect_mode: mode,
            ..Default::default()
        }
    }

    fn target() -> Entity {
        Entity::new("urn:target")
            .with_ranking(0.9)
            .with_reference(&Iri::new(vocab::RDF_TYPE), "urn:Person")
    }

    fn fetch(id: &Iri) -> Result<Option<Entity>, SearchError> {
        Ok((id.as_str() == "urn:target").then(target))
    }

    #[test]
    fn test_add_values_merges_target_triples() {
        let mut s = suggestion(
            Entity::new("urn:alias").with_reference(&see_also(), "urn:target"),
        );
        process_redirects(&mut s, &config(RedirectMode::AddValues), fetch).unwrap();
        let rdf_type = Iri::new(vocab::RDF_TYPE);
        let types: Vec<_> = s
            .entity()
            .references(&rdf_type)
            .collect();
        assert_eq!(types, vec![&Iri::new("urn:Person")]);
        assert_eq!(s.effective_entity().id().as_str(), "urn:alias");
        assert!(s.is_redirect_processed());
    }

    #[test]
    fn test_follow_uses_last_resolvable_target() {
        let mut s = suggestion(
            Entity::new("urn:alias")
                .with_reference(&see_also(), "urn:target")
                .with_reference(&see_also(), "urn:missing"),
        );
        process_redirects(&mut s, &config(RedirectMode::Follow), fetch).unwrap();
        assert_eq!(s.effective_entity().id().as_str(), "urn:target");
        assert_eq!(s.entity_ranking(), Some(0.9));
    }

    #[test]
    fn test_processed_once() {
        let mut s = suggestion(
            Entity::new("urn:alias").with_reference(&see_also(), "urn:target"),
        );
        let mut calls = 0;
        for _ in 0..2 {
            process_redirects(&mut s, &config(RedirectMode::Follow), |id| {
                calls += 1;
                fetch(id)
            })
            .unwrap();
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_ignore_never_fetches() {
        let mut s = suggestion(
            Entity::new("urn:alias").with_reference(&see_also(), "urn:target"),
        );
        process_redirects(&mut s, &config(RedirectMode::Ignore), |_| panic!("fetched")).unwrap();
        assert!(s.redirect().is_none());
        assert!(!s.is_redirect_processed());
    }

    #[test]
    fn test_fetch_error_propagates() {
        let mut s = suggestion(
            Entity::new("urn:alias").with_reference(&see_also(), "urn:target"),
        );
        let result = process_redirects(&mut s, &config(RedirectMode::Follow), |id| {
            Err(SearchError::Get {
                iri: id.clone(),
                reason: "down".to_string(),
            })
        });
        assert!(result.is_err());
        assert!(!s.is_redirect_processed());
    }
}
