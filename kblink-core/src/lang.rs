//! Language tag helpers

/// Primary subtag of a language tag (`en-GB` → `en`)
pub fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Case-insensitive language tag equality; `None` only equals `None`
pub fn same_language(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// Languages to search labels in, highest priority first, without duplicates.
///
/// Order: document language, its primary subtag, then the configured default
/// (`None` stands for untagged labels).
pub fn language_buckets(
    document: Option<&str>,
    default_language: Option<&str>,
) -> Vec<Option<String>> {
    let mut buckets: Vec<Option<String>> = Vec::with_capacity(3);
    let mut push = |lang: Option<&str>| {
        if !buckets.iter().any(|b| same_language(b.as_deref(), lang)) {
            buckets.push(lang.map(str::to_string));
        }
    };
    push(document);
    if let Some(doc) = document {
        push(Some(primary_subtag(doc)));
    }
    push(default_language);
    buckets
}
