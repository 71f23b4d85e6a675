//! Embedded default configuration

use super::LinkingConfig;
use crate::error::ConfigError;
use std::sync::OnceLock;

/// Source of the embedded default configuration
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../configs/default.toml");

static EMBEDDED: OnceLock<Result<LinkingConfig, String>> = OnceLock::new();

/// The embedded default configuration, parsed and validated on first access
pub fn embedded_default() -> Result<&'static LinkingConfig, ConfigError> {
    EMBEDDED
        .get_or_init(|| LinkingConfig::from_toml_str(DEFAULT_CONFIG_TOML).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| ConfigError::Parse(format!("embedded default configuration: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_default_matches_built_in_defaults() {
        let embedded = embedded_default().unwrap();
        assert_eq!(embedded, &LinkingConfig::default());
    }

    #[test]
    fn test_embedded_default_is_cached() {
        let a = embedded_default().unwrap();
        let b = embedded_default().unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
