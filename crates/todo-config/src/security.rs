use std::env;

use crate::split_list;

/// Patterns exempt from authentication when `PERMIT_ALL_PATTERNS` is unset.
pub const DEFAULT_PERMIT_ALL_PATTERNS: &str = "/,/api/auth/**,/api-docs/**";

/// Request security settings.
///
/// `permit_all_patterns` keeps the configured order; patterns are compiled by the
/// application at startup, which is where malformed entries are reported.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    pub permit_all_patterns: Vec<String>,
}

impl SecurityConfig {
    pub fn from_env() -> Self {
        let raw = env::var("PERMIT_ALL_PATTERNS")
            .unwrap_or_else(|_| DEFAULT_PERMIT_ALL_PATTERNS.to_string());
        Self::from_patterns(&raw)
    }

    pub fn from_patterns(raw: &str) -> Self {
        Self {
            permit_all_patterns: split_list(raw),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::from_patterns(DEFAULT_PERMIT_ALL_PATTERNS)
    }
}
