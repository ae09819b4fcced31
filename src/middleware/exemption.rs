//! Path patterns that mark routes as not requiring authentication.
//!
//! Patterns use the Ant-style subset below and are compiled once at startup:
//!
//! | Pattern | Matches |
//! |---|---|
//! | `/api-docs` | exactly that path |
//! | `/api/*/items` | one arbitrary segment in place of `*` |
//! | `/api/auth/**` | `/api/auth`, `/api/auth/` and everything below it |
//!
//! `?`, `**` anywhere but the last segment, and wildcards mixed with literal text
//! inside a segment are rejected with [`PatternError`].

use axum::http::Method;
use thiserror::Error;
use todo_config::SecurityConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid path pattern `{pattern}`: {reason}")]
pub struct PatternError {
    pub pattern: String,
    pub reason: String,
}

impl PatternError {
    fn new(pattern: &str, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// A compiled path pattern.
#[derive(Clone)]
pub struct PathPattern {
    source: String,
    matcher: matchit::Router<()>,
    prefix: bool,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let pattern = pattern.trim();
        if !pattern.starts_with('/') {
            return Err(PatternError::new(pattern, "must start with '/'"));
        }

        let mut matcher = matchit::Router::new();
        for route in to_routes(pattern)? {
            matcher
                .insert(route, ())
                .map_err(|e| PatternError::new(pattern, e.to_string()))?;
        }

        Ok(Self {
            source: pattern.to_string(),
            matcher,
            prefix: pattern.ends_with("/**"),
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        if self.matcher.at(path).is_ok() {
            return true;
        }
        // `/a/**` also takes `/a/`.
        self.prefix
            && path
                .strip_suffix('/')
                .is_some_and(|trimmed| !trimmed.is_empty() && self.matcher.at(trimmed).is_ok())
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PathPattern").field(&self.source).finish()
    }
}

/// Translates an Ant-style pattern into one or two matchit routes.
fn to_routes(pattern: &str) -> Result<Vec<String>, PatternError> {
    let segments: Vec<&str> = pattern[1..].split('/').collect();
    let last = segments.len() - 1;
    let mut converted = Vec::with_capacity(segments.len());
    let mut trailing_wildcard = false;

    for (i, segment) in segments.iter().enumerate() {
        match *segment {
            "**" if i == last => trailing_wildcard = true,
            "**" => return Err(PatternError::new(pattern, "'**' is only allowed at the end")),
            "*" => converted.push(format!("{{p{}}}", i)),
            s if s.contains(['*', '?']) => {
                return Err(PatternError::new(
                    pattern,
                    "wildcards must span a whole segment",
                ));
            }
            s if s.contains(['{', '}']) => {
                return Err(PatternError::new(pattern, "braces are not allowed"));
            }
            s => converted.push(s.to_string()),
        }
    }

    let base = format!("/{}", converted.join("/"));
    if !trailing_wildcard {
        return Ok(vec![base]);
    }

    // `/a/**` covers `/a` itself plus anything beneath it.
    let prefix = if base == "/" { String::new() } else { base.clone() };
    Ok(vec![base, format!("{}/{{*rest}}", prefix)])
}

/// A route carved back out of the exemption patterns.
#[derive(Debug, Clone)]
pub struct RouteOverride {
    method: Option<Method>,
    path: PathPattern,
}

impl RouteOverride {
    pub fn new(method: Option<Method>, path: PathPattern) -> Self {
        Self { method, path }
    }

    fn applies(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.path.matches(path)
    }
}

/// The configured exemption patterns plus explicit overrides.
///
/// A request is exempt when its path matches a pattern and no override applies.
#[derive(Debug, Clone, Default)]
pub struct ExemptionSet {
    patterns: Vec<PathPattern>,
    overrides: Vec<RouteOverride>,
}

impl ExemptionSet {
    pub fn new(patterns: Vec<PathPattern>, overrides: Vec<RouteOverride>) -> Self {
        Self {
            patterns,
            overrides,
        }
    }

    pub fn from_config(
        config: &SecurityConfig,
        overrides: Vec<RouteOverride>,
    ) -> Result<Self, PatternError> {
        let patterns = config
            .permit_all_patterns
            .iter()
            .map(|p| PathPattern::parse(p))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            patterns = ?config.permit_all_patterns,
            overrides = overrides.len(),
            "Compiled exemption patterns"
        );

        Ok(Self::new(patterns, overrides))
    }

    /// Whether `path` matches any configured pattern, ignoring overrides.
    pub fn matches_pattern(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    pub fn is_exempt(&self, method: &Method, path: &str) -> bool {
        self.matches_pattern(path) && !self.overrides.iter().any(|o| o.applies(method, path))
    }
}
