use std::env;

/// Default access token lifetime: one day.
const DEFAULT_ACCESS_EXPIRY: i64 = 86_400;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    /// Lifetime in seconds. `None` issues tokens without an `exp` claim.
    pub access_token_expiry: Option<i64>,
    /// Clock skew tolerated when checking `exp`, in seconds.
    pub leeway_secs: u64,
}

impl JwtConfig {
    /// Reads `JWT_SECRET`, `JWT_ISSUER`, `JWT_ACCESS_EXPIRY` and `JWT_LEEWAY`.
    ///
    /// A missing secret is kept empty here; the token codec refuses to start with it.
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET").unwrap_or_default(),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "todo-api".to_string()),
            access_token_expiry: parse_expiry(env::var("JWT_ACCESS_EXPIRY").ok().as_deref()),
            leeway_secs: env::var("JWT_LEEWAY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        }
    }
}

/// `0` or a negative value disables expiry; unparsable values fall back to the default.
fn parse_expiry(raw: Option<&str>) -> Option<i64> {
    match raw.map(|s| s.trim().parse::<i64>()) {
        None | Some(Err(_)) => Some(DEFAULT_ACCESS_EXPIRY),
        Some(Ok(secs)) if secs <= 0 => None,
        Some(Ok(secs)) => Some(secs),
    }
}
