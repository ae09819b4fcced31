//! Ordered authorization rules.
//!
//! Rules are checked top to bottom and the first rule whose method and target
//! match decides the requirement. Requests that match no rule must be
//! authenticated.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use todo_auth::{AuthError, Identity, Role};

use crate::middleware::auth::AuthContext;
use crate::middleware::exception::AuthRejection;
use crate::middleware::exemption::{ExemptionSet, PathPattern, PatternError, RouteOverride};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anonymous requests allowed.
    PermitAll,
    Authenticated,
    /// Authenticated and holding exactly this role.
    HasRole(Role),
}

impl Requirement {
    pub fn check(&self, identity: Option<&Identity>) -> Result<(), AuthError> {
        match (self, identity) {
            (Requirement::PermitAll, _) => Ok(()),
            (_, None) => Err(AuthError::MissingCredential),
            (Requirement::Authenticated, Some(_)) => Ok(()),
            (Requirement::HasRole(required), Some(identity)) if identity.role() == *required => {
                Ok(())
            }
            (Requirement::HasRole(required), Some(identity)) => Err(AuthError::AccessDenied {
                required: *required,
                actual: identity.role(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RuleTarget {
    Path(PathPattern),
    /// Any path matched by the configured exemption patterns.
    ExemptPatterns,
    AnyRequest,
}

#[derive(Debug, Clone)]
pub struct PolicyRule {
    method: Option<Method>,
    target: RuleTarget,
    requirement: Requirement,
}

impl PolicyRule {
    pub fn new(method: Option<Method>, target: RuleTarget, requirement: Requirement) -> Self {
        Self {
            method,
            target,
            requirement,
        }
    }

    pub fn path(
        method: Option<Method>,
        pattern: &str,
        requirement: Requirement,
    ) -> Result<Self, PatternError> {
        Ok(Self::new(
            method,
            RuleTarget::Path(PathPattern::parse(pattern)?),
            requirement,
        ))
    }

    fn matches(&self, method: &Method, path: &str, exemptions: &ExemptionSet) -> bool {
        if self.method.as_ref().is_some_and(|m| m != method) {
            return false;
        }

        match &self.target {
            RuleTarget::Path(pattern) => pattern.matches(path),
            RuleTarget::ExemptPatterns => exemptions.matches_pattern(path),
            RuleTarget::AnyRequest => true,
        }
    }
}

const DEFAULT_REQUIREMENT: Requirement = Requirement::Authenticated;

#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    rules: Vec<PolicyRule>,
}

impl AuthorizationPolicy {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }

    /// The rule table of the service:
    ///
    /// | Match | Requirement |
    /// |---|---|
    /// | `PUT /api/auth/promote` | role COMMON |
    /// | `/api/auth/load-profile` | authenticated |
    /// | exemption patterns | none |
    /// | anything else | authenticated |
    pub fn standard() -> Result<Self, PatternError> {
        Ok(Self::new(vec![
            PolicyRule::path(
                Some(Method::PUT),
                "/api/auth/promote",
                Requirement::HasRole(Role::Common),
            )?,
            PolicyRule::path(None, "/api/auth/load-profile", Requirement::Authenticated)?,
            PolicyRule::new(None, RuleTarget::ExemptPatterns, Requirement::PermitAll),
            PolicyRule::new(None, RuleTarget::AnyRequest, Requirement::Authenticated),
        ]))
    }

    pub fn evaluate(&self, method: &Method, path: &str, exemptions: &ExemptionSet) -> &Requirement {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path, exemptions))
            .map(|rule| &rule.requirement)
            .unwrap_or(&DEFAULT_REQUIREMENT)
    }

    /// Path rules that sit above the exemption rule and need an identity.
    ///
    /// Authentication must run for these even when an exemption pattern also
    /// matches, otherwise the rule could never be satisfied.
    pub fn exemption_overrides(&self) -> Vec<RouteOverride> {
        self.rules
            .iter()
            .take_while(|rule| !matches!(rule.target, RuleTarget::ExemptPatterns))
            .filter_map(|rule| match &rule.target {
                RuleTarget::Path(pattern) if rule.requirement != Requirement::PermitAll => {
                    Some(RouteOverride::new(rule.method.clone(), pattern.clone()))
                }
                _ => None,
            })
            .collect()
    }
}

/// Applies the policy to the identity attached by [`authenticate`].
///
/// [`authenticate`]: crate::middleware::auth::authenticate
pub async fn authorize(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let requirement = state
        .policy
        .evaluate(req.method(), req.uri().path(), &state.exemptions);
    let identity = req.extensions().get::<AuthContext>().map(AuthContext::identity);

    if let Err(err) = requirement.check(identity) {
        tracing::debug!(
            method = %req.method(),
            path = %req.uri().path(),
            requirement = ?requirement,
            error = %err,
            "Request denied by policy"
        );
        return Err(err.into());
    }

    Ok(next.run(req).await)
}
