use std::sync::Arc;

use anyhow::Context;
use todo_auth::TokenProvider;
use todo_config::{CorsConfig, JwtConfig, SecurityConfig};
use todo_db::{init_db_pool, run_migrations};

use crate::middleware::exemption::ExemptionSet;
use crate::middleware::policy::AuthorizationPolicy;
use crate::modules::users::repository::{InMemoryUserRepository, PgUserRepository, UserRepository};

/// Shared, read-only application state. Cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub tokens: TokenProvider,
    pub policy: Arc<AuthorizationPolicy>,
    pub exemptions: Arc<ExemptionSet>,
    pub cors_config: CorsConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("policy", &self.policy)
            .field("exemptions", &self.exemptions)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Builds the state from explicit configuration.
    ///
    /// Fails on a missing signing secret or an unsupported exemption pattern.
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt_config: &JwtConfig,
        security_config: &SecurityConfig,
        cors_config: CorsConfig,
    ) -> anyhow::Result<Self> {
        let tokens = TokenProvider::new(jwt_config).context("Invalid JWT configuration")?;
        let policy = AuthorizationPolicy::standard().context("Invalid authorization policy")?;
        let exemptions = ExemptionSet::from_config(security_config, policy.exemption_overrides())
            .context("Invalid PERMIT_ALL_PATTERNS")?;

        Ok(Self {
            users,
            tokens,
            policy: Arc::new(policy),
            exemptions: Arc::new(exemptions),
            cors_config,
        })
    }
}

/// Builds the state from the environment.
///
/// Uses PostgreSQL when `DATABASE_URL` is set and an in-memory store otherwise.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let users: Arc<dyn UserRepository> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let db = init_db_pool(&database_url)
                .await
                .context("Failed to connect to database")?;
            run_migrations(&db).await.context("Failed to run migrations")?;
            Arc::new(PgUserRepository::new(db))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL is not set; users are kept in memory and lost on restart");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    AppState::new(
        users,
        &JwtConfig::from_env(),
        &SecurityConfig::from_env(),
        CorsConfig::from_env(),
    )
}
