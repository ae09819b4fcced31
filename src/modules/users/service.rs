use anyhow::anyhow;
use thiserror::Error;
use todo_auth::{CodecError, Identity, Role, TokenProvider};
use todo_core::{AppError, hash_password, verify_password};
use tracing::instrument;

use crate::modules::users::model::{
    LoginRequest, LoginResponse, NewUser, ProfileResponse, SignUpRequest, SignUpResponse,
};
use crate::modules::users::repository::UserRepository;

/// Failures of the COMMON to PREMIUM promotion.
#[derive(Debug, Error)]
pub enum PromotionError {
    /// The token names a user that no longer exists.
    #[error("User account could not be found")]
    UserNotFound,

    #[error("Only COMMON members can be promoted (current role: {current})")]
    IllegalTransition { current: Role },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),

    #[error(transparent)]
    Signing(#[from] CodecError),
}

impl PromotionError {
    pub fn into_app_error(self) -> AppError {
        match self {
            PromotionError::UserNotFound => AppError::not_found(self),
            PromotionError::IllegalTransition { .. } => AppError::conflict(self),
            PromotionError::Storage(_) | PromotionError::Signing(_) => AppError::internal(self),
        }
    }
}

pub struct UserService;

impl UserService {
    #[instrument(skip(users))]
    pub async fn is_duplicated(users: &dyn UserRepository, email: &str) -> Result<bool, AppError> {
        let exists = users.exists_by_email(email).await.map_err(AppError::database)?;
        if exists {
            tracing::warn!(email = %email, "Email is already registered");
        }
        Ok(exists)
    }

    #[instrument(skip(users, dto), fields(email = %dto.email))]
    pub async fn sign_up(
        users: &dyn UserRepository,
        dto: SignUpRequest,
    ) -> Result<SignUpResponse, AppError> {
        if Self::is_duplicated(users, &dto.email).await? {
            return Err(AppError::bad_request(anyhow!("Email is already registered")));
        }

        let password = hash_password(&dto.password)?;
        let saved = users
            .create(NewUser {
                email: dto.email,
                password,
                user_name: dto.user_name,
                role: Role::Common,
            })
            .await
            .map_err(AppError::database)?;

        tracing::info!(user_id = %saved.id, "User registered");
        Ok(SignUpResponse::from(&saved))
    }

    /// Checks credentials and issues a token. Unknown email and wrong password
    /// produce the same error.
    #[instrument(skip(users, tokens, dto), fields(email = %dto.email))]
    pub async fn authenticate(
        users: &dyn UserRepository,
        tokens: &TokenProvider,
        dto: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        let invalid_credentials = || AppError::unauthorized(anyhow!("Invalid email or password"));

        let user = users
            .find_by_email(&dto.email)
            .await
            .map_err(AppError::database)?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&dto.password, &user.password)? {
            return Err(invalid_credentials());
        }

        let token = tokens.issue(user.id, &user.email, user.role)?;
        tracing::info!(user_id = %user.id, "User signed in");

        Ok(LoginResponse::new(&user, token))
    }

    /// Moves the caller from COMMON to PREMIUM and issues a token carrying the new role.
    ///
    /// The role is re-read from storage rather than trusted from the token, and the
    /// write is a compare-and-set, so a user can be promoted at most once even under
    /// concurrent requests. Tokens issued earlier stay valid and keep the old role.
    #[instrument(skip(users, tokens, identity), fields(subject = %identity.subject_id()))]
    pub async fn promote_to_premium(
        users: &dyn UserRepository,
        tokens: &TokenProvider,
        identity: &Identity,
    ) -> Result<LoginResponse, PromotionError> {
        let Some(user_id) = identity.user_id() else {
            tracing::warn!("Token subject is not a user id");
            return Err(PromotionError::UserNotFound);
        };

        let Some(user) = users.find_by_id(user_id).await? else {
            tracing::warn!(user_id = %user_id, "Verified token refers to a missing user");
            return Err(PromotionError::UserNotFound);
        };

        if !user.role.can_transition_to(Role::Premium) {
            return Err(PromotionError::IllegalTransition { current: user.role });
        }

        let promoted = match users
            .compare_and_set_role(user.id, user.role, Role::Premium)
            .await?
        {
            Some(promoted) => promoted,
            None => {
                // Someone else changed the role between the read and the write.
                let current = users
                    .find_by_id(user.id)
                    .await?
                    .ok_or(PromotionError::UserNotFound)?;
                tracing::info!(user_id = %user.id, role = %current.role, "Lost promotion race");
                return Err(PromotionError::IllegalTransition {
                    current: current.role,
                });
            }
        };

        let token = tokens.issue(promoted.id, &promoted.email, promoted.role)?;
        tracing::info!(user_id = %promoted.id, "User promoted to PREMIUM");

        Ok(LoginResponse::new(&promoted, token))
    }

    #[instrument(skip(users, identity), fields(subject = %identity.subject_id()))]
    pub async fn load_profile(
        users: &dyn UserRepository,
        identity: &Identity,
    ) -> Result<ProfileResponse, AppError> {
        let user_id = identity
            .user_id()
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        let user = users
            .find_by_id(user_id)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        Ok(ProfileResponse::from(&user))
    }
}
