//! Storage seam for user records.
//!
//! [`UserRepository`] is what the service layer talks to. [`PgUserRepository`]
//! backs it with PostgreSQL; [`InMemoryUserRepository`] keeps everything in a
//! process-local map and is used when no database is configured and in tests.
//!
//! Role changes go through [`UserRepository::compare_and_set_role`], which only
//! writes when the stored role still equals the expected one. Two concurrent
//! promotions of the same user therefore cannot both succeed.

use std::collections::HashMap;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sqlx::{FromRow, PgPool};
use todo_auth::Role;
use uuid::Uuid;

use crate::modules::users::model::{NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn exists_by_email(&self, email: &str) -> anyhow::Result<bool>;

    /// Inserts a user. Fails if the email is already taken.
    async fn create(&self, new_user: NewUser) -> anyhow::Result<User>;

    /// Sets `role = new` only if the stored role is still `expected`.
    ///
    /// Returns the updated record, or `None` when the user is missing or its role
    /// no longer matches.
    async fn compare_and_set_role(
        &self,
        id: Uuid,
        expected: Role,
        new: Role,
    ) -> anyhow::Result<Option<User>>;
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password: String,
    user_name: String,
    role: String,
    join_date: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .with_context(|| format!("Stored role for user {} is invalid", row.id))?;

        Ok(User {
            id: row.id,
            email: row.email,
            password: row.password,
            user_name: row.user_name,
            role,
            join_date: row.join_date,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password, user_name, role, join_date
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("Failed to fetch user by id")?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password, user_name, role, join_date
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("Failed to fetch user by email")?
        .map(User::try_from)
        .transpose()
    }

    async fn exists_by_email(&self, email: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.db)
                .await
                .context("Failed to check email")?;

        Ok(exists)
    }

    async fn create(&self, new_user: NewUser) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, password, user_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password, user_name, role, join_date
            "#,
        )
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(&new_user.user_name)
        .bind(new_user.role.as_str())
        .fetch_one(&self.db)
        .await
        .context("Failed to insert user")?;

        User::try_from(row)
    }

    async fn compare_and_set_role(
        &self,
        id: Uuid,
        expected: Role,
        new: Role,
    ) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET role = $3
            WHERE id = $1 AND role = $2
            RETURNING id, email, password, user_name, role, join_date
            "#,
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(new.as_str())
        .fetch_optional(&self.db)
        .await
        .context("Failed to update user role")?
        .map(User::try_from)
        .transpose()
    }
}

/// Process-local store. Every operation holds the lock for its whole duration.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `user` as-is, replacing any record with the same id.
    pub fn insert(&self, user: User) {
        self.users.write().insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> anyhow::Result<bool> {
        Ok(self.users.read().values().any(|user| user.email == email))
    }

    async fn create(&self, new_user: NewUser) -> anyhow::Result<User> {
        let mut users = self.users.write();

        if users.values().any(|user| user.email == new_user.email) {
            return Err(anyhow!("Email {} is already registered", new_user.email));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password: new_user.password,
            user_name: new_user.user_name,
            role: new_user.role,
            join_date: Utc::now(),
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn compare_and_set_role(
        &self,
        id: Uuid,
        expected: Role,
        new: Role,
    ) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write();

        match users.get_mut(&id) {
            Some(user) if user.role == expected => {
                user.role = new;
                Ok(Some(user.clone()))
            }
            _ => Ok(None),
        }
    }
}
