//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Role, User, UserCreate};
use crate::utils::time::now_rfc3339;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Parse an external user id string
    pub fn record_id(id: &str) -> RepoResult<RecordId> {
        parse_record_id(USER_TABLE, id)
    }

    /// Find all users, oldest first
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY created_at")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let rid = Self::record_id(id)?;
        let user: Option<User> = self.base.db().select(rid).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user account
    ///
    /// The unique email index makes a concurrent duplicate registration fail
    /// at the storage layer even when both requests pass the check here.
    pub async fn create(&self, data: UserCreate, role: Role) -> RepoResult<User> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }

        let hash_pass = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    name = $name,
                    email = $email,
                    hash_pass = $hash_pass,
                    role = $role,
                    favorites = [],
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("email", data.email))
            .bind(("hash_pass", hash_pass))
            .bind(("role", role))
            .bind(("now", now_rfc3339()))
            .await?;

        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("User creation returned no record".into()))
    }

    /// Replace the password hash for the account registered under `email`
    pub async fn reset_password(&self, email: &str, new_password: &str) -> RepoResult<User> {
        let hash_pass = User::hash_password(new_password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?;

        let mut result = self
            .base
            .db()
            .query(
                "UPDATE user SET hash_pass = $hash_pass, updated_at = $now \
                 WHERE email = $email RETURN AFTER",
            )
            .bind(("hash_pass", hash_pass))
            .bind(("email", email.to_string()))
            .bind(("now", now_rfc3339()))
            .await?;

        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("No account for email {email}")))
    }

    /// Overwrite the favorites list (single-field update)
    pub async fn set_favorites(
        &self,
        user: &RecordId,
        favorites: Vec<RecordId>,
    ) -> RepoResult<Vec<RecordId>> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $user SET favorites = $favorites, updated_at = $now RETURN AFTER")
            .bind(("user", user.clone()))
            .bind(("favorites", favorites))
            .bind(("now", now_rfc3339()))
            .await?;

        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .map(|u| u.favorites)
            .ok_or_else(|| RepoError::NotFound(format!("User {user} not found")))
    }
}
