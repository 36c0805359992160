//! User Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Admin,
    Staff,
    User,
}

impl Role {
    /// Staff and Admin may manage the catalog and list accounts
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Staff => write!(f, "Staff"),
            Role::User => write!(f, "User"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Staff" => Ok(Role::Staff),
            "User" => Ok(Role::User),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// User account entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
    /// Argon2 password hash
    pub hash_pass: String,
    pub role: Role,
    /// Favorite products (record links)
    #[serde(default)]
    pub favorites: Vec<RecordId>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl User {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.hash_pass)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User shape exposed over the API (no password hash)
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub favorites: Vec<String>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_ref().map(|id| id.to_string()),
            name: user.name,
            email: user.email,
            role: user.role,
            favorites: user.favorites.iter().map(|f| f.to_string()).collect(),
        }
    }
}
