//! Authorization hooks and guards.
//!
//! Identity is established elsewhere; this crate only knows how to read
//! credentials, check a password hash and decide whether a principal holds
//! a role.

pub mod credentials;
pub mod password;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use credentials::BasicCredentials;
pub use password::{hash_password, verify_password};

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("authentication required")]
    MissingCredentials,

    #[error("malformed authorization header")]
    MalformedCredentials,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("role {required} required")]
    Forbidden { required: Role },

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Role tags as stored on user records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    /// Whether holding `self` grants `required`. Admin implies user.
    pub fn grants(self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::User, Role::User) => true,
            (Role::User, Role::Admin) => false,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: i32,
    pub email: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(id: i32, email: impl Into<String>, mut roles: Vec<Role>) -> Self {
        // Every authenticated principal is at least a user.
        if !roles.contains(&Role::User) {
            roles.push(Role::User);
        }
        Self {
            id,
            email: email.into(),
            roles,
        }
    }

    pub fn has_role(&self, required: Role) -> bool {
        self.roles.iter().any(|role| role.grants(required))
    }

    pub fn require(&self, required: Role) -> Result<(), AuthzError> {
        if self.has_role(required) {
            Ok(())
        } else {
            tracing::warn!(
                principal = %self.email,
                required = %required,
                "role check denied"
            );
            Err(AuthzError::Forbidden { required })
        }
    }
}
