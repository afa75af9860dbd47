use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Access level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full access.
    Admin,
    /// Yard manager.
    Manager,
    /// Regular staff (default for new accounts).
    #[default]
    Employee,
}

impl Role {
    /// Parse a role name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for unknown names.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "MANAGER" => Ok(Self::Manager),
            "EMPLOYEE" => Ok(Self::Employee),
            _ => Err(Error::invalid_input(format!("Rôle invalide : {value}"))),
        }
    }

    /// Stored / serialized name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Employee => "EMPLOYEE",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Row id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login email, unique.
    pub email: String,
    /// Access level.
    pub role: Role,
    /// Argon2id PHC string.
    #[serde(skip)]
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Account to create. `password_hash` is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Access level.
    pub role: Role,
}
