use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};

use super::{map_unique_violation, Storage};
use crate::error::Result;
use crate::model::{NewUser, Role, User};
use crate::timestamp;

const SELECT_USER: &str =
    "SELECT id, name, email, role, password_hash, created_at FROM users";

/// Message returned when an email is registered twice.
pub(crate) const DUPLICATE_EMAIL: &str = "Un utilisateur avec cet email existe déjà.";

impl Storage {
    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns a conflict error if the email is already registered.
    pub fn create_user(&self, user: &NewUser) -> Result<User> {
        let conn = self.conn()?;
        let created_at = timestamp::now();

        conn.execute(
            r"
            INSERT INTO users (name, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                user.name,
                user.email,
                user.password_hash,
                user.role.as_str(),
                timestamp::to_db(created_at),
            ],
        )
        .map_err(|e| map_unique_violation(e, DUPLICATE_EMAIL))?;

        let id = conn.last_insert_rowid();
        debug!("Inserted user with id {}", id);

        Ok(User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            password_hash: user.password_hash.clone(),
            created_at,
        })
    }

    /// Look up an account by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("{SELECT_USER} WHERE email = ?1"),
                [email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Look up an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(&format!("{SELECT_USER} WHERE id = ?1"), [id], row_to_user)
            .optional()?;
        Ok(user)
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(3)?;
    let role = Role::parse(&role_str).unwrap_or_else(|_| {
        warn!("Unknown role: {}, defaulting to employee", role_str);
        Role::Employee
    });

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role,
        password_hash: row.get(4)?,
        created_at: timestamp::column(row, 5)?,
    })
}
