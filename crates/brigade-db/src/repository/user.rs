//! SurrealDB implementation of [`UserRepository`].
//!
//! Accounts are global; organization access is granted through
//! memberships. Passwords are stored as Argon2id PHC strings
//! (m = 19 MiB, t = 2, p = 1) with a fresh salt per hash and an
//! optional server-side pepper prepended.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
use brigade_core::error::BrigadeResult;
use brigade_core::models::user::{CreateUser, User, UserStatus};
use brigade_core::repository::UserRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    email: String,
    display_name: String,
    password_hash: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let status = UserStatus::parse(&self.status)
            .ok_or_else(|| DbError::Decode(format!("unknown user status: {}", self.status)))?;
        Ok(User {
            id: parse_uuid("user", &self.record_id)?,
            email: self.email,
            display_name: self.display_name,
            password_hash: self.password_hash,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ARGON2_MEMORY_KIB: u32 = 19_456;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_ITERATIONS, ARGON2_PARALLELISM, None)
        .map_err(|e| DbError::Query(format!("invalid argon2 parameters: {e}")))?;
    let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let input = match pepper {
        Some(pepper) => format!("{pepper}{password}"),
        None => password.to_owned(),
    };
    let salt = SaltString::generate(&mut OsRng);
    hasher
        .hash_password(input.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbError::Query(format!("hashing password: {e}")))
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    /// New users are created `Active`; there is no verification flow.
    async fn create(&self, input: CreateUser) -> BrigadeResult<User> {
        let id = Uuid::new_v4();
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let mut result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 email = $email, display_name = $display_name, \
                 password_hash = $password_hash, status = 'Active'; \
                 SELECT meta::id(id) AS record_id, * FROM type::record('user', $id);",
            )
            .bind(("id", id.to_string()))
            .bind(("email", input.email))
            .bind(("display_name", input.display_name))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("user", e))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id))?;
        Ok(row.try_into_user()?)
    }

    async fn get_by_id(&self, id: Uuid) -> BrigadeResult<User> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id))?;
        Ok(row.try_into_user()?)
    }

    async fn get_by_email(&self, email: &str) -> BrigadeResult<User> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE email = $email")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", format!("email={email}")))?;
        Ok(row.try_into_user()?)
    }
}
