//! Repository for the `users` table.

use sqlx::PgPool;
use slotswap_core::types::DbId;
use slotswap_core::user::NewUser;

use crate::models::user::{UserProfileRow, UserRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

/// Provides user creation and lookups.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user. The email must already be normalized.
    pub async fn create(pool: &PgPool, input: &NewUser) -> Result<UserRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(input.name.trim())
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Directory lookup: public attributes for a set of user ids.
    pub async fn find_profiles(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<UserProfileRow>, sqlx::Error> {
        sqlx::query_as::<_, UserProfileRow>(
            "SELECT id, name, email FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
