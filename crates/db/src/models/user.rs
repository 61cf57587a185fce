use sqlx::FromRow;
use slotswap_core::types::{DbId, Timestamp};
use slotswap_core::user::{UserAccount, UserProfile};

/// Full user row from the `users` table, including the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Directory projection: just the public attributes.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfileRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        UserAccount {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

impl From<UserProfileRow> for UserProfile {
    fn from(row: UserProfileRow) -> Self {
        UserProfile {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}
