//! User identity as seen by the swap core, plus signup validation.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Minimum accepted password length at signup.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Display name used when a referenced user cannot be resolved.
pub const UNKNOWN_USER: &str = "Unknown";

/// Full user record, including the password hash.
///
/// Deliberately not `Serialize`; use [`UserProfile`] in responses.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
}

impl UserAccount {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public attributes resolved by the directory lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: DbId,
    pub name: String,
    pub email: String,
}

/// Name/email pair embedded in enriched slot and request views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

impl Contact {
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_USER.to_string(),
            email: UNKNOWN_USER.to_string(),
        }
    }
}

impl From<&UserProfile> for Contact {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
        }
    }
}

/// Insert payload for a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Normalize an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate signup fields before the password is hashed.
pub fn validate_signup(name: &str, email: &str, password: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(CoreError::Validation("Missing required fields".into()));
    }
    let email = email.trim();
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    };
    if !valid_email {
        return Err(CoreError::Validation(format!("Invalid email address '{email}'")));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}
