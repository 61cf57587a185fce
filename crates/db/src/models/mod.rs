//! Row structs for the `slots`, `swap_requests` and `users` tables.
//!
//! Each row converts into its `slotswap_core` counterpart. Status columns are
//! stored as SMALLINT lookup ids and an unknown id fails the conversion
//! instead of being coerced.

pub mod slot;
pub mod swap_request;
pub mod user;

/// Raised when a row holds a value the domain cannot represent.
#[derive(Debug, thiserror::Error)]
#[error("{table} row {id} has unknown status_id {status_id}")]
pub struct CorruptRow {
    pub table: &'static str,
    pub id: slotswap_core::types::DbId,
    pub status_id: slotswap_core::status::StatusId,
}
