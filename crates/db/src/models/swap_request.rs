use sqlx::FromRow;
use slotswap_core::status::{StatusId, SwapStatus};
use slotswap_core::swap::SwapRequest;
use slotswap_core::types::{DbId, Timestamp};

use super::CorruptRow;

/// A row from the `swap_requests` table.
#[derive(Debug, Clone, FromRow)]
pub struct SwapRequestRow {
    pub id: DbId,
    pub requester_id: DbId,
    pub requester_slot_id: DbId,
    pub target_user_id: DbId,
    pub target_slot_id: DbId,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<SwapRequestRow> for SwapRequest {
    type Error = CorruptRow;

    fn try_from(row: SwapRequestRow) -> Result<Self, Self::Error> {
        let status = SwapStatus::from_id(row.status_id).ok_or(CorruptRow {
            table: "swap_requests",
            id: row.id,
            status_id: row.status_id,
        })?;
        Ok(SwapRequest {
            id: row.id,
            requester_id: row.requester_id,
            requester_slot_id: row.requester_slot_id,
            target_user_id: row.target_user_id,
            target_slot_id: row.target_slot_id,
            status,
            created_at: row.created_at,
        })
    }
}
