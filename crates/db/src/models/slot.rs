use sqlx::FromRow;
use slotswap_core::slot::Slot;
use slotswap_core::status::{SlotStatus, StatusId};
use slotswap_core::types::{DbId, Timestamp};

use super::CorruptRow;

/// A row from the `slots` table.
#[derive(Debug, Clone, FromRow)]
pub struct SlotRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<SlotRow> for Slot {
    type Error = CorruptRow;

    fn try_from(row: SlotRow) -> Result<Self, Self::Error> {
        let status = SlotStatus::from_id(row.status_id).ok_or(CorruptRow {
            table: "slots",
            id: row.id,
            status_id: row.status_id,
        })?;
        Ok(Slot {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            start_time: row.start_time,
            end_time: row.end_time,
            status,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn row(status_id: StatusId) -> SlotRow {
        let now = Utc::now();
        SlotRow {
            id: 7,
            owner_id: 1,
            title: "Standup".into(),
            start_time: now,
            end_time: now + chrono::Duration::minutes(15),
            status_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn converts_known_status() {
        let slot = Slot::try_from(row(3)).unwrap();
        assert_eq!(slot.status, SlotStatus::SwapPending);
        assert_eq!(slot.id, 7);
    }

    #[test]
    fn unknown_status_is_corrupt() {
        let err = Slot::try_from(row(9)).unwrap_err();
        assert_eq!(err.status_id, 9);
        assert!(err.to_string().contains("slots row 7"));
    }
}
