//! Repository for the `slots` table.
//!
//! Status writes are conditional on the current `status_id`; there is no
//! unconditional status setter.

use sqlx::PgPool;
use slotswap_core::slot::NewSlot;
use slotswap_core::status::{SlotStatus, StatusId};
use slotswap_core::types::DbId;

use crate::models::slot::SlotRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, title, start_time, end_time, status_id, created_at, updated_at";

/// Provides queries and conditional status transitions for slots.
pub struct SlotRepo;

impl SlotRepo {
    /// Insert a new slot, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewSlot) -> Result<SlotRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO slots (owner_id, title, start_time, end_time, status_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SlotRow>(&query)
            .bind(input.owner_id())
            .bind(input.title())
            .bind(input.start_time())
            .bind(input.end_time())
            .bind(input.status().id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SlotRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slots WHERE id = $1");
        sqlx::query_as::<_, SlotRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's slots in chronological order.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<SlotRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM slots WHERE owner_id = $1 ORDER BY start_time, id"
        );
        sqlx::query_as::<_, SlotRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// List every `SWAPPABLE` slot not owned by `user_id`.
    pub async fn list_swappable_excluding(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SlotRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM slots \
             WHERE status_id = $1 AND owner_id <> $2 \
             ORDER BY start_time, id"
        );
        sqlx::query_as::<_, SlotRow>(&query)
            .bind(SlotStatus::Swappable.id())
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Single-statement compare-and-swap on one slot's status.
    ///
    /// Returns `true` only if the row existed with `expected` and now holds `new`.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE slots SET status_id = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = $2",
        )
        .bind(id)
        .bind(expected.id())
        .bind(new.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// All-or-nothing compare-and-swap over a set of slots in one transaction.
    ///
    /// Rows are locked with `FOR UPDATE` in ascending id order so concurrent
    /// batches over overlapping sets cannot deadlock. If any row is missing or
    /// not in `expected`, the transaction rolls back and `false` is returned.
    pub async fn transition_batch(
        pool: &PgPool,
        ids: &[DbId],
        expected: SlotStatus,
        new: SlotStatus,
    ) -> Result<bool, sqlx::Error> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(true);
        }

        let mut tx = pool.begin().await?;

        let locked: Vec<(DbId, StatusId)> = sqlx::query_as(
            "SELECT id, status_id FROM slots WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&ids[..])
        .fetch_all(&mut *tx)
        .await?;

        let all_expected =
            locked.len() == ids.len() && locked.iter().all(|(_, s)| *s == expected.id());
        if !all_expected {
            tx.rollback().await?;
            return Ok(false);
        }

        let result = sqlx::query(
            "UPDATE slots SET status_id = $3, updated_at = NOW() \
             WHERE id = ANY($1) AND status_id = $2",
        )
        .bind(&ids[..])
        .bind(expected.id())
        .bind(new.id())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() != ids.len() as u64 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
