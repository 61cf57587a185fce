//! Repository for the `swap_requests` table.

use sqlx::PgPool;
use slotswap_core::status::SwapStatus;
use slotswap_core::swap::NewSwapRequest;
use slotswap_core::types::DbId;

use crate::models::swap_request::SwapRequestRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, requester_id, requester_slot_id, target_user_id, target_slot_id, \
                       status_id, created_at, updated_at";

/// Provides queries and the conditional status transition for swap requests.
pub struct SwapRequestRepo;

impl SwapRequestRepo {
    /// Insert a new request in `PENDING`.
    ///
    /// A second pending request for the same slot pair violates
    /// `uq_swap_requests_pending_pair`.
    pub async fn create(
        pool: &PgPool,
        input: &NewSwapRequest,
    ) -> Result<SwapRequestRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO swap_requests \
                (requester_id, requester_slot_id, target_user_id, target_slot_id, status_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SwapRequestRow>(&query)
            .bind(input.requester_id)
            .bind(input.requester_slot_id)
            .bind(input.target_user_id)
            .bind(input.target_slot_id)
            .bind(SwapStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SwapRequestRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM swap_requests WHERE id = $1");
        sqlx::query_as::<_, SwapRequestRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the pending request keyed by (requester, requester slot, target slot).
    pub async fn find_pending(
        pool: &PgPool,
        requester_id: DbId,
        requester_slot_id: DbId,
        target_slot_id: DbId,
    ) -> Result<Option<SwapRequestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM swap_requests \
             WHERE requester_id = $1 AND requester_slot_id = $2 \
               AND target_slot_id = $3 AND status_id = $4"
        );
        sqlx::query_as::<_, SwapRequestRow>(&query)
            .bind(requester_id)
            .bind(requester_slot_id)
            .bind(target_slot_id)
            .bind(SwapStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Requests where the user is requester or target, oldest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SwapRequestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM swap_requests \
             WHERE requester_id = $1 OR target_user_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, SwapRequestRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Single-statement compare-and-swap on a request's status.
    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        expected: SwapStatus,
        new: SwapStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE swap_requests SET status_id = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = $2",
        )
        .bind(id)
        .bind(expected.id())
        .bind(new.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
