//! PostgreSQL implementation of the core store ports.

use std::collections::HashMap;

use async_trait::async_trait;
use slotswap_core::error::StoreError;
use slotswap_core::ports::{SlotStore, StoreHealth, StoreResult, SwapRequestStore, UserStore};
use slotswap_core::slot::{NewSlot, Slot};
use slotswap_core::status::{SlotStatus, SwapStatus};
use slotswap_core::swap::{NewSwapRequest, SwapRequest};
use slotswap_core::types::DbId;
use slotswap_core::user::{normalize_email, NewUser, UserAccount, UserProfile};

use crate::models::CorruptRow;
use crate::repositories::{SlotRepo, SwapRequestRepo, UserRepo};
use crate::DbPool;

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Store backed by a shared connection pool.
///
/// Slot batches use a native transaction (see [`SlotRepo::transition_batch`])
/// instead of the default ordered per-record strategy.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Translate a sqlx error into the driver-agnostic [`StoreError`].
///
/// Unique violations become [`StoreError::Duplicate`] naming the constraint;
/// everything else is [`StoreError::Unavailable`].
pub fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return StoreError::Duplicate(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ));
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Unavailable(err.to_string())
}

fn corrupt(err: CorruptRow) -> StoreError {
    tracing::error!(error = %err, "Corrupt row");
    StoreError::Unavailable(err.to_string())
}

fn convert<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = CorruptRow>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(corrupt))
        .collect()
}

#[async_trait]
impl SlotStore for PgStore {
    async fn create(&self, input: NewSlot) -> StoreResult<Slot> {
        let row = SlotRepo::create(&self.pool, &input).await.map_err(store_error)?;
        Slot::try_from(row).map_err(corrupt)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Slot>> {
        SlotRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(|row| Slot::try_from(row).map_err(corrupt))
            .transpose()
    }

    async fn list_owned(&self, owner_id: DbId) -> StoreResult<Vec<Slot>> {
        let rows = SlotRepo::list_by_owner(&self.pool, owner_id)
            .await
            .map_err(store_error)?;
        convert(rows)
    }

    async fn list_swappable_excluding(&self, user_id: DbId) -> StoreResult<Vec<Slot>> {
        let rows = SlotRepo::list_swappable_excluding(&self.pool, user_id)
            .await
            .map_err(store_error)?;
        convert(rows)
    }

    async fn transition(
        &self,
        id: DbId,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> StoreResult<bool> {
        SlotRepo::transition(&self.pool, id, expected, new)
            .await
            .map_err(store_error)
    }

    async fn transition_batch(
        &self,
        ids: &[DbId],
        expected: SlotStatus,
        new: SlotStatus,
    ) -> StoreResult<bool> {
        SlotRepo::transition_batch(&self.pool, ids, expected, new)
            .await
            .map_err(store_error)
    }
}

#[async_trait]
impl SwapRequestStore for PgStore {
    async fn create(&self, input: NewSwapRequest) -> StoreResult<SwapRequest> {
        let row = SwapRequestRepo::create(&self.pool, &input)
            .await
            .map_err(store_error)?;
        SwapRequest::try_from(row).map_err(corrupt)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<SwapRequest>> {
        SwapRequestRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(|row| SwapRequest::try_from(row).map_err(corrupt))
            .transpose()
    }

    async fn find_pending(
        &self,
        requester_id: DbId,
        requester_slot_id: DbId,
        target_slot_id: DbId,
    ) -> StoreResult<Option<SwapRequest>> {
        SwapRequestRepo::find_pending(&self.pool, requester_id, requester_slot_id, target_slot_id)
            .await
            .map_err(store_error)?
            .map(|row| SwapRequest::try_from(row).map_err(corrupt))
            .transpose()
    }

    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<SwapRequest>> {
        let rows = SwapRequestRepo::list_for_user(&self.pool, user_id)
            .await
            .map_err(store_error)?;
        convert(rows)
    }

    async fn transition_status(
        &self,
        id: DbId,
        expected: SwapStatus,
        new: SwapStatus,
    ) -> StoreResult<bool> {
        SwapRequestRepo::transition_status(&self.pool, id, expected, new)
            .await
            .map_err(store_error)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, input: NewUser) -> StoreResult<UserAccount> {
        let input = NewUser {
            email: normalize_email(&input.email),
            ..input
        };
        let row = UserRepo::create(&self.pool, &input)
            .await
            .map_err(store_error)?;
        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let row = UserRepo::find_by_email(&self.pool, &normalize_email(email))
            .await
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_profiles(&self, ids: &[DbId]) -> StoreResult<HashMap<DbId, UserProfile>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = UserRepo::find_profiles(&self.pool, ids)
            .await
            .map_err(store_error)?;
        Ok(rows
            .into_iter()
            .map(|row| (row.id, UserProfile::from(row)))
            .collect())
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await.map_err(store_error)
    }
}
