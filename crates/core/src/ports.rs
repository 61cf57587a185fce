//! Storage ports the negotiation engine is written against.
//!
//! Backends only need per-record conditional writes. Cross-record atomicity
//! is provided by [`SlotStore::transition_batch`], whose default
//! implementation is [`transition_in_order`]; backends with native
//! multi-record transactions override it with the same contract.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::slot::{NewSlot, Slot};
use crate::status::{SlotStatus, SwapStatus};
use crate::swap::{NewSwapRequest, SwapRequest};
use crate::types::DbId;
use crate::user::{NewUser, UserAccount, UserProfile};

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn create(&self, input: NewSlot) -> StoreResult<Slot>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Slot>>;

    async fn list_owned(&self, owner_id: DbId) -> StoreResult<Vec<Slot>>;

    /// All `SWAPPABLE` slots whose owner is not `user_id`.
    async fn list_swappable_excluding(&self, user_id: DbId) -> StoreResult<Vec<Slot>>;

    /// Compare-and-swap on a single slot's status.
    ///
    /// Sets `new` only if the current status equals `expected`, as one atomic
    /// operation. Returns `Ok(false)` (not an error) when the precondition did
    /// not hold or the slot does not exist.
    async fn transition(&self, id: DbId, expected: SlotStatus, new: SlotStatus)
        -> StoreResult<bool>;

    /// Compare-and-swap on a set of slots as one unit.
    ///
    /// Succeeds only if every member currently has status `expected`; otherwise
    /// no member is modified and `Ok(false)` is returned.
    async fn transition_batch(
        &self,
        ids: &[DbId],
        expected: SlotStatus,
        new: SlotStatus,
    ) -> StoreResult<bool> {
        transition_in_order(self, ids, expected, new).await
    }
}

#[async_trait]
pub trait SwapRequestStore: Send + Sync {
    /// Insert a new request in `PENDING`.
    async fn create(&self, input: NewSwapRequest) -> StoreResult<SwapRequest>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<SwapRequest>>;

    /// The `PENDING` request with this idempotency key, if any.
    async fn find_pending(
        &self,
        requester_id: DbId,
        requester_slot_id: DbId,
        target_slot_id: DbId,
    ) -> StoreResult<Option<SwapRequest>>;

    /// Requests where `user_id` is the requester or the target, oldest first.
    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<SwapRequest>>;

    /// Compare-and-swap on a request's status. Same contract as
    /// [`SlotStore::transition`].
    async fn transition_status(
        &self,
        id: DbId,
        expected: SwapStatus,
        new: SwapStatus,
    ) -> StoreResult<bool>;
}

/// Identity collaborator: user records and the directory lookup used to
/// enrich slots and requests with display attributes.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with [`StoreError::Duplicate`] if the email exists.
    async fn create(&self, input: NewUser) -> StoreResult<UserAccount>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;

    /// Resolve profiles for `ids`. Unknown ids are absent from the map.
    async fn find_profiles(&self, ids: &[DbId]) -> StoreResult<HashMap<DbId, UserProfile>>;
}

/// Liveness check for the backing store.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> StoreResult<()>;
}

/// Handles to every store, shared across requests for the process lifetime.
#[derive(Clone)]
pub struct Stores {
    pub slots: Arc<dyn SlotStore>,
    pub requests: Arc<dyn SwapRequestStore>,
    pub users: Arc<dyn UserStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    /// Build from a single backend that implements every port.
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: SlotStore + SwapRequestStore + UserStore + StoreHealth + Clone + 'static,
    {
        Self {
            slots: Arc::new(backend.clone()),
            requests: Arc::new(backend.clone()),
            users: Arc::new(backend.clone()),
            health: Arc::new(backend),
        }
    }
}

/// Ordered two-phase compare-and-swap over a set of slots.
///
/// Ids are de-duplicated and applied in ascending order so two concurrent
/// batches always contend on the lowest shared id first. On the first failed
/// member every already-applied member is reverted (newest first) and
/// `Ok(false)` is returned. A store error mid-batch also triggers the revert
/// before the error is returned. If a revert itself does not apply, the slot
/// is left in `new` and [`StoreError::Unavailable`] is returned.
pub async fn transition_in_order<S>(
    store: &S,
    ids: &[DbId],
    expected: SlotStatus,
    new: SlotStatus,
) -> StoreResult<bool>
where
    S: SlotStore + ?Sized,
{
    let mut ordered = ids.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    let mut applied: Vec<DbId> = Vec::with_capacity(ordered.len());
    for id in ordered {
        match store.transition(id, expected, new).await {
            Ok(true) => applied.push(id),
            Ok(false) => {
                revert(store, &applied, expected, new).await?;
                return Ok(false);
            }
            Err(e) => {
                revert(store, &applied, expected, new).await?;
                return Err(e);
            }
        }
    }
    Ok(true)
}

async fn revert<S>(
    store: &S,
    applied: &[DbId],
    expected: SlotStatus,
    new: SlotStatus,
) -> StoreResult<()>
where
    S: SlotStore + ?Sized,
{
    for id in applied.iter().rev() {
        if !store.transition(*id, new, expected).await? {
            tracing::error!(slot_id = id, from = %new, to = %expected, "Batch rollback did not apply");
            return Err(StoreError::Unavailable(format!(
                "rollback of slot {id} from {new} to {expected} did not apply"
            )));
        }
    }
    Ok(())
}
