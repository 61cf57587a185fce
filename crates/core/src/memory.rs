use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::ports::{SlotStore, StoreHealth, StoreResult, SwapRequestStore, UserStore};
use crate::slot::{NewSlot, Slot};
use crate::status::{SlotStatus, SwapStatus};
use crate::swap::{NewSwapRequest, SwapRequest};
use crate::types::DbId;
use crate::user::{normalize_email, NewUser, UserAccount, UserProfile};

/// A thread-safe in-memory backend implementing every store port.
///
/// Each table is an `Arc<RwLock<HashMap<..>>>`; cloning the store shares the
/// tables. Compare-and-swap operations run under the table's write lock so
/// each one is linearized. Batch transitions use the default ordered
/// per-record strategy from [`crate::ports::transition_in_order`].
#[derive(Default, Clone)]
pub struct MemoryStore {
    slots: Arc<RwLock<HashMap<DbId, Slot>>>,
    requests: Arc<RwLock<HashMap<DbId, SwapRequest>>>,
    users: Arc<RwLock<HashMap<DbId, UserAccount>>>,
    sequence: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> DbId {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn create(&self, input: NewSlot) -> StoreResult<Slot> {
        let slot = Slot {
            id: self.next_id(),
            owner_id: input.owner_id(),
            title: input.title().to_string(),
            start_time: input.start_time(),
            end_time: input.end_time(),
            status: input.status(),
            created_at: Utc::now(),
        };
        self.slots.write().await.insert(slot.id, slot.clone());
        Ok(slot)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<Slot>> {
        Ok(self.slots.read().await.get(&id).cloned())
    }

    async fn list_owned(&self, owner_id: DbId) -> StoreResult<Vec<Slot>> {
        let slots = self.slots.read().await;
        let mut owned: Vec<Slot> = slots
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|s| (s.start_time, s.id));
        Ok(owned)
    }

    async fn list_swappable_excluding(&self, user_id: DbId) -> StoreResult<Vec<Slot>> {
        let slots = self.slots.read().await;
        let mut open: Vec<Slot> = slots
            .values()
            .filter(|s| s.status == SlotStatus::Swappable && s.owner_id != user_id)
            .cloned()
            .collect();
        open.sort_by_key(|s| (s.start_time, s.id));
        Ok(open)
    }

    async fn transition(
        &self,
        id: DbId,
        expected: SlotStatus,
        new: SlotStatus,
    ) -> StoreResult<bool> {
        let mut slots = self.slots.write().await;
        match slots.get_mut(&id) {
            Some(slot) if slot.status == expected => {
                slot.status = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl SwapRequestStore for MemoryStore {
    async fn create(&self, input: NewSwapRequest) -> StoreResult<SwapRequest> {
        let mut requests = self.requests.write().await;
        let duplicate = requests.values().any(|r| {
            r.status == SwapStatus::Pending
                && r.requester_slot_id == input.requester_slot_id
                && r.target_slot_id == input.target_slot_id
        });
        if duplicate {
            return Err(StoreError::Duplicate(format!(
                "pending request for slots ({}, {}) already exists",
                input.requester_slot_id, input.target_slot_id
            )));
        }

        let request = SwapRequest {
            id: self.next_id(),
            requester_id: input.requester_id,
            requester_slot_id: input.requester_slot_id,
            target_user_id: input.target_user_id,
            target_slot_id: input.target_slot_id,
            status: SwapStatus::Pending,
            created_at: Utc::now(),
        };
        requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<SwapRequest>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn find_pending(
        &self,
        requester_id: DbId,
        requester_slot_id: DbId,
        target_slot_id: DbId,
    ) -> StoreResult<Option<SwapRequest>> {
        let requests = self.requests.read().await;
        Ok(requests
            .values()
            .find(|r| {
                r.status == SwapStatus::Pending
                    && r.requester_id == requester_id
                    && r.requester_slot_id == requester_slot_id
                    && r.target_slot_id == target_slot_id
            })
            .cloned())
    }

    async fn list_for_user(&self, user_id: DbId) -> StoreResult<Vec<SwapRequest>> {
        let requests = self.requests.read().await;
        let mut mine: Vec<SwapRequest> = requests
            .values()
            .filter(|r| r.involves(user_id))
            .cloned()
            .collect();
        mine.sort_by_key(|r| (r.created_at, r.id));
        Ok(mine)
    }

    async fn transition_status(
        &self,
        id: DbId,
        expected: SwapStatus,
        new: SwapStatus,
    ) -> StoreResult<bool> {
        let mut requests = self.requests.write().await;
        match requests.get_mut(&id) {
            Some(request) if request.status == expected => {
                request.status = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, input: NewUser) -> StoreResult<UserAccount> {
        let email = normalize_email(&input.email);
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::Duplicate(format!("email '{email}' is taken")));
        }
        let user = UserAccount {
            id: self.next_id(),
            name: input.name.trim().to_string(),
            email,
            password_hash: input.password_hash,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_profiles(&self, ids: &[DbId]) -> StoreResult<HashMap<DbId, UserProfile>> {
        let users = self.users.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id).map(|u| (u.id, u.profile())))
            .collect())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
