//! Slot-swap negotiation engine.
//!
//! State machines:
//!
//! ```text
//! Slot:         BUSY <-> SWAPPABLE          (owner toggle, blocked while SWAP_PENDING)
//!               SWAPPABLE -> SWAP_PENDING   (propose, both slots as one batch)
//!               SWAP_PENDING -> BUSY        (accept)
//!               SWAP_PENDING -> SWAPPABLE   (reject)
//!
//! SwapRequest:  PENDING -> ACCEPTED | REJECTED   (terminal)
//! ```
//!
//! The engine holds no mutable state of its own. Every status write goes
//! through a store compare-and-swap, so any number of engine clones may run
//! concurrently against the same store. Lost races are reported as
//! [`CoreError::Conflict`] and never retried on the caller's behalf.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::error::CoreError;
use crate::ports::{SlotStore, Stores, SwapRequestStore, UserStore};
use crate::slot::{CreateSlot, Slot};
use crate::status::{SlotStatus, SwapStatus};
use crate::swap::{NewSwapRequest, SwapDecision, SwapRequest};
use crate::types::DbId;
use crate::user::{Contact, UserProfile};

/// A swappable slot enriched with its owner's display attributes.
#[derive(Debug, Clone, Serialize)]
pub struct SlotWithOwner {
    #[serde(flatten)]
    pub slot: Slot,
    pub owner: Contact,
}

/// A swap request enriched with both parties and both slots.
///
/// Slots are `None` only if the record has vanished from the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequestView {
    #[serde(flatten)]
    pub request: SwapRequest,
    pub requester: Contact,
    pub target: Contact,
    pub requester_slot: Option<Slot>,
    pub target_slot: Option<Slot>,
}

#[derive(Clone)]
pub struct NegotiationEngine {
    slots: Arc<dyn SlotStore>,
    requests: Arc<dyn SwapRequestStore>,
    directory: Arc<dyn UserStore>,
}

impl NegotiationEngine {
    pub fn new(
        slots: Arc<dyn SlotStore>,
        requests: Arc<dyn SwapRequestStore>,
        directory: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            slots,
            requests,
            directory,
        }
    }

    pub fn from_stores(stores: &Stores) -> Self {
        Self::new(
            Arc::clone(&stores.slots),
            Arc::clone(&stores.requests),
            Arc::clone(&stores.users),
        )
    }

    // -----------------------------------------------------------------------
    // Slots
    // -----------------------------------------------------------------------

    /// Validate and persist a new slot for `owner_id`.
    pub async fn create_slot(&self, owner_id: DbId, input: &CreateSlot) -> Result<Slot, CoreError> {
        let new_slot = input.validate(owner_id)?;
        let slot = self.slots.create(new_slot).await?;
        tracing::info!(slot_id = slot.id, owner_id, status = %slot.status, "Slot created");
        Ok(slot)
    }

    pub async fn list_owned(&self, owner_id: DbId) -> Result<Vec<Slot>, CoreError> {
        let slots = self.slots.list_owned(owner_id).await?;
        tracing::debug!(owner_id, count = slots.len(), "Listed owned slots");
        Ok(slots)
    }

    /// Other users' `SWAPPABLE` slots, each with its owner's name and email.
    pub async fn list_swappable(&self, user_id: DbId) -> Result<Vec<SlotWithOwner>, CoreError> {
        let slots = self.slots.list_swappable_excluding(user_id).await?;
        let owner_ids: Vec<DbId> = slots
            .iter()
            .map(|s| s.owner_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let profiles = self.directory.find_profiles(&owner_ids).await?;
        tracing::debug!(user_id, count = slots.len(), "Listed swappable slots");

        Ok(slots
            .into_iter()
            .map(|slot| SlotWithOwner {
                owner: contact(&profiles, slot.owner_id),
                slot,
            })
            .collect())
    }

    /// Owner-driven `BUSY <-> SWAPPABLE` toggle.
    ///
    /// Setting the current status again is a no-op. A slot locked by a
    /// pending swap cannot be toggled.
    pub async fn set_slot_availability(
        &self,
        owner_id: DbId,
        slot_id: DbId,
        new_status: SlotStatus,
    ) -> Result<Slot, CoreError> {
        if !new_status.is_owner_settable() {
            return Err(CoreError::Validation(format!(
                "status must be BUSY or SWAPPABLE, got {new_status}"
            )));
        }

        let mut slot = self
            .slots
            .find_by_id(slot_id)
            .await?
            .filter(|s| s.owner_id == owner_id)
            .ok_or(CoreError::NotFound {
                entity: "Slot",
                id: slot_id,
            })?;

        if slot.status == SlotStatus::SwapPending {
            return Err(locked(slot_id));
        }
        if slot.status == new_status {
            return Ok(slot);
        }

        if !self.slots.transition(slot_id, slot.status, new_status).await? {
            let current = self.slots.find_by_id(slot_id).await?.map(|s| s.status);
            tracing::warn!(slot_id, owner_id, ?current, "Lost race on slot availability toggle");
            return Err(match current {
                Some(SlotStatus::SwapPending) => locked(slot_id),
                _ => CoreError::Conflict(format!(
                    "Slot {slot_id} changed concurrently; re-read and retry"
                )),
            });
        }

        tracing::info!(slot_id, owner_id, from = %slot.status, to = %new_status, "Slot availability changed");
        slot.status = new_status;
        Ok(slot)
    }

    // -----------------------------------------------------------------------
    // Swap requests
    // -----------------------------------------------------------------------

    /// Propose exchanging `my_slot_id` (owned by `requester_id`) for
    /// `their_slot_id`.
    ///
    /// On success both slots are `SWAP_PENDING` and exactly one new `PENDING`
    /// request references them. On any failure nothing has changed.
    pub async fn propose_swap(
        &self,
        requester_id: DbId,
        my_slot_id: DbId,
        their_slot_id: DbId,
    ) -> Result<SwapRequest, CoreError> {
        if my_slot_id == their_slot_id {
            return Err(CoreError::Validation(
                "mySlotId and theirSlotId must differ".into(),
            ));
        }

        // Replay of an outstanding proposal.
        if let Some(existing) = self
            .requests
            .find_pending(requester_id, my_slot_id, their_slot_id)
            .await?
        {
            return Err(CoreError::Conflict(format!(
                "Swap request {} for these slots is already pending",
                existing.id
            )));
        }

        let mine = self.load_slot(my_slot_id).await?;
        if mine.owner_id != requester_id {
            return Err(CoreError::NotEligible(format!(
                "Slot {my_slot_id} is not yours to offer"
            )));
        }
        if mine.status != SlotStatus::Swappable {
            return Err(CoreError::NotEligible(format!(
                "Slot {my_slot_id} is {} and cannot be offered",
                mine.status
            )));
        }

        let theirs = self.load_slot(their_slot_id).await?;
        if theirs.owner_id == requester_id {
            return Err(CoreError::NotEligible(
                "Cannot swap with one of your own slots".into(),
            ));
        }
        if theirs.status != SlotStatus::Swappable {
            return Err(CoreError::NotEligible(format!(
                "Slot {their_slot_id} is {} and cannot be requested",
                theirs.status
            )));
        }

        let pair = [my_slot_id, their_slot_id];
        if !self
            .slots
            .transition_batch(&pair, SlotStatus::Swappable, SlotStatus::SwapPending)
            .await?
        {
            tracing::warn!(requester_id, my_slot_id, their_slot_id, "Lost race locking slots for swap");
            return Err(CoreError::Conflict(
                "One or both slots were claimed by another request".into(),
            ));
        }

        let created = self
            .requests
            .create(NewSwapRequest {
                requester_id,
                requester_slot_id: my_slot_id,
                target_user_id: theirs.owner_id,
                target_slot_id: their_slot_id,
            })
            .await;

        match created {
            Ok(request) => {
                tracing::info!(
                    request_id = request.id,
                    requester_id,
                    target_user_id = request.target_user_id,
                    my_slot_id,
                    their_slot_id,
                    "Swap proposed",
                );
                Ok(request)
            }
            Err(e) => {
                // Undo the lock so no SWAP_PENDING slot is left without a request.
                match self
                    .slots
                    .transition_batch(&pair, SlotStatus::SwapPending, SlotStatus::Swappable)
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => tracing::error!(
                        my_slot_id,
                        their_slot_id,
                        "Failed to release slots after request insert failed"
                    ),
                    Err(release_err) => tracing::error!(
                        my_slot_id,
                        their_slot_id,
                        error = %release_err,
                        "Failed to release slots after request insert failed"
                    ),
                }
                Err(e.into())
            }
        }
    }

    /// Record the target user's decision and release both slots.
    ///
    /// The request status is authoritative: if the slot release fails after
    /// the decision was recorded, the decision stands and the fault is
    /// reported as [`CoreError::Internal`].
    pub async fn respond_to_swap(
        &self,
        responder_id: DbId,
        request_id: DbId,
        decision: SwapDecision,
    ) -> Result<SwapRequest, CoreError> {
        let mut request = self
            .requests
            .find_by_id(request_id)
            .await?
            .filter(|r| r.target_user_id == responder_id)
            .ok_or(CoreError::NotFound {
                entity: "SwapRequest",
                id: request_id,
            })?;

        if request.status != SwapStatus::Pending {
            return Err(CoreError::InvalidState(format!(
                "Swap request {request_id} is already {}",
                request.status
            )));
        }

        let outcome = decision.request_status();
        if !self
            .requests
            .transition_status(request_id, SwapStatus::Pending, outcome)
            .await?
        {
            tracing::warn!(request_id, responder_id, "Lost race resolving swap request");
            return Err(CoreError::Conflict(format!(
                "Swap request {request_id} was resolved concurrently"
            )));
        }
        request.status = outcome;

        let release_to = decision.slot_outcome();
        let released = self
            .slots
            .transition_batch(&request.slot_ids(), SlotStatus::SwapPending, release_to)
            .await;
        match released {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!(
                    request_id,
                    requester_slot_id = request.requester_slot_id,
                    target_slot_id = request.target_slot_id,
                    "Slots were not SWAP_PENDING when releasing a resolved swap"
                );
                return Err(CoreError::Internal(format!(
                    "Swap request {request_id} was {outcome} but its slots were not pending; repair required"
                )));
            }
            Err(e) => {
                tracing::error!(request_id, error = %e, "Store failed releasing slots of a resolved swap");
                return Err(CoreError::Internal(format!(
                    "Swap request {request_id} was {outcome} but releasing its slots failed: {e}"
                )));
            }
        }

        tracing::info!(request_id, responder_id, decision = %outcome, "Swap request resolved");
        Ok(request)
    }

    /// Requests where `user_id` is either party, with contacts and slots.
    pub async fn list_requests(&self, user_id: DbId) -> Result<Vec<SwapRequestView>, CoreError> {
        let requests = self.requests.list_for_user(user_id).await?;
        tracing::debug!(user_id, count = requests.len(), "Listing swap requests");

        let user_ids: Vec<DbId> = requests
            .iter()
            .flat_map(|r| [r.requester_id, r.target_user_id])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let profiles = self.directory.find_profiles(&user_ids).await?;

        let mut slots: HashMap<DbId, Option<Slot>> = HashMap::new();
        for slot_id in requests.iter().flat_map(SwapRequest::slot_ids) {
            if !slots.contains_key(&slot_id) {
                let slot = self.slots.find_by_id(slot_id).await?;
                slots.insert(slot_id, slot);
            }
        }

        Ok(requests
            .into_iter()
            .map(|request| SwapRequestView {
                requester: contact(&profiles, request.requester_id),
                target: contact(&profiles, request.target_user_id),
                requester_slot: slots.get(&request.requester_slot_id).cloned().flatten(),
                target_slot: slots.get(&request.target_slot_id).cloned().flatten(),
                request,
            })
            .collect())
    }

    async fn load_slot(&self, slot_id: DbId) -> Result<Slot, CoreError> {
        self.slots
            .find_by_id(slot_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Slot",
                id: slot_id,
            })
    }
}

fn contact(profiles: &HashMap<DbId, UserProfile>, user_id: DbId) -> Contact {
    profiles.get(&user_id).map(Contact::from).unwrap_or_else(Contact::unknown)
}

fn locked(slot_id: DbId) -> CoreError {
    CoreError::InvalidState(format!(
        "Slot {slot_id} is locked by a pending swap request"
    ))
}
