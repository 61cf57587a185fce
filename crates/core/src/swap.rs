//! Swap request entity, proposal/response payloads and decision rules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::{SlotStatus, SwapStatus};
use crate::types::{DbId, Timestamp};

/// A proposal by one user to exchange their slot for another user's slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: DbId,
    pub requester_id: DbId,
    pub requester_slot_id: DbId,
    pub target_user_id: DbId,
    pub target_slot_id: DbId,
    pub status: SwapStatus,
    pub created_at: Timestamp,
}

impl SwapRequest {
    /// Both slot ids referenced by this request.
    pub fn slot_ids(&self) -> [DbId; 2] {
        [self.requester_slot_id, self.target_slot_id]
    }

    /// Whether `user_id` is either party to the request.
    pub fn involves(&self, user_id: DbId) -> bool {
        self.requester_id == user_id || self.target_user_id == user_id
    }
}

/// Insert payload for a new request. Stores always persist it as `PENDING`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSwapRequest {
    pub requester_id: DbId,
    pub requester_slot_id: DbId,
    pub target_user_id: DbId,
    pub target_slot_id: DbId,
}

/// Request body for `POST /swap-requests`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeSwap {
    pub my_slot_id: Option<DbId>,
    pub their_slot_id: Option<DbId>,
}

impl ProposeSwap {
    /// Return `(my_slot_id, their_slot_id)` once both are present and distinct.
    pub fn validate(&self) -> Result<(DbId, DbId), CoreError> {
        let (Some(mine), Some(theirs)) = (self.my_slot_id, self.their_slot_id) else {
            return Err(CoreError::Validation(
                "mySlotId and theirSlotId are required".into(),
            ));
        };
        if mine == theirs {
            return Err(CoreError::Validation(
                "mySlotId and theirSlotId must differ".into(),
            ));
        }
        Ok((mine, theirs))
    }
}

/// Request body for `POST /swap-requests/{id}/response`.
///
/// `response` is accepted as an alias of `decision` for older clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RespondToSwap {
    #[serde(alias = "response")]
    pub decision: Option<String>,
}

impl RespondToSwap {
    pub fn validate(&self) -> Result<SwapDecision, CoreError> {
        match self.decision.as_deref() {
            Some(raw) => raw.trim().parse(),
            None => Err(CoreError::Validation("decision is required".into())),
        }
    }
}

/// The target user's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapDecision {
    Accepted,
    Rejected,
}

impl SwapDecision {
    /// Terminal request status recorded for this decision.
    pub fn request_status(self) -> SwapStatus {
        match self {
            SwapDecision::Accepted => SwapStatus::Accepted,
            SwapDecision::Rejected => SwapStatus::Rejected,
        }
    }

    /// Status both slots are released to once the decision is recorded.
    ///
    /// Accepting does not transfer ownership; both slots become `BUSY`.
    pub fn slot_outcome(self) -> SlotStatus {
        match self {
            SwapDecision::Accepted => SlotStatus::Busy,
            SwapDecision::Rejected => SlotStatus::Swappable,
        }
    }
}

impl std::str::FromStr for SwapDecision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCEPTED" => Ok(SwapDecision::Accepted),
            "REJECTED" => Ok(SwapDecision::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid decision '{other}'. Must be one of: ACCEPTED, REJECTED"
            ))),
        }
    }
}
