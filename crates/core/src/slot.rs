//! Calendar slot entity, creation input and validation.

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::SlotStatus;
use crate::types::{DbId, Timestamp};

/// Maximum length of a slot title, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Status assigned to a slot created without an explicit status.
pub const DEFAULT_SLOT_STATUS: SlotStatus = SlotStatus::Busy;

/// Timestamp layouts accepted in addition to RFC 3339. Naive values are UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// A user-owned calendar interval with an availability status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status: SlotStatus,
    pub created_at: Timestamp,
}

/// Request body for slot creation. Every field is optional at the wire level
/// so missing values surface as validation errors rather than parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlot {
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<String>,
}

/// A validated slot ready to be inserted. Only obtainable through
/// [`NewSlot::new`] or [`CreateSlot::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlot {
    owner_id: DbId,
    title: String,
    start_time: Timestamp,
    end_time: Timestamp,
    status: SlotStatus,
}

impl NewSlot {
    /// Validate and build a new slot.
    ///
    /// The title is trimmed and must be non-empty; `end_time` must be strictly
    /// after `start_time`; the initial status must be owner-settable.
    pub fn new(
        owner_id: DbId,
        title: &str,
        start_time: Timestamp,
        end_time: Timestamp,
        status: SlotStatus,
    ) -> Result<Self, CoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation("title must not be empty".into()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(CoreError::Validation(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        if end_time <= start_time {
            return Err(CoreError::Validation(
                "endTime must be after startTime".into(),
            ));
        }
        if !status.is_owner_settable() {
            return Err(CoreError::Validation(format!(
                "A slot cannot be created with status {status}"
            )));
        }

        Ok(Self {
            owner_id,
            title: title.to_string(),
            start_time,
            end_time,
            status,
        })
    }

    pub fn owner_id(&self) -> DbId {
        self.owner_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }
}

impl CreateSlot {
    /// Check presence of every required field and convert into a [`NewSlot`].
    pub fn validate(&self, owner_id: DbId) -> Result<NewSlot, CoreError> {
        let title = required(self.title.as_deref(), "title")?;
        let start = parse_timestamp(required(self.start_time.as_deref(), "startTime")?, "startTime")?;
        let end = parse_timestamp(required(self.end_time.as_deref(), "endTime")?, "endTime")?;
        let status = match self.status.as_deref() {
            Some(raw) => parse_slot_status(raw)?,
            None => DEFAULT_SLOT_STATUS,
        };
        NewSlot::new(owner_id, title, start, end, status)
    }
}

/// Parse a status string from a request body.
pub fn parse_slot_status(raw: &str) -> Result<SlotStatus, CoreError> {
    raw.trim().parse::<SlotStatus>().map_err(CoreError::Validation)
}

/// Parse an RFC 3339 timestamp, falling back to naive ISO layouts read as UTC.
pub fn parse_timestamp(raw: &str, field: &str) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| CoreError::Validation(format!("{field} is not a valid timestamp: '{raw}'")))
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!("{field} is required"))),
    }
}
