//! Status enums for slots and swap requests.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` lookup table, and its wire name is the
//! SCREAMING_SNAKE_CASE form used by the HTTP contract.

use std::fmt;
use std::str::FromStr;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant = $val ),+
        }

        impl $name {
            /// Every variant in discriminant order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database status ID. Unknown ids yield `None`.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Wire name, e.g. `"SWAP_PENDING"`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $label => Ok($name::$variant), )+
                    other => Err(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        stringify!($name),
                        [$($label),+].join(", ")
                    )),
                }
            }
        }
    };
}

define_status_enum! {
    /// Availability of a calendar slot.
    SlotStatus {
        Busy = 1 => "BUSY",
        Swappable = 2 => "SWAPPABLE",
        /// Locked by exactly one outstanding swap request.
        SwapPending = 3 => "SWAP_PENDING",
    }
}

define_status_enum! {
    /// Lifecycle of a swap request. `Accepted` and `Rejected` are terminal.
    SwapStatus {
        Pending = 1 => "PENDING",
        Accepted = 2 => "ACCEPTED",
        Rejected = 3 => "REJECTED",
    }
}

impl SlotStatus {
    /// Statuses an owner may set by hand.
    pub fn is_owner_settable(self) -> bool {
        matches!(self, SlotStatus::Busy | SlotStatus::Swappable)
    }
}

impl SwapStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SwapStatus::Pending)
    }

    /// Whether the request state machine admits `self -> next`.
    pub fn can_transition_to(self, next: SwapStatus) -> bool {
        matches!(
            (self, next),
            (SwapStatus::Pending, SwapStatus::Accepted) | (SwapStatus::Pending, SwapStatus::Rejected)
        )
    }
}
