//! Slot-swap domain core.
//!
//! Holds the status state machines, input validation, the storage ports the
//! negotiation protocol is written against, an in-memory backend, and the
//! [`negotiation::NegotiationEngine`] itself. Nothing in this crate knows
//! about HTTP or PostgreSQL.

pub mod error;
pub mod memory;
pub mod negotiation;
pub mod ports;
pub mod slot;
pub mod status;
pub mod swap;
pub mod types;
pub mod user;
