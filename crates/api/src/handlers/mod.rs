//! Request handlers.
//!
//! Slot and swap handlers delegate to the
//! [`NegotiationEngine`](slotswap_core::negotiation::NegotiationEngine); auth
//! handlers talk to the user store directly. Errors map via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod slots;
pub mod swaps;
