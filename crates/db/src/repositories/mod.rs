//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod slot_repo;
pub mod swap_request_repo;
pub mod user_repo;

pub use slot_repo::SlotRepo;
pub use swap_request_repo::SwapRequestRepo;
pub use user_repo::UserRepo;
