//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, error types, and the state machine trait
//! shared by the webhook and token cache domains.

mod errors;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
