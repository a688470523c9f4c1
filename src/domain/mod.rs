//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (errors, timestamps, state machines)
//! - `webhook` - Inbound webhook verification, audit, and dispatch
//! - `token` - Encrypted session-scoped access-token cache

pub mod foundation;
pub mod token;
pub mod webhook;
