//! Storefront Payments - Inbound payment webhook trust pipeline
//!
//! Receives provider webhook deliveries, verifies them (RSA-SHA256 against
//! the provider certificate, with a server-side postback fallback), writes
//! one audit record per delivery and dispatches verified events to
//! per-event-type handlers. Also hosts the encrypted, session-scoped access
//! token cache used by the provider REST client.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
