//! Wire protocol message types.
//!
//! This module defines the message format for communication between the
//! local end (this crate) and the remote automation engine.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`Request`] | Local → Engine | Command invocation |
//! | [`SubscribeMessage`] | Local → Engine | Event subscription |
//! | [`UnsubscribeMessage`] | Local → Engine | Event teardown |
//! | [`Reply`] | Engine → Local | Command result |
//! | [`EventNotice`] | Engine → Local | Event notification |
//!
//! Every outbound message carries the issuing proxy's [`TargetId`]
//! unchanged; the local end never rewrites targets in flight.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command tuple and invocation mode |
//! | `message` | Wire message envelopes |
//!
//! [`TargetId`]: crate::identifiers::TargetId

// ============================================================================
// Submodules
// ============================================================================

/// Command and invocation mode types.
pub mod command;

/// Wire message types.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, InvocationMode};
pub use message::{
    EventNotice, Inbound, Reply, ReplyType, Request, SubscribeMessage, UnsubscribeMessage,
};
