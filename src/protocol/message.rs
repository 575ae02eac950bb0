//! Wire message types.
//!
//! Defines the JSON message format exchanged with the remote engine over
//! the transport channel.
//!
//! # Message Types
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | [`Request`] | Local → Engine | Command invocation |
//! | [`SubscribeMessage`] | Local → Engine | Event subscription |
//! | [`UnsubscribeMessage`] | Local → Engine | Event teardown |
//! | [`Reply`] | Engine → Local | Command result |
//! | [`EventNotice`] | Engine → Local | Event notification |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{RequestId, TargetId};

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A command request from the local end to the engine.
///
/// # Format
///
/// ```json
/// {
///   "id": "uuid",
///   "type": "command",
///   "target": "page$7",
///   "operation": "open",
///   "args": ["https://example.com"],
///   "mode": "async"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Unique identifier for request/reply correlation.
    pub id: RequestId,

    /// Message type marker (always `command`).
    #[serde(rename = "type")]
    pub message_type: &'static str,

    /// Command with target, operation, args, and mode.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a new request with an auto-generated ID.
    #[inline]
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            id: RequestId::generate(),
            message_type: "command",
            command,
        }
    }

    /// Creates a new request with a specific ID.
    #[inline]
    #[must_use]
    pub fn with_id(id: RequestId, command: Command) -> Self {
        Self {
            id,
            message_type: "command",
            command,
        }
    }
}

// ============================================================================
// SubscribeMessage
// ============================================================================

/// An event subscription registration sent to the engine.
///
/// For remote-locality listeners, `source` carries the listener's code for
/// injection into the engine's scripting context. For local listeners,
/// `source` is absent and the engine only emits [`EventNotice`] messages.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeMessage {
    /// Message type marker (always `subscribe`).
    #[serde(rename = "type")]
    pub message_type: &'static str,

    /// Event name, e.g. `onResourceReceived`.
    pub event: String,

    /// Target object emitting the event.
    pub target: TargetId,

    /// `true` when the listener runs in the calling process.
    #[serde(rename = "runLocally")]
    pub run_locally: bool,

    /// Listener source for remote-locality subscriptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Extra arguments bound to the listener on every invocation.
    #[serde(rename = "extraArgs")]
    pub extra_args: Vec<Value>,
}

impl SubscribeMessage {
    /// Creates a subscription message for a locally-run listener.
    #[inline]
    #[must_use]
    pub fn local(event: impl Into<String>, target: TargetId, extra_args: Vec<Value>) -> Self {
        Self {
            message_type: "subscribe",
            event: event.into(),
            target,
            run_locally: true,
            source: None,
            extra_args,
        }
    }

    /// Creates a subscription message shipping listener source to the engine.
    #[inline]
    #[must_use]
    pub fn remote(
        event: impl Into<String>,
        target: TargetId,
        source: impl Into<String>,
        extra_args: Vec<Value>,
    ) -> Self {
        Self {
            message_type: "subscribe",
            event: event.into(),
            target,
            run_locally: false,
            source: Some(source.into()),
            extra_args,
        }
    }
}

// ============================================================================
// UnsubscribeMessage
// ============================================================================

/// An event teardown message sent to the engine.
///
/// Idempotent on the engine side: unsubscribing an event with no active
/// subscription is not an error.
#[derive(Debug, Clone, Serialize)]
pub struct UnsubscribeMessage {
    /// Message type marker (always `unsubscribe`).
    #[serde(rename = "type")]
    pub message_type: &'static str,

    /// Event name.
    pub event: String,

    /// Target object.
    pub target: TargetId,
}

impl UnsubscribeMessage {
    /// Creates an unsubscribe message.
    #[inline]
    #[must_use]
    pub fn new(event: impl Into<String>, target: TargetId) -> Self {
        Self {
            message_type: "unsubscribe",
            event: event.into(),
            target,
        }
    }
}

// ============================================================================
// Reply
// ============================================================================

/// A command reply from the engine.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": "uuid", "type": "success", "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": "uuid", "type": "error", "error": "code", "message": "detail" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Reply {
    /// Matches the request `id`.
    pub id: RequestId,

    /// Reply type discriminator.
    #[serde(rename = "type")]
    pub reply_type: ReplyType,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error code (if error).
    #[serde(default)]
    pub error: Option<String>,

    /// Error message (if error).
    #[serde(default)]
    pub message: Option<String>,
}

impl Reply {
    /// Returns `true` if this is a success reply.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.reply_type == ReplyType::Success
    }

    /// Returns `true` if this is an error reply.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.reply_type == ReplyType::Error
    }

    /// Extracts the result value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteExecution`] carrying the engine's error payload
    /// verbatim if the remote operation reported a failure.
    pub fn into_result(self) -> Result<Value> {
        match self.reply_type {
            ReplyType::Success => Ok(self.result.unwrap_or(Value::Null)),
            ReplyType::Error => {
                let code = self.error.unwrap_or_else(|| "unknown".to_string());
                let message = self.message.unwrap_or_else(|| code.clone());
                Err(Error::remote_execution(code, message))
            }
        }
    }
}

// ============================================================================
// ReplyType
// ============================================================================

/// Reply type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyType {
    /// Successful reply.
    Success,
    /// Error reply.
    Error,
}

// ============================================================================
// EventNotice
// ============================================================================

/// An event notification from the engine.
///
/// Emitted for subscriptions of either locality; the local end dispatches
/// the notice to locally-run listeners by (event, target).
///
/// # Format
///
/// ```json
/// {
///   "type": "event",
///   "event": "onLoadFinished",
///   "target": "page$7",
///   "params": ["success"]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct EventNotice {
    /// Message type marker (always `event`).
    #[serde(rename = "type")]
    pub notice_type: String,

    /// Event name.
    pub event: String,

    /// Target that emitted the event.
    pub target: TargetId,

    /// Ordered event arguments.
    #[serde(default)]
    pub params: Vec<Value>,
}

// ============================================================================
// Inbound
// ============================================================================

/// Any message the engine can send to the local end.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Inbound {
    /// Reply to an in-flight command.
    Reply(Reply),
    /// Event notification.
    Event(EventNotice),
}

// ============================================================================
// Tests
// ============================================================================
