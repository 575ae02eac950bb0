//! Command and invocation mode types.
//!
//! A [`Command`] is the ephemeral tuple (target, operation, ordered args)
//! constructed per call by the proxy and handed to the transport. The
//! [`InvocationMode`] tells the engine whether the operation completes with
//! a single quick reply or is long-running; from the proxy's perspective
//! both resolve to one eventual result.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::TargetId;

// ============================================================================
// InvocationMode
// ============================================================================

/// Whether a remote operation is quick or long-running.
///
/// The classification is a deliberate, explicit property of the operation
/// name (membership in the async table), never inferred at runtime. The
/// engine must not block other commands while an [`InvocationMode::Async`]
/// operation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationMode {
    /// Operation completes and returns a single reply.
    Sync,
    /// Operation is long-running; the engine manages completion notification.
    Async,
}

impl InvocationMode {
    /// Returns the wire name of the mode.
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
        }
    }
}

// ============================================================================
// Command
// ============================================================================

/// A single remote operation invocation.
///
/// Constructed per call and not retained: the proxy is a pure router and
/// never holds remote page state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    /// Target object the operation is dispatched against.
    pub target: TargetId,

    /// Named remote operation, e.g. `open` or `property`.
    pub operation: String,

    /// Ordered positional arguments.
    pub args: Vec<Value>,

    /// Sync or async dispatch.
    pub mode: InvocationMode,
}

impl Command {
    /// Creates a new command.
    #[inline]
    #[must_use]
    pub fn new(
        target: TargetId,
        operation: impl Into<String>,
        args: Vec<Value>,
        mode: InvocationMode,
    ) -> Self {
        Self {
            target,
            operation: operation.into(),
            args,
            mode,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
