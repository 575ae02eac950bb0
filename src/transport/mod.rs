//! Transport layer: the contract between proxies and the engine channel.
//!
//! The proxy core is agnostic to whatever byte-level protocol carries its
//! commands. Everything it needs from the channel is captured by the
//! [`Transport`] trait; [`EngineConnection`] is the bundled WebSocket
//! implementation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐                           ┌─────────────────┐
//! │ Page / Engine│        Transport          │  Remote Engine  │
//! │  (proxies)   │◄─────────────────────────►│  (scripting     │
//! │              │   execute / subscribe     │   runtime)      │
//! └──────────────┘                           └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::TargetId;
use crate::protocol::InvocationMode;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::EngineConnection;

// ============================================================================
// LocalListener
// ============================================================================

/// A listener executing in the calling process.
///
/// Invoked with the event's arguments followed by the subscription's bound
/// extra arguments. Local listeners may freely close over state from their
/// defining scope; the proxy reference is made available by explicit
/// closure capture at registration time (see [`Page::on_local`]).
///
/// [`Page::on_local`]: crate::page::Page::on_local
pub type LocalListener = Arc<dyn Fn(&[Value]) + Send + Sync>;

// ============================================================================
// RemoteScript
// ============================================================================

/// Listener source code shipped into the engine's scripting context.
///
/// Remote-locality listeners cannot observe or modify local closure state;
/// they only see the extra arguments explicitly passed at registration.
///
/// # Example
///
/// ```
/// use wraith::RemoteScript;
///
/// let script = RemoteScript::new("function(status) { console.log(status); }")?;
/// assert!(script.source().starts_with("function"));
/// # Ok::<(), wraith::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteScript {
    /// Function expression source text.
    source: String,
}

impl RemoteScript {
    /// Creates a remote script from a function expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signature`] if the source is empty or is not a
    /// function expression. Validation happens here, before the script
    /// ever reaches a transport.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let trimmed = source.trim();

        if trimmed.is_empty() {
            return Err(Error::signature("remote listener source is empty"));
        }
        if !trimmed.starts_with("function") {
            return Err(Error::signature(
                "remote listener source is not a function expression",
            ));
        }

        Ok(Self { source })
    }

    /// Returns the source text.
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Consumes the script, returning the source text.
    #[inline]
    #[must_use]
    pub fn into_source(self) -> String {
        self.source
    }
}

// ============================================================================
// Listener
// ============================================================================

/// An event listener with its execution locality.
///
/// The locality decides where the listener's code runs when the event
/// fires: [`Listener::Local`] in the calling process, [`Listener::Remote`]
/// inside the engine's scripting context.
#[derive(Clone)]
pub enum Listener {
    /// Runs in the calling process.
    Local(LocalListener),
    /// Source shipped to and executed inside the engine.
    Remote(RemoteScript),
}

impl Listener {
    /// Returns `true` if the listener runs in the calling process.
    #[inline]
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(_) => f.write_str("Listener::Local(..)"),
            Self::Remote(script) => f.debug_tuple("Listener::Remote").field(script).finish(),
        }
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Handle describing an active event subscription.
///
/// Subscription state is owned entirely by the transport; this handle only
/// names the (event, target) pair so callers can correlate teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Subscribed event name.
    event: String,
    /// Target the subscription was registered against.
    target: TargetId,
}

impl Subscription {
    /// Creates a subscription handle.
    #[inline]
    #[must_use]
    pub fn new(event: impl Into<String>, target: TargetId) -> Self {
        Self {
            event: event.into(),
            target,
        }
    }

    /// Returns the event name.
    #[inline]
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Returns the target identifier.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &TargetId {
        &self.target
    }
}

// ============================================================================
// Transport
// ============================================================================

/// The channel to the remote engine.
///
/// The transport owns serialization, per-target command ordering, and all
/// subscription state. Proxies are pure routers on top of this contract.
///
/// # Errors
///
/// `execute` fails with [`Error::RemoteExecution`] when the remote
/// operation reports a failure and with a transport-class error (see
/// [`Error::is_transport_error`]) when the channel itself fails. Neither
/// is retried.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes a named operation against a target and awaits its result.
    ///
    /// Commands issued sequentially against the same target must be
    /// forwarded in issuance order; no ordering is guaranteed across
    /// targets or across sync/async operations issued concurrently.
    async fn execute(
        &self,
        target: &TargetId,
        operation: &str,
        args: Vec<Value>,
        mode: InvocationMode,
    ) -> Result<Value>;

    /// Registers a listener for a named event on a target.
    ///
    /// Local listeners are retained by the transport and invoked with the
    /// event's arguments followed by `extra_args`. Remote listeners have
    /// their source forwarded to the engine unmodified.
    async fn subscribe(
        &self,
        event: &str,
        target: &TargetId,
        listener: Listener,
        extra_args: Vec<Value>,
    ) -> Result<Subscription>;

    /// Drops the subscription for (event, target).
    ///
    /// Idempotent: unsubscribing an event with no active subscription is
    /// not an error.
    async fn unsubscribe(&self, event: &str, target: &TargetId) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================
