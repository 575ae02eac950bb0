//! Error types for the engine proxy.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use wraith::{Result, Page};
//!
//! async fn example(page: &Page) -> Result<()> {
//!     page.open(["https://example.com".into()]).await?;
//!     page.render(["page.png".into()]).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Transport | [`Error::Transport`], [`Error::ConnectionClosed`], [`Error::RequestTimeout`] |
//! | Remote | [`Error::RemoteExecution`] |
//! | Local | [`Error::Signature`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`], [`Error::ChannelClosed`] |
//!
//! The core never retries or suppresses a failure: transport and remote
//! errors surface to the original caller as the `Err` of the awaited
//! invocation, while [`Error::Signature`] is returned before any transport
//! interaction takes place.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The channel to the remote engine failed.
    ///
    /// Returned when the engine process died, disconnected, or the wire
    /// itself misbehaved. Never retried by the core.
    #[error("Transport failed: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// Connection to the engine closed unexpectedly.
    ///
    /// Returned when the connection is lost while commands are in flight.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Command request timeout.
    ///
    /// Returned when the engine does not reply within the timeout.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// The remote operation itself reported a failure.
    ///
    /// Carries the error payload verbatim as reported by the engine,
    /// e.g. when a script threw inside the remote scripting context.
    #[error("Remote execution failed ({code}): {message}")]
    RemoteExecution {
        /// Error code reported by the engine.
        code: String,
        /// Error message reported by the engine.
        message: String,
    },

    // ========================================================================
    // Local Errors
    // ========================================================================
    /// Local precondition violation.
    ///
    /// Returned synchronously when a subscription is registered with a
    /// malformed argument shape, before any transport interaction.
    #[error("Signature error: {message}")]
    Signature {
        /// Description of the precondition violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }

    /// Creates a remote execution error.
    #[inline]
    pub fn remote_execution(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteExecution {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a signature error.
    #[inline]
    pub fn signature(message: impl Into<String>) -> Self {
        Self::Signature {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the channel to the engine failed.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::ConnectionClosed
                | Self::RequestTimeout { .. }
                | Self::WebSocket(_)
                | Self::ChannelClosed(_)
        )
    }

    /// Returns `true` if the remote operation reported the failure.
    #[inline]
    #[must_use]
    pub fn is_remote_execution(&self) -> bool {
        matches!(self, Self::RemoteExecution { .. })
    }

    /// Returns `true` if this is a local precondition violation.
    #[inline]
    #[must_use]
    pub fn is_signature_error(&self) -> bool {
        matches!(self, Self::Signature { .. })
    }

    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestTimeout { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::transport("engine process died");
        assert_eq!(err.to_string(), "Transport failed: engine process died");
    }

    #[test]
    fn test_remote_execution_display() {
        let err = Error::remote_execution("script", "ReferenceError: foo is not defined");
        assert_eq!(
            err.to_string(),
            "Remote execution failed (script): ReferenceError: foo is not defined"
        );
    }

    #[test]
    fn test_is_transport_error() {
        let transport_err = Error::transport("test");
        let closed_err = Error::ConnectionClosed;
        let timeout_err = Error::request_timeout(RequestId::generate(), 5000);
        let remote_err = Error::remote_execution("script", "test");

        assert!(transport_err.is_transport_error());
        assert!(closed_err.is_transport_error());
        assert!(timeout_err.is_transport_error());
        assert!(!remote_err.is_transport_error());
    }

    #[test]
    fn test_is_remote_execution() {
        let remote_err = Error::remote_execution("evaluate", "thrown");
        let signature_err = Error::signature("test");

        assert!(remote_err.is_remote_execution());
        assert!(!signature_err.is_remote_execution());
    }

    #[test]
    fn test_is_signature_error() {
        let signature_err = Error::signature("listener source is not a function");
        let transport_err = Error::transport("test");

        assert!(signature_err.is_signature_error());
        assert!(!transport_err.is_signature_error());
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::request_timeout(RequestId::generate(), 1000);
        let other_err = Error::transport("test");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
