//! Wraith - client-side proxy for a remote page automation engine.
//!
//! This library represents controllable page objects living inside an
//! out-of-process automation engine and forwards every operation on them
//! across the process boundary.
//!
//! # Architecture
//!
//! The crate follows a proxy model:
//!
//! - **Local End (Rust)**: stateless proxies that turn method calls into
//!   serialized commands and register event listeners
//! - **Remote End (Engine)**: executes commands against real page objects,
//!   emits event notices
//!
//! Key design principles:
//!
//! - Each [`Page`] owns exactly one immutable target identifier; every
//!   command and subscription it forwards carries that target unchanged
//! - The sync/async operation split is a declarative table, not a runtime
//!   inference ([`page::methods`])
//! - Event listeners run in either process: locally with free closure
//!   capture, or remotely with their source shipped to the engine
//! - All subscription state is owned by the transport; proxies never hold
//!   remote page state
//!
//! # Quick Start
//!
//! ```no_run
//! use wraith::{Engine, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Connect to a running engine
//!     let engine = Engine::connect("ws://127.0.0.1:8910").await?;
//!     let page = engine.create_page().await?;
//!
//!     // Watch load completion from this process
//!     page.on_local("onLoadFinished", |page, args| {
//!         println!("{} load finished: {:?}", page.target(), args);
//!     }, []).await?;
//!
//!     // Navigate and render
//!     page.open(["https://example.com".into()]).await?;
//!     page.render(["example.png".into()]).await?;
//!
//!     page.off("onLoadFinished").await?;
//!     engine.exit().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`engine`] | Engine facade: connect, create pages, exit |
//! | [`page`] | Page proxy: invocation primitives, method surface, events |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire message types (internal) |
//! | [`transport`] | Transport contract and WebSocket implementation |

// ============================================================================
// Modules
// ============================================================================

/// Engine facade.
///
/// Use [`Engine::connect`] against a running engine, or
/// [`Engine::with_transport`] to inject a custom channel.
pub mod engine;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for remote engine objects.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// The remote page proxy.
pub mod page;

/// Wire protocol message types.
///
/// Internal module defining command/reply/event structures.
pub mod protocol;

/// Transport layer.
///
/// The [`Transport`] contract plus the bundled WebSocket implementation.
pub mod transport;

/// Recording transport for unit tests.
#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Proxy types
pub use engine::Engine;
pub use page::{ASYNC_OPERATIONS, Page, SYNC_OPERATIONS, invocation_mode};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{RequestId, TargetId};

// Protocol types
pub use protocol::{Command, InvocationMode};

// Transport types
pub use transport::{
    EngineConnection, Listener, LocalListener, RemoteScript, Subscription, Transport,
};
