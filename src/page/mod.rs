//! The remote page proxy.
//!
//! A [`Page`] represents one controllable page object living inside the
//! remote engine and forwards every operation on it across the process
//! boundary. The proxy is stateless apart from its target identifier:
//! remote page state lives in the engine, subscription state lives in the
//! transport.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Page struct and invocation primitives |
//! | `methods` | Table-driven forwarding method surface |
//! | `events` | Event registration (`on_local`, `on_remote`, `off`) |

// ============================================================================
// Submodules
// ============================================================================

/// Page struct and invocation primitives.
pub mod core;

/// Table-driven forwarding method surface.
pub mod methods;

/// Event registration.
pub mod events;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::Page;
pub use self::methods::{ASYNC_OPERATIONS, SYNC_OPERATIONS, invocation_mode};
