//! Engine facade.
//!
//! The [`Engine`] is the proxy for the engine-level object: it mints
//! [`Page`] proxies and shuts the engine down. Like a page, it holds
//! nothing but its target identifier and a handle to the transport.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::identifiers::TargetId;
use crate::page::Page;
use crate::protocol::InvocationMode;
use crate::transport::{EngineConnection, Transport};

// ============================================================================
// Constants
// ============================================================================

/// Engine-level operation that creates a page and returns its ID.
const CREATE_PAGE_OPERATION: &str = "createPage";

/// Engine-level operation that terminates the engine.
const EXIT_OPERATION: &str = "exit";

// ============================================================================
// Engine
// ============================================================================

/// A proxy for the engine-level object of the remote automation engine.
///
/// # Example
///
/// ```no_run
/// use wraith::{Engine, Result};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let engine = Engine::connect("ws://127.0.0.1:8910").await?;
///
///     let page = engine.create_page().await?;
///     page.open(["https://example.com".into()]).await?;
///
///     engine.exit().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Engine {
    /// Channel to the remote engine.
    transport: Arc<dyn Transport>,
    /// Engine-level target identifier.
    target: TargetId,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Engine - Constructors
// ============================================================================

impl Engine {
    /// Connects to an engine over its WebSocket endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`] if the handshake fails.
    pub async fn connect(url: &str) -> Result<Self> {
        let connection = EngineConnection::connect(url).await?;
        info!(url = %url, "Engine proxy connected");
        Ok(Self::with_transport(Arc::new(connection)))
    }

    /// Creates an engine proxy over any transport.
    ///
    /// Useful for custom channels and for testing.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            target: TargetId::engine(),
        }
    }
}

// ============================================================================
// Engine - Operations
// ============================================================================

impl Engine {
    /// Creates a new page inside the engine and returns its proxy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the engine's reply carries no page
    /// ID, besides the usual execute failure modes.
    pub async fn create_page(&self) -> Result<Page> {
        let result = self
            .transport
            .execute(&self.target, CREATE_PAGE_OPERATION, vec![], InvocationMode::Sync)
            .await?;

        let page_id = match result.get("pageId") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(Error::transport(
                    "malformed createPage reply: missing pageId",
                ));
            }
        };

        let target = TargetId::page(&page_id);
        debug!(target = %target, "Page created");
        Ok(Page::new(Arc::clone(&self.transport), target))
    }

    /// Terminates the remote engine.
    pub async fn exit(&self) -> Result<()> {
        self.transport
            .execute(&self.target, EXIT_OPERATION, vec![], InvocationMode::Sync)
            .await?;
        info!("Engine exited");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
