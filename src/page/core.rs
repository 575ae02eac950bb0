//! Core Page struct and invocation primitives.
//!
//! Everything on the page surface funnels through two primitives:
//! [`Page::invoke`] for quick operations and [`Page::invoke_async`] for
//! long-running ones. Both construct an ephemeral command carrying the
//! page's immutable target identifier and delegate to the transport.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Result;
use crate::identifiers::TargetId;
use crate::protocol::InvocationMode;
use crate::transport::{RemoteScript, Transport};

// ============================================================================
// Constants
// ============================================================================

/// Reserved operation for property get/set.
const PROPERTY_OPERATION: &str = "property";

/// Reserved operation for setting get/set.
const SETTING_OPERATION: &str = "setting";

/// Reserved operation for defining a method on the remote page object.
const DEFINE_METHOD_OPERATION: &str = "defineMethod";

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a page proxy.
pub(crate) struct PageInner {
    /// Target identifier, immutable for the proxy's lifetime.
    pub target: TargetId,
    /// Channel to the remote engine.
    pub transport: Arc<dyn Transport>,
}

// ============================================================================
// Page
// ============================================================================

/// A proxy for one page object inside the remote automation engine.
///
/// The page holds no remote state of its own: every command and
/// subscription it forwards carries its target identifier unchanged. The
/// target is immutable after construction, so a `Page` is safe to invoke
/// concurrently from multiple call sites without internal locking.
///
/// # Example
///
/// ```no_run
/// use wraith::{Engine, Result};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let engine = Engine::connect("ws://127.0.0.1:8910").await?;
///     let page = engine.create_page().await?;
///
///     page.open(["https://example.com".into()]).await?;
///     let title = page.evaluate(["function() { return document.title; }".into()]).await?;
///     println!("Title: {title}");
///
///     engine.exit().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Page {
    pub(crate) inner: Arc<PageInner>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("target", &self.inner.target)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Page - Constructor and Accessors
// ============================================================================

impl Page {
    /// Creates a page proxy for a target on the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, target: TargetId) -> Self {
        debug!(target = %target, "Page proxy created");
        Self {
            inner: Arc::new(PageInner { target, transport }),
        }
    }

    /// Returns the page's target identifier.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &TargetId {
        &self.inner.target
    }
}

// ============================================================================
// Page - Invocation Primitives
// ============================================================================

impl Page {
    /// Invokes a quick remote operation and awaits its single result.
    ///
    /// # Errors
    ///
    /// - [`Error::RemoteExecution`] if the remote operation reported a failure
    /// - A transport-class error if the channel itself failed
    ///
    /// [`Error::RemoteExecution`]: crate::Error::RemoteExecution
    pub async fn invoke(&self, operation: &str, args: Vec<Value>) -> Result<Value> {
        self.inner
            .transport
            .execute(&self.inner.target, operation, args, InvocationMode::Sync)
            .await
    }

    /// Invokes a long-running remote operation.
    ///
    /// Same contract as [`Page::invoke`]; the engine is responsible for not
    /// blocking other commands while the operation completes.
    pub async fn invoke_async(&self, operation: &str, args: Vec<Value>) -> Result<Value> {
        self.inner
            .transport
            .execute(&self.inner.target, operation, args, InvocationMode::Async)
            .await
    }
}

// ============================================================================
// Page - Properties and Settings
// ============================================================================

impl Page {
    /// Gets or sets a page property.
    ///
    /// One argument (the key) reads the property; a second argument sets
    /// it. Get vs set is distinguished purely by argument count.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let agent = page.property(["userAgent".into()]).await?;
    /// page.property(["viewportSize".into(), json!({"width": 1920, "height": 1080})]).await?;
    /// ```
    pub async fn property(&self, args: impl IntoIterator<Item = Value> + Send) -> Result<Value> {
        self.invoke(PROPERTY_OPERATION, args.into_iter().collect())
            .await
    }

    /// Gets or sets an engine page setting.
    ///
    /// Same argument-count convention as [`Page::property`].
    pub async fn setting(&self, args: impl IntoIterator<Item = Value> + Send) -> Result<Value> {
        self.invoke(SETTING_OPERATION, args.into_iter().collect())
            .await
    }

    /// Returns the page's cookies.
    ///
    /// Sugar for `property("cookies")`.
    pub async fn cookies(&self) -> Result<Value> {
        self.property([json!("cookies")]).await
    }

    /// Defines a named method on the remote page object.
    ///
    /// The definition's source is shipped to and evaluated inside the
    /// engine's scripting context.
    pub async fn define_method(&self, name: &str, definition: RemoteScript) -> Result<Value> {
        self.invoke(
            DEFINE_METHOD_OPERATION,
            vec![json!(name), json!(definition.into_source())],
        )
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
