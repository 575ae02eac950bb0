//! Table-driven forwarding method surface.
//!
//! The full catalogue of named remote page operations is declared once in
//! the [`forward_operations!`] table below. Each row generates one public
//! forwarding method on [`Page`] that hands `(operation, args)` to the
//! matching invocation primitive. Adding a remote operation is a one-line
//! table edit; no hand-written forwarding function is ever needed.
//!
//! The sync/async split is a deliberate, explicit classification by table
//! membership. Nothing about an operation's runtime behavior is inspected
//! to decide its mode.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::Result;
use crate::protocol::InvocationMode;

use super::Page;

// ============================================================================
// Generation Macro
// ============================================================================

/// Generates the operation tables and one forwarding method per row.
///
/// Rows are `rust_name => "remoteName"`. Async rows dispatch through
/// [`Page::invoke_async`], sync rows through [`Page::invoke`].
macro_rules! forward_operations {
    (
        async { $( $async_fn:ident => $async_op:literal, )+ }
        sync { $( $sync_fn:ident => $sync_op:literal, )+ }
    ) => {
        /// Operation names dispatched through [`Page::invoke_async`].
        pub const ASYNC_OPERATIONS: &[&str] = &[ $( $async_op, )+ ];

        /// Operation names dispatched through [`Page::invoke`].
        pub const SYNC_OPERATIONS: &[&str] = &[ $( $sync_op, )+ ];

        impl Page {
            $(
                #[doc = concat!("Forwards the long-running `", $async_op, "` operation to the remote page.")]
                pub async fn $async_fn(
                    &self,
                    args: impl IntoIterator<Item = Value> + Send,
                ) -> Result<Value> {
                    self.invoke_async($async_op, args.into_iter().collect()).await
                }
            )+

            $(
                #[doc = concat!("Forwards the `", $sync_op, "` operation to the remote page.")]
                pub async fn $sync_fn(
                    &self,
                    args: impl IntoIterator<Item = Value> + Send,
                ) -> Result<Value> {
                    self.invoke($sync_op, args.into_iter().collect()).await
                }
            )+
        }
    };
}

// ============================================================================
// Operation Tables
// ============================================================================

forward_operations! {
    async {
        include_js => "includeJs",
        open => "open",
    }
    sync {
        add_cookie => "addCookie",
        clear_cookies => "clearCookies",
        close => "close",
        delete_cookie => "deleteCookie",
        evaluate => "evaluate",
        evaluate_async => "evaluateAsync",
        evaluate_javascript => "evaluateJavaScript",
        inject_js => "injectJs",
        open_url => "openUrl",
        reload => "reload",
        render => "render",
        render_base64 => "renderBase64",
        send_event => "sendEvent",
        set_content => "setContent",
        set_proxy => "setProxy",
        stop => "stop",
        switch_to_frame => "switchToFrame",
        switch_to_main_frame => "switchToMainFrame",
        go_back => "goBack",
        upload_file => "uploadFile",
    }
}

// ============================================================================
// Mode Lookup
// ============================================================================

/// Returns the invocation mode of a named operation, if it is in either
/// table.
#[must_use]
pub fn invocation_mode(operation: &str) -> Option<InvocationMode> {
    if ASYNC_OPERATIONS.contains(&operation) {
        Some(InvocationMode::Async)
    } else if SYNC_OPERATIONS.contains(&operation) {
        Some(InvocationMode::Sync)
    } else {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================
