//! Event registration.
//!
//! Listeners come in two localities, each with its own entry point:
//!
//! - [`Page::on_local`] — the listener runs in the calling process. It may
//!   close over arbitrary local state, and it receives a clone of the page
//!   proxy so it can call back into the page's own methods.
//! - [`Page::on_remote`] — the listener's source is shipped into the
//!   engine's scripting context. It cannot observe local closure state and
//!   only sees the extra arguments explicitly passed here.
//!
//! The page retains no subscription state; [`Page::off`] is the one
//! explicit teardown operation and is idempotent.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::{Listener, LocalListener, RemoteScript, Subscription};

use super::Page;

// ============================================================================
// Page - Event Registration
// ============================================================================

impl Page {
    /// Registers a listener that runs in the calling process.
    ///
    /// On every event the listener receives a clone of this page followed
    /// by the event's arguments and then `extra_args`, in order. Because
    /// the listener stays local it may freely capture state from its
    /// defining scope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signature`] before any transport interaction if
    /// `event` is empty.
    ///
    /// # Example
    ///
    /// ```ignore
    /// page.on_local("onLoadFinished", |page, args| {
    ///     println!("{} finished: {:?}", page.target(), args);
    /// }, vec![]).await?;
    /// ```
    pub async fn on_local<F>(
        &self,
        event: &str,
        listener: F,
        extra_args: impl IntoIterator<Item = Value> + Send,
    ) -> Result<Subscription>
    where
        F: Fn(Page, &[Value]) + Send + Sync + 'static,
    {
        validate_event(event)?;

        // The proxy reference is bound by closure capture, not rebinding:
        // the listener always sees the page it was registered on.
        let page = self.clone();
        let bound: LocalListener = Arc::new(move |args: &[Value]| listener(page.clone(), args));

        debug!(event = %event, target = %self.inner.target, "Registering local listener");
        self.inner
            .transport
            .subscribe(
                event,
                &self.inner.target,
                Listener::Local(bound),
                extra_args.into_iter().collect(),
            )
            .await
    }

    /// Registers a listener that executes inside the engine's scripting
    /// context.
    ///
    /// The script source is forwarded unmodified; the transport owns its
    /// serialization and injection. `extra_args` are the only values from
    /// this process the remote listener can see.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signature`] before any transport interaction if
    /// `event` is empty. Malformed sources are rejected earlier, by
    /// [`RemoteScript::new`].
    pub async fn on_remote(
        &self,
        event: &str,
        script: RemoteScript,
        extra_args: impl IntoIterator<Item = Value> + Send,
    ) -> Result<Subscription> {
        validate_event(event)?;

        debug!(event = %event, target = %self.inner.target, "Registering remote listener");
        self.inner
            .transport
            .subscribe(
                event,
                &self.inner.target,
                Listener::Remote(script),
                extra_args.into_iter().collect(),
            )
            .await
    }

    /// Drops the subscription for an event on this page.
    ///
    /// Idempotent: removing an event with no active subscription is not an
    /// error.
    pub async fn off(&self, event: &str) -> Result<()> {
        debug!(event = %event, target = %self.inner.target, "Removing listener");
        self.inner
            .transport
            .unsubscribe(event, &self.inner.target)
            .await
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Rejects empty event names before any transport interaction.
fn validate_event(event: &str) -> Result<()> {
    if event.trim().is_empty() {
        return Err(Error::signature("event name is empty"));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;
    use serde_json::json;

    use crate::identifiers::TargetId;
    use crate::testing::RecordingTransport;

    fn page_with_transport() -> (Page, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let page = Page::new(transport.clone(), TargetId::page("7"));
        (page, transport)
    }

    #[tokio::test]
    async fn test_on_local_forwards_local_locality() {
        let (page, transport) = page_with_transport();

        let sub = page
            .on_local("onLoadFinished", |_page, _args| {}, [json!(1), json!(2)])
            .await
            .expect("subscribe");

        assert_eq!(sub.event(), "onLoadFinished");
        assert_eq!(sub.target().as_str(), "page$7");

        let call = transport.last_subscribe().expect("one call");
        assert!(call.listener.is_local());
        assert_eq!(call.event, "onLoadFinished");
        assert_eq!(call.extra_args, vec![json!(1), json!(2)]);
        assert_eq!(call.target.as_str(), "page$7");
    }

    #[tokio::test]
    async fn test_local_listener_receives_page_clone() {
        let (page, transport) = page_with_transport();

        let seen: Arc<Mutex<Vec<(String, Vec<Value>)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        page.on_local(
            "onResourceReceived",
            move |page, args| {
                seen_clone
                    .lock()
                    .push((page.target().as_str().to_string(), args.to_vec()));
            },
            [],
        )
        .await
        .expect("subscribe");

        // Fire the listener the way a transport would
        let call = transport.last_subscribe().expect("one call");
        match &call.listener {
            Listener::Local(listener) => listener(&[json!("res"), json!(200)]),
            Listener::Remote(_) => panic!("expected local listener"),
        }

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "page$7");
        assert_eq!(seen[0].1, vec![json!("res"), json!(200)]);
    }

    #[tokio::test]
    async fn test_on_remote_forwards_source_unmodified() {
        let (page, transport) = page_with_transport();

        let source = "function(status) { console.log(status); }";
        let script = RemoteScript::new(source).expect("valid");

        page.on_remote("onLoadFinished", script, [json!(1), json!(2)])
            .await
            .expect("subscribe");

        let call = transport.last_subscribe().expect("one call");
        assert_eq!(call.extra_args, vec![json!(1), json!(2)]);
        match &call.listener {
            Listener::Remote(script) => assert_eq!(script.source(), source),
            Listener::Local(_) => panic!("expected remote listener"),
        }
    }

    #[tokio::test]
    async fn test_on_local_rejects_empty_event_before_transport() {
        let (page, transport) = page_with_transport();

        let err = page
            .on_local("", |_page, _args| {}, [])
            .await
            .unwrap_err();

        assert!(err.is_signature_error());
        assert!(transport.subscribes().is_empty());
    }

    #[tokio::test]
    async fn test_on_remote_rejects_empty_event_before_transport() {
        let (page, transport) = page_with_transport();

        let script = RemoteScript::new("function() {}").expect("valid");
        let err = page.on_remote("  ", script, []).await.unwrap_err();

        assert!(err.is_signature_error());
        assert!(transport.subscribes().is_empty());
    }

    #[tokio::test]
    async fn test_off_twice_is_not_an_error() {
        let (page, transport) = page_with_transport();

        page.off("onLoadFinished").await.expect("first off");
        page.off("onLoadFinished").await.expect("second off");

        let calls = transport.unsubscribes();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ("onLoadFinished".to_string(), TargetId::page("7")));
        assert_eq!(calls[1], ("onLoadFinished".to_string(), TargetId::page("7")));
    }
}
