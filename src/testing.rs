//! Recording transport for unit tests.
//!
//! Records every call made through the [`Transport`] contract so tests can
//! assert on operation names, argument order, modes, targets, and
//! subscription localities without a live engine.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::TargetId;
use crate::protocol::InvocationMode;
use crate::transport::{Listener, Subscription, Transport};

// ============================================================================
// Call Records
// ============================================================================

/// One recorded `execute` call.
#[derive(Debug, Clone)]
pub(crate) struct ExecuteCall {
    pub target: TargetId,
    pub operation: String,
    pub args: Vec<Value>,
    pub mode: InvocationMode,
}

/// One recorded `subscribe` call.
#[derive(Clone)]
pub(crate) struct SubscribeCall {
    pub event: String,
    pub target: TargetId,
    pub listener: Listener,
    pub extra_args: Vec<Value>,
}

// ============================================================================
// RecordingTransport
// ============================================================================

/// Transport double that records calls and replies with a canned value.
pub(crate) struct RecordingTransport {
    executes: Mutex<Vec<ExecuteCall>>,
    subscribes: Mutex<Vec<SubscribeCall>>,
    unsubscribes: Mutex<Vec<(String, TargetId)>>,
    reply: Mutex<Value>,
    fail_next: AtomicBool,
}

impl RecordingTransport {
    /// Creates a transport that replies `null` to every execute.
    pub fn new() -> Self {
        Self {
            executes: Mutex::new(Vec::new()),
            subscribes: Mutex::new(Vec::new()),
            unsubscribes: Mutex::new(Vec::new()),
            reply: Mutex::new(Value::Null),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Sets the value returned by subsequent execute calls.
    pub fn set_reply(&self, value: Value) {
        *self.reply.lock() = value;
    }

    /// Makes the next execute call fail with a transport error.
    pub fn fail_next_execute(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Returns all recorded execute calls.
    pub fn executes(&self) -> Vec<ExecuteCall> {
        self.executes.lock().clone()
    }

    /// Returns the most recent execute call.
    pub fn last_execute(&self) -> Option<ExecuteCall> {
        self.executes.lock().last().cloned()
    }

    /// Returns all recorded subscribe calls.
    pub fn subscribes(&self) -> Vec<SubscribeCall> {
        self.subscribes.lock().clone()
    }

    /// Returns the most recent subscribe call.
    pub fn last_subscribe(&self) -> Option<SubscribeCall> {
        self.subscribes.lock().last().cloned()
    }

    /// Returns all recorded unsubscribe calls.
    pub fn unsubscribes(&self) -> Vec<(String, TargetId)> {
        self.unsubscribes.lock().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(
        &self,
        target: &TargetId,
        operation: &str,
        args: Vec<Value>,
        mode: InvocationMode,
    ) -> Result<Value> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::transport("injected failure"));
        }

        self.executes.lock().push(ExecuteCall {
            target: target.clone(),
            operation: operation.to_string(),
            args,
            mode,
        });

        Ok(self.reply.lock().clone())
    }

    async fn subscribe(
        &self,
        event: &str,
        target: &TargetId,
        listener: Listener,
        extra_args: Vec<Value>,
    ) -> Result<Subscription> {
        self.subscribes.lock().push(SubscribeCall {
            event: event.to_string(),
            target: target.clone(),
            listener,
            extra_args,
        });

        Ok(Subscription::new(event, target.clone()))
    }

    async fn unsubscribe(&self, event: &str, target: &TargetId) -> Result<()> {
        self.unsubscribes
            .lock()
            .push((event.to_string(), target.clone()));
        Ok(())
    }
}
