//! WebSocket connection and event loop.
//!
//! [`EngineConnection`] is the bundled [`Transport`] implementation. It
//! dials the engine's WebSocket endpoint and spawns a tokio task that
//! handles:
//!
//! - Outgoing commands and subscription messages
//! - Request/reply correlation by UUID
//! - Dispatch of event notices to locally-run listeners
//!
//! Per-target ordering holds because all outbound traffic funnels through
//! one command channel into one writer task.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{RequestId, TargetId};
use crate::protocol::{
    Command, Inbound, InvocationMode, Reply, Request, SubscribeMessage, UnsubscribeMessage,
};
use crate::transport::{Listener, LocalListener, Subscription, Transport};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for command execution.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum pending requests before rejecting new ones.
const MAX_PENDING_REQUESTS: usize = 100;

// ============================================================================
// Types
// ============================================================================

/// WebSocket stream type after the client handshake.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Map of request IDs to reply channels.
type CorrelationMap = FxHashMap<RequestId, oneshot::Sender<Result<Reply>>>;

/// Key identifying a subscription: (event name, target).
type SubscriptionKey = (String, TargetId);

/// A locally-run listener retained until unsubscribe.
struct LocalSubscription {
    /// The listener callback.
    listener: LocalListener,
    /// Arguments appended to every invocation.
    extra_args: Vec<Value>,
}

/// Map of active local subscriptions.
type SubscriptionMap = FxHashMap<SubscriptionKey, LocalSubscription>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Send a request and correlate the reply.
    Send {
        request: Request,
        reply_tx: oneshot::Sender<Result<Reply>>,
    },
    /// Send a pre-serialized frame (subscribe/unsubscribe) and ack.
    Transmit {
        text: String,
        ack_tx: oneshot::Sender<Result<()>>,
    },
    /// Remove a timed-out correlation entry.
    RemoveCorrelation(RequestId),
    /// Shutdown the connection.
    Shutdown,
}

// ============================================================================
// EngineConnection
// ============================================================================

/// WebSocket connection to the remote automation engine.
///
/// Handles request/reply correlation and routes event notices to the
/// locally-run listeners registered through [`Transport::subscribe`].
///
/// # Thread Safety
///
/// `EngineConnection` is `Send + Sync` and can be shared across tasks.
/// All operations are non-blocking; suspension only happens at the
/// await-point where a caller consumes the returned future.
pub struct EngineConnection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Correlation map (shared with event loop).
    correlation: Arc<Mutex<CorrelationMap>>,
    /// Local subscriptions (shared with event loop).
    subscriptions: Arc<Mutex<SubscriptionMap>>,
}

impl Clone for EngineConnection {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            correlation: Arc::clone(&self.correlation),
            subscriptions: Arc::clone(&self.subscriptions),
        }
    }
}

// ============================================================================
// EngineConnection - Constructor
// ============================================================================

impl EngineConnection {
    /// Connects to an engine WebSocket endpoint.
    ///
    /// # Arguments
    ///
    /// * `url` - Endpoint URL, e.g. `ws://127.0.0.1:8910`
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`] if the handshake fails.
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws_stream, _) = connect_async(url).await?;
        debug!(url = %url, "Engine connection established");
        Ok(Self::from_stream(ws_stream))
    }

    /// Creates a connection from an established WebSocket stream.
    ///
    /// Spawns the event loop task internally.
    pub(crate) fn from_stream(ws_stream: WsStream) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));
        let subscriptions = Arc::new(Mutex::new(SubscriptionMap::default()));

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&correlation),
            Arc::clone(&subscriptions),
        ));

        Self {
            command_tx,
            correlation,
            subscriptions,
        }
    }
}

// ============================================================================
// EngineConnection - Public API
// ============================================================================

impl EngineConnection {
    /// Returns the number of in-flight requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Returns the number of active locally-run subscriptions.
    #[inline]
    #[must_use]
    pub fn local_subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Shuts down the connection.
    ///
    /// All pending requests fail with [`Error::ConnectionClosed`].
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }
}

// ============================================================================
// EngineConnection - Internal
// ============================================================================

impl EngineConnection {
    /// Sends a request and waits for the reply with the default timeout.
    async fn round_trip(&self, request: Request) -> Result<Reply> {
        let request_id = request.id;

        {
            let correlation = self.correlation.lock();
            if correlation.len() >= MAX_PENDING_REQUESTS {
                warn!(
                    pending = correlation.len(),
                    max = MAX_PENDING_REQUESTS,
                    "Too many pending requests"
                );
                return Err(Error::transport(format!(
                    "too many pending requests: {}/{}",
                    correlation.len(),
                    MAX_PENDING_REQUESTS
                )));
            }
        }

        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(ConnectionCommand::Send { request, reply_tx })
            .map_err(|_| Error::ConnectionClosed)?;

        match timeout(DEFAULT_COMMAND_TIMEOUT, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                // Timed out: clean up the correlation entry
                let _ = self
                    .command_tx
                    .send(ConnectionCommand::RemoveCorrelation(request_id));

                Err(Error::request_timeout(
                    request_id,
                    DEFAULT_COMMAND_TIMEOUT.as_millis() as u64,
                ))
            }
        }
    }

    /// Sends a pre-serialized frame and waits for the write to complete.
    async fn transmit(&self, text: String) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();

        self.command_tx
            .send(ConnectionCommand::Transmit { text, ack_tx })
            .map_err(|_| Error::ConnectionClosed)?;

        ack_rx.await.map_err(|_| Error::ConnectionClosed)?
    }
}

// ============================================================================
// EngineConnection - Transport
// ============================================================================

#[async_trait]
impl Transport for EngineConnection {
    async fn execute(
        &self,
        target: &TargetId,
        operation: &str,
        args: Vec<Value>,
        mode: InvocationMode,
    ) -> Result<Value> {
        let command = Command::new(target.clone(), operation, args, mode);
        let request = Request::new(command);

        trace!(
            request_id = %request.id,
            target = %target,
            operation = %operation,
            mode = mode.as_str(),
            "Executing remote operation"
        );

        let reply = self.round_trip(request).await?;
        reply.into_result()
    }

    async fn subscribe(
        &self,
        event: &str,
        target: &TargetId,
        listener: Listener,
        extra_args: Vec<Value>,
    ) -> Result<Subscription> {
        let key: SubscriptionKey = (event.to_string(), target.clone());

        let message = match listener {
            Listener::Local(listener) => {
                // A re-registration for the same (event, target) replaces
                // the previous listener, matching engine-side semantics.
                self.subscriptions.lock().insert(
                    key.clone(),
                    LocalSubscription {
                        listener,
                        extra_args: extra_args.clone(),
                    },
                );
                SubscribeMessage::local(event, target.clone(), extra_args)
            }
            Listener::Remote(script) => {
                SubscribeMessage::remote(event, target.clone(), script.into_source(), extra_args)
            }
        };

        let text = to_string(&message)?;
        if let Err(e) = self.transmit(text).await {
            // Registration never reached the engine
            self.subscriptions.lock().remove(&key);
            return Err(e);
        }

        debug!(event = %event, target = %target, run_locally = message.run_locally, "Subscribed");
        Ok(Subscription::new(event, target.clone()))
    }

    async fn unsubscribe(&self, event: &str, target: &TargetId) -> Result<()> {
        self.subscriptions
            .lock()
            .remove(&(event.to_string(), target.clone()));

        let message = UnsubscribeMessage::new(event, target.clone());
        let text = to_string(&message)?;
        self.transmit(text).await?;

        debug!(event = %event, target = %target, "Unsubscribed");
        Ok(())
    }
}

// ============================================================================
// EngineConnection - Event Loop
// ============================================================================

impl EngineConnection {
    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        correlation: Arc<Mutex<CorrelationMap>>,
        subscriptions: Arc<Mutex<SubscriptionMap>>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming messages from the engine
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &correlation, &subscriptions);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by engine");
                            break;
                        }

                        Some(Err(e)) => {
                            warn!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from the local API
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { request, reply_tx }) => {
                            Self::handle_send_command(
                                request,
                                reply_tx,
                                &mut ws_write,
                                &correlation,
                            ).await;
                        }

                        Some(ConnectionCommand::Transmit { text, ack_tx }) => {
                            let result = ws_write
                                .send(Message::Text(text.into()))
                                .await
                                .map_err(|e| Error::transport(e.to_string()));
                            let _ = ack_tx.send(result);
                        }

                        Some(ConnectionCommand::RemoveCorrelation(request_id)) => {
                            correlation.lock().remove(&request_id);
                            debug!(%request_id, "Removed timed-out correlation");
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        Self::fail_pending_requests(&correlation);

        debug!("Event loop terminated");
    }

    /// Handles an incoming text frame from the engine.
    fn handle_incoming_message(
        text: &str,
        correlation: &Arc<Mutex<CorrelationMap>>,
        subscriptions: &Arc<Mutex<SubscriptionMap>>,
    ) {
        match from_str::<Inbound>(text) {
            Ok(Inbound::Reply(reply)) => {
                let tx = correlation.lock().remove(&reply.id);

                if let Some(tx) = tx {
                    let _ = tx.send(Ok(reply));
                } else {
                    warn!(id = %reply.id, "Reply for unknown request");
                }
            }

            Ok(Inbound::Event(notice)) => {
                trace!(event = %notice.event, target = %notice.target, "Event notice");

                let key = (notice.event.clone(), notice.target.clone());
                let entry = {
                    let subscriptions = subscriptions.lock();
                    subscriptions.get(&key).map(|sub| {
                        (Arc::clone(&sub.listener), sub.extra_args.clone())
                    })
                };

                if let Some((listener, extra_args)) = entry {
                    // Event args first, bound extra args after
                    let mut argv = notice.params;
                    argv.extend(extra_args);
                    listener(&argv);
                }
            }

            Err(_) => {
                warn!(text = %text, "Failed to parse incoming message");
            }
        }
    }

    /// Handles a send command from the local API.
    async fn handle_send_command(
        request: Request,
        reply_tx: oneshot::Sender<Result<Reply>>,
        ws_write: &mut futures_util::stream::SplitSink<WsStream, Message>,
        correlation: &Arc<Mutex<CorrelationMap>>,
    ) {
        let request_id = request.id;

        let json = match to_string(&request) {
            Ok(j) => j,
            Err(e) => {
                let _ = reply_tx.send(Err(Error::Json(e)));
                return;
            }
        };

        // Store correlation before sending
        correlation.lock().insert(request_id, reply_tx);

        if let Err(e) = ws_write.send(Message::Text(json.into())).await
            && let Some(tx) = correlation.lock().remove(&request_id)
        {
            let _ = tx.send(Err(Error::transport(e.to_string())));
        }

        trace!(%request_id, "Request sent");
    }

    /// Fails all pending requests with ConnectionClosed.
    fn fail_pending_requests(correlation: &Arc<Mutex<CorrelationMap>>) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending requests on shutdown");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc::unbounded_channel;

    use crate::transport::RemoteScript;

    /// Minimal in-process engine: replies to commands, echoes an event
    /// notice for each subscription it receives.
    async fn spawn_fake_engine() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let ws_stream = tokio_tungstenite::accept_async(stream).await.expect("ws");
            let (mut write, mut read) = ws_stream.split();

            while let Some(Ok(Message::Text(text))) = read.next().await {
                let msg: Value = from_str(&text).expect("parse");

                match msg.get("type").and_then(|v| v.as_str()) {
                    Some("command") => {
                        let reply = if msg["operation"] == "explode" {
                            json!({
                                "id": msg["id"],
                                "type": "error",
                                "error": "script",
                                "message": "boom",
                            })
                        } else {
                            json!({
                                "id": msg["id"],
                                "type": "success",
                                "result": {
                                    "operation": msg["operation"],
                                    "args": msg["args"],
                                    "mode": msg["mode"],
                                },
                            })
                        };
                        let frame = to_string(&reply).expect("serialize");
                        write.send(Message::Text(frame.into())).await.expect("send");
                    }

                    Some("subscribe") => {
                        let notice = json!({
                            "type": "event",
                            "event": msg["event"],
                            "target": msg["target"],
                            "params": ["fired"],
                        });
                        let frame = to_string(&notice).expect("serialize");
                        write.send(Message::Text(frame.into())).await.expect("send");
                    }

                    _ => {}
                }
            }
        });

        format!("ws://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn test_execute_round_trip() {
        let url = spawn_fake_engine().await;
        let connection = EngineConnection::connect(&url).await.expect("connect");

        let target = TargetId::page("7");
        let result = connection
            .execute(
                &target,
                "open",
                vec![json!("https://example.com")],
                InvocationMode::Async,
            )
            .await
            .expect("execute");

        assert_eq!(result["operation"], json!("open"));
        assert_eq!(result["args"], json!(["https://example.com"]));
        assert_eq!(result["mode"], json!("async"));
        assert_eq!(connection.pending_count(), 0);

        connection.shutdown();
    }

    #[tokio::test]
    async fn test_execute_remote_error_surfaces() {
        let url = spawn_fake_engine().await;
        let connection = EngineConnection::connect(&url).await.expect("connect");

        let target = TargetId::page("1");
        let err = connection
            .execute(&target, "explode", vec![], InvocationMode::Sync)
            .await
            .unwrap_err();

        assert!(err.is_remote_execution());
        assert!(err.to_string().contains("boom"));

        connection.shutdown();
    }

    #[tokio::test]
    async fn test_local_subscription_dispatch() {
        let url = spawn_fake_engine().await;
        let connection = EngineConnection::connect(&url).await.expect("connect");

        let (tx, mut rx) = unbounded_channel();
        let listener: LocalListener = Arc::new(move |args: &[Value]| {
            let _ = tx.send(args.to_vec());
        });

        let target = TargetId::page("7");
        connection
            .subscribe(
                "onLoadFinished",
                &target,
                Listener::Local(listener),
                vec![json!(1), json!(2)],
            )
            .await
            .expect("subscribe");

        assert_eq!(connection.local_subscription_count(), 1);

        // Fake engine echoes one notice with params = ["fired"]
        let argv = rx.recv().await.expect("listener invoked");
        assert_eq!(argv, vec![json!("fired"), json!(1), json!(2)]);

        connection.shutdown();
    }

    #[tokio::test]
    async fn test_remote_subscription_retains_nothing() {
        let url = spawn_fake_engine().await;
        let connection = EngineConnection::connect(&url).await.expect("connect");

        let target = TargetId::page("3");
        let script = RemoteScript::new("function(status) {}").expect("valid");
        connection
            .subscribe("onLoadFinished", &target, Listener::Remote(script), vec![])
            .await
            .expect("subscribe");

        assert_eq!(connection.local_subscription_count(), 0);

        connection.shutdown();
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let url = spawn_fake_engine().await;
        let connection = EngineConnection::connect(&url).await.expect("connect");

        let target = TargetId::page("7");
        connection
            .unsubscribe("onLoadFinished", &target)
            .await
            .expect("first unsubscribe");
        connection
            .unsubscribe("onLoadFinished", &target)
            .await
            .expect("second unsubscribe");

        connection.shutdown();
    }

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_COMMAND_TIMEOUT.as_secs(), 30);
        assert_eq!(MAX_PENDING_REQUESTS, 100);
    }
}
