//! Notification push channel with fixed-delay reconnect.
//!
//! Holds one WebSocket open to the notification service and streams parsed
//! frames through a [`tokio::sync::broadcast`] channel. Whenever the socket
//! drops, for any reason, exactly one reconnect attempt is scheduled after a
//! fixed delay. There is no backoff and no retry cap.
//!
//! # Example
//!
//! ```rust,ignore
//! use skylight_api::push::{PushChannel, PushEvent};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let url = url::Url::parse("ws://kiosk.local:8766/")?;
//! let channel = PushChannel::spawn(url, Duration::from_secs(5), cancel.clone());
//! let mut rx = channel.subscribe();
//!
//! while let Ok(event) = rx.recv().await {
//!     if let PushEvent::Message(msg) = event.as_ref() { /* ... */ }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::notifications::RawNotification;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Default pause between a disconnect and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

// ── Frames ───────────────────────────────────────────────────────────

/// A parsed frame from the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    /// Full replacement of the active notification list.
    Notifications(Vec<RawNotification>),
    /// The backend asks every kiosk to reload its client.
    Reload,
}

/// Everything the channel reports to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    Connected,
    Disconnected { reason: String },
    Message(PushMessage),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Frame {
    Notifications {
        #[serde(default)]
        data: Vec<RawNotification>,
    },
    Reload,
}

/// Parse one text frame. Unknown or malformed frames yield `None`.
pub fn parse_frame(text: &str) -> Option<PushMessage> {
    match serde_json::from_str::<Frame>(text) {
        Ok(Frame::Notifications { data }) => Some(PushMessage::Notifications(data)),
        Ok(Frame::Reload) => Some(PushMessage::Reload),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unrecognised push frame");
            None
        }
    }
}

// ── ReconnectSchedule ────────────────────────────────────────────────

/// Bookkeeping for the single pending reconnect attempt.
///
/// A disconnect schedules an attempt only when none is pending, so a burst
/// of close/error signals for one connection never stacks attempts.
#[derive(Debug, Clone)]
pub struct ReconnectSchedule {
    delay: Duration,
    pending: bool,
    attempts: u64,
}

impl ReconnectSchedule {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: false,
            attempts: 0,
        }
    }

    /// Record a disconnect. Returns the delay to wait when this call
    /// scheduled the attempt, `None` when one is already pending.
    pub fn on_disconnect(&mut self) -> Option<Duration> {
        if self.pending {
            return None;
        }
        self.pending = true;
        Some(self.delay)
    }

    /// The scheduled attempt is firing now.
    pub fn on_attempt(&mut self) {
        self.pending = false;
        self.attempts += 1;
    }

    /// A connection was established.
    pub fn on_connected(&mut self) {
        self.attempts = 0;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Attempts made since the last successful connection.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}

// ── PushChannel ──────────────────────────────────────────────────────

/// Handle to the running push channel task.
pub struct PushChannel {
    event_rx: broadcast::Receiver<Arc<PushEvent>>,
    cancel: CancellationToken,
}

impl PushChannel {
    /// Spawn the connect/reconnect loop and return immediately.
    ///
    /// The first connection attempt happens asynchronously; subscribe to
    /// start consuming events.
    pub fn spawn(url: Url, reconnect_delay: Duration, cancel: CancellationToken) -> Self {
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            push_loop(url, event_tx, ReconnectSchedule::new(reconnect_delay), task_cancel).await;
        });

        Self { event_rx, cancel }
    }

    /// Get a new broadcast receiver for the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PushEvent>> {
        self.event_rx.resubscribe()
    }

    /// Signal the background task to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on disconnect, wait the fixed delay → reconnect.
async fn push_loop(
    url: Url,
    event_tx: broadcast::Sender<Arc<PushEvent>>,
    mut schedule: ReconnectSchedule,
    cancel: CancellationToken,
) {
    loop {
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&url, &event_tx, &mut schedule, &cancel) => result,
        };

        let reason = match outcome {
            Ok(()) => "connection closed".to_owned(),
            Err(e) => e.to_string(),
        };
        tracing::warn!(%reason, attempts = schedule.attempts(), "Push channel disconnected");
        let _ = event_tx.send(Arc::new(PushEvent::Disconnected { reason }));

        if let Some(delay) = schedule.on_disconnect() {
            tracing::info!(delay_ms = delay.as_millis(), "Waiting before reconnect");
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }
        schedule.on_attempt();
    }

    tracing::debug!("Push loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish a single WebSocket connection, read frames until it drops.
async fn connect_and_read(
    url: &Url,
    event_tx: &broadcast::Sender<Arc<PushEvent>>,
    schedule: &mut ReconnectSchedule,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "Connecting to push channel");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!("Push channel connected");
    schedule.on_connected();
    let _ = event_tx.send(Arc::new(PushEvent::Connected));

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        if let Some(msg) = parse_frame(&text) {
                            // No subscribers is fine
                            let _ = event_tx.send(Arc::new(PushEvent::Message(msg)));
                        }
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        return Err(match frame {
                            Some(cf) => Error::WebSocketClosed {
                                code: cf.code.into(),
                                reason: cf.reason.to_string(),
                            },
                            None => Error::WebSocketClosed {
                                code: 1005,
                                reason: "no close payload".into(),
                            },
                        });
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("Push stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Ping, Pong, Frame: pongs are automatic
                    }
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn second_disconnect_before_attempt_schedules_nothing() {
        let mut schedule = ReconnectSchedule::new(Duration::from_secs(5));

        assert_eq!(schedule.on_disconnect(), Some(Duration::from_secs(5)));
        assert!(schedule.is_pending());
        assert_eq!(schedule.on_disconnect(), None);

        schedule.on_attempt();
        assert!(!schedule.is_pending());
        assert_eq!(schedule.attempts(), 1);
    }

    #[test]
    fn reconnect_repeats_forever_with_fixed_delay() {
        let mut schedule = ReconnectSchedule::new(Duration::from_secs(5));
        for _ in 0..50 {
            assert_eq!(schedule.on_disconnect(), Some(Duration::from_secs(5)));
            schedule.on_attempt();
        }
        assert_eq!(schedule.attempts(), 50);

        schedule.on_connected();
        assert_eq!(schedule.attempts(), 0);
    }

    #[test]
    fn parses_notifications_frame() {
        let text = serde_json::json!({
            "type": "notifications",
            "data": [{ "id": "n1", "title": "Leak", "priority": "urgent" }]
        })
        .to_string();

        let Some(PushMessage::Notifications(list)) = parse_frame(&text) else {
            panic!("expected notifications frame");
        };
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].priority.as_deref(), Some("urgent"));
    }

    #[test]
    fn parses_reload_frame() {
        assert_eq!(parse_frame(r#"{"type":"reload"}"#), Some(PushMessage::Reload));
    }

    #[test]
    fn ignores_unknown_and_malformed_frames() {
        assert_eq!(parse_frame(r#"{"type":"ping"}"#), None);
        assert_eq!(parse_frame("not json at all"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_endpoint_reports_disconnect() {
        let cancel = CancellationToken::new();
        // Port 9 (discard) on localhost refuses connections.
        let url = Url::parse("ws://127.0.0.1:9/").unwrap();
        let channel = PushChannel::spawn(url, Duration::from_secs(5), cancel.clone());
        let mut rx = channel.subscribe();

        let event = rx.recv().await;
        assert!(matches!(
            event.as_deref(),
            Ok(PushEvent::Disconnected { .. })
        ));
        channel.shutdown();
    }
}
