//! Notification center.
//!
//! Holds the active notification list, fed by two paths: push frames from
//! the notification channel and a coarse fallback poll. Either path
//! replaces the list wholesale. Reload requests from the channel are
//! forwarded on a broadcast channel.

use std::sync::Arc;
use std::time::Duration;

use skylight_api::{NotificationClient, PushChannel, PushEvent, PushMessage, TransportConfig, derive_push_url};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{Configuration, endpoint};
use crate::convert::notifications_from_raw;
use crate::error::CoreError;
use crate::model::{Notification, NotificationSummary};

const RELOAD_CHANNEL_CAPACITY: usize = 4;

/// What the notification tile renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationFeed {
    NotConfigured,
    Loading,
    /// Ordered for display, urgent first.
    Live(Arc<Vec<Notification>>),
    /// The last fetch failed; nothing is known.
    Unavailable { message: String },
}

/// Push channel connection state, for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    Disabled,
    Connecting,
    Connected,
    Disconnected { reason: String },
}

/// Cheaply cloneable handle to the notification cache.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<NotificationInner>,
}

struct NotificationInner {
    client: Option<NotificationClient>,
    push_url: Option<Url>,
    feed: watch::Sender<NotificationFeed>,
    channel: watch::Sender<ChannelStatus>,
    reload: broadcast::Sender<()>,
}

impl NotificationCenter {
    pub fn new(client: Option<NotificationClient>, push_url: Option<Url>) -> Self {
        let initial = if client.is_some() {
            NotificationFeed::Loading
        } else {
            NotificationFeed::NotConfigured
        };
        let (feed, _) = watch::channel(initial);
        let (channel, _) = watch::channel(if push_url.is_some() {
            ChannelStatus::Connecting
        } else {
            ChannelStatus::Disabled
        });
        let (reload, _) = broadcast::channel(RELOAD_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(NotificationInner {
                client,
                push_url,
                feed,
                channel,
                reload,
            }),
        }
    }

    /// Build from `apis.notifications`. The push URL is the explicit
    /// `push_url` when set, else derived from the REST URL. A bad URL
    /// leaves the center unconfigured.
    pub fn from_config(config: &Configuration, transport: &TransportConfig) -> Self {
        let Some(url) = config.api_url(endpoint::NOTIFICATIONS) else {
            return Self::new(None, None);
        };
        let client = match NotificationClient::new(url, transport) {
            Ok(client) => client,
            Err(e) => {
                warn!(url, error = %e, "invalid notification service URL");
                return Self::new(None, None);
            }
        };

        let explicit = config
            .api(endpoint::NOTIFICATIONS)
            .and_then(|api| api.push_url.as_deref());
        let push_url = match explicit {
            Some(raw) => Url::parse(raw).map_err(skylight_api::Error::from),
            None => derive_push_url(client.base_url()),
        };
        let push_url = push_url
            .inspect_err(|e| warn!(error = %e, "push channel disabled"))
            .ok();

        Self::new(Some(client), push_url)
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn is_configured(&self) -> bool {
        self.inner.client.is_some()
    }

    pub fn push_url(&self) -> Option<&Url> {
        self.inner.push_url.as_ref()
    }

    pub fn feed(&self) -> NotificationFeed {
        self.inner.feed.borrow().clone()
    }

    /// Current list, empty unless the feed is live.
    pub fn notifications(&self) -> Arc<Vec<Notification>> {
        match &*self.inner.feed.borrow() {
            NotificationFeed::Live(list) => Arc::clone(list),
            _ => Arc::default(),
        }
    }

    pub fn summary(&self) -> NotificationSummary {
        match &*self.inner.feed.borrow() {
            NotificationFeed::Live(list) => NotificationSummary::from_notifications(list),
            _ => NotificationSummary::unavailable(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationFeed> {
        self.inner.feed.subscribe()
    }

    pub fn subscribe_channel(&self) -> watch::Receiver<ChannelStatus> {
        self.inner.channel.subscribe()
    }

    /// Fires once per reload request received from the channel.
    pub fn subscribe_reload(&self) -> broadcast::Receiver<()> {
        self.inner.reload.subscribe()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Apply one push frame.
    pub fn apply(&self, message: PushMessage) {
        match message {
            PushMessage::Notifications(raw) => {
                debug!(count = raw.len(), "notifications pushed");
                self.replace(notifications_from_raw(raw));
            }
            PushMessage::Reload => {
                info!("reload requested by push channel");
                let _ = self.inner.reload.send(());
            }
        }
    }

    /// Re-fetch the full list. Failure leaves the feed `Unavailable`.
    pub async fn refresh(&self) {
        let Some(client) = self.inner.client.as_ref() else {
            return;
        };
        match client.list().await {
            Ok(raw) => self.replace(notifications_from_raw(raw)),
            Err(e) => {
                warn!(error = %e, "notification fetch failed");
                self.inner.feed.send_replace(NotificationFeed::Unavailable {
                    message: CoreError::from(e).to_string(),
                });
            }
        }
    }

    /// Delete one notification, then re-fetch the list. Recurring
    /// reminders are rejected without any request.
    pub async fn dismiss(&self, id: &str) -> Result<(), CoreError> {
        let client = self.client()?;
        if self
            .notifications()
            .iter()
            .any(|n| n.id == id && !n.is_dismissible())
        {
            return Err(CoreError::Rejected {
                message: "Recurring reminders cannot be dismissed".into(),
            });
        }
        let result = client.delete(id).await.map_err(CoreError::from);
        self.refresh().await;
        result
    }

    /// Delete every dismissible notification, then re-fetch once.
    /// Returns how many were deleted.
    pub async fn dismiss_all(&self) -> Result<usize, CoreError> {
        let client = self.client()?;
        let mut deleted = 0;
        let mut first_error = None;
        for n in self.notifications().iter().filter(|n| n.is_dismissible()) {
            match client.delete(&n.id).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    warn!(id = %n.id, error = %e, "dismiss failed");
                    first_error.get_or_insert(CoreError::from(e));
                }
            }
        }
        self.refresh().await;
        match first_error {
            Some(e) => Err(e),
            None => Ok(deleted),
        }
    }

    // ── Background tasks ─────────────────────────────────────────────

    /// Fetch immediately, then every `period`, whatever the channel does.
    pub fn spawn_fallback(&self, period: Duration, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        if !self.is_configured() {
            return None;
        }
        let center = self.clone();
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => center.refresh().await,
                }
            }
        }))
    }

    /// Open the push channel and feed its frames into the cache.
    pub fn spawn_channel(&self, reconnect: Duration, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        let url = self.inner.push_url.clone()?;
        let center = self.clone();
        Some(tokio::spawn(async move {
            let channel = PushChannel::spawn(url, reconnect, cancel.child_token());
            let mut events = channel.subscribe();
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(event) => center.on_push_event(&event),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "push events lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            channel.shutdown();
        }))
    }

    // ── Internals ────────────────────────────────────────────────────

    fn on_push_event(&self, event: &PushEvent) {
        match event {
            PushEvent::Connected => {
                self.inner.channel.send_replace(ChannelStatus::Connected);
            }
            PushEvent::Disconnected { reason } => {
                self.inner.channel.send_replace(ChannelStatus::Disconnected {
                    reason: reason.clone(),
                });
            }
            PushEvent::Message(message) => self.apply(message.clone()),
        }
    }

    fn replace(&self, list: Vec<Notification>) {
        self.inner
            .feed
            .send_replace(NotificationFeed::Live(Arc::new(list)));
    }

    fn client(&self) -> Result<&NotificationClient, CoreError> {
        self.inner
            .client
            .as_ref()
            .ok_or_else(|| CoreError::not_configured("Notifications"))
    }
}
