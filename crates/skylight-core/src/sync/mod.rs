//! Remote data synchronizer.
//!
//! A [`Synchronizer`] owns one [`Source`], polls it on a fixed period and
//! publishes the result as a [`SourceState`] through a `watch` channel.
//! Failures never escape: they become `SourceState::Failed`, optionally
//! keeping the last good value, and the next tick simply tries again.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;

/// What a failed fetch does to the cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep showing the last good value next to the error.
    KeepStale,
    /// Drop the cached value.
    Clear,
}

/// A remote data source.
pub trait Source: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    /// Short name used in logs.
    const NAME: &'static str;

    const FAILURE_POLICY: FailurePolicy;

    fn fetch(&self) -> impl Future<Output = Result<Self::Output, CoreError>> + Send;
}

/// Published state of one synchronized source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceState<T> {
    /// No endpoint configured; no network I/O is ever attempted.
    NotConfigured { reason: String },
    /// First fetch still in flight.
    Loading,
    Ready {
        data: T,
        fetched_at: DateTime<Utc>,
    },
    Failed {
        message: String,
        /// Last good value, when the source's policy keeps it.
        stale: Option<T>,
    },
}

impl<T> SourceState<T> {
    /// Fresh or stale data, whichever is available.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready { data, .. } => Some(data),
            Self::Failed { stale, .. } => stale.as_ref(),
            Self::NotConfigured { .. } | Self::Loading => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Polls one [`Source`] and publishes its [`SourceState`].
pub struct Synchronizer<S: Source> {
    source: Option<Arc<S>>,
    state: watch::Sender<SourceState<S::Output>>,
    period: Duration,
    deadline: Duration,
    /// Set while a [`Synchronizer::refresh`] is running.
    in_flight: AtomicBool,
    /// Fetch tickets: the last one handed out and the newest published.
    started: AtomicU64,
    published: AtomicU64,
}

/// Clears the in-flight flag, also when the refresh future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: Source> Synchronizer<S> {
    /// Wrap a configured source.
    pub fn new(source: S, period: Duration, deadline: Duration) -> Self {
        let (state, _) = watch::channel(SourceState::Loading);
        Self {
            source: Some(Arc::new(source)),
            state,
            period,
            deadline,
            in_flight: AtomicBool::new(false),
            started: AtomicU64::new(0),
            published: AtomicU64::new(0),
        }
    }

    /// A synchronizer that never fetches and always reports `reason`.
    pub fn not_configured(reason: impl Into<String>) -> Self {
        let (state, _) = watch::channel(SourceState::NotConfigured {
            reason: reason.into(),
        });
        Self {
            source: None,
            state,
            period: Duration::MAX,
            deadline: Duration::MAX,
            in_flight: AtomicBool::new(false),
            started: AtomicU64::new(0),
            published: AtomicU64::new(0),
        }
    }

    /// Build from a fallible source constructor: `Err` degrades to
    /// `NotConfigured` with the error text.
    pub fn from_result(
        source: Result<S, CoreError>,
        period: Duration,
        deadline: Duration,
    ) -> Self {
        match source {
            Ok(source) => Self::new(source, period, deadline),
            Err(e) => {
                debug!(source = S::NAME, reason = %e, "source not configured");
                Self::not_configured(not_configured_reason(&e))
            }
        }
    }

    pub fn source(&self) -> Option<&Arc<S>> {
        self.source.as_ref()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<SourceState<S::Output>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SourceState<S::Output> {
        self.state.borrow().clone()
    }

    /// Fetch once and publish the outcome. Never fails. A call made while
    /// another refresh is still running does nothing.
    pub async fn refresh(&self) {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(source = S::NAME, "refresh already running, skipping");
            return;
        }
        let _guard = InFlight(&self.in_flight);
        self.fetch_and_publish().await;
    }

    /// Fetch and publish, unless a fetch started later has already
    /// published. Used directly after a write, which must not be skipped.
    pub(crate) async fn fetch_and_publish(&self) {
        let Some(source) = self.source.as_ref() else {
            return;
        };
        let ticket = self.started.fetch_add(1, Ordering::AcqRel) + 1;

        let result = match tokio::time::timeout(self.deadline, source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout {
                timeout_secs: self.deadline.as_secs(),
            }),
        };

        if self.published.fetch_max(ticket, Ordering::AcqRel) > ticket {
            debug!(source = S::NAME, "discarding result older than the published one");
            return;
        }

        match result {
            Ok(data) => {
                debug!(source = S::NAME, "refresh succeeded");
                self.state.send_replace(SourceState::Ready {
                    data,
                    fetched_at: Utc::now(),
                });
            }
            Err(e) => {
                warn!(source = S::NAME, error = %e, "refresh failed");
                self.state.send_modify(|state| {
                    let stale = match S::FAILURE_POLICY {
                        FailurePolicy::KeepStale => state.data().cloned(),
                        FailurePolicy::Clear => None,
                    };
                    *state = SourceState::Failed {
                        message: e.to_string(),
                        stale,
                    };
                });
            }
        }
    }

    /// Fetch immediately, then on every period until `cancel` fires.
    /// Unconfigured synchronizers spawn nothing.
    pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        if !self.is_configured() {
            return None;
        }
        let sync = Arc::clone(self);
        Some(tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                () = sync.refresh() => {}
            }

            let mut interval = tokio::time::interval(sync.period);
            interval.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => sync.refresh().await,
                }
            }
            debug!(source = S::NAME, "synchronizer stopped");
        }))
    }
}

fn not_configured_reason(err: &CoreError) -> String {
    match err {
        CoreError::NotConfigured { feature } => feature.clone(),
        other => other.to_string(),
    }
}
