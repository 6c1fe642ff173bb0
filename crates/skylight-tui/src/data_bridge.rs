//! Data bridge: connects the shared services to TUI actions.
//!
//! Starts the notification fallback poll, the push channel and the bulk
//! device refresh, then forwards every change they publish as an
//! [`Action`] through the TUI's action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use skylight_core::Services;

use crate::action::Action;

/// Run the bridge until `cancel` fires. Every background task it starts
/// hangs off a child of `cancel`.
pub async fn run_data_bridge(
    services: Services,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let refresh = &services.config.refresh;
    let notifications = &services.notifications;

    notifications.spawn_fallback(refresh.notifications(), cancel.child_token());
    if notifications
        .spawn_channel(refresh.reconnect(), cancel.child_token())
        .is_some()
    {
        info!(url = ?notifications.push_url().map(ToString::to_string), "push channel started");
    }
    services
        .devices
        .spawn_refresh(refresh.devices(), cancel.child_token());

    let mut feed = notifications.subscribe();
    let mut channel = notifications.subscribe_channel();
    let mut reload = notifications.subscribe_reload();
    let mut devices = services.devices.subscribe();

    // Push initial snapshots so tiles have data immediately
    let _ = action_tx.send(Action::NotificationsUpdated(feed.borrow_and_update().clone()));
    let _ = action_tx.send(Action::ChannelUpdated(channel.borrow_and_update().clone()));

    // Forward every change until cancelled
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = reload.recv() => {
                info!("reload requested by push channel");
                let _ = action_tx.send(Action::Reload);
            }
            Ok(()) = feed.changed() => {
                let snapshot = feed.borrow_and_update().clone();
                let _ = action_tx.send(Action::NotificationsUpdated(snapshot));
            }
            Ok(()) = channel.changed() => {
                let status = channel.borrow_and_update().clone();
                debug!(?status, "push channel status changed");
                let _ = action_tx.send(Action::ChannelUpdated(status));
            }
            Ok(()) = devices.changed() => {
                let _ = action_tx.send(Action::DevicesChanged);
            }
        }
    }

    debug!("data bridge shut down");
}
