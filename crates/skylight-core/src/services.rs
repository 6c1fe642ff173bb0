// ── Shared service handles ──
//
// Everything built once per client load from the configuration: the HTTP
// transport settings, device control and the notification center. Cloned
// into every widget that needs it.

use std::sync::Arc;

use skylight_api::{HomeClient, TlsMode, TransportConfig};
use tracing::{info, warn};

use crate::config::{Configuration, Credentials, endpoint};
use crate::device::DeviceControl;
use crate::notify::NotificationCenter;

/// Transport settings derived from `insecure`, `ca_cert` and the request
/// timeout.
pub fn transport_for(config: &Configuration) -> TransportConfig {
    let tls = if config.insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ca) = &config.ca_cert {
        TlsMode::CustomCa(ca.clone())
    } else {
        TlsMode::System
    };
    TransportConfig {
        tls,
        timeout: config.refresh.timeout(),
    }
}

#[derive(Clone)]
pub struct Services {
    pub config: Arc<Configuration>,
    pub credentials: Arc<Credentials>,
    pub transport: TransportConfig,
    pub devices: DeviceControl,
    pub notifications: NotificationCenter,
}

impl Services {
    pub fn new(config: Configuration, credentials: Credentials) -> Self {
        let transport = transport_for(&config);

        let home = config.api_url(endpoint::HOME).and_then(|url| {
            let Some(token) = credentials.get(endpoint::HOME) else {
                warn!("device control endpoint has no token, devices disabled");
                return None;
            };
            HomeClient::new(url, token, &transport)
                .inspect_err(|e| warn!(url, error = %e, "invalid device control URL"))
                .ok()
        });
        let devices = DeviceControl::new(
            home,
            config.devices.clone(),
            config.refresh.device_spacing(),
        );
        let notifications = NotificationCenter::from_config(&config, &transport);

        info!(
            devices = config.devices.len(),
            device_control = devices.is_configured(),
            notifications = notifications.is_configured(),
            push = notifications.push_url().is_some(),
            "services ready"
        );

        Self {
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            transport,
            devices,
            notifications,
        }
    }
}
