#![allow(clippy::unwrap_used)]

use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skylight_api::{HomeClient, TransportConfig};
use skylight_core::{
    CommandOutcome, ControlState, CoreError, DeviceConfig, DeviceControl, DeviceStatus, Intent,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn devices() -> IndexMap<String, DeviceConfig> {
    let mut devices = IndexMap::new();
    devices.insert(
        "lamp".to_owned(),
        DeviceConfig {
            entity: "light.lamp".into(),
            name: Some("Reading lamp".into()),
            ..DeviceConfig::default()
        },
    );
    devices.insert(
        "fan".to_owned(),
        DeviceConfig {
            entity: "switch.fan".into(),
            ..DeviceConfig::default()
        },
    );
    devices
}

async fn setup() -> (MockServer, DeviceControl) {
    let server = MockServer::start().await;
    let token = SecretString::from("hub-token");
    let client = HomeClient::new(&server.uri(), &token, &TransportConfig::default()).unwrap();
    let control = DeviceControl::new(Some(client), devices(), Duration::ZERO);
    (server, control)
}

fn state(value: &str, brightness: Option<u8>) -> serde_json::Value {
    match brightness {
        Some(b) => json!({ "state": value, "attributes": { "brightness": b } }),
        None => json!({ "state": value, "attributes": {} }),
    }
}

// ── Commands ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_double_toggle_sends_one_command() {
    let (server, control) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services/light/turn_on"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states/light.lamp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state("on", Some(255))))
        .mount(&server)
        .await;

    let (first, second) = tokio::join!(control.toggle("lamp"), control.toggle("lamp"));

    assert_eq!(first.unwrap(), CommandOutcome::Applied);
    assert_eq!(second.unwrap(), CommandOutcome::Dropped);
    assert_eq!(control.control_state("lamp"), ControlState::Idle);

    let lamp = control.device("lamp").unwrap();
    assert!(lamp.status.is_on());
    assert_eq!(lamp.status.brightness(), Some(100));
}

#[tokio::test]
async fn test_pending_state_visible_while_in_flight() {
    let (server, control) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services/switch/turn_on"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states/switch.fan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state("on", None)))
        .mount(&server)
        .await;

    let observer = control.clone();
    let (outcome, seen) = tokio::join!(control.toggle("fan"), async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        (
            observer.control_state("fan"),
            observer.device("fan").unwrap().status.is_on(),
        )
    });

    assert_eq!(outcome.unwrap(), CommandOutcome::Applied);
    assert_eq!(seen, (ControlState::Pending(Intent::TurnOn), true));
}

#[tokio::test]
async fn test_failed_command_reconciles_with_authoritative_state() {
    let (server, control) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services/switch/turn_on"))
        .respond_with(ResponseTemplate::new(500).set_body_string("hub exploded"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states/switch.fan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state("off", None)))
        .expect(1)
        .mount(&server)
        .await;

    let result = control.toggle("fan").await;

    assert!(matches!(result, Err(CoreError::Api { status: Some(500), .. })));
    let fan = control.device("fan").unwrap();
    assert!(!fan.status.is_on());
    assert!(fan.last_error.is_some());
    assert_eq!(control.control_state("fan"), ControlState::Idle);
}

#[tokio::test]
async fn test_brightness_is_clamped_before_sending() {
    let (server, control) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services/light/turn_on"))
        .and(body_json(json!({ "entity_id": "light.lamp", "brightness": 255 })))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/services/light/turn_off"))
        .and(body_json(json!({ "entity_id": "light.lamp" })))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states/light.lamp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state("on", Some(255))))
        .mount(&server)
        .await;

    // The optimistic write already carries the clamped value.
    let mid_flight = |control: DeviceControl| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        (
            control.control_state("lamp"),
            control.device("lamp").unwrap().status.brightness(),
        )
    };

    let (outcome, seen) = tokio::join!(
        control.set_brightness("lamp", 150),
        mid_flight(control.clone())
    );
    assert_eq!(outcome.unwrap(), CommandOutcome::Applied);
    assert_eq!(
        seen,
        (ControlState::Pending(Intent::SetBrightness(100)), Some(100))
    );

    let (outcome, seen) = tokio::join!(
        control.set_brightness("lamp", -5),
        mid_flight(control.clone())
    );
    assert_eq!(outcome.unwrap(), CommandOutcome::Applied);
    assert_eq!(
        seen,
        (ControlState::Pending(Intent::SetBrightness(0)), Some(0))
    );
}

#[tokio::test]
async fn test_brightness_rejected_for_switches() {
    let (server, control) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = control.set_brightness("fan", 50).await;
    assert!(matches!(result, Err(CoreError::Unsupported { .. })));
}

#[tokio::test]
async fn test_unknown_device_id() {
    let (_server, control) = setup().await;
    let result = control.refresh("garage").await;
    assert!(matches!(result, Err(CoreError::DeviceNotFound { .. })));
}

// ── Refresh ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_all_reads_every_device() {
    let (server, control) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states/light.lamp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state("on", Some(128))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states/switch.fan"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such entity"))
        .expect(1)
        .mount(&server)
        .await;

    control.refresh_all().await;

    let lamp = control.device("lamp").unwrap();
    assert_eq!(lamp.status.brightness(), Some(50));
    assert_eq!(lamp.name, "Reading lamp");

    let fan = control.device("fan").unwrap();
    assert!(matches!(fan.status, DeviceStatus::Error(_)));
    assert_eq!(fan.icon, "plug");

    let order: Vec<String> = control.devices(None).iter().map(|d| d.id.clone()).collect();
    assert_eq!(order, vec!["lamp", "fan"]);
}

#[tokio::test]
async fn test_refresh_skips_device_with_pending_command() {
    let (server, control) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services/light/turn_on"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;
    // Only the reconcile read after the command may hit the lamp.
    Mock::given(method("GET"))
        .and(path("/api/states/light.lamp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state("on", Some(255))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states/switch.fan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state("off", None)))
        .expect(1)
        .mount(&server)
        .await;

    let bulk = control.clone();
    let (outcome, ()) = tokio::join!(control.toggle("lamp"), async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        bulk.refresh_all().await;
    });
    assert_eq!(outcome.unwrap(), CommandOutcome::Applied);
}

#[tokio::test]
async fn test_bulk_read_started_before_command_is_discarded() {
    let (server, control) = setup().await;

    // The bulk read is slow and sees the lamp before the command lands.
    Mock::given(method("GET"))
        .and(path("/api/states/light.lamp"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(state("off", None))
                .set_delay(Duration::from_millis(400)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states/light.lamp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state("on", Some(255))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/services/light/turn_on"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states/switch.fan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state("off", None)))
        .mount(&server)
        .await;

    let command = control.clone();
    let ((), outcome) = tokio::join!(control.refresh_all(), async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        command.toggle("lamp").await
    });
    assert_eq!(outcome.unwrap(), CommandOutcome::Applied);

    let lamp = control.device("lamp").unwrap();
    assert!(lamp.status.is_on());
    assert_eq!(lamp.status.brightness(), Some(100));
    assert_eq!(control.control_state("lamp"), ControlState::Idle);
}
