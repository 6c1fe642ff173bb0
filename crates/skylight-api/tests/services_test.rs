#![allow(clippy::unwrap_used)]
// Integration tests for the read-mostly collaborator clients using wiremock.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skylight_api::{
    BackendClient, CalendarClient, NoteClient, NotificationClient, RecipeClient, ShipmentClient,
    TransportConfig, UnitSystem, WeatherClient, WeatherQuery,
};

fn transport() -> TransportConfig {
    TransportConfig::default()
}

// ── Weather ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_forecast_sends_query_parameters() {
    let server = MockServer::start().await;
    let client = WeatherClient::new(&format!("{}/v1/forecast", server.uri()), &transport()).unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("current", "temperature_2m,weather_code,is_day"))
        .and(query_param("forecast_days", "5"))
        .and(query_param("temperature_unit", "celsius"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": { "time": "2026-10-19T10:00", "temperature_2m": 9.1, "weather_code": 61, "is_day": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = WeatherQuery {
        latitude: 51.5,
        longitude: -0.12,
        timezone: "Europe/London".into(),
        current: vec!["temperature_2m".into(), "weather_code".into(), "is_day".into()],
        daily: vec![],
        units: UnitSystem::Metric,
        forecast_days: 5,
    };
    let forecast = client.forecast(&query).await.unwrap();
    assert_eq!(forecast.current.unwrap().number("weather_code"), Some(61.0));
}

// ── Calendar ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_calendar_accepts_wrapped_items() {
    let server = MockServer::start().await;
    let client = CalendarClient::new(&format!("{}/calendar", server.uri()), &transport()).unwrap();

    Mock::given(method("GET"))
        .and(path("/calendar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "summary": "Book club", "start": { "dateTime": "2026-10-21T19:00:00Z" } }]
        })))
        .mount(&server)
        .await;

    let events = client.list_events().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].summary.as_deref(), Some("Book club"));
}

// ── Shipments ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_trackings_send_api_key_header() {
    let server = MockServer::start().await;
    let key = SecretString::from("as-key-123");
    let client =
        ShipmentClient::new(&format!("{}/trackings", server.uri()), &key, &transport()).unwrap();

    Mock::given(method("GET"))
        .and(path("/trackings"))
        .and(header("as-api-key", "as-key-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "trackings": [
                { "id": "t1", "tag": "InTransit", "slug": "ups", "tracking_number": "1Z999" },
                { "id": "t2", "tag": "Delivered", "slug": "usps", "tracking_number": "9400" }
            ] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let trackings = client.list_trackings().await.unwrap();
    assert_eq!(trackings.len(), 2);
    assert_eq!(trackings[0].slug, "ups");
    assert!(trackings[1].checkpoints.is_empty());
}

// ── Notifications ───────────────────────────────────────────────────

#[tokio::test]
async fn test_notification_list_and_delete() {
    let server = MockServer::start().await;
    let client =
        NotificationClient::new(&format!("{}/api/notifications", server.uri()), &transport())
            .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "n1", "title": "Trash night", "recurring": true, "target_time": "2026-10-19T19:00:00" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/notifications/n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let list = client.list().await.unwrap();
    assert!(list[0].recurring);
    client.delete("n1").await.unwrap();
}

// ── Note / recipe / health ──────────────────────────────────────────

#[tokio::test]
async fn test_note_round_trip_uses_same_url() {
    let server = MockServer::start().await;
    let client = NoteClient::new(&format!("{}/api/note", server.uri()), &transport()).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/note"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "html": "<p>Milk</p>" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/note"))
        .and(body_json(json!({ "html": "<p>Eggs</p>" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.get().await.unwrap(), "<p>Milk</p>");
    client.replace("<p>Eggs</p>").await.unwrap();
}

#[tokio::test]
async fn test_recipe_tolerates_missing_fields() {
    let server = MockServer::start().await;
    let client = RecipeClient::new(&format!("{}/api/recipe", server.uri()), &transport()).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/recipe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "Shakshuka" })))
        .mount(&server)
        .await;

    let recipe = client.get().await.unwrap();
    assert_eq!(recipe.title.as_deref(), Some("Shakshuka"));
    assert_eq!(recipe.updated, None);
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    let client = BackendClient::new(&server.uri(), &transport()).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "services": ["devices", "recipe", "notifications"],
            "devices_configured": 4
        })))
        .mount(&server)
        .await;

    let report = client.health().await.unwrap();
    assert!(report.is_ok());
    assert_eq!(report.devices_configured, Some(4));
}
