#![allow(clippy::unwrap_used)]

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skylight_api::{NotificationClient, PushMessage, RawNotification, TransportConfig};
use skylight_core::{CoreError, Indicator, NotificationCenter, NotificationFeed, Priority};

async fn setup() -> (MockServer, NotificationCenter) {
    let server = MockServer::start().await;
    let url = format!("{}/api/notifications", server.uri());
    let client = NotificationClient::new(&url, &TransportConfig::default()).unwrap();
    (server, NotificationCenter::new(Some(client), None))
}

fn list_body() -> serde_json::Value {
    json!([
        { "id": "n1", "title": "Parcel at the door", "priority": "normal" },
        { "id": "r1", "title": "Take out bins", "priority": "info", "recurring": true, "target_time": "19:00" },
        { "id": "n2", "title": "Smoke alarm", "priority": "urgent", "icon": "fire" }
    ])
}

#[tokio::test]
async fn test_refresh_orders_by_priority() {
    let (server, center) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body()))
        .mount(&server)
        .await;

    assert_eq!(center.feed(), NotificationFeed::Loading);
    center.refresh().await;

    let list = center.notifications();
    let ids: Vec<&str> = list.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["n2", "n1", "r1"]);
    assert_eq!(list[0].priority, Priority::Urgent);
    assert_eq!(list[0].icon, "fire");
    assert_eq!(list[1].icon, "alert");

    let summary = center.summary();
    assert_eq!(summary.label, "Urgent");
    assert_eq!(summary.indicator, Indicator::Pulsing);
    assert_eq!(summary.count, 3);
}

#[tokio::test]
async fn test_failed_fetch_is_unavailable() {
    let (server, center) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    center.refresh().await;

    assert!(matches!(center.feed(), NotificationFeed::Unavailable { .. }));
    assert_eq!(center.summary().indicator, Indicator::Neutral);
}

#[tokio::test]
async fn test_dismiss_deletes_then_refetches() {
    let (server, center) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/notifications/n1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    center.apply(PushMessage::Notifications(vec![RawNotification {
        id: "n1".into(),
        ..RawNotification::default()
    }]));
    center.dismiss("n1").await.unwrap();

    assert!(center.notifications().is_empty());
    assert_eq!(center.summary().label, "All Clear");
}

#[tokio::test]
async fn test_recurring_cannot_be_dismissed() {
    let (server, center) = setup().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    center.apply(PushMessage::Notifications(vec![RawNotification {
        id: "r1".into(),
        recurring: true,
        ..RawNotification::default()
    }]));

    let result = center.dismiss("r1").await;
    assert!(matches!(result, Err(CoreError::Rejected { .. })));
    assert_eq!(center.notifications().len(), 1);
}

#[tokio::test]
async fn test_dismiss_all_skips_recurring() {
    let (server, center) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body()))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/notifications/n1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/notifications/n2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/notifications/r1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    center.refresh().await;
    assert_eq!(center.dismiss_all().await.unwrap(), 2);
}
