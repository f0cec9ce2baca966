//! Lookup service against a mock provider: stage delivery and supersession.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use meteo_app::services::{request_lookup, LookupJob};
use meteo_app::{AppEvent, SearchModel};
use meteo_weather::{ClientOptions, ForecastBucketer, OpenWeatherClient};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn city(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "sys": {"country": "FR"},
        "coord": {"lat": 47.0, "lon": 2.0},
        "main": {"temp": 11.0, "feels_like": 10.0, "humidity": 70,
                 "pressure": 1015, "temp_min": 9.0, "temp_max": 12.0},
        "weather": [{"description": "peu nuageux", "icon": "02d"}],
        "wind": {"speed": 3.0}
    })
}

async fn next_event(rx: &Arc<std::sync::Mutex<Receiver<AppEvent>>>, wait: Duration) -> Option<AppEvent> {
    let rx = rx.clone();
    tokio::task::spawn_blocking(move || rx.lock().unwrap().recv_timeout(wait).ok())
        .await
        .unwrap()
}

fn client(server: &MockServer) -> Arc<OpenWeatherClient> {
    Arc::new(
        OpenWeatherClient::new(
            "key",
            ClientOptions {
                base_url: server.uri(),
                ..ClientOptions::default()
            },
        )
        .unwrap(),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_latest_submission_wins() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Slowtown"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(city("Slowtown"))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Fasttown"))
        .respond_with(ResponseTemplate::new(200).set_body_json(city("Fasttown")))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"list": []})))
        .mount(&mock_server)
        .await;

    let (tx, rx) = mpsc::channel();
    let rx = Arc::new(std::sync::Mutex::new(rx));
    let runtime = tokio::runtime::Handle::current();
    let source = client(&mock_server);
    let mut model = SearchModel::new();

    let slow_token = CancellationToken::new();
    let slow = LookupJob {
        source: source.clone(),
        bucketer: ForecastBucketer::default(),
        ticket: model.submit("Slowtown").unwrap(),
        zone: Utc,
        cancel: slow_token.clone(),
    };
    request_lookup(&runtime, &tx, slow);

    // Superseded before it could answer
    slow_token.cancel();
    let fast = LookupJob {
        source,
        bucketer: ForecastBucketer::default(),
        ticket: model.submit("Fasttown").unwrap(),
        zone: Utc,
        cancel: CancellationToken::new(),
    };
    request_lookup(&runtime, &tx, fast);

    while model.is_pending() {
        match next_event(&rx, Duration::from_secs(5)).await {
            Some(AppEvent::Lookup(stage)) => {
                model.handle(stage);
            }
            other => panic!("expected a stage event, got {:?}", other),
        }
    }

    assert_eq!(model.session().current().unwrap().name, "Fasttown");
    assert!(!model.session().not_found());

    // The cancelled lookup never reports
    assert!(next_event(&rx, Duration::from_millis(700)).await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_city_reports_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (tx, rx) = mpsc::channel();
    let rx = Arc::new(std::sync::Mutex::new(rx));
    let mut model = SearchModel::new();

    let job = LookupJob {
        source: client(&mock_server),
        bucketer: ForecastBucketer::default(),
        ticket: model.submit("Atlantis").unwrap(),
        zone: Utc,
        cancel: CancellationToken::new(),
    };
    request_lookup(&tokio::runtime::Handle::current(), &tx, job)
        .await
        .unwrap();

    match next_event(&rx, Duration::from_secs(1)).await {
        Some(AppEvent::Lookup(stage)) => {
            model.handle(stage);
        }
        other => panic!("expected a stage event, got {:?}", other),
    }

    assert!(!model.is_pending());
    assert!(model.session().not_found());
    assert!(model.session().current().is_none());
}
