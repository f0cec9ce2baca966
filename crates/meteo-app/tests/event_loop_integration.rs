//! The terminal loop against a mock provider, fed from an in-memory reader.

use std::io::Cursor;

use chrono::{Duration, Utc};
use meteo_app::{event_loop, AppServices};
use meteo_core::Config;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn paris() -> serde_json::Value {
    serde_json::json!({
        "name": "Paris",
        "sys": {"country": "FR"},
        "coord": {"lat": 48.8534, "lon": 2.3488},
        "main": {"temp": 14.2, "feels_like": 13.1, "humidity": 68,
                 "pressure": 1012, "temp_min": 12.0, "temp_max": 15.5},
        "weather": [{"description": "couvert", "icon": "04d"}],
        "wind": {"speed": 4.1}
    })
}

fn forecast() -> serde_json::Value {
    let soon = Utc::now() + Duration::hours(3);
    serde_json::json!({
        "list": [{
            "dt": soon.timestamp(),
            "main": {"temp": 12.0},
            "weather": [{"description": "pluie légère", "icon": "10d"}]
        }]
    })
}

/// Mock server running on its own runtime, apart from the one `AppServices` owns.
fn mock_server(runtime: &tokio::runtime::Runtime, weather_calls: u64) -> MockServer {
    runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Paris"))
            .respond_with(ResponseTemplate::new(200).set_body_json(paris()))
            .expect(weather_calls)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast()))
            .mount(&server)
            .await;
        server
    })
}

fn services(server: &MockServer) -> AppServices {
    let mut config = Config::default();
    config.weather.api_key = Some("test_key".to_string());
    config.weather.base_url = server.uri();
    AppServices::new(&config).unwrap()
}

#[test]
fn test_last_line_before_eof_is_reported() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = mock_server(&runtime, 1);
    let services = services(&server);
    let mut out = Vec::new();

    event_loop::run(&services, Utc, Cursor::new("Paris\n"), &mut out).unwrap();
    services.shutdown();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Paris / FR").count(), 1);
    assert!(text.contains("Actuellement 14°C"));
    assert!(text.contains("pluie légère  http://openweathermap.org/img/wn/10d@2x.png"));
    // No prompt after the final report
    assert!(!text.trim_end().ends_with('>'));

    runtime.block_on(server.verify());
}

#[test]
fn test_quit_before_lookup_starts_nothing() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = mock_server(&runtime, 0);
    let services = services(&server);
    let mut out = Vec::new();

    event_loop::run(&services, Utc, Cursor::new("\n:q\nParis\n"), &mut out).unwrap();
    services.shutdown();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Entrez votre destination").count(), 2);
    assert!(!text.contains("Paris / FR"));

    runtime.block_on(server.verify());
}
