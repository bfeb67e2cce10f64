//! Open-Meteo provider and dashboard behaviour against a mock HTTP server.

use std::{sync::Arc, time::Duration};

use dashboard_core::{
    City, CycleOutcome, Dashboard, DashboardSettings, WeatherProvider,
    catalog::hourly_query,
    error::FetchError,
    provider::open_meteo::OpenMeteoProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn oslo() -> City {
    City::new("Oslo", 59.9, 10.75)
}

fn forecast_body(hours: usize) -> serde_json::Value {
    let time: Vec<String> =
        (0..hours).map(|h| format!("2024-01-{:02}T{:02}:00", 1 + h / 24, h % 24)).collect();
    serde_json::json!({
        "latitude": 59.9,
        "longitude": 10.75,
        "hourly_units": { "time": "iso8601", "temperature_2m": "°C" },
        "hourly": {
            "time": time,
            "temperature_2m": vec![-2.5; hours],
            "relativehumidity_2m": vec![80; hours],
            "apparent_temperature": vec![-6.0; hours],
            "windspeed_10m": vec![12.0; hours],
            "precipitation_probability": vec![serde_json::Value::Null; hours]
        },
        "current_weather": {
            "temperature": -12.0,
            "windspeed": 65.0,
            "winddirection": 270,
            "weathercode": 3,
            "time": "2024-01-01T00:00"
        }
    })
}

fn provider(server: &MockServer) -> OpenMeteoProvider {
    OpenMeteoProvider::new(
        &format!("{}/v1/forecast", server.uri()),
        &format!("{}/v1/air-quality", server.uri()),
        Duration::from_secs(5),
    )
    .expect("client builds")
}

fn settings() -> DashboardSettings {
    DashboardSettings { loading_delay: Duration::from_millis(200), ..DashboardSettings::default() }
}

#[tokio::test]
async fn forecast_sends_catalog_query_and_parses_series() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "59.9"))
        .and(query_param("longitude", "10.75"))
        .and(query_param("hourly", hourly_query()))
        .and(query_param("timezone", "auto"))
        .and(query_param("current_weather", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(168)))
        .expect(1)
        .mount(&server)
        .await;

    let forecast = provider(&server).forecast(&oslo()).await.expect("forecast");

    assert_eq!(forecast.time.len(), 168);
    assert_eq!(forecast.hourly["temperature_2m"][0], Some(-2.5));
    assert_eq!(forecast.hourly["relativehumidity_2m"][0], Some(80.0));
    assert_eq!(forecast.hourly["precipitation_probability"][0], None);
    assert_eq!(forecast.current.winddirection, 270.0);
}

#[tokio::test]
async fn non_success_status_is_a_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = provider(&server).forecast(&oslo()).await.unwrap_err();
    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"hourly\": 1}"))
        .mount(&server)
        .await;

    let err = provider(&server).forecast(&oslo()).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn air_quality_reads_current_indices() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .and(query_param("current", "european_aqi,us_aqi"))
        .and(query_param("hourly", "pm10,pm2_5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": { "time": "2024-01-01T00:00", "european_aqi": 18, "us_aqi": null }
        })))
        .mount(&server)
        .await;

    let aq = provider(&server).air_quality(&oslo()).await.expect("air quality");
    assert_eq!(aq.european_aqi, Some(18.0));
    assert_eq!(aq.us_aqi, None);
}

#[tokio::test]
async fn dashboard_applies_forecast_and_ignores_air_quality_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(168)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let dashboard = Dashboard::new(Arc::new(provider(&server)), settings());
    assert_eq!(dashboard.select_city(oslo()).await, CycleOutcome::Applied);

    let state = dashboard.state().await;
    assert!(state.error.is_none());
    assert!(state.air_quality.is_none());

    let snapshot = state.snapshot.as_ref().expect("snapshot");
    assert_eq!(snapshot.len(), 24);
    assert!(snapshot.hourly.values().all(|series| series.len() == 24));

    // -12°C and 65 km/h: cold and wind together.
    let messages: Vec<_> = state.alerts.iter().map(|a| a.message).collect();
    assert_eq!(messages, ["Extreme cold warning", "High wind warning"]);
}

#[tokio::test]
async fn dashboard_surfaces_primary_failure_and_keeps_old_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "59.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(48)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "-12.05"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let dashboard = Dashboard::new(Arc::new(provider(&server)), settings());
    dashboard.select_city(oslo()).await;
    let before = dashboard.state().await.snapshot;

    let outcome = dashboard.select_city(City::new("Lima", -12.05, -77.04)).await;
    assert_eq!(outcome, CycleOutcome::Failed);

    let state = dashboard.state().await;
    assert_eq!(state.error.as_deref(), Some("HTTP 503: maintenance"));
    assert_eq!(state.snapshot, before);
    assert!(!state.loading);
}

#[tokio::test]
async fn slow_response_shows_loading_then_clears() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body(24))
                .set_delay(Duration::from_millis(600)),
        )
        .mount(&server)
        .await;

    let dashboard = Dashboard::new(Arc::new(provider(&server)), settings());
    let cycle = tokio::spawn({
        let dashboard = dashboard.clone();
        async move { dashboard.select_city(oslo()).await }
    });

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(dashboard.state().await.loading);

    assert_eq!(cycle.await.expect("task"), CycleOutcome::Applied);
    assert!(!dashboard.state().await.loading);
}
