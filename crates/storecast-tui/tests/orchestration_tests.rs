//! End-to-end orchestration tests: controller episodes driving the session
//! reducer, with a scripted API for timing control and a wiremock server for
//! the full HTTP path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

use storecast_client::{ApiClient, ForecastApi, Result, TransportError};
use storecast_core::types::{ForecastBundle, HistoryPoint, Store, StoreId};
use storecast_tui::{Controller, FetchEvent, HealthStatus, SessionState, to_chart_series};

/// Scripted in-process API. Outcomes and delays are keyed by store id.
#[derive(Default)]
struct ScriptedApi {
    health: bool,
    stores: Vec<Store>,
    forecasts: HashMap<String, ForecastBundle>,
    forecast_failures: HashMap<String, u16>,
    explanations: HashMap<String, String>,
    explanation_failures: HashMap<String, u16>,
    explanation_delays: HashMap<String, Duration>,
}

impl ScriptedApi {
    fn http(status: u16) -> TransportError {
        TransportError::Http {
            status,
            body: String::new(),
        }
    }
}

#[async_trait]
impl ForecastApi for ScriptedApi {
    async fn check_health(&self) -> Result<bool> {
        Ok(self.health)
    }

    async fn list_stores(&self) -> Result<Vec<Store>> {
        Ok(self.stores.clone())
    }

    async fn get_forecast(&self, store_id: &StoreId) -> Result<ForecastBundle> {
        if let Some(status) = self.forecast_failures.get(store_id.as_str()) {
            return Err(Self::http(*status));
        }
        self.forecasts
            .get(store_id.as_str())
            .cloned()
            .ok_or_else(|| Self::http(404))
    }

    async fn explain_forecast(
        &self,
        store_id: &StoreId,
        _prediction: f64,
        _history: &[HistoryPoint],
        _stats: Option<&Value>,
    ) -> Result<String> {
        if let Some(delay) = self.explanation_delays.get(store_id.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(status) = self.explanation_failures.get(store_id.as_str()) {
            return Err(Self::http(*status));
        }
        self.explanations
            .get(store_id.as_str())
            .cloned()
            .ok_or_else(|| Self::http(404))
    }
}

fn store(id: i64, label: &str) -> Store {
    Store {
        id: StoreId::from(id),
        label: label.to_string(),
    }
}

fn bundle(prediction: f64, history: Vec<(&str, f64)>, label: &str) -> ForecastBundle {
    ForecastBundle {
        prediction,
        history: history
            .into_iter()
            .map(|(period, value)| HistoryPoint {
                period: period.to_string(),
                actual_value: value,
            })
            .collect(),
        stats: None,
        next_period_label: label.to_string(),
    }
}

async fn next_event(rx: &mut UnboundedReceiver<FetchEvent>) -> FetchEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for fetch event")
        .expect("event channel closed")
}

async fn assert_no_event(rx: &mut UnboundedReceiver<FetchEvent>) {
    let quiet = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(quiet.is_err(), "expected no further events");
}

#[tokio::test]
async fn mount_episodes_resolve_independently() {
    let api = Arc::new(ScriptedApi {
        health: true,
        stores: vec![store(1, "Store A"), store(2, "Store B")],
        ..Default::default()
    });
    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = Controller::new(api, tx);
    let mut session = SessionState::new();

    controller.start();
    for _ in 0..2 {
        session.apply(next_event(&mut rx).await);
    }

    assert_eq!(session.health, HealthStatus::Connected);
    assert_eq!(session.catalog.len(), 2);
    assert!(!session.catalog_loading);
    // Mount episodes never touch selection state
    assert!(session.selected.is_none());
    assert!(session.prediction.is_none());
}

#[tokio::test]
async fn successful_episode_populates_forecast_then_explanation() {
    let mut api = ScriptedApi::default();
    api.forecasts.insert(
        "1".to_string(),
        bundle(
            120.5,
            vec![("2024-07-01", 100.0), ("2024-08-01", 110.0)],
            "2024-09",
        ),
    );
    api.explanations
        .insert("1".to_string(), "Sales are trending upward.".to_string());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = Controller::new(Arc::new(api), tx);
    let mut session = SessionState::new();

    let picked = store(1, "Store A");
    let episode = session.select(picked.clone());
    controller.run_episode(picked, episode);

    session.apply(next_event(&mut rx).await);
    assert_eq!(session.prediction, Some(120.5));
    assert_eq!(session.history.len(), 2);
    assert!(!session.forecast_loading);
    assert!(session.explanation_loading);

    session.apply(next_event(&mut rx).await);
    assert_eq!(
        session.explanation.as_deref(),
        Some("Sales are trending upward.")
    );
    assert!(!session.explanation_loading);
    assert!(session.explanation_error.is_none());
}

#[tokio::test]
async fn forecast_failure_suppresses_explanation_step() {
    let mut api = ScriptedApi::default();
    api.forecast_failures.insert("1".to_string(), 500);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = Controller::new(Arc::new(api), tx);
    let mut session = SessionState::new();

    let picked = store(1, "Store A");
    let episode = session.select(picked.clone());
    controller.run_episode(picked, episode);

    session.apply(next_event(&mut rx).await);
    assert!(session.forecast_error.as_deref().unwrap().contains("500"));
    assert!(session.prediction.is_none());
    assert!(!session.explanation_loading);
    assert!(session.explanation.is_none());

    // The episode ends here; no explanation event is ever emitted
    assert_no_event(&mut rx).await;
}

#[tokio::test]
async fn explanation_failure_leaves_forecast_intact() {
    let mut api = ScriptedApi::default();
    api.forecasts
        .insert("1".to_string(), bundle(120.5, vec![], "Next"));
    api.explanation_failures.insert("1".to_string(), 502);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = Controller::new(Arc::new(api), tx);
    let mut session = SessionState::new();

    let picked = store(1, "Store A");
    let episode = session.select(picked.clone());
    controller.run_episode(picked, episode);

    session.apply(next_event(&mut rx).await);
    session.apply(next_event(&mut rx).await);

    assert_eq!(session.prediction, Some(120.5));
    assert!(session.forecast_error.is_none());
    assert!(session.explanation.is_none());
    assert!(session.explanation_error.as_deref().unwrap().contains("502"));
    // Soft failure: nothing in the global banner
    assert_eq!(session.global_error(), None);
}

#[tokio::test]
async fn stale_explanation_from_previous_selection_is_discarded() {
    let mut api = ScriptedApi::default();
    api.forecasts
        .insert("1".to_string(), bundle(100.0, vec![], "Next"));
    api.forecasts
        .insert("2".to_string(), bundle(200.0, vec![], "Next"));
    api.explanations
        .insert("1".to_string(), "Insight for Store A.".to_string());
    api.explanations
        .insert("2".to_string(), "Insight for Store B.".to_string());
    // Store A's explanation straggles in after Store B's whole episode
    api.explanation_delays
        .insert("1".to_string(), Duration::from_millis(300));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = Controller::new(Arc::new(api), tx);
    let mut session = SessionState::new();

    let first = store(1, "Store A");
    let episode = session.select(first.clone());
    controller.run_episode(first, episode);

    // Store A's forecast lands, then the operator moves on before the
    // explanation resolves
    session.apply(next_event(&mut rx).await);
    assert_eq!(session.prediction, Some(100.0));

    let second = store(2, "Store B");
    let episode = session.select(second.clone());
    controller.run_episode(second, episode);

    // Drain every remaining event in arrival order
    for _ in 0..3 {
        session.apply(next_event(&mut rx).await);
        assert_ne!(
            session.explanation.as_deref(),
            Some("Insight for Store A."),
            "stale explanation must never surface"
        );
    }

    assert_eq!(session.prediction, Some(200.0));
    assert_eq!(session.explanation.as_deref(), Some("Insight for Store B."));
    assert!(session.explanation_error.is_none());
}

#[tokio::test]
async fn reselecting_same_store_converges_to_same_state() {
    let mut api = ScriptedApi::default();
    api.forecasts.insert(
        "1".to_string(),
        bundle(120.5, vec![("2024-08-01", 110.0)], "2024-09"),
    );
    api.explanations
        .insert("1".to_string(), "Steady.".to_string());
    let api = Arc::new(api);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = Controller::new(Arc::clone(&api) as Arc<dyn ForecastApi>, tx);
    let mut session = SessionState::new();

    for _ in 0..2 {
        let picked = store(1, "Store A");
        let episode = session.select(picked.clone());
        controller.run_episode(picked, episode);
    }
    // Each episode emits a forecast and an explanation event; everything
    // from episode 1 is stale by definition.
    for _ in 0..4 {
        session.apply(next_event(&mut rx).await);
    }

    assert_eq!(session.prediction, Some(120.5));
    assert_eq!(session.explanation.as_deref(), Some("Steady."));
    assert!(!session.forecast_loading);
    assert!(!session.explanation_loading);
}

/// Full HTTP path: real `ApiClient` against wiremock, driven through the
/// controller, ending in the exact chart series from the selection scenario.
#[tokio::test]
async fn http_episode_produces_expected_chart_series() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/stores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stores": [{ "value": 1, "label": "Store A" }]
        })))
        .mount(&server)
        .await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/forecast/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "store_id": 1,
            "prediction": 120.5,
            "history": [
                { "date": "2024-07-01", "sales": 100.0 },
                { "date": "2024-08-01", "sales": 110.0 }
            ],
            "next_period_label": "2024-09"
        })))
        .mount(&server)
        .await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/explain_forecast"))
        .and(matchers::body_partial_json(json!({
            "store_id": 1,
            "prediction": 120.5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "explanation": "Sales rose two months in a row."
        })))
        .mount(&server)
        .await;

    let api = Arc::new(ApiClient::new(server.uri(), Duration::from_secs(5)).unwrap());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let controller = Controller::new(api, tx);
    let mut session = SessionState::new();

    controller.start();
    for _ in 0..2 {
        session.apply(next_event(&mut rx).await);
    }
    assert_eq!(session.health, HealthStatus::Connected);

    let picked = session.catalog[0].clone();
    let episode = session.select(picked.clone());
    controller.run_episode(picked, episode);
    for _ in 0..2 {
        session.apply(next_event(&mut rx).await);
    }

    assert_eq!(session.prediction, Some(120.5));
    assert_eq!(
        session.explanation.as_deref(),
        Some("Sales rose two months in a row.")
    );

    let series = to_chart_series(
        &session.history,
        session.prediction,
        &session.next_period_label,
    )
    .unwrap();
    let flattened: Vec<(&str, Option<f64>, Option<f64>)> = series
        .iter()
        .map(|p| (p.period_label.as_str(), p.actual_value, p.forecast_value))
        .collect();
    assert_eq!(
        flattened,
        vec![
            ("2024-07", Some(100.0), None),
            ("2024-08", Some(110.0), None),
            ("2024-09", None, Some(120.5)),
        ]
    );
}
