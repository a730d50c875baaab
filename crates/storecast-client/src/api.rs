//! Forecasting service client using direct HTTP requests.
//!
//! This module provides [`ApiClient`], a thin typed wrapper around the four
//! remote operations of the forecasting service, and the [`ForecastApi`]
//! trait that the orchestration layer programs against.

use std::time::Duration;

use ::async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use storecast_core::types::{
    DEFAULT_NEXT_PERIOD_LABEL, ForecastBundle, HistoryPoint, Store, StoreId,
};
use storecast_core::AppConfig;

use crate::error::{Result, TransportError};

/// The four remote operations of the forecasting service.
///
/// This is the seam the orchestration controller depends on, so tests can
/// substitute a scripted implementation for the real HTTP client.
#[async_trait]
pub trait ForecastApi: Send + Sync {
    /// GET `/health`. Returns the service's `ok` flag.
    async fn check_health(&self) -> Result<bool>;

    /// GET `/stores`. A malformed or missing `stores` field yields an empty
    /// list; only transport/HTTP failures error.
    async fn list_stores(&self) -> Result<Vec<Store>>;

    /// GET `/forecast/{id}`. Optional fields are normalized per
    /// [`ForecastBundle`].
    async fn get_forecast(&self, store_id: &StoreId) -> Result<ForecastBundle>;

    /// POST `/explain_forecast`. The body always carries `store_id` and
    /// `prediction`; history and stats are included when available.
    async fn explain_forecast(
        &self,
        store_id: &StoreId,
        prediction: f64,
        history: &[HistoryPoint],
        stats: Option<&Value>,
    ) -> Result<String>;
}

/// Wire shape of the forecast endpoint before normalization.
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    prediction: f64,
    #[serde(default)]
    history: Vec<HistoryPoint>,
    #[serde(default)]
    stats: Option<Value>,
    #[serde(default)]
    next_period_label: Option<String>,
}

/// reqwest-backed client for the forecasting service.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from dashboard configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.api_base_url, Duration::from_secs(config.timeout_secs))
    }

    /// Create a client with an explicit base URL and per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a GET and return the parsed JSON body of a 2xx response.
    async fn get_json(&self, path: &str, context: &str) -> Result<Value> {
        debug!(path, "GET {}", self.base_url);
        let response = self.client.get(self.url(path)).send().await?;
        Self::parse_json(response, context).await
    }

    /// Translate a response into parsed JSON or a [`TransportError`].
    async fn parse_json(response: reqwest::Response, context: &str) -> Result<Value> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Http { status, body });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::decode(context, e.to_string()))
    }
}

#[async_trait]
impl ForecastApi for ApiClient {
    async fn check_health(&self) -> Result<bool> {
        let body = self.get_json("/health", "health").await?;
        Ok(body.get("ok").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn list_stores(&self) -> Result<Vec<Store>> {
        let body = self.get_json("/stores", "stores").await?;

        // The catalog tolerates a malformed or missing `stores` field; an
        // empty list is a valid answer, not an error.
        let rows = match body.get("stores").and_then(Value::as_array) {
            Some(rows) => rows,
            None => {
                warn!("stores response missing or malformed `stores` field");
                return Ok(Vec::new());
            }
        };

        let stores = rows
            .iter()
            .filter_map(|row| match serde_json::from_value::<Store>(row.clone()) {
                Ok(store) => Some(store),
                Err(e) => {
                    warn!(error = %e, "skipping malformed store row");
                    None
                }
            })
            .collect();

        Ok(stores)
    }

    async fn get_forecast(&self, store_id: &StoreId) -> Result<ForecastBundle> {
        let body = self
            .get_json(&format!("/forecast/{store_id}"), "forecast")
            .await?;

        let response: ForecastResponse = serde_json::from_value(body)
            .map_err(|e| TransportError::decode("forecast", e.to_string()))?;

        // Treat an empty stats object the same as an absent one.
        let stats = response
            .stats
            .filter(|s| !s.as_object().is_some_and(|m| m.is_empty()));

        Ok(ForecastBundle {
            prediction: response.prediction,
            history: response.history,
            stats,
            next_period_label: response
                .next_period_label
                .unwrap_or_else(|| DEFAULT_NEXT_PERIOD_LABEL.to_string()),
        })
    }

    async fn explain_forecast(
        &self,
        store_id: &StoreId,
        prediction: f64,
        history: &[HistoryPoint],
        stats: Option<&Value>,
    ) -> Result<String> {
        let mut request = serde_json::json!({
            "store_id": store_id,
            "prediction": prediction,
        });
        if !history.is_empty() {
            request["history"] = serde_json::to_value(history)
                .map_err(|e| TransportError::decode("explanation request", e.to_string()))?;
        }
        if let Some(stats) = stats {
            request["stats"] = stats.clone();
        }

        debug!(%store_id, "POST /explain_forecast");
        let response = self
            .client
            .post(self.url("/explain_forecast"))
            .json(&request)
            .send()
            .await?;

        let body = Self::parse_json(response, "explanation").await?;

        body.get("explanation")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| TransportError::decode("explanation", "missing `explanation` field"))
    }
}
