//! Session state for the STORECAST dashboard.
//!
//! [`SessionState`] is the single source of truth for everything rendered on
//! screen. It is mutated in exactly two ways: synchronously by [`select`]
//! when the operator picks a store, and by [`apply`] when an async episode
//! resolves. All async completions arrive as [`FetchEvent`] values, so
//! ordering and staleness rules live in one transition function instead of
//! being scattered across callbacks.
//!
//! Staleness rule: every selection bumps an episode counter, and forecast or
//! explanation events carry the episode that issued them. An event whose
//! episode no longer matches the current one is discarded without touching
//! state, so a response that arrives after the operator has moved on can
//! never be attributed to the wrong store.
//!
//! [`select`]: SessionState::select
//! [`apply`]: SessionState::apply

use serde_json::Value;
use tracing::debug;

use storecast_client::TransportError;
use storecast_core::types::{
    DEFAULT_NEXT_PERIOD_LABEL, ForecastBundle, HistoryPoint, Store, StoreId,
};

/// Health of the forecasting service, as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    /// Health check still in flight
    #[default]
    Checking,
    /// Service answered with `ok: true`
    Connected,
    /// Service unreachable or answered unexpectedly
    Unreachable,
}

impl HealthStatus {
    /// Short status label for the header.
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Checking => "Checking backend…",
            HealthStatus::Connected => "Backend connected",
            HealthStatus::Unreachable => "Backend unreachable",
        }
    }
}

/// Completion of one async operation, tagged with enough context to decide
/// whether it still applies.
#[derive(Debug)]
pub enum FetchEvent {
    /// Health check resolved (the `ok` flag on success)
    HealthResolved(Result<bool, TransportError>),
    /// Catalog load resolved
    CatalogResolved(Result<Vec<Store>, TransportError>),
    /// Forecast fetch resolved for a selection episode
    ForecastResolved {
        episode: u64,
        store_id: StoreId,
        outcome: Result<ForecastBundle, TransportError>,
    },
    /// Explanation fetch resolved for a selection episode
    ExplanationResolved {
        episode: u64,
        store_id: StoreId,
        outcome: Result<String, TransportError>,
    },
}

/// Everything the dashboard renders, in one snapshot.
#[derive(Debug)]
pub struct SessionState {
    /// Service health tri-state
    pub health: HealthStatus,
    /// Message from a failed or unexpected health check
    pub health_error: Option<String>,

    /// Stores available for selection
    pub catalog: Vec<Store>,
    pub catalog_loading: bool,
    pub catalog_error: Option<String>,

    /// Currently selected store, if any
    pub selected: Option<Store>,
    /// Selection episode counter; bumped on every selection
    episode: u64,

    /// Projected value for the next period
    pub prediction: Option<f64>,
    /// Sales history for the selected store
    pub history: Vec<HistoryPoint>,
    /// Opaque summary statistics passed through to the explanation request
    pub stats: Option<Value>,
    /// Label for the projected period
    pub next_period_label: String,
    pub forecast_loading: bool,
    pub forecast_error: Option<String>,

    /// AI-generated explanation of the forecast
    pub explanation: Option<String>,
    pub explanation_loading: bool,
    pub explanation_error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Create the mount-time state: health check and catalog load pending,
    /// nothing selected.
    pub fn new() -> Self {
        Self {
            health: HealthStatus::Checking,
            health_error: None,
            catalog: Vec::new(),
            catalog_loading: true,
            catalog_error: None,
            selected: None,
            episode: 0,
            prediction: None,
            history: Vec::new(),
            stats: None,
            next_period_label: DEFAULT_NEXT_PERIOD_LABEL.to_string(),
            forecast_loading: false,
            forecast_error: None,
            explanation: None,
            explanation_loading: false,
            explanation_error: None,
        }
    }

    /// Current selection episode.
    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Record a new selection and reset all per-selection state.
    ///
    /// Must run synchronously before the forecast fetch is issued. Returns
    /// the new episode number to tag that fetch with.
    pub fn select(&mut self, store: Store) -> u64 {
        debug!(store_id = %store.id, "store selected");
        self.selected = Some(store);
        self.episode += 1;

        self.prediction = None;
        self.history.clear();
        self.stats = None;
        self.next_period_label = DEFAULT_NEXT_PERIOD_LABEL.to_string();
        self.explanation = None;
        self.forecast_error = None;
        self.explanation_error = None;
        self.forecast_loading = true;
        self.explanation_loading = false;

        self.episode
    }

    /// Mark the mount-time episodes as running again (for manual refresh).
    pub fn begin_refresh(&mut self) {
        self.health = HealthStatus::Checking;
        self.health_error = None;
        self.catalog_loading = true;
        self.catalog_error = None;
    }

    /// Apply one async completion to the snapshot.
    pub fn apply(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::HealthResolved(outcome) => self.apply_health(outcome),
            FetchEvent::CatalogResolved(outcome) => self.apply_catalog(outcome),
            FetchEvent::ForecastResolved {
                episode,
                store_id,
                outcome,
            } => {
                if episode != self.episode {
                    debug!(%store_id, episode, current = self.episode, "discarding stale forecast");
                    return;
                }
                self.apply_forecast(outcome);
            }
            FetchEvent::ExplanationResolved {
                episode,
                store_id,
                outcome,
            } => {
                if episode != self.episode {
                    debug!(%store_id, episode, current = self.episode, "discarding stale explanation");
                    return;
                }
                self.apply_explanation(outcome);
            }
        }
    }

    fn apply_health(&mut self, outcome: Result<bool, TransportError>) {
        match outcome {
            Ok(true) => {
                self.health = HealthStatus::Connected;
                self.health_error = None;
            }
            Ok(false) => {
                self.health = HealthStatus::Unreachable;
                self.health_error = Some("Unexpected response from health check".to_string());
            }
            Err(e) => {
                self.health = HealthStatus::Unreachable;
                self.health_error = Some(e.to_string());
            }
        }
    }

    fn apply_catalog(&mut self, outcome: Result<Vec<Store>, TransportError>) {
        self.catalog_loading = false;
        match outcome {
            Ok(stores) => {
                self.catalog = stores;
                self.catalog_error = None;
            }
            Err(e) => {
                self.catalog_error = Some(e.to_string());
            }
        }
    }

    fn apply_forecast(&mut self, outcome: Result<ForecastBundle, TransportError>) {
        self.forecast_loading = false;
        match outcome {
            Ok(bundle) => {
                self.prediction = Some(bundle.prediction);
                self.history = bundle.history;
                self.stats = bundle.stats;
                self.next_period_label = bundle.next_period_label;
                self.forecast_error = None;
                // The controller proceeds straight to the explanation step
                // once a prediction exists.
                self.explanation_loading = true;
                self.explanation_error = None;
            }
            Err(e) => {
                self.forecast_error = Some(e.to_string());
            }
        }
    }

    fn apply_explanation(&mut self, outcome: Result<String, TransportError>) {
        self.explanation_loading = false;
        match outcome {
            Ok(text) => {
                self.explanation = Some(text);
                self.explanation_error = None;
            }
            Err(e) => {
                self.explanation = None;
                self.explanation_error = Some(e.to_string());
            }
        }
    }

    /// The most prominent error to show in the global banner, if any.
    ///
    /// Explanation errors are deliberately excluded: they are soft and stay
    /// scoped to the AI-insight sub-panel.
    pub fn global_error(&self) -> Option<&str> {
        self.forecast_error
            .as_deref()
            .or(self.catalog_error.as_deref())
            .or(self.health_error.as_deref())
    }
}
