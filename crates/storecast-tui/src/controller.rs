//! Request orchestration for the STORECAST dashboard.
//!
//! The [`Controller`] turns user intent into async episodes against the
//! forecasting service and reports every completion as a [`FetchEvent`] on a
//! channel the UI loop drains. Three kinds of episode exist:
//!
//! - mount-time health check and catalog load, spawned independently and
//!   never waiting on each other
//! - a selection episode per store pick: forecast fetch, then, only if the
//!   forecast succeeded, the explanation fetch
//!
//! In-flight requests are never cancelled. A new selection simply starts a
//! new episode; results from older episodes are discarded by the session
//! reducer when they eventually land.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use storecast_client::ForecastApi;
use storecast_core::types::Store;

use crate::session::FetchEvent;

/// Spawns async episodes and reports their completions.
pub struct Controller {
    api: Arc<dyn ForecastApi>,
    events: UnboundedSender<FetchEvent>,
}

impl Controller {
    pub fn new(api: Arc<dyn ForecastApi>, events: UnboundedSender<FetchEvent>) -> Self {
        Self { api, events }
    }

    /// Spawn the two mount-time episodes. Each populates only its own
    /// status fields and never touches forecast or explanation state.
    pub fn start(&self) {
        self.spawn_health_check();
        self.spawn_catalog_load();
    }

    fn spawn_health_check(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let outcome = api.check_health().await;
            if let Err(e) = &outcome {
                warn!(error = %e, "health check failed");
            }
            let _ = tx.send(FetchEvent::HealthResolved(outcome));
        });
    }

    fn spawn_catalog_load(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let outcome = api.list_stores().await;
            if let Err(e) = &outcome {
                warn!(error = %e, "catalog load failed");
            }
            let _ = tx.send(FetchEvent::CatalogResolved(outcome));
        });
    }

    /// Spawn a selection episode for `store`, tagged with the `episode`
    /// number the session assigned to this selection.
    ///
    /// The forecast result is reported as soon as it lands. The explanation
    /// fetch is issued strictly after a successful forecast and fails
    /// independently; a forecast failure ends the episode.
    pub fn run_episode(&self, store: Store, episode: u64) {
        let api = Arc::clone(&self.api);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let store_id = store.id.clone();
            debug!(%store_id, episode, "forecast episode started");

            let outcome = api.get_forecast(&store_id).await;
            let bundle = outcome.as_ref().ok().cloned();
            if tx
                .send(FetchEvent::ForecastResolved {
                    episode,
                    store_id: store_id.clone(),
                    outcome,
                })
                .is_err()
            {
                return;
            }

            let Some(bundle) = bundle else {
                debug!(%store_id, episode, "episode ended without explanation");
                return;
            };

            let outcome = api
                .explain_forecast(
                    &store_id,
                    bundle.prediction,
                    &bundle.history,
                    bundle.stats.as_ref(),
                )
                .await;
            let _ = tx.send(FetchEvent::ExplanationResolved {
                episode,
                store_id,
                outcome,
            });
        });
    }
}
