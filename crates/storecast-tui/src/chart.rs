//! Chart series derivation.
//!
//! Pure mapping from session state to a chart-ready sequence: every history
//! point becomes an actual-value point with its period truncated to the
//! month, and exactly one trailing point carries the forecast. No side
//! effects, no I/O.

use storecast_core::types::HistoryPoint;

/// One point of the rendered series. Exactly one of `actual_value` and
/// `forecast_value` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub period_label: String,
    pub actual_value: Option<f64>,
    pub forecast_value: Option<f64>,
}

/// Derive the chart series from history and prediction.
///
/// Returns `None` when there is nothing to plot (no history and no
/// prediction), so callers render a "no data" placeholder instead of an
/// empty chart.
pub fn to_chart_series(
    history: &[HistoryPoint],
    prediction: Option<f64>,
    next_period_label: &str,
) -> Option<Vec<ChartPoint>> {
    if history.is_empty() && prediction.is_none() {
        return None;
    }

    let mut series: Vec<ChartPoint> = history
        .iter()
        .map(|point| ChartPoint {
            period_label: truncate_to_month(&point.period),
            actual_value: Some(point.actual_value),
            forecast_value: None,
        })
        .collect();

    if let Some(prediction) = prediction {
        series.push(ChartPoint {
            period_label: next_period_label.to_string(),
            actual_value: None,
            forecast_value: Some(prediction),
        });
    }

    Some(series)
}

/// Truncate an ISO-ish date string to its year-month prefix.
fn truncate_to_month(period: &str) -> String {
    period.get(..7).unwrap_or(period).to_string()
}
