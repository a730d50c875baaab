//! Rendering for the STORECAST dashboard.
//!
//! Everything here is a pure function of the [`App`] snapshot: header with
//! service health, an error banner for hard failures, the store list, the
//! forecast panel with its AI-insight sub-panel, and the history chart.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Wrap,
    },
};

use crate::app::App;
use crate::chart::to_chart_series;
use crate::session::HealthStatus;

/// Render one frame of the dashboard.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let banner_height = if app.session.global_error().is_some() {
        3
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Header
            Constraint::Length(banner_height), // Error banner
            Constraint::Min(10),               // Content
            Constraint::Length(1),             // Footer
        ])
        .split(area);

    draw_header(frame, chunks[0], app);
    if banner_height > 0 {
        draw_error_banner(frame, chunks[1], app);
    }
    draw_content(frame, chunks[2], app);
    draw_footer(frame, chunks[3]);

    if app.show_help {
        draw_help_overlay(frame, area);
    }
}

fn health_style(health: HealthStatus) -> Style {
    match health {
        HealthStatus::Checking => Style::default().fg(Color::Yellow),
        HealthStatus::Connected => Style::default().fg(Color::Green),
        HealthStatus::Unreachable => Style::default().fg(Color::Red),
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled(
            " STORECAST ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("Store-level sales forecasts  "),
        Span::styled(
            format!("[{}]", app.session.health.label()),
            health_style(app.session.health),
        ),
        Span::raw(format!("  {}", app.cached_timestamp)),
    ]);

    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_error_banner(frame: &mut Frame, area: Rect, app: &App) {
    let Some(message) = app.session.global_error() else {
        return;
    };
    let banner = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Error "));
    frame.render_widget(banner, area);
}

fn draw_content(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),
            Constraint::Percentage(36),
            Constraint::Percentage(36),
        ])
        .split(area);

    draw_store_list(frame, columns[0], app);
    draw_forecast_panel(frame, columns[1], app);
    draw_chart_panel(frame, columns[2], app);
}

fn draw_store_list(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.session.catalog_loading {
        " Stores (loading…) "
    } else {
        " Stores "
    };

    let selected_id = app.session.selected.as_ref().map(|s| &s.id);
    let items: Vec<ListItem> = app
        .session
        .catalog
        .iter()
        .map(|store| {
            let marker = if Some(&store.id) == selected_id {
                "● "
            } else {
                "  "
            };
            ListItem::new(format!("{marker}{}", store.label))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.session.catalog.is_empty() {
        state.select(Some(app.list_cursor.min(app.session.catalog.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_forecast_panel(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.session;
    let mut lines: Vec<Line> = Vec::new();

    match &session.selected {
        Some(store) => {
            lines.push(Line::from(Span::styled(
                store.label.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::default());

            if session.forecast_loading {
                lines.push(Line::from(Span::styled(
                    "Fetching forecast…",
                    Style::default().fg(Color::Yellow),
                )));
            } else if let Some(prediction) = session.prediction {
                lines.push(Line::from(vec![
                    Span::raw(format!("Forecast ({}): ", session.next_period_label)),
                    Span::styled(
                        format!("{prediction:.2}"),
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]));
            }

            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "AI Insight",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )));
            if session.explanation_loading {
                lines.push(Line::from(Span::styled(
                    "Generating explanation…",
                    Style::default().fg(Color::Yellow),
                )));
            } else if let Some(error) = &session.explanation_error {
                lines.push(Line::from(Span::styled(
                    format!("Explanation unavailable: {error}"),
                    Style::default().fg(Color::Red),
                )));
            } else if let Some(text) = &session.explanation {
                lines.push(Line::from(text.clone()));
            } else if session.prediction.is_some() {
                lines.push(Line::from(Span::styled(
                    "No explanation for this forecast.",
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Select a store to see its forecast.",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Forecast "));
    frame.render_widget(panel, area);
}

fn draw_chart_panel(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.session;
    let block = Block::default().borders(Borders::ALL).title(" History ");

    let Some(series) = to_chart_series(
        &session.history,
        session.prediction,
        &session.next_period_label,
    ) else {
        let placeholder = Paragraph::new("No data yet — select a store.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let actuals: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.actual_value.map(|v| (i as f64, v)))
        .collect();
    let forecasts: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.forecast_value.map(|v| (i as f64, v)))
        .collect();

    let values: Vec<f64> = actuals
        .iter()
        .chain(forecasts.iter())
        .map(|(_, v)| *v)
        .collect();
    let (y_min, y_max) = value_bounds(&values);

    let datasets = vec![
        Dataset::default()
            .name("actual")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&actuals),
        Dataset::default()
            .name("forecast")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Green))
            .data(&forecasts),
    ];

    let x_labels: Vec<Span> = match series.as_slice() {
        [] => Vec::new(),
        [only] => vec![Span::raw(only.period_label.clone())],
        [first, .., last] => vec![
            Span::raw(first.period_label.clone()),
            Span::raw(last.period_label.clone()),
        ],
    };

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, (series.len().saturating_sub(1)) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{y_min:.0}")),
                    Span::raw(format!("{y_max:.0}")),
                ]),
        );
    frame.render_widget(chart, area);
}

/// Padded y-axis bounds around the plotted values.
fn value_bounds(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.1).max(1.0);
    (min - pad, max + pad)
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let hints = " ↑/↓ navigate   Enter select   r refresh   ? help   q quit";
    let footer = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let overlay = centered_rect(50, 40, area);
    frame.render_widget(Clear, overlay);

    let lines = vec![
        Line::from("Up/Down, j/k  move through the store list"),
        Line::from("Enter         fetch forecast for the highlighted store"),
        Line::from("r             re-check health and reload the catalog"),
        Line::from("Esc           dismiss this overlay"),
        Line::from("q             quit"),
    ];
    let help = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: true });
    frame.render_widget(help, overlay);
}

/// Centered sub-rectangle, sized in percent of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
