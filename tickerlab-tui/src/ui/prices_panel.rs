//! Panel 2 — Prices: close-price history, one colored line per ticker.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(snapshot) = &app.snapshot else {
        render_empty(f, area, "No market data loaded yet.");
        return;
    };
    let visible = app.available_selected();
    if visible.is_empty() {
        render_empty(f, area, "Select at least one loaded ticker in Panel 1.");
        return;
    }

    let close = &snapshot.close;

    // Materialize (x, y) points per ticker, skipping gaps.
    let series: Vec<(String, Color, Vec<(f64, f64)>)> = visible
        .iter()
        .map(|ticker| {
            let row = app
                .tickers
                .watchlist
                .tickers
                .iter()
                .position(|t| t == ticker)
                .unwrap_or(0);
            let color = theme::series_color(app.tickers.watchlist.color(ticker), row);
            let points: Vec<(f64, f64)> = close
                .column(ticker)
                .unwrap_or(&[])
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(|(i, &v)| (i as f64, v))
                .collect();
            (ticker.clone(), color, points)
        })
        .collect();

    let ticker_refs: Vec<&str> = visible.iter().map(|s| s.as_str()).collect();
    let Some((min_y, max_y)) = close.finite_bounds(&ticker_refs) else {
        render_empty(f, area, "Loaded columns contain no finite prices.");
        return;
    };

    let padding = (max_y - min_y).abs().max(1.0) * 0.05;
    let y_min = min_y - padding;
    let y_max = max_y + padding;
    let x_max = close.height().saturating_sub(1) as f64;

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(name, color, points)| {
            Dataset::default()
                .name(name.clone())
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(*color))
                .graph_type(GraphType::Line)
                .data(points)
        })
        .collect();

    let first_date = close.dates().first().map(|d| d.to_string()).unwrap_or_default();
    let last_date = close.dates().last().map(|d| d.to_string()).unwrap_or_default();

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(Span::styled("Date", theme::muted()))
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled(first_date, theme::muted()),
                    Span::styled(last_date, theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Close", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.0}"), theme::muted()),
                    Span::styled(format!("{y_max:.0}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_empty(f: &mut Frame, area: Rect, reason: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(reason.to_string(), theme::muted())),
        Line::from(""),
        Line::from(Span::styled(
            "Go to Tickers (press 1), select symbols, and press f to fetch.",
            theme::muted(),
        )),
    ];
    f.render_widget(Paragraph::new(lines), area);
}
