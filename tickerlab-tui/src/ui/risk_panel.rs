//! Panel 3 — Risk: per-ticker volatility table and annualized std-dev bars.
//!
//! Standard deviation of daily returns measures volatility; the annualized
//! figure is the daily one scaled by sqrt(252).

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Paragraph};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    if app.snapshot.is_none() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No market data loaded yet.",
                theme::muted(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Fetch data in Panel 1 to see volatility.",
                theme::muted(),
            )),
        ];
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    let visible = app.available_selected();
    let stats: Vec<_> = app
        .volatility
        .iter()
        .filter(|s| visible.contains(&s.ticker))
        .collect();

    if stats.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "Select at least one loaded ticker in Panel 1.",
                theme::muted(),
            )),
            area,
        );
        return;
    }

    let table_height = stats.len() as u16 + 3;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(table_height), Constraint::Min(5)])
        .split(area);

    // Volatility table
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        "Risk (standard deviation of daily returns)",
        theme::accent_bold(),
    )));
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<10}", "Ticker"), theme::muted()),
        Span::styled(format!("{:>16}", "Daily Std (%)"), theme::muted()),
        Span::styled(format!("{:>17}", "Annual Std (%)"), theme::muted()),
    ]));
    for stat in &stats {
        let row = app
            .tickers
            .watchlist
            .tickers
            .iter()
            .position(|t| t == &stat.ticker)
            .unwrap_or(0);
        let color = theme::series_color(app.tickers.watchlist.color(&stat.ticker), row);
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<10}", stat.ticker),
                Style::default().fg(color),
            ),
            Span::styled(format_pct(stat.daily_std, 4, 16), theme::secondary()),
            Span::styled(format_pct(stat.annual_std, 2, 17), theme::secondary()),
        ]));
    }
    f.render_widget(Paragraph::new(lines), chunks[0]);

    // Annualized comparison bars
    let bars: Vec<Bar> = stats
        .iter()
        .filter(|s| s.annual_std.is_finite())
        .map(|stat| {
            let row = app
                .tickers
                .watchlist
                .tickers
                .iter()
                .position(|t| t == &stat.ticker)
                .unwrap_or(0);
            let color = theme::series_color(app.tickers.watchlist.color(&stat.ticker), row);
            // Basis points keep integer bar heights meaningful.
            Bar::default()
                .value((stat.annual_std * 10_000.0).round() as u64)
                .label(Line::from(stat.ticker.clone()))
                .text_value(format!("{:.1}%", stat.annual_std * 100.0))
                .style(Style::default().fg(color))
        })
        .collect();

    if !bars.is_empty() {
        let chart = BarChart::default()
            .data(BarGroup::default().bars(&bars))
            .bar_width(9)
            .bar_gap(2);
        f.render_widget(chart, chunks[1]);
    }
}

fn format_pct(value: f64, decimals: usize, width: usize) -> String {
    if value.is_finite() {
        format!("{:>width$.decimals$}", value * 100.0)
    } else {
        format!("{:>width$}", "-")
    }
}
