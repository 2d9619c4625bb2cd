//! Panel 1 — Tickers: watchlist selection, fetch progress, loaded markers.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let state = &app.tickers;
    let mut lines: Vec<Line> = Vec::new();

    // Header
    lines.push(Line::from(vec![
        Span::styled("Selected: ", theme::muted()),
        Span::styled(
            format!("{}/{}", state.selected.len(), state.row_count()),
            theme::accent(),
        ),
        Span::styled(
            format!("  {} → {}", app.start, app.end),
            theme::secondary(),
        ),
        Span::styled(
            "  [Space]toggle [a]ll [d]eselect [f]etch [s]add",
            theme::muted(),
        ),
    ]));
    lines.push(Line::from(""));

    // Fetch progress
    if state.load_in_progress {
        let sym = state.load_current.as_deref().unwrap_or("...");
        lines.push(Line::from(vec![
            Span::styled("Downloading ", theme::warning()),
            Span::styled(sym, theme::accent()),
            Span::styled(
                format!("... [{}/{}]", state.load_done, state.load_total),
                theme::muted(),
            ),
        ]));
        lines.push(Line::from(""));
    }

    // Watchlist rows
    for (row, ticker) in state.watchlist.tickers.iter().enumerate() {
        let is_cursor = row == state.cursor;
        let is_selected = state.selected.contains(ticker);
        let is_loaded = app
            .snapshot
            .as_ref()
            .is_some_and(|s| s.close.column(ticker).is_some());

        let check = if is_selected { "[x]" } else { "[ ]" };
        let dot = if is_loaded { " ●" } else { " ○" };

        let ticker_style = if is_cursor {
            theme::accent().add_modifier(Modifier::REVERSED)
        } else if is_selected {
            theme::accent()
        } else {
            theme::muted()
        };

        let dot_style = if is_loaded {
            theme::positive()
        } else {
            theme::muted()
        };

        let color = theme::series_color(state.watchlist.color(ticker), row);
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::raw(check),
            Span::raw(" "),
            Span::styled("■ ", ratatui::style::Style::default().fg(color)),
            Span::styled(ticker.as_str(), ticker_style),
            Span::styled(dot, dot_style),
        ]));
    }

    // Snapshot summary
    if let Some(snapshot) = &app.snapshot {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Loaded ", theme::muted()),
            Span::styled(
                format!(
                    "{} tickers × {} rows",
                    snapshot.close.width(),
                    snapshot.close.height()
                ),
                theme::secondary(),
            ),
            Span::styled(
                format!("  as of {}", snapshot.fetched_at.format("%H:%M:%S")),
                theme::muted(),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("data {}", &snapshot.fingerprint[..12.min(snapshot.fingerprint.len())]),
            theme::muted(),
        )));
    }

    f.render_widget(Paragraph::new(lines), area);
}
