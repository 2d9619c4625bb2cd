//! Panel 5 — Help: keyboard shortcuts and documentation.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global Navigation");
    key(&mut lines, "1-5", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1 — Tickers");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "Space", "Toggle ticker selection");
    key(&mut lines, "a", "Select all tickers");
    key(&mut lines, "d", "Deselect all tickers");
    key(&mut lines, "f / Enter", "Fetch data for selected tickers");
    key(&mut lines, "s", "Add a custom symbol");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2 — Prices");
    key(&mut lines, "", "Close-price history for the selection");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3 — Risk");
    key(&mut lines, "", "Daily and annualized volatility per ticker");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 4 — Table");
    key(&mut lines, "", "Tail preview of close prices and returns");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 5 — Help (this panel)");
    key(&mut lines, "e", "Open error history overlay");
    lines.push(Line::from(""));

    section(&mut lines, "Notes");
    key(
        &mut lines,
        "Caching",
        "Identical requests reuse downloaded data for six hours",
    );
    key(
        &mut lines,
        "Missing tickers",
        "Symbols the source doesn't know are dropped from the tables",
    );
    key(
        &mut lines,
        "Data source",
        "Yahoo Finance (or deterministic walks with --synthetic)",
    );

    f.render_widget(Paragraph::new(lines), area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(
        title.to_string(),
        theme::accent_bold(),
    )));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {keys:>16}  "), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
