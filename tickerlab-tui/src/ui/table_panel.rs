//! Panel 4 — Table: tail previews of the close and returns tables.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use tickerlab_core::data::TickerFrame;

use crate::app::AppState;
use crate::theme;

const PREVIEW_ROWS: usize = 5;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(snapshot) = &app.snapshot else {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No market data loaded yet. Fetch data in Panel 1.",
                theme::muted(),
            )),
            area,
        );
        return;
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        format!(
            "Available tickers: {} | Rows: {}",
            snapshot.close.tickers().join(", "),
            snapshot.close.height()
        ),
        theme::secondary(),
    )));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        format!("Close prices (last {PREVIEW_ROWS})"),
        theme::accent_bold(),
    )));
    push_preview(&mut lines, &snapshot.close, |v| format!("{v:>10.2}"));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        format!("Daily returns (last {PREVIEW_ROWS})"),
        theme::accent_bold(),
    )));
    push_preview(&mut lines, &snapshot.returns, |v| {
        format!("{:>9.2}%", v * 100.0)
    });

    f.render_widget(Paragraph::new(lines), area);
}

fn push_preview(lines: &mut Vec<Line>, frame: &TickerFrame, fmt: impl Fn(f64) -> String) {
    // Header row with ticker names.
    let mut header = vec![Span::styled(format!("  {:<12}", "Date"), theme::muted())];
    for ticker in frame.tickers() {
        header.push(Span::styled(format!("{ticker:>10}"), theme::muted()));
    }
    lines.push(Line::from(header));

    for (date, values) in frame.tail(PREVIEW_ROWS) {
        let mut spans = vec![Span::styled(
            format!("  {:<12}", date.format("%Y-%m-%d")),
            theme::secondary(),
        )];
        for v in values {
            let text = if v.is_finite() {
                fmt(v)
            } else {
                format!("{:>10}", "-")
            };
            spans.push(Span::styled(text, theme::secondary()));
        }
        lines.push(Line::from(spans));
    }
}
