//! Keyboard input dispatch — global keys → overlays → panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Overlay, Panel};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::Search => {
            handle_search_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys (always available).
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('1') => {
            app.active_panel = Panel::Tickers;
            return;
        }
        KeyCode::Char('2') => {
            app.active_panel = Panel::Prices;
            return;
        }
        KeyCode::Char('3') => {
            app.active_panel = Panel::Risk;
            return;
        }
        KeyCode::Char('4') => {
            app.active_panel = Panel::Table;
            return;
        }
        KeyCode::Char('5') => {
            app.active_panel = Panel::Help;
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Tickers => handle_tickers_key(app, key),
        Panel::Prices | Panel::Risk | Panel::Table => {} // display only
        Panel::Help => handle_help_key(app, key),
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_search_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.search_input.clear();
        }
        KeyCode::Enter => {
            let symbol = app.search_input.trim().to_uppercase();
            if !symbol.is_empty() {
                app.tickers.add_symbol(symbol.clone());
                app.set_status(format!("Added {symbol}"));
            }
            app.search_input.clear();
            app.overlay = Overlay::None;
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
        }
        _ => {}
    }
}

fn handle_tickers_key(app: &mut AppState, key: KeyEvent) {
    let row_count = app.tickers.row_count();

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if row_count > 0 && app.tickers.cursor + 1 < row_count {
                app.tickers.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.tickers.cursor = app.tickers.cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') => {
            if let Some(ticker) = app.tickers.cursor_ticker().map(String::from) {
                if app.tickers.selected.contains(&ticker) {
                    app.tickers.selected.remove(&ticker);
                } else {
                    app.tickers.selected.insert(ticker);
                }
            }
        }
        KeyCode::Char('a') => {
            for ticker in &app.tickers.watchlist.tickers {
                app.tickers.selected.insert(ticker.clone());
            }
        }
        KeyCode::Char('d') => {
            app.tickers.selected.clear();
        }
        KeyCode::Char('f') | KeyCode::Enter => {
            app.request_load();
        }
        KeyCode::Char('s') => {
            app.overlay = Overlay::Search;
            app.search_input.clear();
        }
        _ => {}
    }
}

fn handle_help_key(app: &mut AppState, key: KeyEvent) {
    if let KeyCode::Char('e') = key.code {
        app.overlay = Overlay::ErrorHistory;
        app.error_scroll = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_app;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn quit_on_q() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn number_keys_switch_panels() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('3')));
        assert_eq!(app.active_panel, Panel::Risk);
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.active_panel, Panel::Table);
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.active_panel, Panel::Risk);
    }

    #[test]
    fn space_toggles_the_cursor_ticker() {
        let mut app = test_app();
        let first = app.tickers.watchlist.tickers[0].clone();
        assert!(app.tickers.selected.contains(&first));
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert!(!app.tickers.selected.contains(&first));
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert!(app.tickers.selected.contains(&first));
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut app = test_app();
        let rows = app.tickers.row_count();
        for _ in 0..rows + 5 {
            handle_key(&mut app, press(KeyCode::Char('j')));
        }
        assert_eq!(app.tickers.cursor, rows - 1);
        for _ in 0..rows + 5 {
            handle_key(&mut app, press(KeyCode::Char('k')));
        }
        assert_eq!(app.tickers.cursor, 0);
    }

    #[test]
    fn select_and_deselect_all() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('d')));
        assert!(app.tickers.selected.is_empty());
        handle_key(&mut app, press(KeyCode::Char('a')));
        assert_eq!(
            app.tickers.selected.len(),
            app.tickers.watchlist.tickers.len()
        );
    }

    #[test]
    fn search_overlay_adds_a_symbol() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('s')));
        assert_eq!(app.overlay, Overlay::Search);
        for c in "nhy.ol".chars() {
            handle_key(&mut app, press(KeyCode::Char(c)));
        }
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.overlay, Overlay::None);
        assert!(app.tickers.watchlist.tickers.contains(&"NHY.OL".to_string()));
    }

    #[test]
    fn welcome_overlay_dismisses_on_any_key() {
        let mut app = test_app();
        app.overlay = Overlay::Welcome;
        handle_key(&mut app, press(KeyCode::Char('x')));
        assert_eq!(app.overlay, Overlay::None);
        // The keypress was consumed by the overlay, not the panel.
        assert!(app.running);
    }

    #[test]
    fn error_overlay_scrolls_within_history() {
        let mut app = test_app();
        for i in 0..3 {
            app.push_error(
                crate::app::ErrorCategory::Other,
                format!("e{i}"),
                String::new(),
            );
        }
        app.overlay = Overlay::ErrorHistory;
        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Char('j')));
        assert_eq!(app.error_scroll, 2);
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.overlay, Overlay::None);
    }
}
