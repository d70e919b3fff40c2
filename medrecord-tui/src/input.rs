//! Keyboard input dispatch — Ctrl+C → overlays → reference editing → global keys → panel keys.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Overlay, Panel, ResourcesCursor};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.running = false;
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::Notice(_) => {
            handle_notice_overlay(app, key);
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. The reference input swallows printable keys while editing.
    if app.active_panel == Panel::Lookup && app.input.editing {
        handle_editing_key(app, key);
        return;
    }

    // 3. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('1') => { app.active_panel = Panel::Lookup; return; }
        KeyCode::Char('2') => { app.active_panel = Panel::Resources; return; }
        KeyCode::Char('3') => { app.active_panel = Panel::Help; return; }
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

    // 4. Panel-specific keys.
    match app.active_panel {
        Panel::Lookup => handle_lookup_key(app, key),
        Panel::Resources => handle_resources_key(app, key),
        Panel::Help => handle_help_key(app, key),
    }
}

fn handle_notice_overlay(app: &mut AppState, key: KeyEvent) {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        app.overlay = Overlay::None;
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

fn handle_editing_key(app: &mut AppState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => app.input.text.clear(),
        KeyCode::Char('d') if ctrl => app.request_export(),
        KeyCode::Char(_) if ctrl => {}
        KeyCode::Char(c) => app.input.text.push(c),
        KeyCode::Backspace => {
            app.input.text.pop();
        }
        KeyCode::Enter => app.submit_lookup(),
        KeyCode::Esc => app.input.editing = false,
        KeyCode::Tab => {
            app.input.editing = false;
            app.active_panel = app.active_panel.next();
        }
        KeyCode::BackTab => {
            app.input.editing = false;
            app.active_panel = app.active_panel.prev();
        }
        _ => {}
    }
}

fn handle_lookup_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Char('/') => app.input.editing = true,
        KeyCode::Enter => app.submit_lookup(),
        KeyCode::Char('d') => app.request_export(),
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
        }
        _ => {}
    }
}

fn handle_resources_key(app: &mut AppState, key: KeyEvent) {
    let row_count = ResourcesCursor::row_count();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.resources.row + 1 < row_count {
                app.resources.row += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.resources.row = app.resources.row.saturating_sub(1);
        }
        KeyCode::Enter => {
            let (title, text) = app.resources.selected();
            app.set_status(format!("{title}: {text}"));
        }
        _ => {}
    }
}

fn handle_help_key(app: &mut AppState, key: KeyEvent) {
    if key.code == KeyCode::Char('e') {
        app.error_scroll = 0;
        app.overlay = Overlay::ErrorHistory;
    }
}
