//! Top-level UI layout — banner, active panel, status bar.

pub mod help_panel;
pub mod lookup_panel;
pub mod overlays;
pub mod resources_panel;
pub mod status_bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use medrecord_core::resources::{BANNER_SUBTITLE, BANNER_TITLE, PORTAL_NAME};

use crate::app::{AppState, Overlay, Panel};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: 2-line banner + main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let banner_area = chunks[0];
    let main_area = chunks[1];
    let status_area = chunks[2];

    draw_banner(f, banner_area);
    draw_panel(f, main_area, app);
    status_bar::render(f, status_area, app);

    // Draw overlays on top.
    match &app.overlay {
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::Notice(message) => overlays::render_notice(f, main_area, message),
        Overlay::None => {}
    }
}

fn draw_banner(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled(format!(" {PORTAL_NAME} "), theme::accent_bold()),
            Span::styled("| ", theme::muted()),
            Span::styled(BANNER_TITLE, theme::text()),
        ]),
        Line::from(Span::styled(format!(" {BANNER_SUBTITLE}"), theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

/// Draw a single panel with its border.
fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Lookup => lookup_panel::render(f, inner, app),
        Panel::Resources => resources_panel::render(f, inner, app),
        Panel::Help => help_panel::render(f, inner, app),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}
