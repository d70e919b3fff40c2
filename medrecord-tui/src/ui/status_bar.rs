//! Bottom status bar — panel hints, last status message.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(" 1:Track 2:Resources 3:Help", theme::muted()));
    spans.push(Span::raw(" | "));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    } else {
        spans.push(Span::styled(
            format!("Reports save to {}", app.download_dir.display()),
            theme::muted(),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
