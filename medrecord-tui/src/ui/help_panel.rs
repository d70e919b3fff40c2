//! Panel 3 — Help: keyboard shortcuts.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global Navigation");
    key(&mut lines, "1-3", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "q", "Quit (outside the reference input)");
    key(&mut lines, "Ctrl+C", "Quit from anywhere");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1 — Track Scan");
    key(&mut lines, "i or /", "Edit the reference number");
    key(&mut lines, "Enter", "Search for the analysis");
    key(&mut lines, "Ctrl+U", "Clear the reference number");
    key(&mut lines, "Ctrl+D or d", "Download the PDF report");
    key(&mut lines, "Esc", "Leave the reference input");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2 — Resources");
    key(&mut lines, "j / k", "Move between cards");
    key(&mut lines, "Enter", "Show the card in the status bar");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3 — Help (this panel)");
    key(&mut lines, "e", "Open error history overlay");

    let para = Paragraph::new(lines);
    f.render_widget(para, area);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>20}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
