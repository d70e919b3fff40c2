//! Panel 2 — Resources: quick actions and health tips.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use medrecord_core::resources::{HEALTH_TIPS, QUICK_ACTIONS};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let cursor = app.resources.row;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Quick Actions", theme::accent_bold()),
        Span::styled("  [j/k]move [Enter]show", theme::muted()),
    ]));
    for (i, action) in QUICK_ACTIONS.iter().enumerate() {
        card(&mut lines, i == cursor, action.title, action.description);
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("Health Tips", theme::accent_bold())));
    for (i, tip) in HEALTH_TIPS.iter().enumerate() {
        card(&mut lines, QUICK_ACTIONS.len() + i == cursor, tip.title, tip.summary);
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

fn card(lines: &mut Vec<Line<'static>>, selected: bool, title: &'static str, text: &'static str) {
    let (marker, title_style) = if selected {
        ("> ", theme::accent().add_modifier(Modifier::BOLD))
    } else {
        ("  ", theme::text())
    };
    lines.push(Line::from(vec![
        Span::styled(marker, theme::accent()),
        Span::styled(title, title_style),
    ]));
    lines.push(Line::from(Span::styled(format!("    {text}"), theme::muted())));
}
