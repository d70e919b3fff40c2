//! Panel 1 — Track Scan: reference input, analysis results, report download.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use medrecord_core::resources::{LOOKUP_HINT, LOOKUP_PLACEHOLDER, LOOKUP_TITLE};
use medrecord_core::AnalysisResult;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(Span::styled(LOOKUP_TITLE, theme::accent_bold())),
        chunks[0],
    );
    render_input(f, chunks[1], app);
    render_controls(f, chunks[2], app);
    render_body(f, chunks[3], app);
}

fn render_input(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(app.input.editing))
        .title(" Reference Number ")
        .title_style(theme::panel_title(app.input.editing));

    let line = if app.input.text.is_empty() && !app.input.editing {
        Line::from(Span::styled(LOOKUP_PLACEHOLDER, theme::muted()))
    } else {
        let mut spans = vec![Span::styled(app.input.text.as_str(), theme::text())];
        if app.input.editing {
            spans.push(Span::styled("_", theme::accent()));
        }
        if app.input.text.is_empty() {
            spans.push(Span::styled(format!(" {LOOKUP_PLACEHOLDER}"), theme::muted()));
        }
        Line::from(spans)
    };
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_controls(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans = Vec::new();
    if app.lookup.is_loading() {
        spans.push(Span::styled("[ Searching... ]", theme::muted()));
    } else {
        spans.push(Span::styled("[ Enter ] Search", theme::accent()));
    }
    if app.lookup.result().is_some() {
        spans.push(Span::raw("   "));
        if app.lookup.is_exporting() {
            spans.push(Span::styled("[ Generating... ]", theme::muted()));
        } else {
            spans.push(Span::styled("[ Ctrl+D ] Download Report", theme::accent()));
        }
    }

    let hint = if app.input.editing {
        "Esc: leave input  Ctrl+U: clear"
    } else {
        "i: edit reference  d: download  e: error history"
    };
    let lines = vec![
        Line::from(spans),
        Line::from(Span::styled(hint, theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_body(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(err) = app.lookup.error() {
        lines.push(Line::from(Span::styled(err.to_string(), theme::negative())));
        lines.push(Line::from(""));
    }

    match app.lookup.result() {
        Some(result) => result_lines(&mut lines, result),
        None => lines.push(Line::from(Span::styled(LOOKUP_HINT, theme::muted()))),
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

fn result_lines<'a>(lines: &mut Vec<Line<'a>>, result: &'a AnalysisResult) {
    lines.push(Line::from(vec![
        Span::styled("Diagnosis: ", theme::muted()),
        Span::styled(
            result.analysis_result.as_str(),
            theme::finding(result.is_normal()),
        ),
    ]));
    lines.push(Line::from(Span::styled(result.confidence_label(), theme::text())));

    if let Some(kind) = &result.pneumonia_type {
        field(lines, "Type", kind.clone());
    }
    if let Some(severity) = &result.severity {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>16}: ", "Severity"), theme::muted()),
            Span::styled(severity.as_str(), theme::severity(severity)),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("Details", theme::accent_bold())));
    field(lines, "Reference", result.reference_number.clone());
    field(lines, "Patient Name", result.patient_name_or_placeholder().to_string());
    field(lines, "Analyzed By", result.doctor_name.clone());
    field(lines, "Date", result.display_date());
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("X-Ray Image", theme::accent_bold())));
    lines.push(Line::from(Span::styled(
        format!("  {}", result.image_url),
        theme::neutral(),
    )));

    if let Some(action) = &result.recommended_action {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Recommended Action",
            theme::warning(),
        )));
        lines.push(Line::from(Span::styled(format!("  {action}"), theme::text())));
    }
}

fn field(lines: &mut Vec<Line<'_>>, label: &str, value: String) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>16}: ", label), theme::muted()),
        Span::styled(value, theme::accent()),
    ]));
}
