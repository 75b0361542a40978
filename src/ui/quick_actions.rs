use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Paragraph, Widget},
};

use crate::app::App;

/// Sidebar of canned questions; F1-F6 sends the matching question.
pub fn render_quick_actions(app: &App, area: Rect, buf: &mut Buffer) {
    let label_style = if app.in_flight {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    let lines: Vec<Line> = app
        .config
        .quick_actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            Line::from(vec![
                Span::styled(format!("F{} ", i + 1), Style::default().fg(Color::Yellow)),
                Span::styled(action.label.clone(), label_style),
            ])
        })
        .collect();

    let widget = Paragraph::new(Text::from(lines)).block(
        Block::bordered()
            .title("🚀 빠른 질문")
            .border_type(BorderType::Rounded),
    );
    widget.render(area, buf);
}
