use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Stylize},
    widgets::{Block, BorderType, Paragraph, Widget},
};

use crate::app::App;
use crate::ui::{chat_history, quick_actions, related_docs};

pub fn render_chat(app: &App, area: Rect, buf: &mut Buffer) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(40),    // Chat column
            Constraint::Length(30), // Sidebar
        ])
        .split(area);

    render_chat_column(app, columns[0], buf);
    render_sidebar(app, columns[1], buf);
}

fn render_chat_column(app: &App, area: Rect, buf: &mut Buffer) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Chat history
            Constraint::Length(3), // Input box
            Constraint::Length(3), // Help
        ])
        .split(area);

    // Title
    let title = Paragraph::new("💬 서울시 청년포털 챗봇")
        .block(
            Block::bordered()
                .title("청년 정책 상담사")
                .title_alignment(Alignment::Center)
                .border_type(BorderType::Rounded),
        )
        .fg(Color::Green)
        .alignment(Alignment::Center);
    title.render(main_layout[0], buf);

    // Chat history
    chat_history::render_chat_history(app, main_layout[1], buf);

    // Input box; dimmed while a turn is in flight
    let input_text = format!("> {}", app.chat_manager.chat_input);
    let input_color = if app.in_flight { Color::DarkGray } else { Color::Yellow };
    let input_widget = Paragraph::new(input_text)
        .block(
            Block::bordered()
                .title("질문을 입력하세요")
                .border_type(BorderType::Rounded),
        )
        .fg(input_color);
    input_widget.render(main_layout[2], buf);

    // Help
    let help = Paragraph::new(
        "Enter: send • Tab: cycle links • F1-F6: quick questions • ↑↓: scroll • Esc: quit",
    )
    .block(
        Block::bordered()
            .title("Controls")
            .border_type(BorderType::Rounded),
    )
    .fg(Color::Yellow)
    .alignment(Alignment::Center);
    help.render(main_layout[3], buf);
}

fn render_sidebar(app: &App, area: Rect, buf: &mut Buffer) {
    if app.related_docs.is_empty() {
        quick_actions::render_quick_actions(app, area, buf);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(app.config.quick_actions.len() as u16 + 2),
            Constraint::Min(3),
        ])
        .split(area);

    quick_actions::render_quick_actions(app, rows[0], buf);
    related_docs::render_related_docs(app, rows[1], buf);
}
