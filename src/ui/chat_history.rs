use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Paragraph, StatefulWidget, Widget, Wrap},
};

use crate::app::App;
use crate::chat::Role;
use crate::markdown;

pub fn render_chat_history(app: &App, area: Rect, buf: &mut Buffer) {
    let (history_area, pending_area) = if app.chat_log.is_pending() {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        (rows[0], Some(rows[1]))
    } else {
        (area, None)
    };

    let content = if app.chat_log.is_empty() {
        welcome_text()
    } else {
        history_text(app)
    };

    let total_lines = content.lines.len();
    // offset counts up from the bottom; 0 keeps the newest message visible
    let viewport = history_area.height.saturating_sub(2) as usize;
    let max_scroll = total_lines.saturating_sub(viewport);
    let from_bottom = app.chat_manager.chat_scroll_offset.min(max_scroll);
    let top_offset = u16::try_from(max_scroll - from_bottom).unwrap_or(u16::MAX);

    let chat_widget = Paragraph::new(content)
        .block(
            Block::bordered()
                .title("대화 (↑↓ to scroll, Tab to select links)")
                .border_type(BorderType::Rounded),
        )
        .wrap(Wrap { trim: false })
        .scroll((top_offset, 0));
    chat_widget.render(history_area, buf);

    if let Some(pending_area) = pending_area {
        render_pending(app, pending_area, buf);
    }
}

fn welcome_text() -> Text<'static> {
    Text::from(vec![
        Line::from("안녕하세요! 👋 서울시 청년포털 AI 상담사입니다."),
        Line::from(""),
        Line::from("청년 정책, 지원사업, 일자리 정보 등 궁금한 것을 물어보세요!"),
        Line::from(""),
        Line::from("추천 주제: 청년수당 • 청년일자리 • 주거지원 • 창업지원"),
        Line::from(""),
        Line::from("오른쪽의 빠른 질문(F1-F6)을 눌러도 됩니다."),
    ])
}

fn history_text(app: &App) -> Text<'static> {
    let mut lines = Vec::new();
    let mut link_base = 0;
    let selected = app.chat_manager.current_link_index;

    for message in app.chat_log.messages() {
        match message.role {
            Role::User => {
                // user text is shown verbatim, never through markdown
                let mut content_lines = message.content.lines();
                let first = content_lines.next().unwrap_or_default().to_string();
                lines.push(Line::from(vec![
                    Span::styled(
                        "나: ",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(first, Style::default().fg(Color::White)),
                ]));
                for line in content_lines {
                    lines.push(Line::from(vec![
                        Span::raw("    "),
                        Span::styled(line.to_string(), Style::default().fg(Color::White)),
                    ]));
                }
            }
            Role::Assistant => {
                lines.push(Line::from(Span::styled(
                    "AI:",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )));
                let document = markdown::render(&message.content);
                let rendered = document.to_lines(link_base, selected);
                link_base += document.links().len();
                lines.extend(rendered);
            }
        }
        lines.push(Line::from(""));
    }

    Text::from(lines)
}

fn render_pending(app: &App, area: Rect, buf: &mut Buffer) {
    let throbber = throbber_widgets_tui::Throbber::default()
        .label("입력 중...")
        .style(Style::default().fg(Color::Gray))
        .throbber_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .throbber_set(throbber_widgets_tui::BRAILLE_SIX)
        .use_type(throbber_widgets_tui::WhichUse::Spin);
    let mut state = app.throbber_state.clone();
    StatefulWidget::render(throbber, area, buf, &mut state);
}
