use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Paragraph, Widget, Wrap},
};

use crate::app::App;

/// Side list of related policy documents from the latest turn. Hidden
/// entirely (the caller skips this panel) when the list is empty.
pub fn render_related_docs(app: &App, area: Rect, buf: &mut Buffer) {
    // message links occupy the lower indices of the Tab cycle
    let doc_link_count = app.related_docs.iter().filter(|d| d.url.is_some()).count();
    // while a turn is in flight the link list is already cleared
    let link_base = app.chat_manager.available_links.len().saturating_sub(doc_link_count);
    let selected = app.chat_manager.current_link_index;

    let mut next_link = link_base;
    let lines: Vec<Line> = app
        .related_docs
        .iter()
        .map(|doc| {
            let style = match &doc.url {
                Some(_) => {
                    let index = next_link;
                    next_link += 1;
                    if selected == Some(index) {
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED)
                    }
                }
                None => Style::default().fg(Color::White),
            };
            Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::Green)),
                Span::styled(doc.title.clone(), style),
            ])
        })
        .collect();

    let widget = Paragraph::new(Text::from(lines))
        .block(
            Block::bordered()
                .title("📋 관련 정책")
                .border_type(BorderType::Rounded),
        )
        .wrap(Wrap { trim: true });
    widget.render(area, buf);
}
