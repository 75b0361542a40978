pub mod chat;
pub mod chat_history;
pub mod quick_actions;
pub mod related_docs;

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use crate::app::App;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        chat::render_chat(self, area, buf);
    }
}
