//! In-memory conversation state: the append-only message log and the
//! chat view state (input buffer, scrolling, link selection).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One exchanged message. Immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
}

/// Ordered log of exchanged messages plus the transient pending placeholder.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<Message>,
    next_id: u64,
    pending: bool,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append-only; ids are a monotonic counter, never reordered.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            role,
            content: content.into(),
        });
        id
    }

    /// At most one placeholder exists; calling twice is the same as once.
    pub fn show_pending(&mut self) {
        self.pending = true;
    }

    /// Idempotent; clearing with no placeholder is a no-op.
    pub fn clear_pending(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

/// Manages chat UI state.
///
/// `chat_scroll_offset` counts lines scrolled up from the bottom of the
/// history, so 0 keeps the view pinned to the newest message and appends
/// just reset it.
#[derive(Debug, Default)]
pub struct ChatManager {
    pub chat_input: String,
    pub chat_scroll_offset: usize,
    pub current_link_index: Option<usize>,
    pub available_links: Vec<String>,
}

impl ChatManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_input(&mut self, ch: char) {
        self.chat_input.push(ch);
    }

    pub fn backspace(&mut self) {
        self.chat_input.pop();
    }

    pub fn clear_input(&mut self) {
        self.chat_input.clear();
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll_offset = self.chat_scroll_offset.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll_offset = self.chat_scroll_offset.saturating_sub(1);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll_offset = 0;
    }

    pub fn set_links(&mut self, links: Vec<String>) {
        self.available_links = links;
        self.current_link_index = None;
    }

    pub fn clear_links(&mut self) {
        self.available_links.clear();
        self.current_link_index = None;
    }

    pub fn cycle_links(&mut self, direction: i32) {
        if self.available_links.is_empty() {
            return;
        }

        match self.current_link_index {
            None => self.current_link_index = Some(0),
            Some(index) => {
                let len = self.available_links.len() as i32;
                let new_index = if direction > 0 {
                    (index as i32 + 1) % len
                } else {
                    (index as i32 - 1 + len) % len
                };
                self.current_link_index = Some(new_index as usize);
            }
        }
    }

    pub fn get_current_link(&self) -> Option<&String> {
        self.current_link_index
            .and_then(|index| self.available_links.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appended_messages_keep_insertion_order() {
        let mut log = ChatLog::new();
        let a = log.append(Role::User, "질문");
        let b = log.append(Role::Assistant, "답변");
        assert!(a < b);
        assert_eq!(log.messages()[0].content, "질문");
        assert_eq!(log.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn clear_pending_is_idempotent() {
        let mut log = ChatLog::new();
        log.show_pending();
        log.clear_pending();
        log.clear_pending();
        assert!(!log.is_pending());

        // double show is also a single placeholder
        log.show_pending();
        log.show_pending();
        assert!(log.is_pending());
    }

    #[test]
    fn cycle_links_wraps_both_directions() {
        let mut manager = ChatManager::new();
        manager.cycle_links(1);
        assert_eq!(manager.current_link_index, None);

        manager.set_links(vec!["a".into(), "b".into()]);
        manager.cycle_links(1);
        assert_eq!(manager.current_link_index, Some(0));
        manager.cycle_links(1);
        assert_eq!(manager.current_link_index, Some(1));
        manager.cycle_links(1);
        assert_eq!(manager.current_link_index, Some(0));
        manager.cycle_links(-1);
        assert_eq!(manager.current_link_index, Some(1));
        assert_eq!(manager.get_current_link(), Some(&"b".to_string()));
    }

    #[test]
    fn scroll_offset_saturates_at_bottom() {
        let mut manager = ChatManager::new();
        manager.scroll_down();
        assert_eq!(manager.chat_scroll_offset, 0);
        manager.scroll_up();
        manager.scroll_up();
        manager.scroll_to_bottom();
        assert_eq!(manager.chat_scroll_offset, 0);
    }
}
