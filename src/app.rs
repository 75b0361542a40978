use crate::chat::{ChatLog, ChatManager, Role};
use crate::config::Config;
use crate::event::{AppEvent, Event, EventHandler};
use crate::gateway::{
    BackendGateway, GatewayError, NormalizedAnswer, RelatedDocument, UNREACHABLE_FALLBACK,
};
use crate::identity::{generate_client_id, ClientStore};
use crate::markdown;
use crate::redirect::LinkGuard;
use ratatui::{
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    DefaultTerminal,
};
use color_eyre::Result;
use std::sync::Arc;
use throbber_widgets_tui::ThrobberState;

/// Application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    pub running: bool,
    /// Runtime configuration.
    pub config: Config,
    /// Ordered log of exchanged messages.
    pub chat_log: ChatLog,
    /// Chat view state: input buffer, scrolling, link selection.
    pub chat_manager: ChatManager,
    /// Related documents from the latest turn; fully replaced each turn.
    pub related_docs: Vec<RelatedDocument>,
    /// True from the moment a turn starts until its outcome is processed;
    /// gates every send path so turns never overlap.
    pub in_flight: bool,
    /// Animation state for the pending placeholder.
    pub throbber_state: ThrobberState,
    /// Event handler.
    pub events: EventHandler,

    gateway: Arc<BackendGateway>,
    link_guard: LinkGuard,
    session_id: String,
}

impl App {
    /// Constructs a new instance of [`App`].
    pub async fn new() -> Result<Self> {
        let config = Config::load();

        let session_id = match ClientStore::open_default() {
            Ok(store) => store.client_id(),
            Err(e) => {
                tracing::warn!("client storage unavailable, using ephemeral id: {e}");
                generate_client_id()
            }
        };

        let gateway = Arc::new(BackendGateway::new(config.backend_base_url.clone())?);
        let link_guard = LinkGuard::new(
            config.portal_origin.clone(),
            config.verifier_base_url.clone(),
        );

        Ok(Self {
            running: true,
            config,
            chat_log: ChatLog::new(),
            chat_manager: ChatManager::new(),
            related_docs: Vec::new(),
            in_flight: false,
            throbber_state: ThrobberState::default(),
            events: EventHandler::new(),
            gateway,
            link_guard,
            session_id,
        })
    }

    /// Run the application's main loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut needs_redraw = true;

        while self.running {
            if needs_redraw {
                terminal.draw(|frame| frame.render_widget(&self, frame.area()))?;
                // save power
                needs_redraw = false;
            }

            match self.events.next().await? {
                Event::Tick => {
                    if self.chat_log.is_pending() {
                        self.throbber_state.calc_next();
                        needs_redraw = true;
                    }
                }
                Event::Crossterm(event) => {
                    if let crossterm::event::Event::Key(key_event) = event {
                        self.handle_key_events(key_event)?;
                    }
                    needs_redraw = true;
                }
                Event::App(app_event) => {
                    match app_event {
                        AppEvent::ChatSubmit => self.submit_chat_message(),
                        AppEvent::QuickAction(index) => self.send_quick_action(index),
                        AppEvent::TurnCompleted(answer) => self.finish_turn(answer),
                        AppEvent::TurnFailed(error) => self.fail_turn(error),
                        AppEvent::OpenLink(url) => self.open_link(url),
                        AppEvent::Quit => self.quit(),
                    }
                    needs_redraw = true;
                }
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    pub fn handle_key_events(&mut self, key_event: KeyEvent) -> Result<()> {
        match key_event.code {
            KeyCode::Esc => self.events.send(AppEvent::Quit),
            KeyCode::Char('c' | 'C') if key_event.modifiers == KeyModifiers::CONTROL => {
                self.events.send(AppEvent::Quit)
            }
            KeyCode::Tab => self.chat_manager.cycle_links(1),
            KeyCode::BackTab => self.chat_manager.cycle_links(-1),
            KeyCode::Enter => {
                if let Some(url) = self.chat_manager.get_current_link() {
                    let url = url.clone();
                    self.events.send(AppEvent::OpenLink(url));
                } else {
                    self.events.send(AppEvent::ChatSubmit);
                }
            }
            KeyCode::F(n @ 1..=6) => self.events.send(AppEvent::QuickAction(n as usize - 1)),
            KeyCode::Backspace => self.chat_manager.backspace(),
            KeyCode::Char(ch) => self.chat_manager.handle_input(ch),
            KeyCode::PageUp | KeyCode::Up => self.chat_manager.scroll_up(),
            KeyCode::PageDown | KeyCode::Down => self.chat_manager.scroll_down(),
            _ => {}
        }
        Ok(())
    }

    /// Set running to false to quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn submit_chat_message(&mut self) {
        // Sending stays disabled until the in-flight turn finishes.
        if self.in_flight {
            return;
        }
        let query = self.chat_manager.chat_input.trim().to_string();
        if query.is_empty() {
            return;
        }
        // Clear input immediately for better UX
        self.chat_manager.clear_input();
        self.start_turn(query);
    }

    pub fn send_quick_action(&mut self, index: usize) {
        // Rapid quick-action presses are serialized by the same gate.
        if self.in_flight {
            return;
        }
        if let Some(action) = self.config.quick_actions.get(index) {
            let question = action.question.clone();
            self.start_turn(question);
        }
    }

    fn start_turn(&mut self, query: String) {
        self.chat_log.append(Role::User, query.clone());
        self.chat_manager.clear_links();
        self.chat_manager.scroll_to_bottom();
        self.chat_log.show_pending();
        self.in_flight = true;

        let gateway = Arc::clone(&self.gateway);
        let session_id = self.session_id.clone();
        let sender = self.events.sender();
        // The task always reports exactly one outcome, so the in-flight
        // gate is released on every path.
        tokio::spawn(async move {
            let outcome = match gateway.send_turn(&session_id, &query).await {
                Ok(answer) => AppEvent::TurnCompleted(answer),
                Err(error) => AppEvent::TurnFailed(error),
            };
            let _ = sender.send(Event::App(outcome));
        });
    }

    fn finish_turn(&mut self, answer: NormalizedAnswer) {
        self.chat_log.clear_pending();
        self.chat_log.append(Role::Assistant, answer.text);
        self.related_docs = answer.documents;
        self.update_available_links();
        self.chat_manager.scroll_to_bottom();
        self.in_flight = false;
    }

    fn fail_turn(&mut self, error: GatewayError) {
        tracing::warn!("turn failed: {error}");
        self.chat_log.clear_pending();
        // The widget never surfaced HTTP statuses to the user; every
        // failed exchange reads as the backend being unreachable.
        self.chat_log.append(Role::Assistant, UNREACHABLE_FALLBACK);
        self.related_docs.clear();
        self.update_available_links();
        self.chat_manager.scroll_to_bottom();
        self.in_flight = false;
    }

    /// Rebuild the Tab-cycling link list: markdown links from assistant
    /// messages in order, then linkable related documents.
    pub fn update_available_links(&mut self) {
        let mut links = Vec::new();
        for message in self.chat_log.messages() {
            if message.role == Role::Assistant {
                links.extend(markdown::render(&message.content).links());
            }
        }
        links.extend(self.related_docs.iter().filter_map(|doc| doc.url.clone()));
        self.chat_manager.set_links(links);
    }

    fn open_link(&mut self, url: String) {
        let guard = self.link_guard.clone();
        tokio::spawn(async move {
            if let Err(e) = guard.open(&url).await {
                tracing::warn!("failed to open link: {e}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_for_test() -> App {
        App {
            running: true,
            config: Config::default(),
            chat_log: ChatLog::new(),
            chat_manager: ChatManager::new(),
            related_docs: Vec::new(),
            in_flight: false,
            throbber_state: ThrobberState::default(),
            events: EventHandler::new(),
            gateway: Arc::new(
                BackendGateway::new("http://127.0.0.1:1".to_string()).unwrap(),
            ),
            link_guard: LinkGuard::new(
                "https://youth.seoul.go.kr/".to_string(),
                String::new(),
            ),
            session_id: "user-test00000000".to_string(),
        }
    }

    #[tokio::test]
    async fn completed_turn_appends_answer_and_reenables_sending() {
        let mut app = app_for_test();
        app.chat_log.append(Role::User, "청년수당");
        app.chat_log.show_pending();
        app.in_flight = true;
        // scrolled up into older history before the answer arrives
        app.chat_manager.chat_scroll_offset = 5;

        app.finish_turn(NormalizedAnswer {
            text: "청년수당은 ...".to_string(),
            documents: vec![],
        });

        assert!(!app.in_flight);
        assert!(!app.chat_log.is_pending());
        // the appended answer pins the view back to the newest message
        assert_eq!(app.chat_manager.chat_scroll_offset, 0);
        let last = app.chat_log.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "청년수당은 ...");
        assert!(app.related_docs.is_empty());
    }

    #[tokio::test]
    async fn failed_turn_renders_fallback_and_reenables_sending() {
        let mut app = app_for_test();
        app.chat_log.show_pending();
        app.in_flight = true;
        app.chat_manager.chat_scroll_offset = 5;
        app.related_docs = vec![RelatedDocument {
            title: "이전 문서".to_string(),
            url: None,
        }];

        app.fail_turn(GatewayError::NetworkUnreachable);

        assert!(!app.in_flight);
        assert!(!app.chat_log.is_pending());
        assert_eq!(app.chat_manager.chat_scroll_offset, 0);
        assert_eq!(
            app.chat_log.messages().last().unwrap().content,
            UNREACHABLE_FALLBACK
        );
        // a failed turn returns no documents, so the panel clears
        assert!(app.related_docs.is_empty());
    }

    #[tokio::test]
    async fn turn_with_documents_replaces_panel_and_links() {
        let mut app = app_for_test();
        app.in_flight = true;

        app.finish_turn(NormalizedAnswer {
            text: "[자세히 보기] https://youth.seoul.go.kr/p/1".to_string(),
            documents: vec![
                RelatedDocument {
                    title: "청년수당".to_string(),
                    url: Some("https://youth.seoul.go.kr/p/2".to_string()),
                },
                RelatedDocument {
                    title: "링크 없는 문서".to_string(),
                    url: None,
                },
            ],
        });

        assert_eq!(app.related_docs.len(), 2);
        // message link first, then the linkable document
        assert_eq!(
            app.chat_manager.available_links,
            vec![
                "https://youth.seoul.go.kr/p/1".to_string(),
                "https://youth.seoul.go.kr/p/2".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn submits_are_ignored_while_a_turn_is_in_flight() {
        let mut app = app_for_test();
        app.in_flight = true;

        app.chat_manager.chat_input = "두 번째 질문".to_string();
        app.submit_chat_message();
        app.send_quick_action(0);

        // nothing was appended and the input survived
        assert!(app.chat_log.is_empty());
        assert_eq!(app.chat_manager.chat_input, "두 번째 질문");
    }

    #[tokio::test]
    async fn empty_input_never_submits() {
        let mut app = app_for_test();
        app.chat_manager.chat_input = "   ".to_string();
        app.submit_chat_message();
        assert!(app.chat_log.is_empty());
        assert!(!app.in_flight);
    }
}
