//! # Chat Controller
//!
//! State machine behind the chat widget: message list, typing/loading flags,
//! session token, unread badge, and panel visibility.
//!
//! State lives behind `Arc<parking_lot::Mutex<_>>` and is never locked across an
//! `.await`, so the UI can read it while a request is in flight.
//!
//! ```rust,ignore
//! use widget::{ChatController, HttpChatApi};
//! use std::sync::Arc;
//!
//! let api = HttpChatApi::new("http://127.0.0.1:5000", widget::api::DEFAULT_TIMEOUT)?;
//! let chat = ChatController::new(Arc::new(api));
//!
//! chat.open_chat();
//! chat.send_message("Quero aumentar minhas vendas").await;
//! for toast in chat.drain_notifications() {
//!     println!("{}: {}", toast.title, toast.description);
//! }
//! ```

use crate::api::{ApiError, ChatApi};
use crate::notify::Notification;
use chrono::{DateTime, Utc};
use lib_utils::validation::check_message;
use parking_lot::Mutex;
use shared::{ChatMessageRequest, ErrorCode};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub const WELCOME_MESSAGE: &str =
    "Olá! 👋 Sou o NeuroBotX Assistant. Como posso ajudar você a otimizar seu negócio hoje?";

const WELCOME_ID: &str = "welcome";

/// A message as the widget shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetMessage {
    pub id: String,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl WidgetMessage {
    fn local(prefix: &str, content: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: format!("{}-{}", prefix, Uuid::new_v4()),
            content: content.into(),
            is_user,
            timestamp: Utc::now(),
        }
    }

    fn welcome() -> Self {
        Self {
            id: WELCOME_ID.to_string(),
            content: WELCOME_MESSAGE.to_string(),
            is_user: false,
            timestamp: Utc::now(),
        }
    }
}

impl From<shared::ChatMessageDto> for WidgetMessage {
    fn from(dto: shared::ChatMessageDto) -> Self {
        Self {
            id: dto.id,
            content: dto.content,
            is_user: dto.is_user,
            timestamp: dto.timestamp,
        }
    }
}

/// Controller state. Cloned out by [`ChatController::snapshot`].
#[derive(Debug, Clone)]
pub struct ChatState {
    pub messages: Vec<WidgetMessage>,
    pub is_typing: bool,
    pub is_loading: bool,
    pub session_token: Option<String>,
    pub unread_count: u32,
    pub is_chat_open: bool,
    notifications: Vec<Notification>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            messages: vec![WidgetMessage::welcome()],
            is_typing: false,
            is_loading: false,
            session_token: None,
            // The welcome message starts unread.
            unread_count: 1,
            is_chat_open: false,
            notifications: Vec::new(),
        }
    }
}

/// What a [`ChatController::send_message`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Rejected locally; nothing was sent.
    Rejected,
    /// The bot replied.
    Replied,
    /// The request failed.
    Failed(ApiError),
}

/// Chat widget controller. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ChatController {
    api: Arc<dyn ChatApi>,
    user_id: Option<String>,
    state: Arc<Mutex<ChatState>>,
}

impl ChatController {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            user_id: None,
            state: Arc::new(Mutex::new(ChatState::default())),
        }
    }

    /// Send `user_id` with every message.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Resume a stored session.
    pub fn with_session_token(self, token: impl Into<String>) -> Self {
        self.state.lock().session_token = Some(token.into());
        self
    }

    // region:    --- Accessors
    pub fn snapshot(&self) -> ChatState {
        self.state.lock().clone()
    }

    pub fn messages(&self) -> Vec<WidgetMessage> {
        self.state.lock().messages.clone()
    }

    pub fn session_token(&self) -> Option<String> {
        self.state.lock().session_token.clone()
    }

    pub fn unread_count(&self) -> u32 {
        self.state.lock().unread_count
    }

    pub fn is_chat_open(&self) -> bool {
        self.state.lock().is_chat_open
    }

    pub fn is_typing(&self) -> bool {
        self.state.lock().is_typing
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading
    }

    /// Take pending notifications.
    pub fn drain_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut self.state.lock().notifications)
    }
    // endregion: --- Accessors

    // region:    --- Panel
    pub fn open_chat(&self) {
        let mut state = self.state.lock();
        state.is_chat_open = true;
        state.unread_count = 0;
    }

    pub fn close_chat(&self) {
        self.state.lock().is_chat_open = false;
    }

    pub fn toggle_chat(&self) {
        let mut state = self.state.lock();
        state.is_chat_open = !state.is_chat_open;
        if state.is_chat_open {
            state.unread_count = 0;
        }
    }
    // endregion: --- Panel

    /// Forget the session; the next message starts a new one.
    pub fn reset_session(&self) {
        self.state.lock().session_token = None;
    }

    /// Check and send `text`, then apply the reply or the failure.
    ///
    /// The optimistic message and the request carry the trimmed text as typed.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        // The server encodes; the client only applies the rules.
        let message = match check_message(text) {
            Ok(message) => message,
            Err(reason) => {
                debug!(%reason, "[WIDGET] Message rejected locally");
                self.state
                    .lock()
                    .notifications
                    .push(Notification::invalid_message(reason.to_string()));
                return SendOutcome::Rejected;
            }
        };

        let request = {
            let mut state = self.state.lock();
            state.messages.push(WidgetMessage::local("user", message.clone(), true));
            state.is_typing = true;
            state.is_loading = true;

            ChatMessageRequest {
                message,
                session_token: state.session_token.clone(),
                user_id: self.user_id.clone(),
                timestamp: Some(Utc::now().to_rfc3339()),
            }
        };

        let result = self.api.send_message(&request).await;

        let mut state = self.state.lock();
        state.is_typing = false;
        state.is_loading = false;

        match result {
            Ok(response) => {
                state.session_token = Some(response.session_token);
                state.messages.push(WidgetMessage::local("bot", response.reply, false));
                if !state.is_chat_open {
                    state.unread_count += 1;
                }
                SendOutcome::Replied
            }
            Err(err) => {
                warn!(error = %err, "[WIDGET] Send failed");
                state.notifications.push(Notification::for_api_error(&err));
                SendOutcome::Failed(err)
            }
        }
    }

    /// Replace the message list with the stored session's history.
    ///
    /// Without a token this does nothing. An expired session clears the token.
    pub async fn load_history(&self) -> Result<usize, ApiError> {
        let Some(token) = self.session_token() else {
            return Ok(0);
        };

        match self.api.fetch_history(&token).await {
            Ok(history) => {
                let count = history.messages.len();
                let mut state = self.state.lock();
                state.messages = std::iter::once(WidgetMessage::welcome())
                    .chain(history.messages.into_iter().map(WidgetMessage::from))
                    .collect();
                Ok(count)
            }
            Err(err) => {
                let mut state = self.state.lock();
                if err.code() == Some(ErrorCode::SessionNotFound) {
                    state.session_token = None;
                    state.notifications.push(Notification::session_expired());
                } else {
                    state.notifications.push(Notification::for_api_error(&err));
                }
                Err(err)
            }
        }
    }
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lib_utils::validation::{MessageValidator, MAX_MESSAGE_LENGTH};
    use shared::{ChatHistoryResponse, ChatMessageDto, ChatMessageResponse, SessionInfo};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    type SendResult = Result<ChatMessageResponse, ApiError>;
    type HistoryResult = Result<ChatHistoryResponse, ApiError>;

    /// Scripted API; optionally parks each send until released.
    #[derive(Default)]
    struct MockApi {
        sends: Mutex<VecDeque<SendResult>>,
        histories: Mutex<VecDeque<HistoryResult>>,
        requests: Mutex<Vec<ChatMessageRequest>>,
        calls: AtomicUsize,
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl MockApi {
        fn replying(replies: &[&str]) -> Self {
            let api = Self::default();
            for reply in replies {
                api.sends.lock().push_back(Ok(ChatMessageResponse {
                    reply: reply.to_string(),
                    session_token: "token-0123456789".to_string(),
                    timestamp: Utc::now(),
                }));
            }
            api
        }

        fn failing(err: ApiError) -> Self {
            let api = Self::default();
            api.sends.lock().push_back(Err(err));
            api
        }
    }

    #[async_trait]
    impl ChatApi for MockApi {
        async fn send_message(&self, request: &ChatMessageRequest) -> SendResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().push(request.clone());

            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }

            self.sends
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no scripted reply".into())))
        }

        async fn fetch_history(&self, _: &str) -> HistoryResult {
            self.histories
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no scripted history".into())))
        }
    }

    fn server(code: ErrorCode) -> ApiError {
        ApiError::Server {
            status: 400,
            code,
            message: String::new(),
        }
    }

    #[test]
    fn test_starts_with_unread_welcome() {
        let chat = ChatController::new(Arc::new(MockApi::default()));

        let state = chat.snapshot();
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].content, WELCOME_MESSAGE);
        assert_eq!(state.unread_count, 1);
        assert!(!state.is_chat_open);
    }

    #[tokio::test]
    async fn test_reply_while_closed_increments_unread() {
        // -- Arrange
        let chat = ChatController::new(Arc::new(MockApi::replying(&["Resposta"])));

        // -- Act
        let outcome = chat.send_message("Quero aumentar minhas vendas").await;

        // -- Assert
        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(chat.unread_count(), 2);
        assert_eq!(chat.session_token().as_deref(), Some("token-0123456789"));

        let messages = chat.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[1].is_user);
        assert_eq!(messages[2].content, "Resposta");

        chat.open_chat();
        assert_eq!(chat.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_reply_while_open_keeps_unread_zero() {
        let chat = ChatController::new(Arc::new(MockApi::replying(&["Resposta"])));
        chat.toggle_chat();

        chat.send_message("Quero aumentar minhas vendas").await;

        assert!(chat.is_chat_open());
        assert_eq!(chat.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_text_notifies_without_request() {
        let api = Arc::new(MockApi::default());
        let chat = ChatController::new(api.clone());

        let outcome = chat.send_message("ok").await;

        assert_eq!(outcome, SendOutcome::Rejected);
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        assert_eq!(chat.messages().len(), 1);
        let notes = chat.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Mensagem inválida");
        assert!(chat.drain_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_failure_clears_flags_and_notifies() {
        let chat = ChatController::new(Arc::new(MockApi::failing(server(ErrorCode::RateLimitExceeded))));

        let outcome = chat.send_message("Quero aumentar minhas vendas").await;

        assert!(matches!(outcome, SendOutcome::Failed(_)));
        assert!(!chat.is_typing());
        assert!(!chat.is_loading());
        // The optimistic user message stays.
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.drain_notifications()[0].title, "Limite de mensagens");
    }

    #[tokio::test]
    async fn test_request_carries_token_and_user() {
        let api = Arc::new(MockApi::replying(&["um", "dois"]));
        let chat = ChatController::new(api.clone()).with_user_id("user_1");

        chat.send_message("Primeira pergunta sobre vendas").await;
        chat.send_message("Segunda pergunta sobre vendas").await;

        let requests = api.requests.lock();
        assert_eq!(requests[0].session_token, None);
        assert_eq!(requests[1].session_token.as_deref(), Some("token-0123456789"));
        assert_eq!(requests[1].user_id.as_deref(), Some("user_1"));
        assert_eq!(requests[0].message, "Primeira pergunta sobre vendas");
    }

    /// Stores what the server would: the lenient validator's output.
    #[derive(Default)]
    struct ValidatingApi {
        stored: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatApi for ValidatingApi {
        async fn send_message(&self, request: &ChatMessageRequest) -> SendResult {
            let content = MessageValidator::lenient()
                .validate(&request.message)
                .map_err(|e| ApiError::Server {
                    status: 400,
                    code: ErrorCode::InvalidMessageContent,
                    message: e.to_string(),
                })?;
            self.stored.lock().push(content);

            Ok(ChatMessageResponse {
                reply: "Entendi".to_string(),
                session_token: "token-0123456789".to_string(),
                timestamp: Utc::now(),
            })
        }

        async fn fetch_history(&self, _: &str) -> HistoryResult {
            Err(ApiError::Network("unused".into()))
        }
    }

    #[tokio::test]
    async fn test_special_characters_are_encoded_once() {
        // -- Arrange
        let api = Arc::new(ValidatingApi::default());
        let chat = ChatController::new(api.clone());

        // -- Act
        let outcome = chat.send_message("  Vendo produtos/serviços & quero crescer ").await;

        // -- Assert
        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(chat.messages()[1].content, "Vendo produtos/serviços & quero crescer");
        assert_eq!(
            api.stored.lock().as_slice(),
            ["Vendo produtos&#x2F;serviços &amp; quero crescer"]
        );
    }

    #[tokio::test]
    async fn test_text_at_length_cap_is_sent_whole() {
        let api = Arc::new(MockApi::replying(&["ok"]));
        let chat = ChatController::new(api.clone());
        let text = format!("{} & /", "a".repeat(MAX_MESSAGE_LENGTH - 4));

        assert_eq!(chat.send_message(&text).await, SendOutcome::Replied);

        assert_eq!(api.requests.lock()[0].message, text);
    }

    #[tokio::test]
    async fn test_state_readable_while_request_in_flight() {
        // -- Arrange
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let api = MockApi {
            gate: Some((entered.clone(), release.clone())),
            ..MockApi::replying(&["Resposta"])
        };
        let chat = ChatController::new(Arc::new(api));
        chat.open_chat();

        // -- Act
        let pending = tokio::spawn({
            let chat = chat.clone();
            async move { chat.send_message("Quero aumentar minhas vendas").await }
        });
        entered.notified().await;

        // -- Assert
        assert!(chat.is_typing());
        assert!(chat.is_loading());
        chat.close_chat();
        assert_eq!(chat.unread_count(), 0);

        release.notify_one();
        assert_eq!(pending.await.unwrap(), SendOutcome::Replied);
        assert!(!chat.is_typing());
        // Closing does not cancel the send; the reply lands as unread.
        assert_eq!(chat.unread_count(), 1);
        assert_eq!(chat.messages().last().unwrap().content, "Resposta");
    }

    #[tokio::test]
    async fn test_load_history_replaces_messages() {
        let api = MockApi::default();
        api.histories.lock().push_back(Ok(ChatHistoryResponse {
            messages: vec![ChatMessageDto {
                id: "m1".to_string(),
                session_id: "s1".to_string(),
                content: "Quero vender mais".to_string(),
                is_user: true,
                timestamp: Utc::now(),
            }],
            session_info: SessionInfo {
                id: "s1".to_string(),
                created_at: Utc::now(),
                is_active: true,
            },
        }));
        let chat = ChatController::new(Arc::new(api)).with_session_token("token-0123456789");

        let count = chat.load_history().await.unwrap();

        assert_eq!(count, 1);
        let messages = chat.messages();
        assert_eq!(messages[0].id, WELCOME_ID);
        assert_eq!(messages[1].content, "Quero vender mais");
    }

    #[tokio::test]
    async fn test_expired_history_clears_token() {
        let api = MockApi::default();
        api.histories.lock().push_back(Err(server(ErrorCode::SessionNotFound)));
        let chat = ChatController::new(Arc::new(api)).with_session_token("token-0123456789");

        assert!(chat.load_history().await.is_err());

        assert_eq!(chat.session_token(), None);
        assert_eq!(chat.drain_notifications()[0].title, "Sessão expirada");
    }

    #[tokio::test]
    async fn test_load_history_without_token_is_noop() {
        let chat = ChatController::new(Arc::new(MockApi::default()));

        assert_eq!(chat.load_history().await.unwrap(), 0);
        assert_eq!(chat.messages().len(), 1);
    }
}
// endregion: --- Tests
