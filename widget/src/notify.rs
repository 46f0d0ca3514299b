//! # Notifications
//!
//! Toast records emitted by the controller. Rendering is up to the UI.

use crate::api::ApiError;
use shared::ErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Default,
    Destructive,
}

/// One toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    fn destructive(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }

    /// Local validation rejected the text.
    pub fn invalid_message(reason: impl Into<String>) -> Self {
        Self::destructive("Mensagem inválida", reason)
    }

    pub fn session_expired() -> Self {
        Self::destructive("Sessão expirada", "Sua sessão expirou. A conversa será reiniciada.")
    }

    /// Toast for a failed API call, chosen by error code.
    pub fn for_api_error(err: &ApiError) -> Self {
        let (code, server_message) = match err {
            ApiError::Network(_) => {
                return Self::destructive(
                    "Erro de conexão",
                    "Verifique sua conexão com a internet e tente novamente.",
                );
            }
            ApiError::Server { code, message, .. } => (Some(*code), Some(message.as_str())),
            ApiError::Decode(_) => (None, None),
        };

        let or_default = |fallback: &str| {
            server_message
                .filter(|m| !m.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        match code {
            Some(ErrorCode::RateLimitExceeded) | Some(ErrorCode::GeneralRateLimitExceeded) => Self::destructive(
                "Limite de mensagens",
                "Muitas mensagens enviadas. Aguarde um momento antes de tentar novamente.",
            ),
            Some(ErrorCode::InvalidMessageContent) => {
                Self::destructive("Mensagem inválida", or_default("Verifique o conteúdo da sua mensagem."))
            }
            Some(ErrorCode::MessageTooSimple) => Self::destructive(
                "Mensagem muito simples",
                or_default("Por favor, descreva melhor sua necessidade de negócio."),
            ),
            Some(ErrorCode::SessionNotFound) => Self::session_expired(),
            Some(ErrorCode::InternalServerError) => Self::destructive(
                "Erro do servidor",
                "Problema interno do servidor. Tente novamente em alguns instantes.",
            ),
            _ => Self::destructive(
                "Erro na comunicação",
                or_default("Ocorreu um erro ao enviar a mensagem. Tente novamente."),
            ),
        }
    }
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn server(code: ErrorCode, message: &str) -> ApiError {
        ApiError::Server {
            status: 400,
            code,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_titles_by_code() {
        let cases = [
            (ErrorCode::RateLimitExceeded, "Limite de mensagens"),
            (ErrorCode::InvalidMessageContent, "Mensagem inválida"),
            (ErrorCode::MessageTooSimple, "Mensagem muito simples"),
            (ErrorCode::SessionNotFound, "Sessão expirada"),
            (ErrorCode::InternalServerError, "Erro do servidor"),
            (ErrorCode::Unknown, "Erro na comunicação"),
        ];

        for (code, title) in cases {
            assert_eq!(Notification::for_api_error(&server(code, "x")).title, title);
        }
    }

    #[test]
    fn test_server_message_is_used_when_present() {
        let n = Notification::for_api_error(&server(ErrorCode::MessageTooSimple, "Detalhe mais"));
        assert_eq!(n.description, "Detalhe mais");

        let n = Notification::for_api_error(&server(ErrorCode::MessageTooSimple, ""));
        assert_eq!(n.description, "Por favor, descreva melhor sua necessidade de negócio.");
    }

    #[test]
    fn test_network_error() {
        let n = Notification::for_api_error(&ApiError::Network("refused".into()));
        assert_eq!(n.title, "Erro de conexão");
        assert_eq!(n.variant, Variant::Destructive);
    }
}
// endregion: --- Tests
