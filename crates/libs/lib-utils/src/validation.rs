//! # Validation Utilities
//!
//! Chat message validation and sanitization, shared by the server endpoint and
//! the client-side chat controller.
//!
//! ## Pipeline
//!
//! [`sanitize_message`] applies, in order:
//!
//! 1. trim surrounding whitespace
//! 2. strip `<script>`/`<iframe>` blocks, `javascript:` URIs, inline event
//!    handlers (`onclick=`), then every remaining HTML tag
//! 3. entity-encode `& < > " ' /`
//! 4. collapse three or more consecutive newlines into two
//! 5. truncate to [`MAX_MESSAGE_LENGTH`] characters
//!
//! [`MessageValidator`] runs the length rules before sanitizing. The lenient
//! variant only requires non-blank content; the strict variant also requires at
//! least [`MIN_CONTENT_LENGTH`] characters. [`MessageValidator::check`] applies
//! the same rules but returns the trimmed text unencoded; clients send that and
//! leave encoding to the server.
//!
//! ```rust
//! use lib_utils::validation::{validate_message, ValidationError};
//!
//! assert_eq!(validate_message("Quero vender mais").unwrap(), "Quero vender mais");
//! assert_eq!(validate_message("ok"), Err(ValidationError::TooShort { min: 3 }));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum characters in a stored message.
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// Minimum trimmed characters for a message with business content.
pub const MIN_CONTENT_LENGTH: usize = 3;

/// Maximum characters accepted in the raw request body field.
pub const MAX_RAW_MESSAGE_LENGTH: usize = 1000;

/// Hint returned to users whose message is a bare greeting/acknowledgement.
pub const TOO_SIMPLE_HINT: &str = "Por favor, forneça uma mensagem mais detalhada sobre seu negócio";

/// Greetings and acknowledgements rejected as content.
const TOO_SIMPLE_WORDS: &[&str] = &["oi", "olá", "ok", "sim", "não", "obrigado", "tchau"];

static DANGEROUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)<script[^>]*>.*?</script\s*>",
        r"(?is)<iframe[^>]*>.*?</iframe\s*>",
        r"(?i)javascript:",
        r"(?i)on\w+\s*=",
        r"<[^>]*>",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("static sanitizer pattern"))
    .collect()
});

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("static newline pattern"));

/// Trim and remove script/iframe blocks, `javascript:` URIs, event handlers and tags.
///
/// No entity encoding; see [`sanitize_message`].
pub fn strip_markup(input: &str) -> String {
    let mut stripped = input.trim().to_string();

    for pattern in DANGEROUS_PATTERNS.iter() {
        stripped = pattern.replace_all(&stripped, "").into_owned();
    }

    stripped
}

/// Sanitize a raw chat message for storage and display.
pub fn sanitize_message(input: &str) -> String {
    let sanitized = strip_markup(input);

    let mut encoded = String::with_capacity(sanitized.len());
    for c in sanitized.chars() {
        match c {
            '&' => encoded.push_str("&amp;"),
            '<' => encoded.push_str("&lt;"),
            '>' => encoded.push_str("&gt;"),
            '"' => encoded.push_str("&quot;"),
            '\'' => encoded.push_str("&#x27;"),
            '/' => encoded.push_str("&#x2F;"),
            other => encoded.push(other),
        }
    }

    let collapsed = EXCESS_NEWLINES.replace_all(&encoded, "\n\n");

    collapsed.chars().take(MAX_MESSAGE_LENGTH).collect()
}

/// Whether `text` is nothing but a greeting or acknowledgement.
pub fn is_too_simple(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    TOO_SIMPLE_WORDS.iter().any(|word| *word == normalized)
}

/// Whether `text` carries enough content to be worth answering.
pub fn validate_message_content(text: &str) -> bool {
    text.trim().chars().count() >= MIN_CONTENT_LENGTH && !is_too_simple(text)
}

/// Validate and sanitize with the strict rules.
pub fn validate_message(raw: &str) -> Result<String, ValidationError> {
    MessageValidator::strict().validate(raw)
}

/// Check the strict rules, returning the trimmed text unencoded.
pub fn check_message(raw: &str) -> Result<String, ValidationError> {
    MessageValidator::strict().check(raw)
}

/// Length rules applied before sanitizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageValidator {
    min_length: usize,
    max_length: usize,
}

impl MessageValidator {
    /// Non-blank content up to [`MAX_MESSAGE_LENGTH`] characters.
    pub fn lenient() -> Self {
        Self {
            min_length: 1,
            max_length: MAX_MESSAGE_LENGTH,
        }
    }

    /// Like [`lenient`](Self::lenient), but also at least [`MIN_CONTENT_LENGTH`] characters.
    pub fn strict() -> Self {
        Self {
            min_length: MIN_CONTENT_LENGTH,
            max_length: MAX_MESSAGE_LENGTH,
        }
    }

    /// Validate `raw`, returning the sanitized message.
    pub fn validate(&self, raw: &str) -> Result<String, ValidationError> {
        self.check(raw).map(|trimmed| sanitize_message(&trimmed))
    }

    /// Apply the rules without encoding, returning the trimmed text.
    ///
    /// For callers that hand the text on to something that sanitizes it, such
    /// as a client sending to the server.
    pub fn check(&self, raw: &str) -> Result<String, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::Empty);
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::WhitespaceOnly);
        }

        if raw.chars().count() > self.max_length {
            return Err(ValidationError::TooLong {
                max: self.max_length,
            });
        }

        if trimmed.chars().count() < self.min_length {
            return Err(ValidationError::TooShort {
                min: self.min_length,
            });
        }

        if strip_markup(trimmed).trim().is_empty() {
            return Err(ValidationError::OnlyMarkup);
        }

        Ok(trimmed.to_string())
    }
}

// region:    --- Error
/// Why a message was rejected. `Display` is the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty,
    WhitespaceOnly,
    TooLong { max: usize },
    TooShort { min: usize },
    OnlyMarkup,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ValidationError::Empty => write!(fmt, "Mensagem não pode estar vazia"),
            ValidationError::WhitespaceOnly => {
                write!(fmt, "Mensagem não pode conter apenas espaços")
            }
            ValidationError::TooLong { max } => {
                write!(fmt, "Mensagem muito longa (máximo {max} caracteres)")
            }
            ValidationError::TooShort { min } => {
                write!(fmt, "Mensagem muito curta (mínimo {min} caracteres)")
            }
            ValidationError::OnlyMarkup => write!(fmt, "Mensagem contém apenas conteúdo inválido"),
        }
    }
}

impl std::error::Error for ValidationError {}
// endregion: --- Error

// endregion: --- Tests
