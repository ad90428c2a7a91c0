//! Prompt adapter contract
//!
//! The runner never talks to a terminal directly. It asks a `PromptAdapter`
//! for one of three primitives and interprets the raw answer.

use anyhow::Result;
use async_trait::async_trait;

use super::types::PromptOption;

/// An adapter's answer before the runner interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResponse {
    /// A selected option value or typed text.
    Text(String),
    /// A confirm answer.
    Bool(bool),
    /// The operator backed out of the prompt.
    Cancelled,
}

impl RawResponse {
    /// Coerce to a string. Booleans render as `true`/`false`.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Bool(b) => b.to_string(),
            Self::Cancelled => String::new(),
        }
    }

    /// Coerce to a boolean. Text is true when non-empty.
    #[must_use]
    pub fn into_bool(self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Bool(b) => b,
            Self::Cancelled => false,
        }
    }
}

/// The three prompt primitives plus cancellation detection.
///
/// Methods take `&self` so one adapter can serve a flow and any flow nested
/// inside one of its handlers.
#[async_trait]
pub trait PromptAdapter: Send + Sync {
    /// Single choice among `options`. A non-cancelled answer carries the
    /// chosen option's value.
    async fn select(&self, message: &str, options: &[PromptOption]) -> Result<RawResponse>;

    /// Yes/no question.
    async fn confirm(&self, message: &str, initial_value: Option<bool>) -> Result<RawResponse>;

    /// Free text. The runner does not trim the answer.
    async fn text(
        &self,
        message: &str,
        placeholder: Option<&str>,
        default_value: Option<&str>,
    ) -> Result<RawResponse>;

    /// Whether `response` means the operator cancelled. Checked before any
    /// other interpretation of the response.
    fn is_cancel(&self, response: &RawResponse) -> bool {
        matches!(response, RawResponse::Cancelled)
    }
}
