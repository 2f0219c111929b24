/// Text-completion provider abstraction
///
/// The sentiment classifier only needs "prompt in, text out". Any backend that
/// speaks that contract (an OpenAI-compatible endpoint, a local model server)
/// can be plugged in behind this trait.
use crate::error::AppResult;

pub mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleProvider;

/// Trait for external text-generation services
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends `prompt` and returns the raw response text, unmodified.
    ///
    /// Transport, status, credential and timeout failures surface as
    /// `AppError::Classification`.
    async fn complete(&self, prompt: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
