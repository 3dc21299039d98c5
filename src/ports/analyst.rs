//! Analyst Port - External Text-Generation Service
//!
//! The chat assistant hands a serialized data summary plus the user's
//! question to an external text-generation service and relays the
//! answer verbatim. Prompt engineering and response rendering are not
//! the dashboard's business; this boundary keeps them out.

use async_trait::async_trait;

/// External AI text service consulted by the chat endpoint.
#[async_trait]
pub trait Analyst: Send + Sync + 'static {
  /// Answers `question` given the serialized dashboard `context`.
  ///
  /// `context` is the size-capped JSON summary produced by
  /// `usecases::analytics::chat_context`; implementations forward it
  /// as system context and return the model's text.
  async fn analyze(&self, context: &str, question: &str) -> anyhow::Result<String>;

  /// Whether the service is reachable and credentialed.
  async fn is_healthy(&self) -> bool;
}
