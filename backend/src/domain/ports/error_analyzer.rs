//! Port for the inference call behind error analysis.

use async_trait::async_trait;

use crate::domain::AnalysisPrompt;

use super::define_port_error;

define_port_error! {
    /// Errors raised by analyzer adapters.
    pub enum ErrorAnalyzerError {
        /// The analyzer backend could not be reached.
        Unavailable { message: String } => "error analyzer unavailable: {message}",
        /// The analyzer returned an unusable answer.
        Failed { message: String } => "error analysis failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ErrorAnalyzer: Send + Sync {
    async fn analyze(&self, prompt: &AnalysisPrompt) -> Result<String, ErrorAnalyzerError>;
}

/// Analyzer that returns the prompt unchanged. No model is called.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptEchoAnalyzer;

#[async_trait]
impl ErrorAnalyzer for PromptEchoAnalyzer {
    async fn analyze(&self, prompt: &AnalysisPrompt) -> Result<String, ErrorAnalyzerError> {
        Ok(prompt.as_str().to_owned())
    }
}
