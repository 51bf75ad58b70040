//! Company descriptions from an LLM.
//!
//! [`LlmSummarizer`] sends the prompts from [`crate::prompts`] through any
//! `edgequake-llm` provider. Failures are not errors here: a provider error or
//! an empty answer yields `None`, and enrichment skips that record.

use crate::config::SummaryConfig;
use crate::error::ArchiveError;
use crate::prompts::{description_request, DESCRIPTION_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::{debug, warn};

/// Produces a short description for a company name.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, company: &str) -> Option<String>;
}

pub struct LlmSummarizer {
    provider: Arc<dyn LLMProvider>,
    config: SummaryConfig,
}

impl LlmSummarizer {
    /// Wrap an already-constructed provider.
    pub fn new(provider: Arc<dyn LLMProvider>, config: SummaryConfig) -> Self {
        Self { provider, config }
    }

    /// Resolve the provider named in `config`, or auto-detect one from the
    /// environment when no name is given.
    pub fn from_config(config: SummaryConfig) -> Result<Self, ArchiveError> {
        let provider = match config.provider_name.as_deref() {
            Some(name) => {
                let model = config
                    .model
                    .as_deref()
                    .unwrap_or_else(|| default_model(name));
                ProviderFactory::create_llm_provider(name, model).map_err(|e| {
                    ArchiveError::ProviderNotConfigured {
                        provider: name.to_string(),
                        hint: format!("{e}"),
                    }
                })?
            }
            None => {
                let (llm, _embedding) = ProviderFactory::from_env().map_err(|e| {
                    ArchiveError::ProviderNotConfigured {
                        provider: "auto".to_string(),
                        hint: format!(
                            "No LLM provider could be auto-detected from environment.\n\
                             Set GROQ_API_KEY, OPENAI_API_KEY, or pass --provider.\n\
                             Error: {e}"
                        ),
                    }
                })?;
                llm
            }
        };
        Ok(Self::new(provider, config))
    }

    fn options(&self) -> CompletionOptions {
        build_options(&self.config)
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, company: &str) -> Option<String> {
        let company = company.trim();
        if company.is_empty() {
            return None;
        }

        let messages = vec![
            ChatMessage::system(DESCRIPTION_SYSTEM_PROMPT),
            ChatMessage::user(description_request(company)),
        ];
        let options = self.options();

        match self.provider.chat(&messages, Some(&options)).await {
            Ok(response) => {
                debug!(
                    "Description for {}: {} input tokens, {} output tokens",
                    company, response.prompt_tokens, response.completion_tokens
                );
                truncate_description(&response.content, self.config.max_chars)
            }
            Err(e) => {
                warn!("Description request for {} failed: {}", company, e);
                None
            }
        }
    }
}

/// Model used when only a provider name is given.
pub fn default_model(provider: &str) -> &'static str {
    match provider {
        "groq" => "llama-3.1-70b-versatile",
        _ => "gpt-4.1-nano",
    }
}

fn build_options(config: &SummaryConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Trim `text` and cap it at `max_chars` characters.
///
/// Over-long text is cut at `max_chars`, then back to the last space, and
/// suffixed with `…`. Empty text yields `None`.
pub fn truncate_description(text: &str, max_chars: usize) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.chars().count() <= max_chars {
        return Some(text.to_string());
    }

    let head: String = text.chars().take(max_chars).collect();
    let cut = match head.rfind(' ') {
        Some(idx) => &head[..idx],
        None => head.as_str(),
    };
    Some(format!("{}…", cut.trim_end()))
}
