//! Remote-first assistant with silent fallback to canned replies.
//!
//! Each call tries the generative endpoint once. Any failure, including a
//! missing configuration, resolves to a reply from the fallback table; the
//! next call tries the endpoint again.

use crate::error::{AssistantError, ErrorKind};
use crate::fallback::FallbackResponder;
use crate::gemini::{Credential, GeminiClient};
use anyhow::Result;
use reqwest::Client;
use shared::settings::AssistantSettings;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Anything that can answer a chat message. Must always produce text.
#[async_trait::async_trait]
pub trait Assistant: Send + Sync {
    async fn send(&self, message: &str) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

pub struct AssistantClient {
    remote: Option<GeminiClient>,
    fallback: FallbackResponder,
}

impl AssistantClient {
    /// Build from settings. Missing endpoint or key is not an error: the
    /// client then answers from the fallback table only.
    pub fn from_settings(settings: &AssistantSettings) -> Result<Self> {
        let remote = match remote_target(settings) {
            Ok((endpoint, credential)) => {
                let http = Client::builder()
                    .timeout(Duration::from_secs(settings.request_timeout_secs.max(1)))
                    .build()?;
                info!(
                    host = endpoint.host_str().unwrap_or_default(),
                    timeout_secs = settings.request_timeout_secs.max(1),
                    "Assistant endpoint configured"
                );
                Some(GeminiClient::new(
                    http,
                    endpoint,
                    credential,
                    settings.generation.clone(),
                ))
            }
            Err(e) => {
                info!(reason = %e, "Assistant using fallback replies only");
                None
            }
        };

        Ok(Self {
            remote,
            fallback: FallbackResponder::walletx(),
        })
    }

    pub fn fallback_only() -> Self {
        Self {
            remote: None,
            fallback: FallbackResponder::walletx(),
        }
    }

    pub fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn respond(&self, message: &str) -> Reply {
        let result = match &self.remote {
            Some(remote) => remote.generate(message).await,
            None => Err(AssistantError::not_configured("no endpoint or API key")),
        };

        match result {
            Ok(text) => Reply {
                text,
                source: ReplySource::Remote,
            },
            Err(e) => {
                if e.kind() == ErrorKind::Configuration {
                    debug!(error = %e, "Answering from fallback table");
                } else {
                    warn!(kind = ?e.kind(), error = %e, "Assistant request failed, using fallback reply");
                }
                Reply {
                    text: self.fallback.resolve(message).to_string(),
                    source: ReplySource::Fallback,
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Assistant for AssistantClient {
    async fn send(&self, message: &str) -> String {
        self.respond(message).await.text
    }
}

fn remote_target(settings: &AssistantSettings) -> Result<(Url, Credential), AssistantError> {
    let endpoint = settings
        .endpoint
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AssistantError::not_configured("no endpoint URL"))?;
    let endpoint = Url::parse(endpoint)
        .map_err(|e| AssistantError::not_configured(format!("invalid endpoint URL: {}", e)))?;
    let credential = settings
        .api_key
        .clone()
        .and_then(Credential::new)
        .ok_or_else(|| AssistantError::not_configured("no API key"))?;
    Ok((endpoint, credential))
}
