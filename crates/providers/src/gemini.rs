use crate::error::AssistantError;
use crate::prompts::{build_prompt, WALLETX_SYSTEM_PROMPT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::settings::GenerationSettings;
use std::fmt;
use url::Url;
use zeroize::Zeroizing;

const BLOCK_MEDIUM_AND_ABOVE: &str = "BLOCK_MEDIUM_AND_ABOVE";

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Error bodies are clipped to this many characters before logging
const MAX_ERROR_BODY: usize = 800;

/// API key for the generative endpoint. Wiped on drop, redacted in `Debug`.
#[derive(Clone)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    /// Blank keys count as missing.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(Zeroizing::new(trimmed.to_string())))
        }
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl From<&GenerationSettings> for GenerationConfig {
    fn from(s: &GenerationSettings) -> Self {
        Self {
            temperature: s.temperature,
            top_k: s.top_k,
            top_p: s.top_p,
            max_output_tokens: s.max_output_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

/// Single-shot client for a Gemini-style `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    endpoint: Url,
    credential: Credential,
    generation: GenerationSettings,
    system_prompt: String,
}

impl GeminiClient {
    pub fn new(
        http: Client,
        endpoint: Url,
        credential: Credential,
        generation: GenerationSettings,
    ) -> Self {
        Self {
            http,
            endpoint,
            credential,
            generation,
            system_prompt: WALLETX_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub(crate) fn build_request(&self, user_message: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: build_prompt(&self.system_prompt, user_message),
                }],
            }],
            generation_config: GenerationConfig::from(&self.generation),
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: BLOCK_MEDIUM_AND_ABOVE,
                })
                .collect(),
        }
    }

    pub async fn generate(&self, user_message: &str) -> Result<String, AssistantError> {
        let req = self.build_request(user_message);
        // Strip the URL from transport errors: it carries the key.
        let resp = self
            .http
            .post(self.endpoint.clone())
            .query(&[("key", self.credential.expose())])
            .json(&req)
            .send()
            .await
            .map_err(|e| AssistantError::Transport(e.without_url()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AssistantError::Transport(e.without_url()))?;

        if !status.is_success() {
            return Err(AssistantError::Status {
                status,
                body: clip(body.trim()),
            });
        }
        parse_response(&body)
    }
}

/// Pull the first candidate's text out of a success body.
pub(crate) fn parse_response(body: &str) -> Result<String, AssistantError> {
    let parsed: GeminiResponse =
        serde_json::from_str(body).map_err(|e| AssistantError::malformed(e.to_string()))?;
    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| AssistantError::malformed("response has no candidate text"))?;
    if text.trim().is_empty() {
        return Err(AssistantError::malformed("candidate text is empty"));
    }
    Ok(text)
}

fn clip(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY {
        let head: String = body.chars().take(MAX_ERROR_BODY).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn client() -> GeminiClient {
        GeminiClient::new(
            Client::new(),
            Url::parse("http://localhost/v1beta/models/test:generateContent").unwrap(),
            Credential::new("test-key").unwrap(),
            GenerationSettings::default(),
        )
        .with_system_prompt("SYSTEM")
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(client().build_request("hello")).unwrap();

        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "SYSTEM\n\nUser: hello");

        let config = &body["generationConfig"];
        assert_eq!(config["topK"], 40);
        assert_eq!(config["maxOutputTokens"], 1024);
        assert!((config["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((config["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);

        let safety = body["safetySettings"].as_array().unwrap();
        assert_eq!(safety.len(), 4);
        for setting in safety {
            assert_eq!(setting["threshold"], "BLOCK_MEDIUM_AND_ABOVE");
        }
        assert_eq!(safety[1]["category"], "HARM_CATEGORY_HATE_SPEECH");
    }

    #[test]
    fn test_parse_first_candidate() {
        let body = r#"{"candidates":[
            {"content":{"parts":[{"text":"first"},{"text":"ignored"}]}},
            {"content":{"parts":[{"text":"second"}]}}
        ]}"#;
        assert_eq!(parse_response(body).unwrap(), "first");
    }

    #[test]
    fn test_parse_rejects_missing_candidate_text() {
        for body in [
            r#"{}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{"finishReason":"SAFETY"}]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#,
            "not json",
        ] {
            let err = parse_response(body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Protocol, "{body}");
        }
    }

    #[test]
    fn test_credential_is_redacted() {
        let cred = Credential::new("  secret-value ").unwrap();
        assert_eq!(cred.expose(), "secret-value");
        assert!(!format!("{:?}", cred).contains("secret"));
        assert!(Credential::new("   ").is_none());
    }

    #[test]
    fn test_clip_long_error_body() {
        let clipped = clip(&"x".repeat(1000));
        assert_eq!(clipped.chars().count(), MAX_ERROR_BODY + 3);
        assert_eq!(clip("short"), "short");
    }
}
