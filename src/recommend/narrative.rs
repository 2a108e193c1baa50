//! Optional text-generation collaborator for citizen narratives.

use crate::config::NarrativeConfig;
use crate::error::NarrativeError;
use serde::Serialize;
use std::time::Duration;

/// Produces narrative text for a prompt. Failures are absorbed by the caller.
pub trait NarrativeGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, NarrativeError>;
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
}

/// Hosted text-generation endpoint (`POST {endpoint}/{model}` with a bearer token).
pub struct HttpNarrativeClient {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
    max_new_tokens: u32,
}

impl HttpNarrativeClient {
    /// `None` when disabled or no API key is configured.
    pub fn new(config: &NarrativeConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = config.api_key()?;
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .ok()?;
        Some(Self {
            client,
            url: format!(
                "{}/{}",
                config.endpoint.trim_end_matches('/'),
                config.model.trim_start_matches('/')
            ),
            api_key,
            max_new_tokens: config.max_new_tokens,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl NarrativeGenerator for HttpNarrativeClient {
    fn generate(&self, prompt: &str) -> Result<String, NarrativeError> {
        let body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: self.max_new_tokens,
            },
        };
        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().unwrap_or_default();
            return Err(NarrativeError::Status { status, body });
        }
        let value: serde_json::Value = res
            .json()
            .map_err(|e| NarrativeError::Malformed(e.to_string()))?;
        extract_generated_text(prompt, &value)
    }
}

/// Pull `[0].generated_text` out of the response, dropping an echoed prompt.
pub fn extract_generated_text(
    prompt: &str,
    value: &serde_json::Value,
) -> Result<String, NarrativeError> {
    let text = value
        .as_array()
        .and_then(|items| items.first())
        .and_then(|first| first.get("generated_text"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| NarrativeError::Malformed("missing generated_text".to_string()))?;
    let text = match text.find(prompt) {
        Some(at) => &text[at + prompt.len()..],
        None => text,
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(NarrativeError::Empty);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_strips_echoed_prompt() {
        let v = json!([{ "generated_text": "PROMPT\n  You are doing well. " }]);
        assert_eq!(
            extract_generated_text("PROMPT", &v).unwrap(),
            "You are doing well."
        );
    }

    #[test]
    fn test_extract_without_echo() {
        let v = json!([{ "generated_text": "Keep it up." }]);
        assert_eq!(extract_generated_text("PROMPT", &v).unwrap(), "Keep it up.");
    }

    #[test]
    fn test_extract_rejects_bad_shapes() {
        assert!(matches!(
            extract_generated_text("p", &json!({ "error": "loading" })),
            Err(NarrativeError::Malformed(_))
        ));
        assert!(matches!(
            extract_generated_text("p", &json!([])),
            Err(NarrativeError::Malformed(_))
        ));
        assert!(matches!(
            extract_generated_text("p", &json!([{ "generated_text": "p   " }])),
            Err(NarrativeError::Empty)
        ));
    }

    #[test]
    fn test_client_needs_key_and_enabled() {
        let config = NarrativeConfig {
            api_key_env: "LEDGERSCORE_TEST_NO_SUCH_KEY".to_string(),
            ..Default::default()
        };
        assert!(HttpNarrativeClient::new(&config).is_none());

        let config = NarrativeConfig {
            enabled: false,
            api_key_env: "PATH".to_string(),
            ..Default::default()
        };
        assert!(HttpNarrativeClient::new(&config).is_none());
    }

    #[test]
    fn test_url_joins_model() {
        let config = NarrativeConfig {
            endpoint: "http://127.0.0.1:9/models/".to_string(),
            model: "org/model".to_string(),
            api_key_env: "PATH".to_string(),
            timeout_secs: 1,
            ..Default::default()
        };
        let client = HttpNarrativeClient::new(&config).unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:9/models/org/model");
        // nothing listens on the discard port
        assert!(client.generate("hello").is_err());
    }
}
