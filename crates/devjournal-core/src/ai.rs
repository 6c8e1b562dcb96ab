//! AI Invoker (spec §4.7): a single reliable entry point for calling out to an AI provider,
//! with config-driven placeholder/auth short-circuits, bounded retries, and graceful
//! degradation — the hook worker must never fail a commit because the AI call did.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::AiConfig;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PLACEHOLDER_KEYS: &[&str] = &[
    "your-openai-api-key-here",
    "your-api-key",
    "your_api_key",
    "api-key-here",
    "api_key_here",
    "placeholder",
    "your-key",
    "your_key",
    "key-here",
    "key_here",
    "change-me",
    "change_me",
];

fn is_placeholder_api_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    PLACEHOLDER_KEYS.iter().any(|p| lower.contains(p))
}

/// The warning markdown returned in place of an empty string when a caller wants a
/// human-visible explanation rather than silent degradation.
pub fn api_key_warning(config: &AiConfig, reason: &str) -> String {
    let env_var = config.api_key_env_var();
    format!(
        "## ⚠️ AI Configuration Warning\n\
         AI features are disabled: {reason}.\n\n\
         To configure your API key:\n\
         1. Open `.devjournalrc.yaml`\n\
         2. Add or update the AI section:\n\
         \x20  ```yaml\n\
         \x20  ai:\n\
         \x20    openai_api_key: \"${{{env_var}}}\"\n\
         \x20  ```\n\
         3. Set `{env_var}` in your environment\n"
    )
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: std::borrow::Cow<'a, str>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OwnedMessage,
}

#[derive(Debug, Deserialize)]
struct OwnedMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<OpenAiMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    text: String,
}

async fn call_openai(client: &reqwest::Client, config: &AiConfig, api_key: &str, prompt: &str) -> Result<String, String> {
    let request = OpenAiRequest {
        model: &config.model,
        messages: vec![OpenAiMessage {
            role: "user",
            content: std::borrow::Cow::Borrowed(prompt),
        }],
        max_tokens: 800,
        temperature: 0.3,
    };

    let response = client
        .post("https://api.openai.com/v1/chat/completions")
        .bearer_auth(api_key)
        .json(&request)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(format!("API error {status}: {text}"));
    }

    let parsed: OpenAiResponse = response
        .json()
        .await
        .map_err(|e| format!("failed to parse response: {e}"))?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| "no choices in response".to_string())
}

async fn call_anthropic(client: &reqwest::Client, config: &AiConfig, api_key: &str, prompt: &str) -> Result<String, String> {
    let request = AnthropicRequest {
        model: &config.model,
        max_tokens: 800,
        messages: vec![OpenAiMessage {
            role: "user",
            content: std::borrow::Cow::Borrowed(prompt),
        }],
    };

    let response = client
        .post("https://api.anthropic.com/v1/messages")
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .json(&request)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(format!("API error {status}: {text}"));
    }

    let parsed: AnthropicResponse = response
        .json()
        .await
        .map_err(|e| format!("failed to parse response: {e}"))?;

    parsed
        .content
        .into_iter()
        .next()
        .map(|c| c.text)
        .ok_or_else(|| "no content in response".to_string())
}

async fn call_provider(client: &reqwest::Client, config: &AiConfig, api_key: &str, prompt: &str) -> Result<String, String> {
    match config.provider.as_str() {
        "anthropic" => call_anthropic(client, config, api_key, prompt).await,
        _ => call_openai(client, config, api_key, prompt).await,
    }
}

/// Looks up the API key for `config.provider`: explicit `openai_api_key` config value first,
/// falling back to `config.api_key_env_var()`.
fn resolve_api_key(config: &AiConfig) -> Option<String> {
    if !config.openai_api_key.trim().is_empty() {
        return Some(config.openai_api_key.clone());
    }
    std::env::var(config.api_key_env_var()).ok()
}

fn is_auth_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("api key") || lower.contains("unauthorized") || lower.contains("401")
}

/// Calls the configured AI provider with bounded retries and graceful degradation.
///
/// Returns `Ok(response)` on success, or `Ok(String::new())` for any failure that should
/// degrade silently (missing config, placeholder key, auth error, exhausted retries) — the
/// caller is never meant to abort a commit over an AI failure. `return_warning` swaps the
/// empty string for a human-readable markdown warning in the same cases.
pub async fn invoke_ai(
    config: &AiConfig,
    prompt: &str,
    return_warning: bool,
) -> String {
    let start = Instant::now();

    let Some(api_key) = resolve_api_key(config) else {
        log::warn!("AI invocation skipped: no API key configured");
        return if return_warning {
            api_key_warning(config, "a missing API key")
        } else {
            String::new()
        };
    };

    if is_placeholder_api_key(&api_key) {
        log::warn!("AI invocation skipped: placeholder API key detected");
        return if return_warning {
            api_key_warning(config, "a placeholder API key")
        } else {
            String::new()
        };
    }

    log::debug!(
        "calling provider {} with key {}",
        config.provider,
        crate::error::redact_secret(&api_key)
    );

    let client = reqwest::Client::new();
    let mut final_error: Option<String> = None;

    for attempt in 1..=MAX_ATTEMPTS {
        match call_provider(&client, config, &api_key, prompt).await {
            Ok(response) => {
                let latency_ms = start.elapsed().as_millis();
                log::info!("ai.success=true ai.latency_ms={latency_ms}");
                return response;
            }
            Err(e) if is_auth_error(&e) => {
                log::warn!("AI invocation failed due to API key configuration: {e}");
                return if return_warning {
                    api_key_warning(config, "an invalid API key")
                } else {
                    String::new()
                };
            }
            Err(e) => {
                log::warn!("AI invocation failed (attempt {attempt}/{MAX_ATTEMPTS}): {e}");
                final_error = Some(e);
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    let latency_ms = start.elapsed().as_millis();
    log::error!(
        "ai.success=false ai.latency_ms={latency_ms} ai.error_type={}",
        final_error.unwrap_or_default()
    );

    if return_warning {
        api_key_warning(config, "repeated provider failures")
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_placeholder_keys() {
        assert!(is_placeholder_api_key("your-openai-api-key-here"));
        assert!(is_placeholder_api_key("PLACEHOLDER"));
        assert!(!is_placeholder_api_key("sk-live-abc123xyz"));
    }

    #[test]
    fn detects_change_me_and_its_underscore_variant() {
        assert!(is_placeholder_api_key("change-me"));
        assert!(is_placeholder_api_key("change_me"));
        assert!(is_placeholder_api_key("CHANGE-ME"));
    }

    #[test]
    fn resolves_key_from_config_before_env() {
        let config = AiConfig {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            openai_api_key: "sk-explicit".to_string(),
        };
        assert_eq!(resolve_api_key(&config), Some("sk-explicit".to_string()));
    }

    #[test]
    fn detects_auth_error_messages() {
        assert!(is_auth_error("Invalid API key provided"));
        assert!(is_auth_error("API error 401: Unauthorized"));
        assert!(!is_auth_error("connection timed out"));
    }

    #[test]
    fn warning_mentions_correct_env_var_per_provider() {
        let mut config = AiConfig {
            provider: "anthropic".to_string(),
            model: "claude-3".to_string(),
            openai_api_key: String::new(),
        };
        assert!(api_key_warning(&config, "x").contains("ANTHROPIC_API_KEY"));
        config.provider = "openai".to_string();
        assert!(api_key_warning(&config, "x").contains("OPENAI_API_KEY"));
    }
}
