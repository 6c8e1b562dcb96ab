//! AI-Driven Boundary Filter (spec §4.6): submits a window of chat messages plus git context
//! to an AI provider, which returns a single boundary marker; everything from that marker
//! forward is "this commit's conversation."

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::messages::{ChatMessage, Speaker};
use crate::error::{Error, Result};
use crate::gitctx::CommitContext;

const MAX_WINDOW: usize = 250;
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct FilteredMessage {
    pub speaker: Speaker,
    pub text: String,
}

impl Serialize for Speaker {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawBoundaryResponse {
    #[serde(rename = "bubbleId")]
    bubble_id: Option<serde_json::Value>,
    confidence: Option<serde_json::Value>,
    reasoning: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct BoundaryResponse {
    pub bubble_id: String,
    pub confidence: i64,
    pub reasoning: String,
}

/// An AI invocation abstraction so `filter_chat_for_commit` can be unit-tested without a
/// network call. Production code wires this to `ai::invoke`.
pub trait AiInvoker {
    fn invoke(&self, prompt: &str, context: &serde_json::Value) -> String;
}

/// Validates `messages` all carry a non-empty `bubbleId`, per spec §4.6 step 1.
pub fn validate_bubble_ids(messages: &[ChatMessage]) -> Result<()> {
    for (i, m) in messages.iter().enumerate() {
        if m.bubble_id.trim().is_empty() {
            return Err(Error::internal(format!(
                "AI filtering requires bubbleId on every message; message {} is missing it.",
                i + 1
            )));
        }
    }
    Ok(())
}

fn simplify(messages: &[ChatMessage]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .map(|m| {
            let mut preview: String = m.text.chars().take(PREVIEW_CHARS).collect();
            if m.text.chars().count() > PREVIEW_CHARS {
                preview.push_str("...");
            }
            json!({
                "bubbleId": m.bubble_id,
                "speaker": match m.speaker { Speaker::User => "user", Speaker::Assistant => "assistant" },
                "timestamp": m.timestamp_ms,
                "preview": preview,
            })
        })
        .collect()
}

fn build_prompt(
    limited: &[serde_json::Value],
    commit: &CommitContext,
    previous_commit_message: Option<&str>,
    previous_journal_entry: Option<&str>,
) -> String {
    format!(
        "Identify the single chat message where the conversation for this commit begins.\n\
         Respond with JSON: {{\"bubbleId\": string, \"confidence\": 1-10, \"reasoning\": string}}.\n\n\
         Commit: {} by {} — {}\n\
         Previous commit message: {}\n\
         Previous journal entry: {}\n\n\
         Messages (oldest first): {}",
        commit.hash,
        commit.author,
        commit.message,
        previous_commit_message.unwrap_or("(none)"),
        previous_journal_entry.unwrap_or("(none)"),
        serde_json::to_string(limited).unwrap_or_default(),
    )
}

fn parse_response(raw: &str) -> Result<BoundaryResponse> {
    if raw.trim().is_empty() {
        return Err(Error::internal("empty AI response"));
    }

    let parsed: RawBoundaryResponse = serde_json::from_str(raw)
        .map_err(|e| Error::internal(format!("invalid AI response JSON: {e}")))?;

    let bubble_id = parsed
        .bubble_id
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::internal("AI response missing non-empty bubbleId"))?;

    let confidence = parsed
        .confidence
        .and_then(|v| v.as_i64())
        .filter(|c| (1..=10).contains(c))
        .ok_or_else(|| Error::internal("AI response confidence must be an integer 1-10"))?;

    let reasoning = parsed
        .reasoning
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::internal("AI response missing non-empty reasoning"))?;

    Ok(BoundaryResponse {
        bubble_id,
        confidence,
        reasoning,
    })
}

fn fallback_projection(messages: &[ChatMessage]) -> Vec<FilteredMessage> {
    let start = messages.len().saturating_sub(MAX_WINDOW);
    project(&messages[start..])
}

fn project(messages: &[ChatMessage]) -> Vec<FilteredMessage> {
    messages
        .iter()
        .map(|m| FilteredMessage {
            speaker: m.speaker,
            text: m.text.clone(),
        })
        .collect()
}

/// Runs the full boundary-filter algorithm described in spec §4.6. Any unhandled condition
/// degrades to the last-250 (or all, if fewer) messages with a `{speaker, text}` projection,
/// matching step 10's behavior exactly — this function never returns an error for that reason;
/// it only returns one if `messages` fails the upfront bubbleId validation (step 1, "a distinct
/// error if not — indicates upstream bug").
pub fn filter_chat_for_commit(
    messages: &[ChatMessage],
    commit: &CommitContext,
    previous_commit_message: Option<&str>,
    previous_journal_entry: Option<&str>,
    invoker: &dyn AiInvoker,
) -> Result<Vec<FilteredMessage>> {
    validate_bubble_ids(messages)?;

    if messages.is_empty() {
        return Ok(Vec::new());
    }

    let limited_start = messages.len().saturating_sub(MAX_WINDOW);
    let limited = &messages[limited_start..];
    let simplified = simplify(limited);
    let prompt = build_prompt(&simplified, commit, previous_commit_message, previous_journal_entry);

    let raw_response = invoker.invoke(&prompt, &json!({}));

    let boundary = match parse_response(&raw_response) {
        Ok(b) => b,
        Err(e) => {
            log::warn!("boundary filter falling back after AI response error: {e}");
            return Ok(fallback_projection(messages));
        }
    };

    let boundary_index = messages.iter().position(|m| m.bubble_id == boundary.bubble_id);

    let (resolved_index, confidence, reasoning) = match boundary_index {
        Some(idx) => (idx, boundary.confidence, boundary.reasoning),
        None if messages.len() > MAX_WINDOW => (
            messages.len() - MAX_WINDOW,
            1,
            "AI returned invalid bubbleId, defaulted to last 250 messages".to_string(),
        ),
        None => (
            0,
            1,
            "AI returned invalid bubbleId, defaulted to first message (fewer than 250 total)"
                .to_string(),
        ),
    };

    if confidence < 7 {
        log::warn!("boundary filter low confidence ({confidence}): {reasoning}");
    } else {
        log::info!("boundary filter confidence {confidence}: {reasoning}");
    }

    Ok(project(&messages[resolved_index..]))
}
