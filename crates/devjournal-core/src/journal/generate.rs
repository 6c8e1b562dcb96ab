//! Section-by-section journal entry generation: the bridge between the filtered chat +
//! commit context and a renderable `JournalSections`. This is supporting code around the AI
//! Invoker, not one of the three core subsystems spec.md's §1 scopes in detail.

use crate::ai::invoke_ai;
use crate::boundary::FilteredMessage;
use crate::config::AiConfig;
use crate::db::messages::Speaker;
use crate::gitctx::CommitContext;
use crate::journal::model::{DiscussionNote, JournalSections, ToneMood};

fn commit_summary_block(commit: &CommitContext, discussion: &[FilteredMessage]) -> String {
    let chat_excerpt: String = discussion
        .iter()
        .map(|m| {
            let speaker = match m.speaker {
                Speaker::User => "user",
                Speaker::Assistant => "assistant",
            };
            format!("{speaker}: {}", m.text)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Commit {} by {}: {}\n\nChanged files: {}\n\nConversation:\n{}",
        commit.hash,
        commit.author,
        commit.message,
        commit.changed_files.join(", "),
        chat_excerpt
    )
}

fn split_list_response(response: &str) -> Vec<String> {
    response
        .lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Builds every section of a journal entry. Each AI call degrades independently — a failed or
/// empty response simply leaves that section out of the rendered markdown (spec §4.9 step 6).
pub async fn generate_sections(
    ai_config: &AiConfig,
    commit: &CommitContext,
    discussion: &[FilteredMessage],
) -> JournalSections {
    let context = commit_summary_block(commit, discussion);

    let summary_prompt = format!(
        "Write a 2-3 sentence summary of the engineering work in this commit.\n\n{context}"
    );
    let synopsis_prompt = format!(
        "Write a short technical synopsis of the approach taken in this commit.\n\n{context}"
    );
    let accomplishments_prompt = format!(
        "List, one per line, the concrete things accomplished in this commit.\n\n{context}"
    );
    let frustrations_prompt = format!(
        "List, one per line, any frustrations or roadblocks visible in this commit's conversation. If none, respond with an empty line.\n\n{context}"
    );
    let mood_prompt = format!(
        "Describe the developer's mood in one short line, then a second line of supporting indicators from the conversation.\n\n{context}"
    );

    let summary = invoke_ai(ai_config, &summary_prompt, false).await;
    let technical_synopsis = invoke_ai(ai_config, &synopsis_prompt, false).await;
    let accomplishments_raw = invoke_ai(ai_config, &accomplishments_prompt, false).await;
    let frustrations_raw = invoke_ai(ai_config, &frustrations_prompt, false).await;
    let mood_raw = invoke_ai(ai_config, &mood_prompt, false).await;

    let tone_mood = {
        let mut lines = mood_raw.lines().filter(|l| !l.trim().is_empty());
        match (lines.next(), lines.next()) {
            (Some(mood), Some(indicators)) => Some(ToneMood {
                mood: mood.trim().to_string(),
                indicators: indicators.trim().to_string(),
            }),
            (Some(mood), None) => Some(ToneMood {
                mood: mood.trim().to_string(),
                indicators: String::new(),
            }),
            _ => None,
        }
    };

    let discussion_notes = discussion
        .iter()
        .map(|m| DiscussionNote {
            speaker: Some(
                match m.speaker {
                    Speaker::User => "User",
                    Speaker::Assistant => "Assistant",
                }
                .to_string(),
            ),
            text: m.text.clone(),
        })
        .collect();

    let commit_metadata = vec![
        ("Hash".to_string(), commit.hash.clone()),
        ("Author".to_string(), commit.author.clone()),
        ("Date".to_string(), commit.date_iso.clone()),
        ("Size".to_string(), format!("{:?}", commit.size_classification)),
        ("Diff".to_string(), commit.diff_summary.clone()),
    ];

    JournalSections {
        summary: non_empty(summary),
        technical_synopsis: non_empty(technical_synopsis),
        accomplishments: split_list_response(&accomplishments_raw),
        frustrations: split_list_response(&frustrations_raw),
        tone_mood,
        discussion_notes,
        commit_metadata,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
