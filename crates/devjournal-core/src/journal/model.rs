//! Journal entry content model and bit-exact markdown rendering (spec §6).

use chrono::NaiveTime;

/// Tone/Mood is a mood line plus a line of supporting indicators, rendered as a blockquote.
#[derive(Debug, Clone, Default)]
pub struct ToneMood {
    pub mood: String,
    pub indicators: String,
}

/// A single line of chat discussion, optionally attributed to a speaker.
#[derive(Debug, Clone)]
pub struct DiscussionNote {
    pub speaker: Option<String>,
    pub text: String,
}

/// The AI-generated sections of one journal entry (spec §6's Section names, in order).
/// Generation itself is an external collaborator; this struct is the rendering contract.
#[derive(Debug, Clone, Default)]
pub struct JournalSections {
    pub summary: Option<String>,
    pub technical_synopsis: Option<String>,
    pub accomplishments: Vec<String>,
    pub frustrations: Vec<String>,
    pub tone_mood: Option<ToneMood>,
    pub discussion_notes: Vec<DiscussionNote>,
    pub commit_metadata: Vec<(String, String)>,
}

pub enum EntryKind {
    Commit(String),
    Reflection,
    AiKnowledgeCapture,
}

impl EntryKind {
    fn label(&self) -> String {
        match self {
            EntryKind::Commit(hash) => format!("Commit {hash}"),
            EntryKind::Reflection => "Reflection".to_string(),
            EntryKind::AiKnowledgeCapture => "AI Knowledge Capture".to_string(),
        }
    }
}

/// `H:MM AM/PM`, no leading zero on the hour, matching `strftime("%I:%M %p").lstrip('0')`.
pub fn format_timestamp(time: NaiveTime) -> String {
    let formatted = time.format("%I:%M %p").to_string();
    formatted.trim_start_matches('0').to_string()
}

fn render_list(items: &[String]) -> String {
    items.iter().map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n")
}

fn render_discussion(notes: &[DiscussionNote]) -> String {
    notes
        .iter()
        .map(|n| match &n.speaker {
            Some(s) => format!("> **{s}:** {}", n.text),
            None => format!("> {}", n.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_tone_mood(tone: &ToneMood) -> String {
    format!("> {}\n> {}", tone.mood, tone.indicators)
}

fn render_metadata(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("- **{k}:** {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl JournalSections {
    /// Renders a `### <timestamp> — <kind>` block with `####` section subheadings, per spec §6.
    /// Sections with no content are omitted — graceful degradation never blocks the others.
    pub fn to_markdown(&self, kind: &EntryKind, time: NaiveTime) -> String {
        let mut out = format!("### {} — {}\n\n", format_timestamp(time), kind.label());

        let mut push_section = |title: &str, body: String| {
            if !body.trim().is_empty() {
                out.push_str(&format!("#### {title}\n{body}\n\n"));
            }
        };

        if let Some(s) = &self.summary {
            push_section("Summary", s.clone());
        }
        if let Some(s) = &self.technical_synopsis {
            push_section("Technical Synopsis", s.clone());
        }
        push_section("Accomplishments", render_list(&self.accomplishments));
        push_section("Frustrations or Roadblocks", render_list(&self.frustrations));
        if let Some(tone) = &self.tone_mood {
            push_section("Tone/Mood", render_tone_mood(tone));
        }
        push_section("Discussion Notes (from chat)", render_discussion(&self.discussion_notes));
        push_section("Commit Metadata", render_metadata(&self.commit_metadata));

        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_strips_leading_zero() {
        let t = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(format_timestamp(t), "9:05 AM");
    }

    #[test]
    fn timestamp_keeps_double_digit_hour() {
        let t = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(format_timestamp(t), "2:30 PM");
    }

    #[test]
    fn renders_commit_header_and_present_sections_only() {
        let sections = JournalSections {
            summary: Some("Fixed the bug.".to_string()),
            accomplishments: vec!["Shipped the fix".to_string()],
            ..Default::default()
        };
        let md = sections.to_markdown(&EntryKind::Commit("abc123".to_string()), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(md.starts_with("### 9:00 AM — Commit abc123"));
        assert!(md.contains("#### Summary"));
        assert!(md.contains("#### Accomplishments"));
        assert!(!md.contains("#### Tone/Mood"));
    }

    #[test]
    fn discussion_notes_attribute_speaker() {
        let sections = JournalSections {
            discussion_notes: vec![
                DiscussionNote { speaker: Some("user".to_string()), text: "ok".to_string() },
                DiscussionNote { speaker: None, text: "unattributed".to_string() },
            ],
            ..Default::default()
        };
        let md = sections.to_markdown(&EntryKind::Reflection, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(md.contains("> **user:** ok"));
        assert!(md.contains("> unattributed"));
    }
}
