//! Message Assembler (spec §4.5): reads session metadata from a workspace DB and per-message
//! records from a global DB, filters by the commit's time window, and merges chronologically.

use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

const BUSY_TIMEOUT_MS: u32 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub bubble_id: String,
    pub composer_id: String,
    pub session_name: String,
    pub speaker: Speaker,
    pub text: String,
    pub timestamp_ms: i64,
}

#[derive(Debug, Deserialize)]
struct ComposerDataValue {
    #[serde(rename = "allComposers", default)]
    all_composers: Vec<ComposerEntry>,
}

#[derive(Debug, Deserialize)]
struct ComposerEntry {
    #[serde(rename = "composerId")]
    composer_id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ComposerHeaders {
    #[serde(rename = "fullConversationHeadersOnly", default)]
    headers: Vec<BubbleHeader>,
}

#[derive(Debug, Deserialize)]
struct BubbleHeader {
    #[serde(rename = "bubbleId")]
    bubble_id: String,
    #[serde(rename = "type", default)]
    bubble_type: i64,
}

#[derive(Debug, Deserialize)]
struct BubbleBody {
    #[serde(default)]
    text: String,
    #[serde(default)]
    timestamp: i64,
}

fn open_readonly(path: &std::path::Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    conn.busy_timeout(std::time::Duration::from_millis(BUSY_TIMEOUT_MS as u64))?;
    Ok(conn)
}

fn list_composers(workspace_db: &std::path::Path) -> Result<Vec<ComposerEntry>> {
    let conn = open_readonly(workspace_db)?;
    let raw: Option<String> = match conn.query_row(
        "SELECT value FROM ItemTable WHERE key = 'composer.composerData'",
        [],
        |row| row.get(0),
    ) {
        Ok(value) => Some(value),
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        // `ItemTable` absent entirely is a Schema error, not just an empty result; a caller
        // further up the chain may want to tell that apart from "no composers yet".
        Err(e) => return Err(e.into()),
    };

    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<ComposerDataValue>(&raw) {
        Ok(data) => Ok(data.all_composers),
        Err(e) => {
            log::warn!("malformed composer.composerData JSON, skipping: {e}");
            Ok(Vec::new())
        }
    }
}

fn fetch_headers(conn: &Connection, composer_id: &str) -> Vec<BubbleHeader> {
    let key = format!("composerData:{composer_id}");
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM cursorDiskKV WHERE key = ?1",
            [&key],
            |row| row.get(0),
        )
        .ok();

    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<ComposerHeaders>(&raw) {
        Ok(h) => h.headers,
        Err(e) => {
            log::warn!("malformed headers for composer {composer_id}, skipping: {e}");
            Vec::new()
        }
    }
}

fn fetch_bubble(conn: &Connection, composer_id: &str, bubble_id: &str) -> Option<BubbleBody> {
    let key = format!("bubbleId:{composer_id}:{bubble_id}");
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM cursorDiskKV WHERE key = ?1",
            [&key],
            |row| row.get(0),
        )
        .ok()?;
    let raw = raw?;

    match serde_json::from_str::<BubbleBody>(&raw) {
        Ok(body) => Some(body),
        Err(e) => {
            log::warn!("malformed bubble body {key}, skipping: {e}");
            None
        }
    }
}

fn speaker_for(bubble_type: i64) -> Speaker {
    match bubble_type {
        2 => Speaker::Assistant,
        _ => Speaker::User,
    }
}

/// Reads and time-filters messages from a single workspace/global database pair.
/// Never returns an `Err` for malformed records — those are logged and skipped. Only
/// top-level I/O failures (database missing, permission denied) propagate.
pub fn assemble_messages(
    workspace_db: &std::path::Path,
    global_db: &std::path::Path,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<ChatMessage>> {
    if !workspace_db.exists() {
        return Err(Error::not_found(format!(
            "workspace database not found: {}",
            workspace_db.display()
        )));
    }
    if !global_db.exists() {
        return Err(Error::not_found(format!(
            "global database not found: {}",
            global_db.display()
        )));
    }

    let composers = list_composers(workspace_db)?;
    let global_conn = open_readonly(global_db)?;

    let mut messages = Vec::new();
    for composer in composers {
        let headers = fetch_headers(&global_conn, &composer.composer_id);
        for header in headers {
            let Some(body) = fetch_bubble(&global_conn, &composer.composer_id, &header.bubble_id)
            else {
                continue;
            };
            if body.timestamp < start_ms || body.timestamp > end_ms {
                continue;
            }
            messages.push(ChatMessage {
                bubble_id: header.bubble_id,
                composer_id: composer.composer_id.clone(),
                session_name: composer.name.clone(),
                speaker: speaker_for(header.bubble_type),
                text: body.text,
                timestamp_ms: body.timestamp,
            });
        }
    }

    messages.sort_by_key(|m| m.timestamp_ms);
    Ok(messages)
}

/// Merges message lists from multiple candidate databases (the 48-hour-recent set), preserving
/// chronological order. Duplicate bubbleIds across sessions are left in, per spec §4.5.
pub fn merge_message_sets(sets: Vec<Vec<ChatMessage>>) -> Vec<ChatMessage> {
    let mut merged: Vec<ChatMessage> = sets.into_iter().flatten().collect();
    merged.sort_by_key(|m| m.timestamp_ms);
    merged
}

pub fn extract_folder_from_workspace_json(raw: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let folder = value.get("folder")?.as_str()?;
    Some(folder.trim_start_matches("file://").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_maps_type_codes() {
        assert_eq!(speaker_for(1), Speaker::User);
        assert_eq!(speaker_for(2), Speaker::Assistant);
        assert_eq!(speaker_for(99), Speaker::User);
    }

    #[test]
    fn missing_item_table_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.vscdb");
        // A valid SQLite file that never got its ItemTable created.
        Connection::open(&path)
            .unwrap()
            .execute("CREATE TABLE unrelated (id INTEGER)", [])
            .unwrap();

        let result = list_composers(&path);
        assert!(matches!(result, Err(Error::Schema(_))), "expected Schema, got {result:?}");
    }

    #[test]
    fn missing_workspace_db_is_not_found() {
        let result = assemble_messages(
            std::path::Path::new("/nonexistent/workspace.vscdb"),
            std::path::Path::new("/nonexistent/global.vscdb"),
            0,
            1,
        );
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn extracts_folder_strips_file_prefix() {
        let raw = r#"{"folder": "file:///home/dev/project"}"#;
        assert_eq!(
            extract_folder_from_workspace_json(raw),
            Some("/home/dev/project".to_string())
        );
    }

    #[test]
    fn merge_sorts_across_sets() {
        let a = vec![ChatMessage {
            bubble_id: "a".into(),
            composer_id: "c1".into(),
            session_name: "s1".into(),
            speaker: Speaker::User,
            text: "hi".into(),
            timestamp_ms: 200,
        }];
        let b = vec![ChatMessage {
            bubble_id: "b".into(),
            composer_id: "c2".into(),
            session_name: "s2".into(),
            speaker: Speaker::Assistant,
            text: "hello".into(),
            timestamp_ms: 100,
        }];
        let merged = merge_message_sets(vec![a, b]);
        assert_eq!(merged[0].bubble_id, "b");
        assert_eq!(merged[1].bubble_id, "a");
    }
}
