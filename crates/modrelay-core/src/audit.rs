use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;

use crate::{errors::Error, Result};

// ============== Timestamp Helpers ==============

/// RFC3339 timestamp in UTC (for logs/telemetry).
pub fn iso_timestamp_utc() -> String {
    Utc::now().to_rfc3339()
}

// ============== Audit Logging ==============

const AUDIT_MAX_TEXT: usize = 500;

#[derive(Clone, Debug, Serialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub event: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderator_message_id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEvent {
    fn base(event: &str) -> Self {
        Self {
            timestamp: iso_timestamp_utc(),
            event: event.to_string(),
            user_id: None,
            label: None,
            message_type: None,
            content: None,
            moderator_message_id: None,
            reason: None,
            error: None,
        }
    }

    pub fn question_forwarded(user_id: i64, label: &str, content: Option<&str>, anchor: i32) -> Self {
        Self {
            user_id: Some(user_id),
            label: Some(label.to_string()),
            content: content.map(|s| s.to_string()),
            moderator_message_id: Some(anchor),
            ..Self::base("question_forwarded")
        }
    }

    pub fn forward_failed(user_id: i64, label: &str, error: &str, context: &str) -> Self {
        Self {
            user_id: Some(user_id),
            label: Some(label.to_string()),
            reason: Some(context.to_string()),
            error: Some(error.to_string()),
            ..Self::base("forward_failed")
        }
    }

    pub fn answer_delivered(
        user_id: i64,
        message_type: &str,
        content: Option<&str>,
        moderator_message_id: i32,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            message_type: Some(message_type.to_string()),
            content: content.map(|s| s.to_string()),
            moderator_message_id: Some(moderator_message_id),
            ..Self::base("answer_delivered")
        }
    }

    pub fn routing_failed(moderator_message_id: i32, reason: &str) -> Self {
        Self {
            moderator_message_id: Some(moderator_message_id),
            reason: Some(reason.to_string()),
            ..Self::base("routing_failed")
        }
    }

    pub fn delivery_failed(user_id: i64, moderator_message_id: i32, error: &str) -> Self {
        Self {
            user_id: Some(user_id),
            moderator_message_id: Some(moderator_message_id),
            error: Some(error.to_string()),
            ..Self::base("delivery_failed")
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuditLogger {
    path: PathBuf,
    json: bool,
}

impl AuditLogger {
    pub fn new(path: impl Into<PathBuf>, json: bool) -> Self {
        Self {
            path: path.into(),
            json,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, mut event: AuditEvent) -> Result<()> {
        if let Some(s) = &event.content {
            event.content = Some(truncate_text(s, AUDIT_MAX_TEXT));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if self.json {
            let line = serde_json::to_string(&event)?;
            writeln!(file, "{line}")?;
            return Ok(());
        }

        // Plain text format for readability.
        let mut out = String::new();
        out.push('\n');
        out.push_str(&"=".repeat(60));

        let value = serde_json::to_value(&event)?;
        let Some(obj) = value.as_object() else {
            return Err(Error::External(
                "audit event is not a JSON object".to_string(),
            ));
        };
        for (k, v) in obj {
            out.push('\n');
            out.push_str(k);
            out.push_str(": ");
            out.push_str(&json_value_to_display(v));
        }
        out.push('\n');

        file.write_all(out.as_bytes())?;
        Ok(())
    }
}

pub fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out = s.chars().take(max_len).collect::<String>();
    out.push_str("...");
    out
}

fn json_value_to_display(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| "<unprintable>".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_file(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}.log"))
    }

    #[test]
    fn truncate_text_adds_ellipsis() {
        let s = "a".repeat(AUDIT_MAX_TEXT + 10);
        let t = truncate_text(&s, AUDIT_MAX_TEXT);
        assert!(t.ends_with("..."));
        assert_eq!(t.chars().count(), AUDIT_MAX_TEXT + 3);
        assert_eq!(truncate_text("short", AUDIT_MAX_TEXT), "short");
    }

    #[test]
    fn json_lines_skip_empty_fields_and_truncate_content() {
        let log = AuditLogger::new(tmp_file("modrelay-audit-json"), true);
        let content = "q".repeat(AUDIT_MAX_TEXT + 1);
        log.write(AuditEvent::question_forwarded(555, "@alice", Some(&content), 12))
            .unwrap();
        log.write(AuditEvent::routing_failed(13, "unresolved")).unwrap();

        let written = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "question_forwarded");
        assert_eq!(first["user_id"], 555);
        assert_eq!(first["moderator_message_id"], 12);
        assert!(first["content"].as_str().unwrap().ends_with("..."));
        assert!(first.get("error").is_none());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "routing_failed");
        assert!(second.get("user_id").is_none());

        let _ = std::fs::remove_file(log.path());
    }

    #[test]
    fn plain_text_format_lists_fields() {
        let log = AuditLogger::new(tmp_file("modrelay-audit-text"), false);
        log.write(AuditEvent::delivery_failed(7, 40, "bot was blocked"))
            .unwrap();

        let written = std::fs::read_to_string(log.path()).unwrap();
        assert!(written.contains(&"=".repeat(60)));
        assert!(written.contains("event: delivery_failed"));
        assert!(written.contains("user_id: 7"));
        assert!(written.contains("error: bot was blocked"));

        let _ = std::fs::remove_file(log.path());
    }
}
