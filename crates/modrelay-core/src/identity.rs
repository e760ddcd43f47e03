//! Sender identity markers embedded in moderator chat messages.
//!
//! The marker `USER_ID:<digits>` is the only protocol surface persisted in the
//! moderator chat history, so its format must stay stable.

use std::sync::OnceLock;

use regex::Regex;

use crate::{domain::UserId, messaging::types::QuotedMessage};

pub const MARKER_PREFIX: &str = "USER_ID:";

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"USER_ID:([0-9]+)").expect("valid regex"))
}

/// Build the correlation text posted under a forwarded question.
pub fn encode_marker(user: UserId, label: &str) -> String {
    format!("{MARKER_PREFIX}{} | {label}", user.0)
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    #[error("malformed user id marker: {0}")]
    Malformed(String),
}

/// Find the first `USER_ID:<digits>` token in `s`.
///
/// A token whose digits do not form a positive `i64` is `Malformed`, which is
/// reported separately from "no marker at all".
pub fn scan_marker(s: &str) -> Result<Option<UserId>, MarkerError> {
    let Some(caps) = marker_re().captures(s) else {
        return Ok(None);
    };
    let digits = &caps[1];
    match digits.parse::<i64>() {
        Ok(id) if id > 0 => Ok(Some(UserId(id))),
        _ => Err(MarkerError::Malformed(format!("{MARKER_PREFIX}{digits}"))),
    }
}

/// Where a resolved identity came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentitySource {
    Text,
    Caption,
    ForwardOrigin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved { user: UserId, source: IdentitySource },
    /// A marker was present but unusable and no other source matched.
    Malformed,
    Unresolved,
}

impl Resolution {
    pub fn user(&self) -> Option<UserId> {
        match self {
            Resolution::Resolved { user, .. } => Some(*user),
            _ => None,
        }
    }
}

/// Resolve the original sender of a replied-to message.
///
/// First match wins: marker in text, marker in caption, forward origin.
pub fn resolve(msg: &QuotedMessage) -> Resolution {
    let mut saw_malformed = false;

    let embedded = [
        (msg.text.as_deref(), IdentitySource::Text),
        (msg.caption.as_deref(), IdentitySource::Caption),
    ];
    for (field, source) in embedded {
        let Some(s) = field else {
            continue;
        };
        match scan_marker(s) {
            Ok(Some(user)) => return Resolution::Resolved { user, source },
            Ok(None) => {}
            Err(_) => saw_malformed = true,
        }
    }

    if let Some(user) = msg.forward_from {
        return Resolution::Resolved {
            user,
            source: IdentitySource::ForwardOrigin,
        };
    }

    if saw_malformed {
        Resolution::Malformed
    } else {
        Resolution::Unresolved
    }
}
