use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{domain::ChatId, errors::Error, Result};

const TOKEN_KEYS: [&str; 3] = ["BOT_TOKEN", "TELEGRAM_BOT_TOKEN", "TOKEN"];
const MOD_CHAT_KEYS: [&str; 3] = ["MOD_CHAT_ID", "MOD_CHAT", "TG_MOD_CHAT_ID"];

/// Typed configuration for the relay bot.
///
/// Several aliases are accepted for each required value so hosting providers
/// can supply credentials under different keys.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub moderator_chat_id: ChatId,

    // Audit
    pub audit_log_path: Option<PathBuf>,
    pub audit_log_json: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (environment, test map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = first_non_empty(&lookup, &TOKEN_KEYS).ok_or_else(|| {
            Error::Config(format!(
                "bot token is required (set one of {})",
                TOKEN_KEYS.join(", ")
            ))
        })?;

        let raw_chat = first_non_empty(&lookup, &MOD_CHAT_KEYS).ok_or_else(|| {
            Error::Config(format!(
                "moderator chat id is required (set one of {})",
                MOD_CHAT_KEYS.join(", ")
            ))
        })?;
        let moderator_chat_id = raw_chat
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| Error::Config(format!("moderator chat id is not an integer: {raw_chat}")))?;

        let audit_log_path = lookup("AUDIT_LOG_PATH")
            .and_then(non_empty)
            .map(PathBuf::from);
        let audit_log_json = lookup("AUDIT_LOG_JSON").map(parse_bool).unwrap_or(false);

        Ok(Self {
            bot_token,
            moderator_chat_id,
            audit_log_path,
            audit_log_json,
        })
    }
}

fn first_non_empty(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| lookup(*k))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim().trim_start_matches("export ").trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(s: String) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
