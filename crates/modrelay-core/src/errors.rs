/// Core error type for the relay.
///
/// Adapter crates should map their specific errors into this type so the relay
/// can tell an unreachable recipient apart from a generic transport failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The recipient cannot be reached (blocked the bot, deactivated, unknown chat).
    #[error("recipient unreachable: {0}")]
    Unreachable(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Error::Unreachable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
