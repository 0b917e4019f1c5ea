use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwistError {
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    InvalidReference(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Multiple {kind}s match \"{input}\": {candidates}")]
    AmbiguousReference {
        kind: &'static str,
        input: String,
        candidates: String,
    },
    #[error(
        "This thread belongs to a private channel. Use --include-private-channels (or set TWIST_INCLUDE_PRIVATE_CHANNELS=1) to access it."
    )]
    PrivateChannelAccess { channel_id: u64 },
    #[error("Invalid {kind} reference: {input}. Use {kind} ID or Twist URL.")]
    UnsupportedReferenceKind { kind: &'static str, input: String },
    #[error("Twist API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Invalid config: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, TwistError>;
