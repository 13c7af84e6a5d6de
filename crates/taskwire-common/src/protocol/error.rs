use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskwireError {
    /// The worker action raised; the carried value is forwarded verbatim.
    #[error("worker call failed: {0}")]
    Faulted(serde_json::Value),

    /// The named action is not part of the discovered surface.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The channel to the worker failed; every call pending at that moment
    /// is rejected with this error.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// The proxy was terminated before this call was issued.
    #[error("proxy terminated")]
    Terminated,

    /// The worker answered with a payload the caller could not interpret.
    #[error("invalid reply: {0}")]
    InvalidReply(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TaskwireError>;
