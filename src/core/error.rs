/// Failure taxonomy of one poll cycle
///
/// None of these ever leave a poller: each one is folded into the node
/// status and the next scheduled cycle is the retry.

use std::time::Duration;
use thiserror::Error;

/// The collection call itself failed (host unreachable, hung, bad bytes)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to read agent script {path}: {source}")]
    Script {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn transport: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("transport timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport i/o error: {0}")]
    Io(#[source] std::io::Error),

    #[error("transport output is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// The payload came back but does not have the expected shape
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected at least {expected} fields, got {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("field `{field}` is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Collector ran but exited non-zero or printed nothing
    #[error("collector exited with status {exit_code} ({} bytes of output)", .output_len)]
    Protocol { exit_code: i32, output_len: usize },

    #[error("malformed payload: {0}")]
    Parse(#[from] ParseError),
}
