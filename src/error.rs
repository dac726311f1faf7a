//! Wire error-code tokens and the client-side error taxonomy.

use std::fmt;

/// The error-code tokens carried on the wire in an `ERROR` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The requested command is not registered.
    UnknownCommand,
    /// Any other handler-raised failure (stringified).
    Uncategorised,
}

impl ErrorCode {
    pub const UNKNOWN_COMMAND: &'static str = "ERROR_UNKNOWN_COMMAND";
    pub const UNCATEGORISED: &'static str = "ERROR_UNCATEGORISED";

    /// The literal wire token for this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UnknownCommand => Self::UNKNOWN_COMMAND,
            ErrorCode::Uncategorised => Self::UNCATEGORISED,
        }
    }

    /// Parses a wire token, if it matches one of the known codes.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            Self::UNKNOWN_COMMAND => Some(ErrorCode::UnknownCommand),
            Self::UNCATEGORISED => Some(ErrorCode::Uncategorised),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The client-side error taxonomy: everything a [`crate::Client`] call can fail with.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The service replied `ERROR_UNKNOWN_COMMAND`.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The service replied with any other error token.
    #[error("service error {code}: {message}")]
    Service { code: String, message: String },

    /// The reply was empty, malformed, or failed to decode (frame count/tags, metadata schema).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The receive deadline elapsed before a reply arrived.
    #[error("timed out waiting for a reply")]
    Timeout,

    /// The endpoint URL could not be parsed, or the transport connection failed.
    #[error("transport error: {0}")]
    Transport(String),
}
