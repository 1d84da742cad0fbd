use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Connection,
    Submission,
    NotConnected,
    Busy,
}

/// Every failure the guestbook surfaces to a user. None of them is fatal:
/// the prior session and entry state is left intact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuestbookError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("wallet connection failed: {0}")]
    Connection(String),
    #[error("entry submission failed: {0}")]
    Submission(String),
    #[error("wallet is not connected")]
    NotConnected,
    #[error("{0} already in progress")]
    Busy(&'static str),
    #[error("invalid account address '{0}'")]
    InvalidAddress(String),
}

impl GuestbookError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::InvalidAddress(_) => ErrorCode::Validation,
            Self::Connection(_) => ErrorCode::Connection,
            Self::Submission(_) => ErrorCode::Submission,
            Self::NotConnected => ErrorCode::NotConnected,
            Self::Busy(_) => ErrorCode::Busy,
        }
    }
}
