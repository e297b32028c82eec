use std::io;

use crate::core::types::ThreatStatus;

#[derive(thiserror::Error, Debug)]
pub enum SentinelError {
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
    #[error("http error: {0}")]
    Http(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("unknown threat: {0}")]
    UnknownThreat(String),
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: ThreatStatus, to: ThreatStatus },
    #[error("action error: {0}")]
    Action(String),
    #[error("unknown error")]
    Unknown,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for SentinelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SentinelError::Timeout
        } else if err.is_connect() {
            SentinelError::Network(err.to_string())
        } else if err.is_status() {
            SentinelError::Http(err.to_string())
        } else {
            SentinelError::Unknown
        }
    }
}
