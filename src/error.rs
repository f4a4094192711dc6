//! Error type shared by every stage of the digest.
//!
//! Fatal and per-item failures use the same enum; whether an error aborts
//! the run is decided by the stage that receives it.

use std::time::Duration;

use thiserror::Error;

use crate::browser::Condition;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser session error: {0}")]
    Session(String),

    #[error("No element matches `{0}`")]
    NoSuchElement(String),

    #[error("Timed out after {timeout:?} waiting for `{selector}` to be {condition}")]
    WaitTimeout {
        selector: String,
        condition: Condition,
        timeout: Duration,
    },

    /// The element was detached from the document after it was found.
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("Browser command failed: {0}")]
    Browser(String),

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = Error::Status {
            status: 503,
            url: "https://example.com/t".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected HTTP status 503 from https://example.com/t"
        );
    }

    #[test]
    fn test_wait_timeout_message() {
        let err = Error::WaitTimeout {
            selector: "#agree".to_string(),
            condition: Condition::Clickable,
            timeout: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 10s waiting for `#agree` to be clickable"
        );
    }
}
