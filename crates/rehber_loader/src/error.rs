use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport-level failure while fetching a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum FetchError {
    BadUrl(String),
    Request(String),
    Status(String),
    Io(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::BadUrl(msg) => write!(f, "bad url: {}", msg),
            FetchError::Request(msg) => write!(f, "request failed: {}", msg),
            FetchError::Status(msg) => write!(f, "unexpected status: {}", msg),
            FetchError::Io(msg) => write!(f, "io error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Io(err.to_string())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Failure loading catalog data. `Clone` so one shared in-flight load
/// can hand the same outcome to every coalesced waiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LoadError {
    Fetch(String),
    MalformedPayload(String),
    UnknownFragment(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Fetch(msg) => write!(f, "fetch failed: {}", msg),
            LoadError::MalformedPayload(msg) => write!(f, "malformed payload: {}", msg),
            LoadError::UnknownFragment(msg) => write!(f, "unknown fragment: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<FetchError> for LoadError {
    fn from(err: FetchError) -> Self {
        LoadError::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::MalformedPayload(err.to_string())
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
