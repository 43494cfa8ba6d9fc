//! Error handling for the Firechat Rust client

use std::fmt;
use thiserror::Error;

/// Unified error type for the Firechat Rust client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Phone verification and session errors
    #[error("Auth error: {0}")]
    Auth(#[from] firechat_rust_auth::AuthError),

    /// Conversation stream and history errors
    #[error("Chat error: {0}")]
    Chat(#[from] firechat_rust_chat::ChatError),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }
}
