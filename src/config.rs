//! Configuration options for the Firechat client

use std::time::Duration;

/// Configuration options for the Firechat client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Whether to automatically refresh the token
    pub auto_refresh_token: bool,

    /// Whether to keep the session in memory after sign-in
    pub persist_session: bool,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Number of messages delivered with the initial live page
    pub live_page_size: u32,

    /// Number of messages fetched per history page
    pub history_page_size: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            auto_refresh_token: true,
            persist_session: true,
            request_timeout: Some(Duration::from_secs(30)),
            live_page_size: 2,
            history_page_size: 20,
        }
    }
}

impl ClientOptions {
    /// Set whether to automatically refresh the token
    pub fn with_auto_refresh_token(mut self, value: bool) -> Self {
        self.auto_refresh_token = value;
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the initial live page size
    pub fn with_live_page_size(mut self, value: u32) -> Self {
        self.live_page_size = value;
        self
    }

    /// Set the history page size
    pub fn with_history_page_size(mut self, value: u32) -> Self {
        self.history_page_size = value;
        self
    }
}

/// Project credentials for a Firechat deployment
///
/// All fields are empty by default and must be supplied externally, either
/// directly or through the environment (see [`ProjectConfig::from_env`]).
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    /// Project API key
    pub api_key: String,
    /// Project identifier
    pub project_id: String,
    /// Base URL of the project
    pub project_url: String,
}

impl ProjectConfig {
    /// Load project credentials from the environment
    ///
    /// Reads `FIRECHAT_API_KEY`, `FIRECHAT_PROJECT_ID` and `FIRECHAT_URL`.
    /// Missing variables yield empty fields, matching the unconfigured default.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("FIRECHAT_API_KEY").unwrap_or_default(),
            project_id: std::env::var("FIRECHAT_PROJECT_ID").unwrap_or_default(),
            project_url: std::env::var("FIRECHAT_URL").unwrap_or_default(),
        }
    }

    /// Whether credentials have been supplied
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.project_url.is_empty()
    }
}
