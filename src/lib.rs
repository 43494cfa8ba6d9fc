//! Firechat Rust Client Library
//!
//! A Rust client library for the Firechat platform, providing access to the
//! realtime conversation stream and phone-number verification services.

pub mod config;
pub mod error;

pub use firechat_rust_auth as auth;
pub use firechat_rust_chat as chat;

use reqwest::Client;

use crate::auth::{AuthOptions, PhoneAuth, PhoneAuthFlow};
use crate::chat::ChatClient;
use crate::config::ClientOptions;

/// The main entry point for the Firechat Rust client
pub struct Firechat {
    /// The base URL for the Firechat project
    pub url: String,
    /// The anonymous API key for the Firechat project
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client for phone verification and session management
    pub auth: PhoneAuth,
    /// Client options
    pub options: ClientOptions,
}

impl Firechat {
    /// Create a new Firechat client
    ///
    /// # Arguments
    ///
    /// * `project_url` - The base URL for your Firechat project
    /// * `api_key` - The anonymous API key for your Firechat project
    ///
    /// # Example
    ///
    /// ```
    /// use firechat_rust::Firechat;
    ///
    /// let firechat = Firechat::new("https://your-project.firechat.app", "your-anon-key");
    /// ```
    pub fn new(project_url: &str, api_key: &str) -> Self {
        Self::new_with_options(project_url, api_key, ClientOptions::default())
    }

    /// Create a new Firechat client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use firechat_rust::{Firechat, config::ClientOptions};
    ///
    /// let options = ClientOptions::default().with_auto_refresh_token(true);
    /// let firechat = Firechat::new_with_options(
    ///     "https://your-project.firechat.app",
    ///     "your-anon-key",
    ///     options
    /// );
    /// ```
    pub fn new_with_options(project_url: &str, api_key: &str, options: ClientOptions) -> Self {
        let http_client = Client::new();

        let auth_options = AuthOptions {
            auto_refresh_token: options.auto_refresh_token,
            persist_session: options.persist_session,
        };
        let auth = PhoneAuth::new(project_url, api_key, http_client.clone(), auth_options);

        Self {
            url: project_url.to_string(),
            key: api_key.to_string(),
            http_client,
            auth,
            options,
        }
    }

    /// Get a reference to the auth client for phone verification and sessions
    pub fn auth(&self) -> &PhoneAuth {
        &self.auth
    }

    /// Create a phone verification flow bound to this client's auth state
    ///
    /// The flow shares its session with [`Firechat::auth`], so a sign-in
    /// completed through the flow is visible from `auth()` as well.
    pub fn phone_flow(&self) -> PhoneAuthFlow {
        PhoneAuthFlow::new(self.auth.clone())
    }

    /// Get a chat client for conversation stream and history operations
    ///
    /// # Example
    ///
    /// ```
    /// use firechat_rust::Firechat;
    ///
    /// let firechat = Firechat::new("https://your-project.firechat.app", "your-anon-key");
    /// let chat = firechat.chat();
    /// ```
    pub fn chat(&self) -> ChatClient {
        ChatClient::new(&self.url, &self.key, self.http_client.clone())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{ClientOptions, ProjectConfig};
    pub use crate::error::Error;
    pub use crate::Firechat;
}
