use std::fmt;

use thiserror::Error;
use tracing::warn;

/// User-facing errors. Every message is either the server's `error` field or a
/// fixed per-operation fallback; raw transport errors are only logged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Processing(String),

    #[error("{0}")]
    Download(String),

    #[error("{0}")]
    Fetch(String),

    #[error("{0}")]
    AuthFailed(String),

    #[error("Failed to start HTTP client: {0}")]
    Runtime(String),
}

impl IntegrationError {
    /// The message shown to the user
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// The backend operation a request belongs to. Selects the error variant and
/// the fallback message used when the server gives none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Signup,
    Login,
    Upload,
    Process,
    Download,
    Fetch,
}

impl Operation {
    /// Message used when the server did not supply one
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::Signup => "Signup failed",
            Self::Login => "Login failed",
            Self::Upload => "Upload failed",
            Self::Process => "Processing failed",
            Self::Download => "Download failed",
            Self::Fetch => "Failed to fetch data",
        }
    }

    /// Build this operation's error, preferring the server-supplied message
    pub fn error(self, server_message: Option<String>) -> IntegrationError {
        let message = server_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.fallback_message().to_string());
        match self {
            Self::Signup | Self::Login => IntegrationError::AuthFailed(message),
            Self::Upload => IntegrationError::Upload(message),
            Self::Process => IntegrationError::Processing(message),
            Self::Download => IntegrationError::Download(message),
            Self::Fetch => IntegrationError::Fetch(message),
        }
    }

    /// Map a transport failure to this operation's fallback error
    pub fn transport(self, err: reqwest::Error) -> IntegrationError {
        if err.is_timeout() {
            warn!("{} request timed out: {}", self, err);
        } else if err.is_connect() {
            warn!("{} request could not reach the server: {}", self, err);
        } else {
            warn!("{} request failed: {}", self, err);
        }
        self.error(None)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Signup => "signup",
            Self::Login => "login",
            Self::Upload => "upload",
            Self::Process => "process",
            Self::Download => "download",
            Self::Fetch => "fetch",
        };
        f.write_str(name)
    }
}
