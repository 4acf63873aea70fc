// Centralized error handling for the forum client

use thiserror::Error;

/// Errors returned by the Backend API client
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session rejected by the backend (status {status})")]
    Unauthorized { status: u16 },

    #[error("Backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// True when the backend refused the credential (401/403)
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status } | ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors from the durable token slot
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Token store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token store is corrupt: {0}")]
    Corrupt(String),
}

/// Errors from explicit session mutations (login, register, profile, subscriptions)
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Form input rejected before any request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must contain {}", .missing.join(", "))]
    WeakPassword { missing: Vec<&'static str> },

    #[error("Nothing to update")]
    NoChanges,
}

/// Errors surfaced by feature views to the user
#[derive(Error, Debug)]
pub enum ViewError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("View data is not loaded")]
    NotLoaded,

    #[error("Not authenticated")]
    NotAuthenticated,
}
