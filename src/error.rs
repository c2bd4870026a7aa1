//! Error taxonomy for the session core.
//!
//! Every gateway failure is classified into one of the [`ApiError`]
//! variants so the session controller can decide between retrying,
//! deauthenticating, and surfacing the error to the caller without
//! re-inspecting status codes at each call site.

// =============================================================================
// API ERROR
// =============================================================================

/// Classified failure from the API gateway client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response reached us: DNS, connect, TLS, or timeout failure.
    /// Retried during bootstrap; never deauthenticates.
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected our credentials (401/403 or an explicit
    /// authentication-failure body). Always deauthenticates, never retried.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A 4xx with a caller-fixable cause, e.g. bad login credentials.
    /// Surfaced verbatim to the initiating caller; no session change.
    #[error("{0}")]
    Validation(String),

    /// A 5xx from the backend. Surfaced to the caller; no automatic retry.
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// A 2xx response whose body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// Whether the bootstrap verification loop should retry after this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether this error must force a logout.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

// =============================================================================
// STORE ERROR
// =============================================================================

/// Failure writing or clearing the credential store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential store io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

// =============================================================================
// FRIENDLY MESSAGES
// =============================================================================

/// Backend messages for a failed credential check, verbatim.
const GENERIC_CREDENTIAL_FAILURES: &[&str] = &["Invalid email or password", "Invalid credentials"];

/// User-facing replacement shown by sign-in forms.
pub const WRONG_CREDENTIALS_MESSAGE: &str = "Wrong username or password, please try again";

/// Substitute the friendlier sign-in message for the backend's generic
/// invalid-credentials response. All other errors pass through unchanged.
#[must_use]
pub fn friendly_login_error(error: ApiError) -> ApiError {
    match error {
        ApiError::Validation(message) if GENERIC_CREDENTIAL_FAILURES.contains(&message.as_str()) => {
            ApiError::Validation(WRONG_CREDENTIALS_MESSAGE.to_owned())
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
