//! API gateway client — authenticated HTTP access to the DMA backend.
//!
//! DESIGN
//! ======
//! A thin reqwest wrapper with one cross-cutting behavior: every response
//! is classified into an [`ApiError`] variant, and an `Auth` classification
//! fires the registered auth-failure hook exactly once before the error is
//! returned. Call sites never look at status codes. Classification is a
//! pure function (`classify_failure`) so it can be tested without a server.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use serde_json::Value;

use crate::error::ApiError;
use crate::types::{AuthPayload, ProfileUpdate, UserRecord};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Message values the backend uses to flag a rejected token in the body
/// of responses that are not plain 401/403.
const AUTH_FAILURE_ERROR: &str = "authentication_failed";
const AUTH_FAILURE_MESSAGE: &str = "Authentication failed";

/// Callback invoked when any request is rejected for authentication.
pub type AuthFailureHook = Arc<dyn Fn() + Send + Sync>;

// =============================================================================
// GATEWAY TRAIT
// =============================================================================

/// Auth endpoints consumed by the session controller. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AuthGateway: Send + Sync {
    /// Set the bearer token attached to subsequent requests. No network call.
    fn set_token(&self, token: &str);

    /// Drop the bearer token. No network call.
    fn clear_token(&self);

    /// Register the auth-failure hook. At most one is held; a new
    /// registration replaces the previous one.
    fn on_auth_failure(&self, hook: AuthFailureHook);

    /// `GET /auth/profile` — fetch the profile of the token's owner.
    async fn get_profile(&self) -> Result<UserRecord, ApiError>;

    /// `POST /auth/login` — exchange credentials for a token + user.
    async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError>;

    /// `POST /auth/register` — create an account; logs the user in immediately.
    async fn register(&self, fields: &Value) -> Result<AuthPayload, ApiError>;

    /// `PUT /auth/profile` — update profile fields.
    async fn update_profile(&self, fields: &Value) -> Result<ProfileUpdate, ApiError>;

    /// `POST /auth/profile/picture` — upload a new profile picture.
    async fn upload_profile_picture(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<UserRecord, ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for the DMA REST backend.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
    auth_failure_hook: Mutex<Option<AuthFailureHook>>,
}

impl ApiClient {
    /// Build a client for the given base URL (e.g. `https://api.dma.example`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            http,
            token: RwLock::new(None),
            auth_failure_hook: Mutex::new(None),
        })
    }

    /// Current bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|token| token.clone())
    }

    /// Perform a JSON request against `path`, attaching the bearer token
    /// when one is set.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ApiError`]; an `Auth` classification fires
    /// the registered auth-failure hook before returning.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);

        let mut builder = self.http.request(method, &url);
        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(json) = body {
            builder = builder.json(json);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        self.handle_response(response).await
    }

    /// Upload raw bytes to `path` with the given content type.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);

        let mut builder = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if (200..300).contains(&status) {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()));
        }

        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        let error = classify_failure(status, &body);
        if error.is_auth() {
            self.fire_auth_failure_hook();
        }
        Err(error)
    }

    fn fire_auth_failure_hook(&self) {
        let hook = self
            .auth_failure_hook
            .lock()
            .ok()
            .and_then(|slot| slot.clone());
        if let Some(hook) = hook {
            hook();
        }
    }
}

#[async_trait::async_trait]
impl AuthGateway for ApiClient {
    fn set_token(&self, token: &str) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.to_owned());
        }
    }

    fn clear_token(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }

    fn on_auth_failure(&self, hook: AuthFailureHook) {
        if let Ok(mut slot) = self.auth_failure_hook.lock() {
            *slot = Some(hook);
        }
    }

    async fn get_profile(&self) -> Result<UserRecord, ApiError> {
        let body = self
            .request(reqwest::Method::GET, "/auth/profile", None)
            .await?;
        decode::<ProfileEnvelope>(body).map(|envelope| envelope.user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let value = self
            .request(reqwest::Method::POST, "/auth/login", Some(&body))
            .await?;
        decode(value)
    }

    async fn register(&self, fields: &Value) -> Result<AuthPayload, ApiError> {
        let value = self
            .request(reqwest::Method::POST, "/auth/register", Some(fields))
            .await?;
        decode(value)
    }

    async fn update_profile(&self, fields: &Value) -> Result<ProfileUpdate, ApiError> {
        let value = self
            .request(reqwest::Method::PUT, "/auth/profile", Some(fields))
            .await?;
        decode(value)
    }

    async fn upload_profile_picture(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<UserRecord, ApiError> {
        let value = self.upload("/auth/profile/picture", bytes, content_type).await?;
        decode::<ProfileEnvelope>(value).map(|envelope| envelope.user)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Deserialize)]
struct ProfileEnvelope {
    user: UserRecord,
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Best-effort human-readable message from an error body.
fn body_message(body: &Value) -> Option<&str> {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
}

/// Whether a non-2xx response signals a rejected token.
///
/// Status 401/403 is the primary signal; some backend routes respond with
/// other statuses but flag the failure in the body instead.
pub(crate) fn is_auth_failure(status: u16, body: &Value) -> bool {
    if status == 401 || status == 403 {
        return true;
    }
    matches!(body_message(body), Some(AUTH_FAILURE_ERROR | AUTH_FAILURE_MESSAGE))
}

/// Classify a non-2xx response into an [`ApiError`].
pub(crate) fn classify_failure(status: u16, body: &Value) -> ApiError {
    let message = body_message(body)
        .unwrap_or("request failed")
        .to_owned();

    if is_auth_failure(status, body) {
        return ApiError::Auth(format!("HTTP {status}: {message}"));
    }
    if (400..500).contains(&status) {
        return ApiError::Validation(message);
    }
    ApiError::Server { status, message }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
