//! Client session core for the DMA (Dove Ministries Africa) application.
//!
//! Provides the authentication lifecycle shared by the app's shells:
//! durable credential storage, an authenticated gateway client with
//! centralized auth-failure handling, the session controller state
//! machine, and the pure route-admission policy.

pub mod api;
pub mod error;
pub mod nav;
pub mod routes;
pub mod session;
pub mod store;
pub mod types;

pub use api::{ApiClient, AuthGateway};
pub use error::{ApiError, StoreError};
pub use routes::{RouteAccess, RouteGuard, admit};
pub use session::{Session, SessionConfig, SessionController};
pub use store::{CredentialStore, Credentials, FileStore, MemoryStore};
pub use types::{AuthPayload, Role, UserRecord};
