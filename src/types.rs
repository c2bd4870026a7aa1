//! Domain types — user records, roles, and auth wire payloads.

use serde::{Deserialize, Serialize};

// =============================================================================
// ROLE
// =============================================================================

/// A user's role as assigned by the backend.
///
/// Any role string the client does not recognize deserializes to
/// [`Role::User`], so an unexpected backend value degrades to least
/// privilege instead of failing the whole profile decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Content moderation access; counts as administrative for admission.
    Moderator,
    /// Regular member.
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    /// Whether this role grants access to admin-gated routes.
    #[must_use]
    pub fn can_administer(self) -> bool {
        matches!(self, Self::Admin | Self::Moderator)
    }
}

// =============================================================================
// USER RECORD
// =============================================================================

/// Profile record for an authenticated user.
///
/// Only `id` and `role` matter to the session core; everything else the
/// backend sends is carried through `extra` unchanged so profile pages
/// can render fields this crate knows nothing about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// WIRE PAYLOADS
// =============================================================================

/// Token + user pair returned by `POST /auth/login` and `POST /auth/register`.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserRecord,
}

/// Result of `PUT /auth/profile`. The backend may rotate the token when
/// credentials change; absent means the existing token stays valid.
#[derive(Clone, Debug, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub token: Option<String>,
    pub user: UserRecord,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
