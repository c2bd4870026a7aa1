use super::*;

// =============================================================================
// Role
// =============================================================================

#[test]
fn role_admin_can_administer() {
    assert!(Role::Admin.can_administer());
}

#[test]
fn role_moderator_can_administer() {
    assert!(Role::Moderator.can_administer());
}

#[test]
fn role_user_cannot_administer() {
    assert!(!Role::User.can_administer());
}

#[test]
fn role_deserializes_lowercase() {
    let role: Role = serde_json::from_str("\"admin\"").unwrap();
    assert_eq!(role, Role::Admin);
}

#[test]
fn role_unknown_string_degrades_to_user() {
    let role: Role = serde_json::from_str("\"superuser\"").unwrap();
    assert_eq!(role, Role::User);
}

#[test]
fn role_default_is_user() {
    assert_eq!(Role::default(), Role::User);
}

// =============================================================================
// UserRecord
// =============================================================================

#[test]
fn user_record_missing_role_defaults_to_user() {
    let user: UserRecord = serde_json::from_str(r#"{"id":"u1","name":"Ada","email":"a@b.com"}"#).unwrap();
    assert_eq!(user.role, Role::User);
}

#[test]
fn user_record_extra_fields_pass_through() {
    let json = r#"{"id":"u1","name":"Ada","email":"a@b.com","role":"user","phone":"555","bio":"hi"}"#;
    let user: UserRecord = serde_json::from_str(json).unwrap();
    assert_eq!(user.extra.get("phone").and_then(|v| v.as_str()), Some("555"));
    assert_eq!(user.extra.get("bio").and_then(|v| v.as_str()), Some("hi"));
}

#[test]
fn user_record_extra_fields_survive_round_trip() {
    let json = r#"{"id":"u1","name":"Ada","email":"a@b.com","role":"moderator","phone":"555"}"#;
    let user: UserRecord = serde_json::from_str(json).unwrap();
    let rendered = serde_json::to_value(&user).unwrap();
    assert_eq!(rendered["phone"], "555");
    assert_eq!(rendered["role"], "moderator");
}

// =============================================================================
// Wire payloads
// =============================================================================

#[test]
fn auth_payload_deserializes() {
    let json = r#"{"token":"abc","user":{"id":"u1","role":"user"}}"#;
    let payload: AuthPayload = serde_json::from_str(json).unwrap();
    assert_eq!(payload.token, "abc");
    assert_eq!(payload.user.id, "u1");
}

#[test]
fn profile_update_token_optional() {
    let json = r#"{"user":{"id":"u1"}}"#;
    let update: ProfileUpdate = serde_json::from_str(json).unwrap();
    assert!(update.token.is_none());
}

#[test]
fn profile_update_with_rotated_token() {
    let json = r#"{"token":"fresh","user":{"id":"u1"}}"#;
    let update: ProfileUpdate = serde_json::from_str(json).unwrap();
    assert_eq!(update.token.as_deref(), Some("fresh"));
}
