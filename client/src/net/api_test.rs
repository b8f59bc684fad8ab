use super::*;

const USER_JSON: &str = r#"{"id":1,"email":"a@b.com","name":"Ada","createdAt":"2024-01-02T03:04:05Z"}"#;

fn auth_body() -> String {
    format!(r#"{{"message":"Login successful","token":"tok-1","user":{USER_JSON}}}"#)
}

// =============================================================
// error_message
// =============================================================

#[test]
fn error_message_prefers_server_error_field() {
    assert_eq!(error_message(400, r#"{"error":"User already exists"}"#), "User already exists");
}

#[test]
fn error_message_falls_back_to_status_reason() {
    assert_eq!(error_message(405, "Method not allowed\n"), "Method Not Allowed");
}

#[test]
fn error_message_blank_error_field_falls_back() {
    assert_eq!(error_message(500, r#"{"error":"  "}"#), "Internal Server Error");
}

#[test]
fn error_message_unknown_status_formats_code() {
    assert_eq!(error_message(599, ""), "request failed with status 599");
}

// =============================================================
// decode_success
// =============================================================

#[test]
fn decode_success_parses_auth_response() {
    let resp: AuthResponse = decode_success(200, &auth_body()).unwrap();
    assert_eq!(resp.token, Token::new("tok-1"));
    assert_eq!(resp.user.display_name, "Ada");
}

#[test]
fn decode_success_accepts_created_status() {
    let resp: AuthResponse = decode_success(201, &auth_body()).unwrap();
    assert_eq!(resp.message, "Login successful");
}

#[test]
fn decode_success_unauthorized_login_is_rejected_not_unauthorized() {
    let err = decode_success::<AuthResponse>(401, r#"{"error":"Invalid credentials"}"#).unwrap_err();
    assert_eq!(err, AuthError::Rejected { status: 401, message: "Invalid credentials".into() });
}

#[test]
fn decode_success_bad_body_is_malformed() {
    let err = decode_success::<AuthResponse>(200, r#"{"message":"ok"}"#).unwrap_err();
    assert!(matches!(err, AuthError::Malformed(_)));
}

// =============================================================
// decode_profile
// =============================================================

#[test]
fn decode_profile_extracts_user() {
    let user = decode_profile(200, &format!(r#"{{"user":{USER_JSON}}}"#)).unwrap();
    assert_eq!(user.id, 1);
    assert!(user.created_at.is_some());
}

#[test]
fn decode_profile_401_is_unauthorized() {
    assert_eq!(decode_profile(401, r#"{"error":"Invalid token"}"#), Err(AuthError::Unauthorized));
}

#[test]
fn decode_profile_404_is_rejected() {
    let err = decode_profile(404, r#"{"error":"User not found"}"#).unwrap_err();
    assert_eq!(err, AuthError::Rejected { status: 404, message: "User not found".into() });
}

// =============================================================
// OutboundAuth
// =============================================================

#[test]
fn outbound_auth_starts_empty() {
    let outbound = OutboundAuth::new();
    assert!(!outbound.is_set());
    assert_eq!(outbound.header_value(), None);
}

#[test]
fn outbound_auth_clones_share_slot() {
    let outbound = OutboundAuth::new();
    let reader = outbound.clone();
    outbound.set(&Token::new("abc"));
    assert_eq!(reader.header_value().as_deref(), Some("Bearer abc"));
    outbound.clear();
    assert!(!reader.is_set());
}
