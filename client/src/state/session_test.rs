use super::*;

fn ada() -> User {
    User { id: 1, email: "a@b.com".into(), display_name: "Ada".into(), created_at: None }
}

#[test]
fn default_is_uninitialized() {
    assert_eq!(Session::default(), Session::Uninitialized);
    assert!(!Session::default().is_settled());
}

#[test]
fn token_present_only_when_authenticated() {
    let states = [
        Session::Uninitialized,
        Session::Loading,
        Session::Guest,
        Session::Authenticated { user: ada(), token: Token::new("t") },
    ];
    for state in states {
        assert_eq!(state.token().is_some(), state.is_authenticated(), "{}", state.label());
        assert_eq!(state.user().is_some(), state.is_authenticated(), "{}", state.label());
    }
}

#[test]
fn loading_is_not_settled() {
    assert!(!Session::Loading.is_settled());
    assert!(Session::Guest.is_settled());
}

#[test]
fn authenticated_exposes_user_and_token() {
    let session = Session::Authenticated { user: ada(), token: Token::new("t") };
    assert_eq!(session.user().map(|u| u.id), Some(1));
    assert_eq!(session.token(), Some(&Token::new("t")));
    assert_eq!(session.label(), "authenticated");
}
