use market_client::net::types::{AuthResponse, LoginRequest, SignupRequest, TemporaryUserRequest};
use market_client::{AuthGateway, MemoryCredentialStore, Token};

use super::*;

fn ada() -> User {
    User { id: 1, email: "a@b.com".into(), display_name: "Ada".into(), created_at: None }
}

#[test]
fn describe_session_names_user_when_authenticated() {
    let session = Session::Authenticated { user: ada(), token: Token::new("t") };
    assert_eq!(describe_session(&session), "authenticated: Ada <a@b.com> (id 1)");
}

#[test]
fn describe_session_uses_label_otherwise() {
    assert_eq!(describe_session(&Session::Guest), "guest");
}

#[test]
fn describe_admission_formats_redirect() {
    assert_eq!(describe_admission(View::Profile, Admission::Redirect(View::Login)), "/profile: redirect to /login");
}

#[test]
fn cli_error_for_silent_failure_has_friendly_message() {
    let err = CliError::auth(AuthOperation::FetchProfile, &AuthError::Unauthorized);
    assert_eq!(err.to_string(), "Your session has expired. Continuing as guest. [E_UNAUTHORIZED]");
}

#[test]
fn cli_error_for_rejection_uses_server_text() {
    let err = CliError::auth(
        AuthOperation::Login,
        &AuthError::Rejected { status: 401, message: "Invalid credentials".into() },
    );
    assert_eq!(err.to_string(), "Invalid credentials [E_AUTH_REJECTED]");
}

#[test]
fn cli_parses_login_subcommand() {
    let cli = Cli::try_parse_from(["market", "--api-url", "http://localhost", "login", "--email", "a@b.com", "--password", "secret"])
        .unwrap();
    assert!(matches!(cli.command, Command::Login(LoginArgs { ref email, .. }) if email == "a@b.com"));
}

// =============================================================
// form admission
// =============================================================

struct AcceptingGateway;

#[async_trait::async_trait]
impl AuthGateway for AcceptingGateway {
    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        Ok(AuthResponse { message: "ok".into(), token: Token::new("tok-1"), user: ada() })
    }

    async fn signup(&self, _request: &SignupRequest) -> Result<AuthResponse, AuthError> {
        Err(AuthError::Unreachable("unused".into()))
    }

    async fn temporary_user(&self, _request: &TemporaryUserRequest) -> Result<AuthResponse, AuthError> {
        Err(AuthError::Unreachable("unused".into()))
    }

    async fn fetch_profile(&self, _token: &Token) -> Result<User, AuthError> {
        Ok(ada())
    }
}

fn navigator() -> Navigator {
    let controller = Arc::new(SessionController::new(
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(AcceptingGateway),
        Arc::new(QueryCache::new()),
        OutboundAuth::new(),
    ));
    Navigator::new(controller, RouteGuard::default())
}

#[tokio::test]
async fn login_form_is_admitted_for_guest() {
    let nav = navigator();
    nav.controller().initialize().await;
    assert_eq!(admit(&nav, View::Login).await, None);
}

#[tokio::test]
async fn login_form_redirects_once_signed_in() {
    let nav = navigator();
    nav.controller().initialize().await;
    nav.controller().login(&LoginForm::new("a@b.com", "secret")).await.unwrap();

    assert_eq!(admit(&nav, View::Login).await.as_deref(), Some("/login: redirect to /catalog"));
}
