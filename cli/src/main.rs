use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use market_client::{
    Admission, AuthError, AuthOperation, ClientConfig, ConfigError, FileCredentialStore, GuestForm, HttpGateway, LoginForm,
    Navigator, OutboundAuth, QueryCache, RouteGuard, Session, SessionController, SignupForm, User, View,
};
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{message} [{code}]")]
    Auth { code: &'static str, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl CliError {
    fn auth(op: AuthOperation, err: &AuthError) -> Self {
        let message = err
            .display_message(op)
            .unwrap_or_else(|| "Your session has expired. Continuing as guest.".to_owned());
        Self::Auth { code: err.error_code(), message }
    }
}

#[derive(Parser, Debug)]
#[command(name = "market", about = "Marketplace account and session CLI")]
struct Cli {
    #[arg(long, env = "MARKET_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "MARKET_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[arg(long, env = "MARKET_ROUTE_POLICY", help = "guest_browsing or login_required")]
    route_policy: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the stored credential and print the session.
    Status,
    Login(LoginArgs),
    Signup(SignupArgs),
    /// Start a temporary account with just a display name.
    Guest {
        #[arg(long)]
        name: String,
    },
    /// Show the signed-in user's profile.
    Profile,
    Logout,
    /// Print the admission decision for a path.
    Route {
        path: String,
    },
    /// Print the furniture catalog if the current session may see it.
    Catalog {
        #[arg(long)]
        tags: Option<String>,
    },
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "MARKET_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct SignupArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    confirm: String,
}

struct App {
    config: ClientConfig,
    gateway: Arc<HttpGateway>,
    navigator: Navigator,
}

impl App {
    fn build(cli: &Cli) -> Result<Self, CliError> {
        let config = ClientConfig::from_lookup(|key| match key {
            "MARKET_API_URL" => cli.api_url.clone(),
            "MARKET_TOKEN_FILE" => cli.token_file.as_ref().map(|p| p.display().to_string()),
            "MARKET_ROUTE_POLICY" => cli.route_policy.clone(),
            other => std::env::var(other).ok(),
        })?;
        tracing::debug!(api_url = %config.api_url, env = %config.environment, policy = config.route_policy.as_str(), "config loaded");

        let outbound = OutboundAuth::new();
        let gateway = Arc::new(HttpGateway::new(&config, outbound.clone())?);
        let store = Arc::new(FileCredentialStore::new(config.token_file.clone()));
        let controller = Arc::new(SessionController::new(store, gateway.clone(), Arc::new(QueryCache::new()), outbound));
        let navigator = Navigator::new(controller, RouteGuard::new(config.route_policy));
        Ok(Self { config, gateway, navigator })
    }

    fn controller(&self) -> &SessionController {
        self.navigator.controller()
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = App::build(&cli)?;

    match cli.command {
        Command::Status => run_status(&app).await,
        Command::Login(args) => run_login(&app, args).await,
        Command::Signup(args) => run_signup(&app, args).await,
        Command::Guest { name } => run_guest(&app, name).await,
        Command::Profile => run_profile(&app).await,
        Command::Logout => {
            run_logout(&app);
            Ok(())
        }
        Command::Route { path } => run_route(&app, &path).await,
        Command::Catalog { tags } => run_catalog(&app, tags).await,
    }
}

async fn run_status(app: &App) -> Result<(), CliError> {
    let session = app.controller().initialize().await;
    println!("{}", describe_session(&session));
    Ok(())
}

async fn run_login(app: &App, args: LoginArgs) -> Result<(), CliError> {
    app.controller().initialize().await;
    if let Some(refusal) = admit(&app.navigator, View::Login).await {
        println!("{refusal}");
        return Ok(());
    }
    let form = LoginForm::new(args.email, args.password);
    let user = app
        .controller()
        .login(&form)
        .await
        .map_err(|e| CliError::auth(AuthOperation::Login, &e))?;
    println!("Signed in as {}", describe_user(&user));
    Ok(())
}

async fn run_signup(app: &App, args: SignupArgs) -> Result<(), CliError> {
    app.controller().initialize().await;
    if let Some(refusal) = admit(&app.navigator, View::Login).await {
        println!("{refusal}");
        return Ok(());
    }
    let form = SignupForm::new(args.name, args.email, args.password, args.confirm);
    let user = app
        .controller()
        .signup(&form)
        .await
        .map_err(|e| CliError::auth(AuthOperation::Signup, &e))?;
    println!("Account created for {}", describe_user(&user));
    Ok(())
}

async fn run_guest(app: &App, name: String) -> Result<(), CliError> {
    app.controller().initialize().await;
    if let Some(refusal) = admit(&app.navigator, View::Login).await {
        println!("{refusal}");
        return Ok(());
    }
    let user = app
        .controller()
        .enter_guest_session(&GuestForm::new(name))
        .await
        .map_err(|e| CliError::auth(AuthOperation::TemporaryUser, &e))?;
    println!("Guest session started for {}", user.display_name);
    Ok(())
}

async fn run_profile(app: &App) -> Result<(), CliError> {
    app.controller().initialize().await;
    match app.navigator.enter(View::Profile).await {
        Admission::Render => {
            if let Some(user) = app.controller().current_session().user() {
                println!("{}", describe_user(user));
                if let Some(created) = user.created_at {
                    println!("member since {}", created.date());
                }
            }
        }
        other => println!("{}", describe_admission(View::Profile, other)),
    }
    Ok(())
}

fn run_logout(app: &App) {
    app.controller().logout();
    println!("Signed out. Credential removed from {}", app.config.token_file.display());
}

async fn run_route(app: &App, path: &str) -> Result<(), CliError> {
    app.controller().initialize().await;
    let view = View::from_path(path);
    let admission = app.navigator.enter(view).await;
    println!("{}", describe_admission(view, admission));
    Ok(())
}

async fn run_catalog(app: &App, tags: Option<String>) -> Result<(), CliError> {
    app.controller().initialize().await;
    if let Some(refusal) = admit(&app.navigator, View::Catalog).await {
        println!("{refusal}");
        return Ok(());
    }
    let query: Vec<(&str, &str)> = tags.as_deref().map(|t| vec![("tags", t)]).unwrap_or_default();
    let listing = app
        .gateway
        .fetch_catalog(&query)
        .await
        .map_err(|e| CliError::Auth { code: e.error_code(), message: e.to_string() })?;
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

/// Enter `view` and return the guard's decision when it does not render.
async fn admit(navigator: &Navigator, view: View) -> Option<String> {
    match navigator.enter(view).await {
        Admission::Render => None,
        other => Some(describe_admission(view, other)),
    }
}

fn describe_user(user: &User) -> String {
    format!("{} <{}> (id {})", user.display_name, user.email, user.id)
}

fn describe_session(session: &Session) -> String {
    match session {
        Session::Authenticated { user, .. } => format!("authenticated: {}", describe_user(user)),
        other => other.label().to_owned(),
    }
}

fn describe_admission(view: View, admission: Admission) -> String {
    match admission {
        Admission::Render => format!("{view}: render"),
        Admission::Redirect(to) => format!("{view}: redirect to {to}"),
        Admission::Wait => format!("{view}: waiting for session"),
    }
}
