use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use moodmeter_application::{InteractionController, MoodBoard};
use moodmeter_core::auth::{AuthSession, HOME_ROUTE, IdentityProvider, RouteDecision, RouteGate};
use moodmeter_core::identity::SessionContext;
use moodmeter_core::sync::MoodSynchronizer;
use moodmeter_infrastructure::{
    ConfigService, DevIdentityProvider, FileIdentityStore, InMemoryMoodStore, MoodMeterPaths,
};

mod commands;
mod logging;
mod render;
mod repl;

use repl::{CliHelper, Prompt, TerminalFailureSink, read_line};

#[derive(Parser)]
#[command(name = "moodmeter")]
#[command(about = "MoodMeter - share how you feel on a live mood board", long_about = None)]
struct Cli {
    /// Directory holding config.toml, local state and logs
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,
}

/// Walks the sign-in flow until the gate lets the user onto the board.
///
/// Returns `None` if the user abandons sign-in.
async fn sign_in(rl: &mut Prompt, provider: &DevIdentityProvider) -> Result<Option<AuthSession>> {
    let gate = RouteGate::new();

    loop {
        let session = provider.current_session().await;
        match gate.decide(HOME_ROUTE, session.is_some()) {
            RouteDecision::Proceed => return Ok(session),
            RouteDecision::Redirect(route) => tracing::debug!("[Main] Redirected to {}", route),
        }

        println!("{}", "Sign in with your email to join the board.".bright_yellow());
        let Some(email) = read_line(rl, "email> ")? else {
            return Ok(None);
        };
        if let Err(e) = provider.request_code(&email).await {
            println!("{}", e.to_string().red());
            continue;
        }
        if let Some(code) = provider.issued_code(&email) {
            println!("{}", format!("(dev) Your 6-digit code is {}", code).bright_black());
        }

        let Some(code) = read_line(rl, "code> ")? else {
            return Ok(None);
        };
        match provider.verify_code(&email, &code).await {
            Ok(user) => println!("{}", format!("Signed in as {}.", user.display_name).green()),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = MoodMeterPaths::new(cli.config_dir)?;
    paths.ensure_dirs()?;
    let config = ConfigService::new(paths.config_file()).get_config()?;

    let level = cli.log_level.unwrap_or_else(|| config.logging.level.clone());
    let _log_guard = logging::init_logging(&paths.logs_dir(), &level)?;
    tracing::info!("[Main] Starting moodmeter with config dir {}", paths.config_dir().display());

    let mut rl: Prompt = Prompt::new()?;
    rl.set_helper(Some(CliHelper::new()));

    let provider = DevIdentityProvider::new();
    let Some(session) = sign_in(&mut rl, &provider).await? else {
        println!("{}", "Goodbye!".bright_green());
        return Ok(());
    };
    tracing::info!("[Main] Signed in as {}", session.user.email);

    if config.has_backend_credentials() {
        tracing::warn!(
            "[Main] Backend {} configured, but this build only serves a local board",
            config.backend.url
        );
    }

    let store = Arc::new(InMemoryMoodStore::new(config.backend.table.clone()));
    let synchronizer = Arc::new(
        MoodSynchronizer::new(store.clone())
            .with_policy(config.sync)
            .with_failure_sink(Arc::new(TerminalFailureSink)),
    );
    let board = MoodBoard::new(synchronizer.clone(), store.clone(), config.backend.table.clone());
    if let Err(e) = board.start().await {
        println!("{}", format!("Could not load the board: {:#}. Use /status to retry.", e).red());
    }

    let identity_store = Arc::new(FileIdentityStore::new(
        paths.local_storage_file(),
        config.identity.storage_key.clone(),
    ));
    let context = SessionContext::restore(identity_store);
    let mut controller = InteractionController::new(context, synchronizer);

    let result = repl::run(&mut rl, &board, &mut controller).await;
    board.stop().await;
    result
}
