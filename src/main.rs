use clap::Parser;
use damwallet::{
    cli::{self, Cli, Command, shell},
    config,
    errors::Error,
};
use dotenvy::dotenv;
use std::io;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    let args = Cli::parse();
    let command = args.command.clone().unwrap_or(Command::List { filter: None });

    // 3. Load the application configuration
    let app_config = match config::load_app_configuration() {
        Ok(app_config) => app_config,
        Err(e) => return fail(cli::LOAD_CONFIGURATION, &e),
    };

    // 4. Open the wallet
    let mut session = match cli::open_session(&app_config, args.database.as_deref()).await {
        Ok(session) => session,
        Err(e) => return fail(cli::OPEN_WALLET, &e),
    };

    // 5. Run the command
    let mut stdout = io::stdout();
    let result = match &command {
        Command::Shell => shell::run_shell(&mut session, io::stdin().lock(), &mut stdout).await,
        other => cli::execute(&mut session, other, &mut stdout).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(command.operation(), &e),
    }
}

/// Prints the failure once on stderr, naming the step that failed.
fn fail(operation: &str, e: &Error) -> ExitCode {
    if let Err(write_err) = cli::report_error(&mut io::stderr(), operation, e) {
        error!("could not {}: {} ({})", operation, e, write_err);
    }
    ExitCode::FAILURE
}
