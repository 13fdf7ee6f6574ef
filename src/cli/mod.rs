//! Command-line interface - Parses commands and renders ledger views as text.
//!
//! One-shot commands run against a fresh session and exit, so `undo` is only offered
//! inside the interactive [`shell`], where a single session lives for the whole run.

/// Interactive shell holding a single session
pub mod shell;

use crate::{
    config::{AppConfig, last_file},
    core::{
        filter::Filter,
        movement::MovementKind,
        report::{ReportFormat, cutoff_for, format_movement_line},
        session::{LedgerSession, ViewState},
        store::LedgerStore,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Personal income and expense ledger.
#[derive(Parser, Debug)]
#[command(name = "damwallet", version, about = "Track income and expenses in a local wallet file")]
pub struct Cli {
    /// Wallet file to open (defaults to the last one used)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Command to run; lists every movement when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Ledger commands shared by the command line and the shell.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Record an income (or an expense with --expense)
    Add {
        /// Short label, 1 to 25 characters
        concept: String,
        /// Amount with at most two decimals; the sign is ignored
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Record the movement as an expense
        #[arg(long, short)]
        expense: bool,
    },
    /// Show movements and the balance
    List {
        /// Time window: all, month or year
        #[arg(long, short)]
        filter: Option<Filter>,
    },
    /// Delete a movement by id
    Delete {
        /// Id shown by `list`
        id: i64,
    },
    /// Export movements to a report file
    Export {
        /// Report format: csv, json or pdf
        format: ReportFormat,
        /// Destination file
        output: PathBuf,
        /// Only include movements after one month or year ago
        #[arg(long, short, default_value_t = Filter::All)]
        filter: Filter,
    },
    /// Start an interactive shell (enables undo)
    Shell,
}

impl Command {
    /// Human description of the operation, used to prefix error messages.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add movement",
            Self::List { .. } => "list movements",
            Self::Delete { .. } => "delete movement",
            Self::Export { .. } => "export report",
            Self::Shell => "start shell",
        }
    }
}

/// Opens the wallet at `explicit` (or the configured one) and records it as the last
/// wallet used. Failing to record it only logs a warning.
pub async fn open_session(
    app_config: &AppConfig,
    explicit: Option<&Path>,
) -> Result<LedgerSession> {
    let database_path = app_config.resolve_database_path(explicit);
    let store = LedgerStore::initialize(&database_path).await?;
    info!("Using wallet {}", database_path.display());

    if let Err(e) = last_file::remember_path(&app_config.last_file_path, &database_path) {
        warn!(
            "Could not record last wallet in {}: {}",
            app_config.last_file_path.display(),
            e
        );
    }
    Ok(LedgerSession::new(store))
}

/// Runs one ledger command against `session`, writing its output to `out`.
pub async fn execute(
    session: &mut LedgerSession,
    command: &Command,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Add {
            concept,
            amount,
            date,
            expense,
        } => {
            let kind = if *expense {
                MovementKind::Expense
            } else {
                MovementKind::Income
            };
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let view = session.add_movement(concept, *amount, date, kind).await?;
            writeln!(out, "Movement added.")?;
            print_view(out, &view)
        }
        Command::List { filter } => {
            let filter = filter.unwrap_or(session.filter());
            let view = session.set_filter(filter).await?;
            print_view(out, &view)
        }
        Command::Delete { id } => {
            let view = session.delete_movement(*id).await?;
            writeln!(out, "Movement #{id} deleted.")?;
            print_view(out, &view)
        }
        Command::Export {
            format,
            output,
            filter,
        } => {
            let cutoff = cutoff_for(*filter, Utc::now().date_naive());
            let report = format.report();
            let mut file = std::fs::File::create(output)?;
            let written = session
                .export_report(report.as_ref(), cutoff, &mut file)
                .await?;
            info!("Exported {} movements to {}", written, output.display());
            writeln!(
                out,
                "Exported {written} movements after {cutoff} to {}",
                output.display()
            )?;
            Ok(())
        }
        Command::Shell => Err(Error::Usage {
            message: "already running the shell".to_string(),
        }),
    }
}

/// Writes a view as one line per movement followed by the balance.
pub fn print_view(out: &mut dyn Write, view: &ViewState) -> Result<()> {
    if view.movements.is_empty() {
        writeln!(out, "No movements.")?;
    }
    for movement in &view.movements {
        writeln!(out, "{}", format_movement_line(movement))?;
    }
    writeln!(out, "Balance ({}): {:.2}", view.filter, view.balance)?;
    Ok(())
}

/// Operation named when configuration cannot be loaded.
pub const LOAD_CONFIGURATION: &str = "load configuration";

/// Operation named when the wallet cannot be opened.
pub const OPEN_WALLET: &str = "open wallet";

/// Writes an error the way users see it: `error: could not <operation>: <cause>`.
pub fn report_error(out: &mut dyn Write, operation: &str, error: &Error) -> Result<()> {
    writeln!(out, "error: could not {operation}: {error}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::errors::{LedgerError, StoreError};
    use crate::test_utils::*;

    fn temp_config(dir: &Path) -> AppConfig {
        AppConfig {
            database_path: dir.join("Default.db"),
            last_file_path: dir.join("config").join("last_path.txt"),
        }
    }

    #[test]
    fn test_parse_add_expense_with_negative_amount() {
        let cli = Cli::try_parse_from([
            "damwallet", "add", "Rent", "-650", "--expense", "--date", "2024-05-01",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Some(Command::Add {
                concept: "Rent".to_string(),
                amount: -650.0,
                date: NaiveDate::from_ymd_opt(2024, 5, 1),
                expense: true,
            })
        );
    }

    #[test]
    fn test_parse_export_and_global_database() {
        let cli = Cli::try_parse_from([
            "damwallet", "export", "csv", "out.csv", "--filter", "month", "-d", "w.db",
        ])
        .unwrap();

        assert_eq!(cli.database, Some(PathBuf::from("w.db")));
        assert_eq!(
            cli.command,
            Some(Command::Export {
                format: ReportFormat::Csv,
                output: PathBuf::from("out.csv"),
                filter: Filter::LastMonth,
            })
        );
    }

    #[test]
    fn test_parse_export_pdf() {
        let cli = Cli::try_parse_from(["damwallet", "export", "pdf", "out.pdf"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Export {
                format: ReportFormat::Pdf,
                filter: Filter::All,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["damwallet", "list", "--filter", "week"]).is_err());
    }

    #[tokio::test]
    async fn test_execute_add_and_list() -> Result<()> {
        let mut session = setup_test_session().await?;
        let mut out: Vec<u8> = Vec::new();

        let add = Command::Add {
            concept: "Salary".to_string(),
            amount: 1500.0,
            date: None,
            expense: false,
        };
        execute(&mut session, &add, &mut out).await?;
        execute(&mut session, &Command::List { filter: None }, &mut out).await?;

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Movement added."));
        assert!(text.contains("Salary"));
        assert!(text.contains("Balance (all): 1500.00"));
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_export_writes_file() -> Result<()> {
        let mut session = setup_test_session().await?;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.json");
        let mut out: Vec<u8> = Vec::new();

        let add = Command::Add {
            concept: "Salary".to_string(),
            amount: 1500.0,
            date: None,
            expense: false,
        };
        execute(&mut session, &add, &mut out).await?;
        let export = Command::Export {
            format: ReportFormat::Json,
            output: output.clone(),
            filter: Filter::LastMonth,
        };
        execute(&mut session, &export, &mut out).await?;

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output)?).unwrap();
        assert_eq!(value["total"], 1500.0);
        assert!(String::from_utf8(out).unwrap().contains("Exported 1 movements"));
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_delete_missing_names_the_operation() -> Result<()> {
        let mut session = setup_test_session().await?;
        let command = Command::Delete { id: 9 };

        let err = execute(&mut session, &command, &mut Vec::<u8>::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::NotFound { id: 9 })
        ));

        let mut out: Vec<u8> = Vec::new();
        report_error(&mut out, command.operation(), &err)?;
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "error: could not delete movement: Movement #9 not found\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_open_session_remembers_the_wallet() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let app_config = temp_config(dir.path());
        let wallet = dir.path().join("Home.db");

        let mut session = open_session(&app_config, Some(&wallet)).await?;
        assert!(session.refresh().await?.movements.is_empty());
        assert_eq!(
            last_file::read_last_path(&app_config.last_file_path),
            Some(wallet.clone())
        );

        // Without an explicit path the remembered wallet is used
        drop(session);
        let session = open_session(&app_config, None).await?;
        assert_eq!(session.store().path(), Some(wallet.as_path()));
        Ok(())
    }

    #[tokio::test]
    async fn test_open_session_failure_is_reported_as_opening_the_wallet() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let app_config = temp_config(dir.path());

        let err = open_session(&app_config, Some(dir.path())).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Store(StoreError::Unreachable { .. })
        ));
        assert_eq!(last_file::read_last_path(&app_config.last_file_path), None);

        let mut out: Vec<u8> = Vec::new();
        report_error(&mut out, OPEN_WALLET, &err)?;
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("error: could not open wallet: Database at"));
        assert_eq!(text.lines().count(), 1);
        Ok(())
    }
}
