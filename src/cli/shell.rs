//! Interactive shell.
//!
//! Lines are split with shell quoting rules, so `add "Coffee beans" 3.50 -e` works,
//! and parsed with the same commands as the command line plus `undo`, `filter`,
//! `guide` and `quit`. Errors are printed and the shell keeps going.

use crate::{
    cli::{Command, execute, print_view, report_error},
    core::{filter::Filter, session::LedgerSession},
    errors::Result,
};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use tracing::{debug, info};

const PROMPT: &str = "damwallet> ";

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    #[command(flatten)]
    Ledger(Command),
    /// Restore the most recently deleted movement
    Undo,
    /// Switch the time window; cycles all -> month -> year without an argument
    Filter {
        /// all, month or year
        filter: Option<Filter>,
    },
    /// Suspend (on) or resume (off) editing while a guided tour runs
    Guide {
        /// on or off
        state: GuideState,
    },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum GuideState {
    On,
    Off,
}

enum Flow {
    Continue,
    Exit,
}

/// Reads commands from `input` until end of input or `quit`.
pub async fn run_shell<R: BufRead>(
    session: &mut LedgerSession,
    mut input: R,
    out: &mut dyn Write,
) -> Result<()> {
    info!("Starting interactive shell");
    print_view(out, &session.refresh().await?)?;

    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        let tokens = match shell_words::split(line.trim()) {
            Ok(tokens) => tokens,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };
        if tokens.is_empty() {
            continue;
        }

        let parsed = match ShellLine::try_parse_from(&tokens) {
            Ok(parsed) => parsed,
            Err(e) => {
                write!(out, "{e}")?;
                continue;
            }
        };

        debug!(?parsed.command, "Shell command");
        if let Flow::Exit = dispatch(session, parsed.command, out).await? {
            break;
        }
    }

    info!("Shell closed");
    Ok(())
}

async fn dispatch(
    session: &mut LedgerSession,
    command: ShellCommand,
    out: &mut dyn Write,
) -> Result<Flow> {
    let (operation, result) = match command {
        ShellCommand::Ledger(command) => (
            command.operation(),
            execute(session, &command, out).await,
        ),
        ShellCommand::Undo => ("undo delete", undo(session, out).await),
        ShellCommand::Filter { filter } => (
            "change filter",
            change_filter(session, filter, out).await,
        ),
        ShellCommand::Guide { state } => {
            session.set_active(state == GuideState::Off);
            let mode = if session.is_active() { "off" } else { "on" };
            writeln!(out, "Guided mode {mode}.")?;
            ("toggle guided mode", Ok(()))
        }
        ShellCommand::Quit => return Ok(Flow::Exit),
    };

    if let Err(e) = result {
        report_error(out, operation, &e)?;
    }
    Ok(Flow::Continue)
}

async fn undo(session: &mut LedgerSession, out: &mut dyn Write) -> Result<()> {
    let view = session.undo_last_delete().await?;
    writeln!(out, "Movement restored.")?;
    print_view(out, &view)
}

async fn change_filter(
    session: &mut LedgerSession,
    filter: Option<Filter>,
    out: &mut dyn Write,
) -> Result<()> {
    let view = match filter {
        Some(filter) => session.set_filter(filter).await?,
        None => session.cycle_filter().await?,
    };
    print_view(out, &view)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    async fn run_script(script: &str) -> Result<String> {
        let mut session = setup_test_session().await?;
        let mut out: Vec<u8> = Vec::new();
        run_shell(&mut session, script.as_bytes(), &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_delete_and_undo_within_one_shell() -> Result<()> {
        let output = run_script(
            "add Salary 1500\n\
             add Rent 650 --expense\n\
             delete 2\n\
             undo\n\
             undo\n\
             quit\n\
             list\n",
        )
        .await?;

        assert!(output.contains("Balance (all): 850.00"));
        assert!(output.contains("Movement #2 deleted."));
        assert!(output.contains("Balance (all): 1500.00"));
        assert!(output.contains("Movement restored."));
        assert!(output.contains("error: could not undo delete: Nothing to undo"));
        // Nothing after quit runs
        assert_eq!(output.matches("Balance (all): 850.00").count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_quoted_concepts_and_bad_input() -> Result<()> {
        let output = run_script(
            "add \"Coffee beans\" 3.50 -e\n\
             add 'unterminated 1\n\
             add Bad 1.234\n\
             frobnicate\n",
        )
        .await?;

        assert!(output.contains("Coffee beans"));
        assert!(output.contains("Balance (all): -3.50"));
        assert!(output.contains("error: missing closing quote"));
        assert!(output.contains("error: could not add movement: Invalid movement"));
        assert!(output.contains("unrecognized subcommand"));
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_cycles_and_guided_mode_blocks_edits() -> Result<()> {
        let output = run_script(
            "filter\n\
             filter\n\
             filter all\n\
             guide on\n\
             add Salary 1500\n\
             guide off\n\
             add Salary 1500\n",
        )
        .await?;

        assert!(output.contains("Balance (month): 0.00"));
        assert!(output.contains("Balance (year): 0.00"));
        assert!(output.contains("Guided mode on."));
        assert!(output.contains("error: could not add movement: Ledger is suspended"));
        assert!(output.contains("Guided mode off."));
        assert!(output.contains("Balance (all): 1500.00"));
        Ok(())
    }
}
