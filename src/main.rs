//! db-workbench - a read-only SQL workbench with AI-assisted query repair.

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::{error, info};

use db_workbench::app::build_session;
use db_workbench::cli::{Cli, Command, HistoryAction};
use db_workbench::config::Config;
use db_workbench::error::WorkbenchError;
use db_workbench::logging;
use db_workbench::repl::{render_entry, render_history, render_repair, render_run, Repl};
use db_workbench::results::ExportFormat;
use db_workbench::session::{RepairOutcome, RunOutcome, Session};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();
    let command = cli.command();

    if command == Command::Repl {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    if let Err(e) = run(&cli, command).await {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, command: Command) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let mut session = build_session(&config)
        .await
        .context("Failed to start session")?;

    match command {
        Command::Repl => {
            println!("db-workbench v{}", env!("CARGO_PKG_VERSION"));
            println!("Logging to {}", logging::get_log_path().display());
            Repl::new(session).run().await?;
        }
        Command::Run {
            sql,
            export,
            output,
        } => run_once(&mut session, &sql, export, output).await?,
        Command::Fix { sql } => fix_once(&mut session, sql).await?,
        Command::History { action } => {
            history(&mut session, action.unwrap_or(HistoryAction::List)).await?
        }
    }
    Ok(())
}

/// File, then environment, then command line; validated last.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let path = cli.config_path();
    info!("Loading config from: {}", path.display());
    Ok(Config::load(Some(&path), |config| cli.apply_overrides(config))?)
}

async fn run_once(
    session: &mut Session,
    sql: &str,
    export: Option<ExportFormat>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let outcome = session.run(sql).await;
    match (&outcome, export) {
        (RunOutcome::Rows { .. }, Some(format)) => {
            let path = session.export_to(format, output).await?;
            println!("Exported {format} to {}", path.display());
        }
        (RunOutcome::Error { message }, _) => {
            return Err(WorkbenchError::remote(message.clone()).into())
        }
        (RunOutcome::Blocked(_), _) => bail!("{}", render_run(&outcome, None)),
        _ => println!("{}", render_run(&outcome, session.results())),
    }
    Ok(())
}

async fn fix_once(session: &mut Session, sql: String) -> anyhow::Result<()> {
    let outcome = session.run(&sql).await;
    let RunOutcome::Error { message } = &outcome else {
        println!("{}", render_run(&outcome, session.results()));
        return Ok(());
    };
    eprintln!("Error: {message}");

    let mut editor = sql;
    let repair = session.repair(&mut editor).await;
    println!("{}", render_repair(&repair, &editor));
    if let RepairOutcome::Failed(message) = repair {
        bail!("{message}");
    }
    Ok(())
}

async fn history(session: &mut Session, action: HistoryAction) -> anyhow::Result<()> {
    match action {
        HistoryAction::List => {
            let entries = session.load_history().await?;
            println!("{}", render_history(entries));
        }
        HistoryAction::Show { index } => {
            session.load_history().await?;
            let entry = index
                .checked_sub(1)
                .and_then(|i| session.open_history(i))
                .with_context(|| format!("No history entry at position {index}"))?;
            println!("{}", render_entry(entry));
        }
        HistoryAction::Delete { id } => {
            session.load_history().await?;
            session.delete_history(id).await?;
            println!("Deleted history entry {id}.");
        }
    }
    Ok(())
}
