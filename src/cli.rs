//! Command-line argument parsing for the workbench.

use crate::config::Config;
use crate::llm::LlmProvider;
use crate::results::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// A read-only SQL workbench with AI-assisted query repair.
#[derive(Parser, Debug)]
#[command(name = "workbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Workbench server URL (overrides config)
    #[arg(long, value_name = "URL", env = "WORKBENCH_URL", global = true)]
    pub url: Option<String>,

    /// AI provider: server, ollama or mock (overrides config)
    #[arg(long, value_name = "PROVIDER", global = true)]
    pub llm: Option<LlmProvider>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run one statement and print the result
    Run {
        /// SQL text
        sql: String,

        /// Export the rows instead of printing a table
        #[arg(long, value_name = "FORMAT")]
        export: Option<ExportFormat>,

        /// Export destination (defaults to a timestamped file name)
        #[arg(long, value_name = "PATH", requires = "export")]
        output: Option<PathBuf>,
    },

    /// Inspect query history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Run a statement and, if it fails, print a suggested fix
    Fix {
        /// SQL text
        sql: String,
    },

    /// Interactive session (default)
    Repl,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    /// List entries, newest first (default)
    List,
    /// Print the full statement of entry N (1-based position in the list)
    Show { index: usize },
    /// Delete the entry with the given id
    Delete { id: i64 },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path (CLI arg or default).
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// The subcommand to run, defaulting to the REPL.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Repl)
    }

    /// Applies command-line overrides on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.server.url = url.clone();
        }
        if let Some(provider) = self.llm {
            config.llm.provider = provider;
        }
    }
}
