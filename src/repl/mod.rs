//! Interactive line-based front end over a [`Session`].
//!
//! The REPL keeps the editor text; the session keeps everything else.

mod command;
mod render;

pub use command::{parse_line, ReplCommand, HELP};
pub use render::{
    render_entry, render_generate, render_history, render_repair, render_run, render_stats,
    render_table, MAX_DISPLAY_ROWS,
};

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::error::{Result, WorkbenchError};
use crate::session::Session;

const PROMPT: &str = "sql> ";

/// What the loop does after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Print the text (if any) and read the next line.
    Continue(String),
    Quit,
}

impl Step {
    fn say(text: impl Into<String>) -> Self {
        Self::Continue(text.into())
    }
}

/// REPL state: a session plus the editor buffer.
pub struct Repl {
    session: Session,
    editor: String,
    clipboard: Option<arboard::Clipboard>,
}

impl Repl {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            editor: String::new(),
            clipboard: None,
        }
    }

    pub fn editor(&self) -> &str {
        &self.editor
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Reads lines from stdin until `:quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        if let Err(e) = self.session.load_history().await {
            warn!("Could not load history at startup: {e}");
        }

        println!("Type :help for commands.");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("{PROMPT}");
            std::io::stdout()
                .flush()
                .map_err(|e| WorkbenchError::internal(format!("stdout: {e}")))?;

            let line = lines
                .next_line()
                .await
                .map_err(|e| WorkbenchError::internal(format!("stdin: {e}")))?;
            let Some(line) = line else {
                break;
            };

            let step = match parse_line(&line) {
                Ok(command) => self.handle(command).await,
                Err(message) => Step::Continue(message),
            };
            match step {
                Step::Continue(text) if text.is_empty() => {}
                Step::Continue(text) => println!("{text}"),
                Step::Quit => break,
            }
        }
        Ok(())
    }

    /// Applies one command.
    pub async fn handle(&mut self, command: ReplCommand) -> Step {
        debug!("REPL command: {command:?}");
        match command {
            ReplCommand::Nothing => Step::say(""),
            ReplCommand::Help => Step::say(HELP),
            ReplCommand::Quit => Step::Quit,
            ReplCommand::Sql(sql) => {
                self.editor = sql;
                self.run_editor().await
            }
            ReplCommand::Run => {
                if self.editor.trim().is_empty() {
                    return Step::say("The editor is empty.");
                }
                self.run_editor().await
            }
            ReplCommand::Show => {
                if self.editor.is_empty() {
                    Step::say("The editor is empty.")
                } else {
                    Step::say(self.editor.clone())
                }
            }
            ReplCommand::Sort(column) => {
                if self.session.sort(column) {
                    let table = self
                        .session
                        .results()
                        .map(|r| render_table(r, MAX_DISPLAY_ROWS))
                        .unwrap_or_default();
                    Step::say(table)
                } else {
                    Step::say("Nothing to sort by that column.")
                }
            }
            ReplCommand::Stats => {
                if self.session.results().is_none() {
                    return Step::say("Run a query first.");
                }
                Step::say(render_stats(self.session.stats()))
            }
            ReplCommand::Fix => {
                let outcome = self.session.repair(&mut self.editor).await;
                Step::say(render_repair(&outcome, &self.editor))
            }
            ReplCommand::Ask(question) => {
                let outcome = self.session.generate(&question, &mut self.editor).await;
                Step::say(render_generate(&outcome))
            }
            ReplCommand::Export { format, path } => {
                match self.session.export_to(format, path).await {
                    Ok(path) => Step::say(format!("Exported {format} to {}", path.display())),
                    Err(e) => Step::say(e.to_string()),
                }
            }
            ReplCommand::History => match self.session.load_history().await {
                Ok(entries) => Step::say(render_history(entries)),
                Err(e) => Step::say(format!("Could not load history: {e}")),
            },
            ReplCommand::Open(index) => match self.session.open_history(index) {
                Some(entry) => Step::say(render_entry(entry)),
                None => Step::say("No such history entry. Use :history to list them."),
            },
            ReplCommand::Load(index) => match self.session.open_history(index) {
                Some(entry) => {
                    self.editor = entry.sql.clone();
                    Step::say(format!("Loaded into the editor:\n{}", self.editor))
                }
                None => Step::say("No such history entry. Use :history to list them."),
            },
            ReplCommand::Copy(index) => {
                let Some(text) = self.session.row_text(index) else {
                    return Step::say("No such row.");
                };
                match self.copy_to_clipboard(text) {
                    Ok(()) => Step::say(format!("Row {} copied.", index + 1)),
                    Err(e) => Step::say(format!("Copy failed: {e}")),
                }
            }
        }
    }

    async fn run_editor(&mut self) -> Step {
        let outcome = self.session.run(&self.editor).await;
        Step::say(render_run(&outcome, self.session.results()))
    }

    fn copy_to_clipboard(&mut self, text: String) -> Result<()> {
        if self.clipboard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| WorkbenchError::internal(format!("Clipboard unavailable: {e}")))?;
            self.clipboard = Some(clipboard);
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard
                .set_text(text)
                .map_err(|e| WorkbenchError::internal(format!("Clipboard write failed: {e}")))?;
        }
        Ok(())
    }
}
