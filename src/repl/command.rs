//! Parsing of REPL input lines.
//!
//! Lines starting with `:` are commands; anything else is SQL. Positions
//! typed by the user (`:sort 2`, `:open 1`) are 1-based and converted to
//! 0-based here.

use crate::results::ExportFormat;
use std::path::PathBuf;

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Replace the editor text and run it.
    Sql(String),
    /// Run the editor text again.
    Run,
    /// Print the editor text.
    Show,
    Sort(usize),
    /// Print the column statistics of the current results.
    Stats,
    Fix,
    Ask(String),
    Export {
        format: ExportFormat,
        path: Option<PathBuf>,
    },
    History,
    Open(usize),
    Load(usize),
    Copy(usize),
    Help,
    Quit,
    /// Blank line.
    Nothing,
}

/// Parses one line of input.
pub fn parse_line(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Nothing);
    }

    let Some(rest) = line.strip_prefix(':') else {
        return Ok(ReplCommand::Sql(line.to_string()));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name.to_lowercase().as_str() {
        "run" | "r" => Ok(ReplCommand::Run),
        "show" => Ok(ReplCommand::Show),
        "sort" => parse_position(args, ":sort").map(ReplCommand::Sort),
        "stats" => Ok(ReplCommand::Stats),
        "fix" => Ok(ReplCommand::Fix),
        "ask" => {
            if args.is_empty() {
                Err("Usage: :ask <question>".to_string())
            } else {
                Ok(ReplCommand::Ask(args.to_string()))
            }
        }
        "export" => parse_export(args),
        "history" | "h" => Ok(ReplCommand::History),
        "open" => parse_position(args, ":open").map(ReplCommand::Open),
        "load" => parse_position(args, ":load").map(ReplCommand::Load),
        "copy" => parse_position(args, ":copy").map(ReplCommand::Copy),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "q" | "exit" => Ok(ReplCommand::Quit),
        other => Err(format!("Unknown command: :{other}. Type :help for commands.")),
    }
}

/// Parses a 1-based position into a 0-based index.
fn parse_position(args: &str, usage: &str) -> Result<usize, String> {
    match args.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("Usage: {usage} <N> (N starts at 1)")),
    }
}

fn parse_export(args: &str) -> Result<ReplCommand, String> {
    let mut parts = args.split_whitespace();
    let format = match parts.next() {
        Some(f) => f.parse::<ExportFormat>()?,
        None => return Err("Usage: :export <csv|pipe> [PATH]".to_string()),
    };
    let path = parts.next().map(PathBuf::from);
    Ok(ReplCommand::Export { format, path })
}

/// Help text listing every command.
pub const HELP: &str = "\
Type SQL to run it. Commands:
  :run              run the editor text again
  :show             print the editor text
  :sort N           sort by column N (again to flip direction)
  :stats            column statistics of the results
  :fix              ask for a fix for the last error
  :ask TEXT         generate SQL from a question
  :export FMT [P]   export rows as csv or pipe
  :history          list query history
  :open N           show history entry N
  :load N           put history entry N in the editor
  :copy N           copy result row N to the clipboard
  :quit             leave";
