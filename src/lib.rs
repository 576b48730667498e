//! db-workbench - a read-only SQL workbench with AI-assisted query repair.
//!
//! This library exposes the core modules for use in integration tests.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod llm;
pub mod logging;
pub mod persistence;
pub mod repl;
pub mod results;
pub mod safety;
pub mod session;
