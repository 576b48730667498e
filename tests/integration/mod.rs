//! Integration tests for db-workbench.

pub mod client_test;
pub mod history_test;
pub mod session_test;
