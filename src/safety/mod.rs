//! Pre-execution safety gate.
//!
//! The workbench is read-only: any statement carrying a mutating keyword as a
//! whole word is refused before it reaches the database endpoint.

mod gate;

pub use gate::SecurityGate;

use std::fmt;

/// Statement keywords the gate refuses, in the order they are tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockedKeyword {
    Drop,
    Delete,
    Truncate,
    Update,
    Alter,
    Create,
    Grant,
    Revoke,
    Insert,
}

impl BlockedKeyword {
    /// Every denylisted keyword, in match priority order.
    pub const ALL: [BlockedKeyword; 9] = [
        Self::Drop,
        Self::Delete,
        Self::Truncate,
        Self::Update,
        Self::Alter,
        Self::Create,
        Self::Grant,
        Self::Revoke,
        Self::Insert,
    ];

    /// Returns the keyword as it appears in SQL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "DROP",
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Update => "UPDATE",
            Self::Alter => "ALTER",
            Self::Create => "CREATE",
            Self::Grant => "GRANT",
            Self::Revoke => "REVOKE",
            Self::Insert => "INSERT",
        }
    }
}

impl fmt::Display for BlockedKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of checking a statement against the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No denylisted keyword was found.
    Allowed,
    /// The first denylisted keyword found, in priority order.
    Blocked(BlockedKeyword),
}

impl Verdict {
    /// Returns true if the statement may be sent.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_display() {
        assert_eq!(BlockedKeyword::Drop.to_string(), "DROP");
        assert_eq!(BlockedKeyword::Update.to_string(), "UPDATE");
        assert_eq!(BlockedKeyword::Insert.to_string(), "INSERT");
    }

    #[test]
    fn test_priority_order() {
        let names: Vec<&str> = BlockedKeyword::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "DROP", "DELETE", "TRUNCATE", "UPDATE", "ALTER", "CREATE", "GRANT", "REVOKE",
                "INSERT"
            ]
        );
    }

    #[test]
    fn test_verdict_is_allowed() {
        assert!(Verdict::Allowed.is_allowed());
        assert!(!Verdict::Blocked(BlockedKeyword::Grant).is_allowed());
    }
}
