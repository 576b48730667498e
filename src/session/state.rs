//! The single record of the most recent unresolved execution error.

/// Last execution error, shared by the executor and the repair loop.
///
/// Only a failed execution sets it. A blocked execution, a successful
/// execution, or an applied repair clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionErrorState {
    last_error: Option<String>,
}

impl SessionErrorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.last_error.is_some()
    }

    /// Records a failure. Returns true if the stored value changed.
    pub(crate) fn set(&mut self, message: impl Into<String>) -> bool {
        let message = Some(message.into());
        if self.last_error == message {
            return false;
        }
        self.last_error = message;
        true
    }

    /// Returns true if there was an error to clear.
    pub(crate) fn clear(&mut self) -> bool {
        self.last_error.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let mut state = SessionErrorState::new();
        assert!(!state.is_set());

        assert!(state.set("ORA-00001"));
        assert_eq!(state.last_error(), Some("ORA-00001"));
        assert!(!state.set("ORA-00001"));
        assert!(state.set("ORA-00942"));

        assert!(state.clear());
        assert!(!state.clear());
        assert_eq!(state.last_error(), None);
    }
}
