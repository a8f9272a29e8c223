//! One-way `Live -> Disposed` tag shared by credentials, sets and prompts.

use crate::errors::{CredentialError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    #[default]
    Live,
    Disposed,
}

impl Lifecycle {
    /// Fail with `Disposed` once the owner has been disposed.
    pub(crate) fn ensure_live(self, owner: &'static str) -> Result<()> {
        match self {
            Lifecycle::Live => Ok(()),
            Lifecycle::Disposed => Err(CredentialError::Disposed(owner)),
        }
    }

    /// Move to `Disposed`. Returns `true` only on the first call.
    pub(crate) fn dispose(&mut self) -> bool {
        let was_live = *self == Lifecycle::Live;
        *self = Lifecycle::Disposed;
        was_live
    }

    pub(crate) fn is_disposed(self) -> bool {
        self == Lifecycle::Disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_passes_check() {
        assert!(Lifecycle::Live.ensure_live("Credential").is_ok());
    }

    #[test]
    fn dispose_is_one_way() {
        let mut state = Lifecycle::default();
        assert!(state.dispose());
        assert!(!state.dispose());
        assert!(state.is_disposed());

        let err = state.ensure_live("Credential").unwrap_err();
        assert!(matches!(err, CredentialError::Disposed("Credential")));
    }
}
