use thiserror::Error;

/// All errors that can occur in credmgr.
///
/// Native outcomes (not found, access denied, user cancelled) are not
/// errors: they come back as `false` or `DialogResult::Cancelled`.
/// The variants here are programmer errors and bad input.
#[derive(Debug, Error)]
pub enum CredentialError {
    // --- Argument errors ---
    #[error("{0} cannot be null")]
    NullArgument(&'static str),

    #[error("{field} exceeds the maximum length of {max}")]
    OutOfRange { field: &'static str, max: usize },

    // --- State errors ---
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("{0} object is already disposed")]
    Disposed(&'static str),

    // --- Vault record errors ---
    #[error("Failed to decode {field} from vault record: {reason}")]
    Decode { field: &'static str, reason: String },

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Convenience type alias for credmgr results.
pub type Result<T> = std::result::Result<T, CredentialError>;
