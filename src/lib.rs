pub mod cli;
pub mod config;
pub mod credential;
pub mod errors;
pub mod prompt;
pub mod secure;
pub mod vault;

mod lifecycle;

pub use credential::{Credential, CredentialSet};
pub use errors::{CredentialError, Result};
pub use prompt::{CredentialsPrompt, DialogResult, OwnerWindow, VistaPrompt, XpPrompt};
pub use secure::{SecureSecret, TextFormat};
pub use vault::{CredentialType, PersistenceType};
