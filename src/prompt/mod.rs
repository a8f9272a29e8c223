//! Prompt module: modal credential dialogs.
//!
//! This module provides:
//! - `Prompt<V>` with the `XpPrompt` and `VistaPrompt` variants (`base`, `xp`, `vista`)
//! - Flag enums and `FlagSet`, composed into native flag words (`flags`)
//! - The `CredentialDialog` seam and its request/result types (`dialog`)
//! - `TerminalDialog`, a dialoguer-based dialog (`terminal`)
//! - `NativeDialog`, the CredUI dialogs (`win32`, Windows only)

pub mod base;
pub mod dialog;
pub mod flags;
pub mod terminal;
pub mod vista;
pub mod xp;

#[cfg(windows)]
pub mod win32;

pub use base::{
    CredentialsPrompt, Prompt, PromptState, PromptVariant, MAX_CAPTION_LENGTH, MAX_MESSAGE_LENGTH,
    MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH,
};
pub use dialog::{
    platform_dialog, CredentialDialog, DialogKind, DialogRequest, DialogResult, OwnerWindow,
};
pub use flags::{FlagSet, LegacyFlag, PromptFlag, WindowsFlag};
pub use terminal::TerminalDialog;
pub use vista::{VistaPrompt, WindowsOptions};
pub use xp::{LegacyOptions, XpPrompt, MAX_TARGET_LENGTH};

#[cfg(windows)]
pub use win32::NativeDialog;
