//! The boundary to the modal credential dialog.

use std::sync::{Arc, OnceLock};

use crate::secure::SecureSecret;

use super::flags::{LegacyFlag, PromptFlag, WindowsFlag};

/// Parent window for the dialog, as a raw `HWND`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnerWindow(pub isize);

impl OwnerWindow {
    /// No parent window.
    pub const NONE: OwnerWindow = OwnerWindow(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// How the user dismissed the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResult {
    Confirmed,
    Cancelled,
}

/// Which native dialog to show, with its composed flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind<'a> {
    /// `CredUIPromptForCredentialsW` with `CREDUI_FLAGS_*`.
    Legacy { target: &'a str, flags: u32 },
    /// `CredUIPromptForWindowsCredentialsW` with `CREDUIWIN_*`.
    Windows { flags: u32 },
}

impl DialogKind<'_> {
    pub fn flags(&self) -> u32 {
        match *self {
            DialogKind::Legacy { flags, .. } | DialogKind::Windows { flags } => flags,
        }
    }

    pub fn shows_save_checkbox(&self) -> bool {
        match *self {
            DialogKind::Legacy { flags, .. } => flags & LegacyFlag::ShowSaveCheckBox.bit() != 0,
            DialogKind::Windows { flags } => flags & WindowsFlag::Checkbox.bit() != 0,
        }
    }

    pub fn username_read_only(&self) -> bool {
        match *self {
            DialogKind::Legacy { flags, .. } => flags & LegacyFlag::UsernameReadOnly.bit() != 0,
            DialogKind::Windows { .. } => false,
        }
    }
}

/// One dialog invocation.
///
/// `username`, `secret` and `save_checked` go in as the initial values
/// and hold what the user entered once the dialog returns `Confirmed`.
#[derive(Debug)]
pub struct DialogRequest<'a> {
    pub kind: DialogKind<'a>,
    /// Authentication error to show, 0 for none.
    pub auth_error: u32,
    pub caption: Option<&'a str>,
    pub message: Option<&'a str>,
    pub owner: OwnerWindow,
    pub username: &'a mut String,
    pub secret: &'a mut SecureSecret,
    pub save_checked: &'a mut bool,
}

/// A modal credential dialog. `prompt` blocks until it is dismissed.
pub trait CredentialDialog: Send + Sync {
    fn prompt(&self, request: DialogRequest<'_>) -> DialogResult;
}

static PLATFORM_DIALOG: OnceLock<Arc<dyn CredentialDialog>> = OnceLock::new();

/// The dialog for this platform, resolved once per process.
pub fn platform_dialog() -> Arc<dyn CredentialDialog> {
    Arc::clone(PLATFORM_DIALOG.get_or_init(init_platform_dialog))
}

#[cfg(windows)]
fn init_platform_dialog() -> Arc<dyn CredentialDialog> {
    Arc::new(super::win32::NativeDialog::new())
}

#[cfg(not(windows))]
fn init_platform_dialog() -> Arc<dyn CredentialDialog> {
    tracing::debug!("no native credential dialog on this OS; prompting on the terminal");
    Arc::new(super::terminal::TerminalDialog::new())
}
