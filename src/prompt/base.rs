//! `Prompt<V>`: configuration, validation and results shared by both
//! dialog variants.

use std::sync::Arc;

use tracing::debug;
use zeroize::Zeroizing;

use super::dialog::{
    platform_dialog, CredentialDialog, DialogKind, DialogRequest, DialogResult, OwnerWindow,
};
use super::flags::{FlagSet, PromptFlag};
use crate::errors::{CredentialError, Result};
use crate::lifecycle::Lifecycle;
use crate::secure::SecureSecret;

/// `CREDUI_MAX_USERNAME_LENGTH` as used by the prompts, in UTF-16 units.
pub const MAX_USERNAME_LENGTH: usize = 256;
/// `CREDUI_MAX_PASSWORD_LENGTH`, in UTF-16 units.
pub const MAX_PASSWORD_LENGTH: usize = 256;
/// `CREDUI_MAX_MESSAGE_LENGTH`, in UTF-16 units.
pub const MAX_MESSAGE_LENGTH: usize = 32767;
/// `CREDUI_MAX_CAPTION_LENGTH`, in UTF-16 units.
pub const MAX_CAPTION_LENGTH: usize = 128;

/// Where a prompt is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    Configuring,
    Showing,
    Confirmed,
    Cancelled,
    Disposed,
}

/// What differs between the legacy and the modern dialog.
pub trait PromptVariant: Default {
    type Flag: PromptFlag;

    /// Type name used in `Disposed` errors.
    const NAME: &'static str;
    const SAVE_CHECKBOX: Self::Flag;
    const GENERIC: Self::Flag;

    /// Checks that can only run once every property is set.
    fn validate(&self, flags: &FlagSet<Self::Flag>) -> Result<()>;

    fn dialog_kind<'a>(&'a self, flags: &FlagSet<Self::Flag>) -> DialogKind<'a>;
}

/// The operations every credentials prompt offers.
pub trait CredentialsPrompt {
    /// Show the dialog parented to `owner` and block until it closes.
    fn show_dialog_with_owner(&mut self, owner: OwnerWindow) -> Result<DialogResult>;

    /// Show the dialog without a parent window.
    fn show_dialog(&mut self) -> Result<DialogResult> {
        self.show_dialog_with_owner(OwnerWindow::NONE)
    }

    /// Wipe the secret and invalidate the prompt. Safe to call twice.
    fn dispose(&mut self);
}

/// A credentials prompt. Use the `XpPrompt` or `VistaPrompt` aliases.
///
/// Setters validate eagerly; flag combinations are validated when the
/// dialog is shown. Any mutation puts the prompt back in `Configuring`.
pub struct Prompt<V: PromptVariant> {
    dialog: Arc<dyn CredentialDialog>,
    lifecycle: Lifecycle,
    state: PromptState,
    username: String,
    secret: SecureSecret,
    save_checked: bool,
    message: Option<String>,
    title: Option<String>,
    error_code: u32,
    flags: FlagSet<V::Flag>,
    variant: V,
}

/// Length in UTF-16 units, the unit native caps are expressed in.
pub(crate) fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Reject `None` and text longer than `max` UTF-16 units.
pub(crate) fn checked_text<'a>(
    field: &'static str,
    value: Option<&'a str>,
    max: usize,
) -> Result<&'a str> {
    let value = value.ok_or(CredentialError::NullArgument(field))?;
    if utf16_len(value) > max {
        return Err(CredentialError::OutOfRange { field, max });
    }
    Ok(value)
}

/// Like `checked_text`, but an empty string counts as missing.
fn checked_non_empty<'a>(
    field: &'static str,
    value: Option<&'a str>,
    max: usize,
) -> Result<&'a str> {
    match value {
        Some("") | None => Err(CredentialError::NullArgument(field)),
        value => checked_text(field, value, max),
    }
}

impl<V: PromptVariant> Prompt<V> {
    /// A prompt that shows the platform dialog.
    pub fn new() -> Self {
        Self::with_dialog(platform_dialog())
    }

    pub fn with_dialog(dialog: Arc<dyn CredentialDialog>) -> Self {
        Self {
            dialog,
            lifecycle: Lifecycle::Live,
            state: PromptState::Configuring,
            username: String::new(),
            secret: SecureSecret::new(),
            save_checked: false,
            message: None,
            title: None,
            error_code: 0,
            flags: FlagSet::new(),
            variant: V::default(),
        }
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    /// The username; empty until set or entered.
    pub fn username(&self) -> Result<&str> {
        self.ensure_live()?;
        Ok(&self.username)
    }

    pub fn set_username<'a>(&mut self, username: impl Into<Option<&'a str>>) -> Result<()> {
        self.ensure_live()?;
        let username = checked_text("username", username.into(), MAX_USERNAME_LENGTH)?;
        self.mutate()?;
        self.username = username.to_string();
        Ok(())
    }

    /// The password as a short-lived plain-text copy.
    pub fn password(&self) -> Result<Zeroizing<String>> {
        self.ensure_live()?;
        Ok(self.secret.reveal())
    }

    pub fn set_password<'a>(&mut self, password: impl Into<Option<&'a str>>) -> Result<()> {
        self.ensure_live()?;
        let password = checked_text("password", password.into(), MAX_PASSWORD_LENGTH)?;
        self.mutate()?;
        self.secret.assign(password);
        Ok(())
    }

    /// An independent copy of the password.
    pub fn secure_password(&self) -> Result<SecureSecret> {
        self.ensure_live()?;
        Ok(self.secret.clone())
    }

    pub fn set_secure_password(&mut self, password: &SecureSecret) -> Result<()> {
        self.ensure_live()?;
        if password.utf16_len() > MAX_PASSWORD_LENGTH {
            return Err(CredentialError::OutOfRange {
                field: "password",
                max: MAX_PASSWORD_LENGTH,
            });
        }
        self.mutate()?;
        password.with_revealed(|plain| self.secret.assign(plain));
        Ok(())
    }

    pub fn message(&self) -> Result<Option<&str>> {
        self.ensure_live()?;
        Ok(self.message.as_deref())
    }

    pub fn set_message<'a>(&mut self, message: impl Into<Option<&'a str>>) -> Result<()> {
        self.ensure_live()?;
        let message = checked_non_empty("message", message.into(), MAX_MESSAGE_LENGTH)?;
        self.mutate()?;
        self.message = Some(message.to_string());
        Ok(())
    }

    pub fn title(&self) -> Result<Option<&str>> {
        self.ensure_live()?;
        Ok(self.title.as_deref())
    }

    pub fn set_title<'a>(&mut self, title: impl Into<Option<&'a str>>) -> Result<()> {
        self.ensure_live()?;
        let title = checked_non_empty("title", title.into(), MAX_CAPTION_LENGTH)?;
        self.mutate()?;
        self.title = Some(title.to_string());
        Ok(())
    }

    /// Whether the save checkbox is (or was left) ticked.
    pub fn save_checked(&self) -> Result<bool> {
        self.ensure_live()?;
        Ok(self.save_checked)
    }

    pub fn set_save_checked(&mut self, checked: bool) -> Result<()> {
        self.mutate()?;
        self.save_checked = checked;
        Ok(())
    }

    /// Authentication error shown by the dialog; 0 for none.
    pub fn error_code(&self) -> Result<u32> {
        self.ensure_live()?;
        Ok(self.error_code)
    }

    pub fn set_error_code(&mut self, code: u32) -> Result<()> {
        self.mutate()?;
        self.error_code = code;
        Ok(())
    }

    pub fn show_save_checkbox(&self) -> Result<bool> {
        self.flag(V::SAVE_CHECKBOX)
    }

    pub fn set_show_save_checkbox(&mut self, on: bool) -> Result<()> {
        self.set_flag(V::SAVE_CHECKBOX, on)
    }

    pub fn generic_credentials(&self) -> Result<bool> {
        self.flag(V::GENERIC)
    }

    pub fn set_generic_credentials(&mut self, on: bool) -> Result<()> {
        self.set_flag(V::GENERIC, on)
    }

    /// Whether `flag` is switched on.
    pub fn flag(&self, flag: V::Flag) -> Result<bool> {
        self.ensure_live()?;
        Ok(self.flags.contains(flag))
    }

    pub fn set_flag(&mut self, flag: V::Flag, on: bool) -> Result<()> {
        self.mutate()?;
        self.flags.set(flag, on);
        Ok(())
    }

    /// The native flag word as it would be passed right now.
    pub fn flag_bits(&self) -> Result<u32> {
        self.ensure_live()?;
        Ok(self.flags.bits())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    pub(crate) fn variant(&self) -> Result<&V> {
        self.ensure_live()?;
        Ok(&self.variant)
    }

    pub(crate) fn variant_mut(&mut self) -> Result<&mut V> {
        self.mutate()?;
        Ok(&mut self.variant)
    }

    fn ensure_live(&self) -> Result<()> {
        self.lifecycle.ensure_live(V::NAME)
    }

    /// Every mutation goes back to `Configuring`.
    fn mutate(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.state = PromptState::Configuring;
        Ok(())
    }
}

impl<V: PromptVariant> CredentialsPrompt for Prompt<V> {
    fn show_dialog_with_owner(&mut self, owner: OwnerWindow) -> Result<DialogResult> {
        self.ensure_live()?;
        self.variant.validate(&self.flags)?;

        self.state = PromptState::Showing;
        let kind = self.variant.dialog_kind(&self.flags);
        debug!(prompt = V::NAME, flags = kind.flags(), "showing credentials dialog");

        let result = self.dialog.prompt(DialogRequest {
            kind,
            auth_error: self.error_code,
            caption: self.title.as_deref(),
            message: self.message.as_deref(),
            owner,
            username: &mut self.username,
            secret: &mut self.secret,
            save_checked: &mut self.save_checked,
        });

        self.state = match result {
            DialogResult::Confirmed => PromptState::Confirmed,
            DialogResult::Cancelled => PromptState::Cancelled,
        };
        debug!(prompt = V::NAME, ?result, "credentials dialog closed");
        Ok(result)
    }

    fn dispose(&mut self) {
        if self.lifecycle.dispose() {
            self.secret.dispose();
            self.state = PromptState::Disposed;
        }
    }
}

impl<V: PromptVariant> Default for Prompt<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PromptVariant> std::fmt::Debug for Prompt<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(V::NAME)
            .field("state", &self.state)
            .field("username", &self.username)
            .field("title", &self.title)
            .field("flags", &format_args!("{:#x}", self.flags.bits()))
            .finish_non_exhaustive()
    }
}
