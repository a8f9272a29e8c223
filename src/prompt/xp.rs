//! `XpPrompt`: the legacy dialog (`CredUIPromptForCredentialsW`).

use super::base::{checked_text, Prompt, PromptVariant};
use super::dialog::DialogKind;
use super::flags::{FlagSet, LegacyFlag};
use crate::errors::{CredentialError, Result};

/// `CREDUI_MAX_GENERIC_TARGET_LENGTH`, in UTF-16 units.
pub const MAX_TARGET_LENGTH: usize = 32767;

/// Legacy-only settings.
#[derive(Debug, Default)]
pub struct LegacyOptions {
    target: Option<String>,
}

impl PromptVariant for LegacyOptions {
    type Flag = LegacyFlag;

    const NAME: &'static str = "XpPrompt";
    const SAVE_CHECKBOX: LegacyFlag = LegacyFlag::ShowSaveCheckBox;
    const GENERIC: LegacyFlag = LegacyFlag::GenericCredentials;

    fn validate(&self, flags: &FlagSet<LegacyFlag>) -> Result<()> {
        if self.target.as_deref().map_or(true, str::is_empty) {
            return Err(CredentialError::InvalidState(
                "Target must be specified to show the dialog.".into(),
            ));
        }
        if flags.contains(LegacyFlag::AlwaysShowUI)
            && !flags.contains(LegacyFlag::GenericCredentials)
        {
            return Err(CredentialError::InvalidState(
                "AlwaysShowUI requires GenericCredentials.".into(),
            ));
        }
        Ok(())
    }

    fn dialog_kind<'a>(&'a self, flags: &FlagSet<LegacyFlag>) -> DialogKind<'a> {
        DialogKind::Legacy {
            target: self.target.as_deref().unwrap_or_default(),
            flags: flags.bits(),
        }
    }
}

/// The legacy credentials prompt.
pub type XpPrompt = Prompt<LegacyOptions>;

macro_rules! legacy_flags {
    ($($flag:ident => $get:ident, $set:ident;)*) => {
        $(
            pub fn $get(&self) -> Result<bool> {
                self.flag(LegacyFlag::$flag)
            }

            pub fn $set(&mut self, on: bool) -> Result<()> {
                self.set_flag(LegacyFlag::$flag, on)
            }
        )*
    };
}

impl Prompt<LegacyOptions> {
    /// The server or resource the credentials are for.
    pub fn target(&self) -> Result<Option<&str>> {
        Ok(self.variant()?.target.as_deref())
    }

    pub fn set_target<'a>(&mut self, target: impl Into<Option<&'a str>>) -> Result<()> {
        self.variant()?;
        let target = checked_text("target", target.into(), MAX_TARGET_LENGTH)?;
        self.variant_mut()?.target = Some(target.to_string());
        Ok(())
    }

    legacy_flags! {
        AlwaysShowUI => always_show_ui, set_always_show_ui;
        CompleteUsername => complete_username, set_complete_username;
        DoNotPersist => do_not_persist, set_do_not_persist;
        ExcludeCertificates => exclude_certificates, set_exclude_certificates;
        ExpectConfirmation => expect_confirmation, set_expect_confirmation;
        IncorrectPassword => incorrect_password, set_incorrect_password;
        Persist => persist, set_persist;
        RequestAdministrator => request_administrator, set_request_administrator;
        RequireCertificate => require_certificate, set_require_certificate;
        RequireSmartCard => require_smart_card, set_require_smart_card;
        UsernameReadOnly => username_read_only, set_username_read_only;
        ValidateUsername => validate_username, set_validate_username;
    }
}
