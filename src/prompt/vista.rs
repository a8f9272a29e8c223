//! `VistaPrompt`: the modern dialog (`CredUIPromptForWindowsCredentialsW`).

use super::base::{Prompt, PromptVariant};
use super::dialog::DialogKind;
use super::flags::{FlagSet, WindowsFlag};
use crate::errors::Result;

/// The modern dialog has no settings beyond the shared ones.
#[derive(Debug, Default)]
pub struct WindowsOptions;

impl PromptVariant for WindowsOptions {
    type Flag = WindowsFlag;

    const NAME: &'static str = "VistaPrompt";
    const SAVE_CHECKBOX: WindowsFlag = WindowsFlag::Checkbox;
    const GENERIC: WindowsFlag = WindowsFlag::Generic;

    fn validate(&self, _flags: &FlagSet<WindowsFlag>) -> Result<()> {
        Ok(())
    }

    fn dialog_kind<'a>(&'a self, flags: &FlagSet<WindowsFlag>) -> DialogKind<'a> {
        DialogKind::Windows { flags: flags.bits() }
    }
}

/// The modern credentials prompt.
pub type VistaPrompt = Prompt<WindowsOptions>;
