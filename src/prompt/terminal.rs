//! A credentials dialog on the terminal, for platforms without CredUI.

use console::style;
use dialoguer::{Confirm, Input, Password};
use tracing::debug;
use zeroize::Zeroizing;

use super::base::{utf16_len, MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH};
use super::dialog::{CredentialDialog, DialogKind, DialogRequest, DialogResult};

/// Prompts on stderr with dialoguer.
///
/// Esc, Ctrl-C and a missing terminal all count as `Cancelled`.
#[derive(Debug, Default)]
pub struct TerminalDialog;

impl TerminalDialog {
    pub fn new() -> Self {
        TerminalDialog
    }

    fn header(request: &DialogRequest<'_>) {
        if let Some(caption) = request.caption {
            eprintln!("{}", style(caption).bold());
        }
        if let DialogKind::Legacy { target, .. } = request.kind {
            eprintln!("{} {}", style("Target:").dim(), target);
        }
        if let Some(message) = request.message {
            eprintln!("{message}");
        }
        if request.auth_error != 0 {
            eprintln!(
                "{} {}",
                style("!").red().bold(),
                style(format!("The last attempt failed (error {}).", request.auth_error)).red()
            );
        }
    }

    fn collect(request: &mut DialogRequest<'_>) -> dialoguer::Result<()> {
        let username = if request.kind.username_read_only() {
            eprintln!("{} {}", style("Username:").dim(), request.username);
            None
        } else {
            let entered: String = Input::new()
                .with_prompt("Username")
                .with_initial_text(request.username.as_str())
                .validate_with(|input: &String| {
                    if utf16_len(input) > MAX_USERNAME_LENGTH {
                        Err(format!("at most {MAX_USERNAME_LENGTH} characters"))
                    } else {
                        Ok(())
                    }
                })
                .interact_text()?;
            Some(entered)
        };

        let password = loop {
            let entered = Zeroizing::new(
                Password::new()
                    .with_prompt("Password")
                    .allow_empty_password(true)
                    .interact()?,
            );
            if utf16_len(&entered) <= MAX_PASSWORD_LENGTH {
                break entered;
            }
            eprintln!("{} at most {MAX_PASSWORD_LENGTH} characters", style("!").red().bold());
        };

        let save = if request.kind.shows_save_checkbox() {
            Some(
                Confirm::new()
                    .with_prompt("Remember these credentials?")
                    .default(*request.save_checked)
                    .interact()?,
            )
        } else {
            None
        };

        // Nothing is written back until every question is answered.
        if let Some(username) = username {
            *request.username = username;
        }
        request.secret.assign(&password);
        if let Some(save) = save {
            *request.save_checked = save;
        }
        Ok(())
    }
}

impl CredentialDialog for TerminalDialog {
    fn prompt(&self, mut request: DialogRequest<'_>) -> DialogResult {
        Self::header(&request);
        match Self::collect(&mut request) {
            Ok(()) => DialogResult::Confirmed,
            Err(e) => {
                debug!("terminal credential prompt ended: {e}");
                DialogResult::Cancelled
            }
        }
    }
}
