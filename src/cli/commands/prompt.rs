//! `credmgr prompt`: collect credentials with the credential dialog.

use crate::cli::output;
use crate::cli::Context;
use crate::credential::Credential;
use crate::errors::{CredentialError, Result};
use crate::prompt::{CredentialsPrompt, DialogResult, Prompt, PromptVariant, VistaPrompt, XpPrompt};

/// Options for `credmgr prompt`.
pub struct PromptArgs<'a> {
    pub target: &'a str,
    pub modern: bool,
    pub title: Option<&'a str>,
    pub message: Option<&'a str>,
    pub username: Option<&'a str>,
    pub save: bool,
}

/// Execute the `prompt` command.
pub fn execute(ctx: &Context, args: PromptArgs<'_>) -> Result<()> {
    if args.modern {
        run(ctx, &args, VistaPrompt::new())
    } else {
        let mut prompt = XpPrompt::new();
        prompt.set_target(args.target)?;
        run(ctx, &args, prompt)
    }
}

fn run<V: PromptVariant>(
    ctx: &Context,
    args: &PromptArgs<'_>,
    mut prompt: Prompt<V>,
) -> Result<()> {
    let result = ask(ctx, args, &mut prompt);
    prompt.dispose();
    result
}

fn ask<V: PromptVariant>(
    ctx: &Context,
    args: &PromptArgs<'_>,
    prompt: &mut Prompt<V>,
) -> Result<()> {
    prompt.set_generic_credentials(true)?;
    prompt.set_show_save_checkbox(args.save)?;
    if let Some(title) = args.title {
        prompt.set_title(title)?;
    }
    if let Some(message) = args.message {
        prompt.set_message(message)?;
    }
    if let Some(username) = args.username {
        prompt.set_username(username)?;
    }

    if prompt.show_dialog()? == DialogResult::Cancelled {
        return Err(CredentialError::UserCancelled);
    }

    let username = prompt.username()?.to_string();
    output::success(&format!("Credentials entered for '{}' as '{username}'", args.target));

    if !(args.save && prompt.save_checked()?) {
        return Ok(());
    }

    let mut credential = Credential::new()
        .with_target(args.target)
        .with_username(&username)
        .with_type(ctx.credential_type)
        .with_text_format(ctx.text_format)
        .with_persistence(ctx.settings.default_persistence);
    credential.set_secure_secret(&prompt.secure_password()?)?;
    let saved = credential.save();
    credential.dispose();

    if !saved? {
        return Err(CredentialError::CommandFailed(format!(
            "the vault refused to store '{}'",
            args.target
        )));
    }
    output::success(&format!("Saved '{}'", args.target));
    Ok(())
}
