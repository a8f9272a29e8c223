//! `credmgr save`: store a credential in the vault.

use crate::cli::output;
use crate::cli::{read_secret, Context};
use crate::credential::Credential;
use crate::errors::{CredentialError, Result};
use crate::vault::PersistenceType;

/// Options for `credmgr save`.
pub struct SaveArgs<'a> {
    pub target: &'a str,
    pub username: Option<&'a str>,
    pub secret: Option<&'a str>,
    pub description: Option<&'a str>,
    pub persist: Option<PersistenceType>,
}

/// Execute the `save` command.
pub fn execute(ctx: &Context, args: SaveArgs<'_>) -> Result<()> {
    let secret = read_secret(args.target, args.secret)?;
    let persistence = args.persist.unwrap_or(ctx.settings.default_persistence);

    let mut credential = Credential::new()
        .with_target(args.target)
        .with_type(ctx.credential_type)
        .with_text_format(ctx.text_format)
        .with_persistence(persistence);
    credential.set_username(args.username)?;
    credential.set_description(args.description)?;
    credential.set_secret(secret.as_str())?;

    let saved = credential.save();
    credential.dispose();

    if !saved? {
        return Err(CredentialError::CommandFailed(format!(
            "the vault refused to store '{}'",
            args.target
        )));
    }

    output::success(&format!(
        "Saved '{}' ({}, {})",
        args.target, ctx.credential_type, persistence
    ));
    if persistence == PersistenceType::Session {
        output::tip("Session credentials are removed when you log off.");
    }
    Ok(())
}
