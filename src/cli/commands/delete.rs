//! `credmgr delete`: remove a credential from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::Context;
use crate::credential::Credential;
use crate::errors::{CredentialError, Result};

/// Execute the `delete` command.
pub fn execute(ctx: &Context, target: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete credential '{target}'?"))
            .default(false)
            .interact()
            .map_err(|e| CredentialError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut credential = Credential::new()
        .with_target(target)
        .with_type(ctx.credential_type);
    let deleted = credential.delete();
    credential.dispose();

    if !deleted? {
        return Err(CredentialError::CommandFailed(format!(
            "no credential found for '{target}'"
        )));
    }

    output::success(&format!("Deleted '{target}'"));
    Ok(())
}
