//! `credmgr exists`: check for a credential; the exit code is the answer.

use crate::cli::output;
use crate::cli::Context;
use crate::credential::Credential;
use crate::errors::{CredentialError, Result};

/// Execute the `exists` command.
pub fn execute(ctx: &Context, target: &str) -> Result<()> {
    let mut credential = Credential::new()
        .with_target(target)
        .with_type(ctx.credential_type)
        .with_text_format(ctx.text_format);
    let found = credential.exists();
    credential.dispose();

    if found? {
        output::success(&format!("'{target}' exists"));
        Ok(())
    } else {
        Err(CredentialError::CommandFailed(format!(
            "no credential found for '{target}'"
        )))
    }
}
