//! `credmgr get`: show one stored credential.

use std::io::{self, Write};

use serde::Serialize;
use zeroize::Zeroizing;

use crate::cli::output::{self, CredentialSummary};
use crate::cli::Context;
use crate::credential::Credential;
use crate::errors::{CredentialError, Result};

/// Execute the `get` command.
pub fn execute(ctx: &Context, target: &str, show_secret: bool, json: bool) -> Result<()> {
    let mut credential = Credential::new()
        .with_target(target)
        .with_type(ctx.credential_type)
        .with_text_format(ctx.text_format);

    let result = show(&mut credential, target, show_secret, json);
    credential.dispose();
    result
}

fn show(credential: &mut Credential, target: &str, show_secret: bool, json: bool) -> Result<()> {
    if !credential.load()? {
        return Err(CredentialError::CommandFailed(format!(
            "no credential found for '{target}'"
        )));
    }

    let summary = CredentialSummary::from_credential(credential)?;
    let secret = if show_secret {
        Some(credential.secret()?)
    } else {
        None
    };

    if json {
        let rendered = render_json(&summary, secret.as_ref().map(|s| s.as_str()))?;
        io::stdout().lock().write_all(&rendered)?;
    } else {
        output::print_credential(&summary, secret.as_ref().map(|s| s.as_str()));
        if !show_secret {
            output::tip("Pass --show-secret to print the secret.");
        }
    }
    Ok(())
}

/// `--json` output. The secret is only ever copied into the returned
/// buffer, which is wiped when dropped.
#[derive(Serialize)]
struct JsonCredential<'a> {
    #[serde(flatten)]
    summary: &'a CredentialSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<&'a str>,
}

fn render_json(summary: &CredentialSummary, secret: Option<&str>) -> Result<Zeroizing<Vec<u8>>> {
    let mut rendered = Zeroizing::new(Vec::new());
    serde_json::to_writer_pretty(&mut *rendered, &JsonCredential { summary, secret })
        .map_err(|e| CredentialError::SerializationError(e.to_string()))?;
    rendered.push(b'\n');
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::{CredentialType, PersistenceType};

    fn summary() -> CredentialSummary {
        CredentialSummary {
            target: "app/db".into(),
            username: Some("alice".into()),
            credential_type: CredentialType::Generic,
            persistence: PersistenceType::Session,
            description: None,
            last_written: None,
        }
    }

    #[test]
    fn json_omits_secret_unless_revealed() {
        let rendered = render_json(&summary(), None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&rendered).unwrap();
        assert_eq!(value["target"], "app/db");
        assert_eq!(value["type"], "generic");
        assert!(value.get("secret").is_none());
    }

    #[test]
    fn json_includes_revealed_secret() {
        let rendered = render_json(&summary(), Some("hunter2")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&rendered).unwrap();
        assert_eq!(value["username"], "alice");
        assert_eq!(value["secret"], "hunter2");
        assert!(rendered.ends_with(b"\n"));
    }
}
