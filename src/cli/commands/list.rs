//! `credmgr list`: display stored credentials in a table or as JSON.

use crate::cli::output::{self, CredentialSummary};
use crate::cli::Context;
use crate::credential::CredentialSet;
use crate::errors::{CredentialError, Result};

/// Execute the `list` command.
pub fn execute(ctx: &Context, filter: Option<&str>, json: bool) -> Result<()> {
    let set = match filter {
        Some(filter) => CredentialSet::with_filter(filter),
        None => CredentialSet::new(),
    };
    let mut set = set.with_text_format(ctx.text_format);

    let summaries = summarize(&mut set)?;

    if json {
        let rendered = serde_json::to_string_pretty(&summaries)
            .map_err(|e| CredentialError::SerializationError(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    match filter {
        Some(filter) => output::info(&format!(
            "{} credential(s) matching '{filter}'",
            summaries.len()
        )),
        None => output::info(&format!("{} credential(s)", summaries.len())),
    }
    output::print_credentials_table(&summaries);
    Ok(())
}

/// Load the set and describe every member; the set is disposed after.
fn summarize(set: &mut CredentialSet) -> Result<Vec<CredentialSummary>> {
    let summaries = set
        .load()?
        .iter()
        .map(CredentialSummary::from_credential)
        .collect();
    set.dispose();
    summaries
}
