//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use chrono::{DateTime, Local, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;
use serde::Serialize;

use crate::credential::Credential;
use crate::errors::Result;
use crate::vault::{CredentialType, PersistenceType};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Everything about a credential except its secret.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialSummary {
    pub target: String,
    pub username: Option<String>,
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
    pub persistence: PersistenceType,
    pub description: Option<String>,
    pub last_written: Option<DateTime<Utc>>,
}

impl CredentialSummary {
    pub fn from_credential(credential: &Credential) -> Result<Self> {
        Ok(Self {
            target: credential.target()?.unwrap_or_default().to_string(),
            username: credential.username()?.map(str::to_string),
            credential_type: credential.credential_type()?,
            persistence: credential.persistence()?,
            description: credential.description()?.map(str::to_string),
            last_written: credential.last_write_time_utc()?,
        })
    }
}

fn local_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Print a table of credentials (Target, Username, Type, Persistence, Written).
pub fn print_credentials_table(credentials: &[CredentialSummary]) {
    if credentials.is_empty() {
        info("No credentials found.");
        tip("Run `credmgr save <TARGET>` to store one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Target", "Username", "Type", "Persistence", "Written"]);

    for c in credentials {
        table.add_row(vec![
            c.target.clone(),
            c.username.clone().unwrap_or_default(),
            c.credential_type.to_string(),
            c.persistence.to_string(),
            local_time(c.last_written),
        ]);
    }

    println!("{table}");
}

/// Print one credential as a two-column table.
pub fn print_credential(summary: &CredentialSummary, secret: Option<&str>) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["Target", summary.target.as_str()]);
    table.add_row(vec!["Username", summary.username.as_deref().unwrap_or("")]);
    table.add_row(vec!["Type".to_string(), summary.credential_type.to_string()]);
    table.add_row(vec!["Persistence".to_string(), summary.persistence.to_string()]);
    if let Some(description) = summary.description.as_deref() {
        table.add_row(vec!["Description", description]);
    }
    table.add_row(vec!["Written".to_string(), local_time(summary.last_written)]);
    if let Some(secret) = secret {
        table.add_row(vec!["Secret", secret]);
    }
    println!("{table}");
}
