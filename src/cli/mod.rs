//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};

use clap::{ArgAction, Parser};
use clap_complete::Shell;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{CredentialError, Result};
use crate::secure::TextFormat;
use crate::vault::{CredentialType, PersistenceType};

/// credmgr CLI: store and retrieve credentials in the platform vault.
#[derive(Parser)]
#[command(
    name = "credmgr",
    about = "Platform credential vault manager",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Credential type (default: from .credmgr.toml, else generic)
    #[arg(long = "type", value_enum, global = true)]
    pub credential_type: Option<CredentialType>,

    /// Secret encoding in the vault (default: from .credmgr.toml, else unicode)
    #[arg(long, value_enum, global = true)]
    pub encoding: Option<TextFormat>,

    /// Log vault and dialog calls to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Store a credential (add or overwrite)
    Save {
        /// Target name the credential is stored under
        target: String,
        /// Username to store with the secret
        #[arg(short, long)]
        username: Option<String>,
        /// Secret value (omit for interactive prompt or piped stdin)
        #[arg(short, long)]
        secret: Option<String>,
        /// Free-text description stored as the vault comment
        #[arg(short, long)]
        description: Option<String>,
        /// How long the vault keeps the credential
        #[arg(long, value_enum)]
        persist: Option<PersistenceType>,
    },

    /// Show a stored credential
    Get {
        /// Target name
        target: String,
        /// Print the secret as well
        #[arg(long)]
        show_secret: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a stored credential
    Delete {
        /// Target name
        target: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Exit successfully if a credential exists
    Exists {
        /// Target name
        target: String,
    },

    /// List stored credentials
    List {
        /// Only targets starting with this prefix
        filter: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask for credentials with the credential dialog
    Prompt {
        /// Resource the credentials are for
        target: String,
        /// Use the modern dialog instead of the legacy one
        #[arg(long)]
        modern: bool,
        /// Dialog title
        #[arg(long)]
        title: Option<String>,
        /// Message shown above the fields
        #[arg(long)]
        message: Option<String>,
        /// Pre-filled username
        #[arg(short, long)]
        username: Option<String>,
        /// Offer a "remember" checkbox and store the credentials when ticked
        #[arg(long)]
        save: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Settings resolved from `.credmgr.toml` and the global flags.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub credential_type: CredentialType,
    pub text_format: TextFormat,
}

impl Context {
    /// Load `.credmgr.toml` from the working directory and apply overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::resolve(cli, Settings::load(&cwd)?))
    }

    pub fn resolve(cli: &Cli, settings: Settings) -> Self {
        Self {
            credential_type: cli.credential_type.unwrap_or(settings.credential_type),
            text_format: cli.encoding.unwrap_or(settings.text_format),
            settings,
        }
    }
}

/// Read a secret from the flag, piped stdin, or an interactive prompt.
pub fn read_secret(target: &str, inline: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(value) = inline {
        output::warning("Secret provided on the command line; it may appear in shell history.");
        return Ok(Zeroizing::new(value.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string());
        return Ok(trimmed);
    }

    let secret = dialoguer::Password::new()
        .with_prompt(format!("Secret for {target}"))
        .allow_empty_password(true)
        .interact()
        .map_err(|e| CredentialError::CommandFailed(format!("secret prompt: {e}")))?;
    Ok(Zeroizing::new(secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let cli = Cli::parse_from(["credmgr", "--type", "domain-password", "list"]);
        let settings = Settings {
            text_format: TextFormat::Ansi,
            ..Settings::default()
        };

        let ctx = Context::resolve(&cli, settings);
        assert_eq!(ctx.credential_type, CredentialType::DomainPassword);
        assert_eq!(ctx.text_format, TextFormat::Ansi);
    }

    #[test]
    fn verbose_counts() {
        let cli = Cli::parse_from(["credmgr", "-vv", "list"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn save_parses_persistence() {
        let cli = Cli::parse_from([
            "credmgr",
            "save",
            "app/db",
            "-u",
            "alice",
            "--persist",
            "local-machine",
        ]);
        match cli.command {
            Commands::Save {
                target,
                username,
                persist,
                ..
            } => {
                assert_eq!(target, "app/db");
                assert_eq!(username.as_deref(), Some("alice"));
                assert_eq!(persist, Some(PersistenceType::LocalMachine));
            }
            _ => panic!("expected save"),
        }
    }
}
