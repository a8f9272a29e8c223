//! `credmgr completions`: generate shell completion scripts.
//!
//! Usage:
//!   credmgr completions bash > ~/.bash_completion.d/credmgr
//!   credmgr completions zsh
//!   credmgr completions powershell

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    write_completions(shell, &mut io::stdout())
}

fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "credmgr", out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_completions(shell, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn bash_script_names_the_binary() {
        let script = render(Shell::Bash);
        assert!(script.contains("credmgr"));
        assert!(script.contains("save"));
    }

    #[test]
    fn powershell_script_lists_subcommands() {
        let script = render(Shell::PowerShell);
        assert!(script.contains("exists"));
        assert!(script.contains("completions"));
    }
}
