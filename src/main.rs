use clap::Parser;
use credmgr::cli::commands::{prompt::PromptArgs, save::SaveArgs};
use credmgr::cli::{Cli, Commands, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();

    let ctx = match Context::load(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            credmgr::cli::output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    // RUST_LOG wins, then -v, then the configured filter.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new(&ctx.settings.log_filter),
        1 => EnvFilter::new("credmgr=debug"),
        _ => EnvFilter::new("credmgr=trace"),
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Save {
            ref target,
            ref username,
            ref secret,
            ref description,
            persist,
        } => credmgr::cli::commands::save::execute(
            &ctx,
            SaveArgs {
                target,
                username: username.as_deref(),
                secret: secret.as_deref(),
                description: description.as_deref(),
                persist,
            },
        ),
        Commands::Get {
            ref target,
            show_secret,
            json,
        } => credmgr::cli::commands::get::execute(&ctx, target, show_secret, json),
        Commands::Delete { ref target, force } => {
            credmgr::cli::commands::delete::execute(&ctx, target, force)
        }
        Commands::Exists { ref target } => credmgr::cli::commands::exists::execute(&ctx, target),
        Commands::List { ref filter, json } => {
            credmgr::cli::commands::list::execute(&ctx, filter.as_deref(), json)
        }
        Commands::Prompt {
            ref target,
            modern,
            ref title,
            ref message,
            ref username,
            save,
        } => credmgr::cli::commands::prompt::execute(
            &ctx,
            PromptArgs {
                target,
                modern,
                title: title.as_deref(),
                message: message.as_deref(),
                username: username.as_deref(),
                save,
            },
        ),
        Commands::Completions { shell } => credmgr::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        credmgr::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
