//! One module per `credmgr` subcommand.

pub mod completions;
pub mod delete;
pub mod exists;
pub mod get;
pub mod list;
pub mod prompt;
pub mod save;
