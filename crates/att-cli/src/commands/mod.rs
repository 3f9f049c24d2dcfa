//! CLI subcommand implementations.

pub mod analytics;
pub mod create;
pub mod list;
pub mod show;
pub mod status;
pub mod update;
pub mod util;
