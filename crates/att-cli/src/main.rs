use std::io::Write;

use anyhow::{Context, Result};
use att_core::RuleContext;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use att_cli::commands::{analytics, create, list, show, status, update};
use att_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let ctx = RuleContext::new(config.resolve_timezone(cli.tz.as_deref()), Utc::now());
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::Create(args) => create::run(&mut stdout, args, &config, &ctx)?,
        Commands::Update(args) => update::run(&mut stdout, args, &config, &ctx)?,
        Commands::Show(args) => show::run(&mut stdout, args, &config, ctx.tz)?,
        Commands::List(args) => list::run(&mut stdout, args, &config, &ctx)?,
        Commands::Analytics(args) => analytics::run(&mut stdout, args, &config)?,
        Commands::Status => status::run(&mut stdout, &config, ctx.tz)?,
    }

    stdout.flush()?;
    Ok(())
}
