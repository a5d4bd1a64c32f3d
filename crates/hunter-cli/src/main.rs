mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hunter=info,hunter_core=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let context = commands::Context::from_args(&args)?;

    match args.command {
        Some(Command::Tail { handle }) => commands::tail::run(&context, handle),
        Some(Command::Backup {
            dir,
            handle,
            user_id,
            quiet,
            json,
        }) => commands::backup::run(&context, dir, handle, &user_id, quiet, json),
        None => commands::tail::run(&context, None),
    }
}
