//! Port Patrol - Who's using my ports?
//!
//! Lists the processes listening on local ports and lets you search, inspect
//! and kill them from an interactive terminal UI.

mod commands;
mod logging;
mod tui;

use anyhow::Context;
use clap::Parser;
use portpatrol_core::{ConfigStore, Settings};

#[derive(Parser)]
#[command(name = "pp")]
#[command(author, version, about = "Port Patrol - Who's using my ports?")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: (),

    /// Start with the list filtered to this port
    port: Option<u16>,

    /// Print the port list as JSON instead of starting the TUI
    #[arg(long)]
    json: bool,

    /// Print the port list as a table instead of starting the TUI
    #[arg(long)]
    no_tui: bool,
}

async fn load_settings() -> anyhow::Result<Settings> {
    match ConfigStore::new() {
        Ok(store) => store
            .load()
            .await
            .with_context(|| format!("loading settings from {}", store.path().display())),
        // No home directory: nothing to read.
        Err(_) => Ok(Settings::default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings().await?;
    logging::init(&settings)?;

    if cli.json || cli.no_tui || !atty::is(atty::Stream::Stdout) {
        commands::list::run(cli.port, cli.json, &settings).await?;
    } else {
        tui::run(cli.port, settings).await?;
    }

    Ok(())
}
