//! # CLI Layer
//!
//! One client of the `superhxpro` library. This is the only place that knows
//! about arguments, terminal output, logging setup and exit codes.
//!
//! 1. Parse arguments with clap ([`setup`]).
//! 2. Install the `tracing` subscriber at the requested verbosity.
//! 3. Load configuration and build a `HelperApi<FsStore>`.
//! 4. Dispatch and print the returned messages ([`print`]).
//!
//! Errors returned from here are fatal: `main` prints them and exits with 1.

mod print;
mod setup;

use clap::Parser;
use print::print_messages;
use setup::{Cli, Commands, MoodAction};
use superhxpro::api::HelperApi;
use superhxpro::commands::{CmdResult, DedupeMode};
use superhxpro::config::HelperConfig;
use superhxpro::error::Result;
use superhxpro::store::fs::FsStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = HelperConfig::load(cli.config.as_deref())?;
    debug!("Loaded config: {:?}", config);
    let api = HelperApi::new(FsStore, config);

    let result = dispatch(&api, cli.command)?;
    print_messages(&result.messages);
    Ok(())
}

fn dispatch(api: &HelperApi<FsStore>, command: Commands) -> Result<CmdResult> {
    match command {
        Commands::Tag {
            path,
            add,
            remove,
            recursive,
        } => api.tag(&path, &add, &remove, recursive),
        Commands::SearchTag { folder, tag } => api.search_tag(&folder, &tag),
        Commands::SearchMeta { folder, json_query } => api.search_meta(&folder, &json_query),
        Commands::ExportMap { folder, json_file } => api.export_map(&folder, &json_file),
        Commands::Deduplicate { folder, delete } => {
            let mode = if delete {
                DedupeMode::Delete
            } else {
                DedupeMode::DryRun
            };
            api.deduplicate(&folder, mode)
        }
        Commands::HealthCheck { folder } => api.health_check(&folder),
        Commands::FolderMood { action } => match action {
            MoodAction::Set { folder, mood, name } => {
                api.set_folder_mood(&folder, &mood, name.as_deref())
            }
            MoodAction::Get {
                folder,
                recursive,
                mood_name,
            } => api.get_folder_mood(&folder, recursive, mood_name.as_deref()),
        },
    }
}

/// `RUST_LOG` wins when set; otherwise the level follows `-v`.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
