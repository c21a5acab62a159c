use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, with the git hash appended for non-release builds.
/// Format: "0.1.0" for releases, "0.1.0@abc1234" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{}", VERSION, GIT_HASH)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "superhxpro", bin_name = "superhxpro", version = get_version())]
#[command(about = "Tag, search, catalog and deduplicate files using per-folder metadata", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read configuration from this TOML file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add or remove tags on a file, or on the files of a folder
    Tag {
        /// File or folder to tag
        path: PathBuf,

        /// Comma-separated tags to add
        #[arg(long, default_value = "")]
        add: String,

        /// Comma-separated tags to remove
        #[arg(long, default_value = "")]
        remove: String,

        /// Also tag files in subfolders
        #[arg(short, long)]
        recursive: bool,
    },

    /// Find files carrying a tag
    SearchTag {
        folder: PathBuf,
        tag: String,
    },

    /// Find files by size, age, type, tags or mood, e.g. '{"type":"pdf","size":{"gt":5000000}}'
    SearchMeta {
        folder: PathBuf,
        json_query: String,
    },

    /// Write a JSON catalog of a folder tree
    ExportMap {
        folder: PathBuf,
        json_file: PathBuf,
    },

    /// Find duplicate files by content (dry run unless --delete)
    Deduplicate {
        folder: PathBuf,

        /// Delete duplicates instead of only reporting them
        #[arg(long)]
        delete: bool,
    },

    /// Report broken symlinks, unreadable entries and corrupt metadata
    HealthCheck {
        folder: PathBuf,
    },

    /// Set or get the mood of a folder
    FolderMood {
        #[command(subcommand)]
        action: MoodAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum MoodAction {
    /// Set the mood of a folder, replacing any previous one
    Set {
        folder: PathBuf,

        /// Mood value, e.g. 'happy'
        #[arg(long)]
        mood: String,

        /// Optional name, e.g. 'Vacation'
        #[arg(long)]
        name: Option<String>,
    },

    /// Show the mood of a folder, or of every subfolder
    Get {
        folder: PathBuf,

        /// Scan subfolders too
        #[arg(short, long)]
        recursive: bool,

        /// Only show moods whose value or name contains this text (case-insensitive)
        #[arg(long = "mood-name", value_name = "FILTER")]
        mood_name: Option<String>,
    },
}
