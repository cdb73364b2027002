use std::path::PathBuf;

use clap::{value_parser, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "planboard",
    version,
    about = "Keyboard-first board for projects, tasks and the resources they need.",
    after_help = "Examples:\n  planboard                      Launch the TUI (same as `planboard tui`)\n  planboard --demo               Try it against built-in sample data\n  planboard board --filter roof\n  planboard resources add Crane"
)]
pub struct Cli {
    /// Base URL of the planning store (defaults to PLANBOARD_STORE_URL or http://127.0.0.1:5000)
    #[arg(long, value_name = "URL", global = true)]
    pub store_url: Option<String>,

    /// Override the data directory used for preferences and logs
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Tracing filter directive (e.g. "info", "planboard_core=debug")
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    /// Use a seeded in-memory store instead of the HTTP store
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Launch the interactive terminal board (default command)
    Tui,
    /// Print the bucketed project board
    Board(BoardArgs),
    /// Print pending work grouped by resource
    Jobs,
    /// List, add or delete resources
    #[command(subcommand)]
    Resources(ResourceCommand),
}

#[derive(Args, Debug, Clone, Default)]
pub struct BoardArgs {
    /// Only show projects whose name, or one of whose tasks, contains TEXT
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ResourceCommand {
    /// List every resource
    List,
    /// Create a resource
    Add {
        #[arg(value_name = "NAME", required = true)]
        name: Vec<String>,
    },
    /// Delete a resource and drop it from every task that requires it
    Delete {
        #[arg(value_name = "ID", value_parser = value_parser!(i64))]
        id: i64,
    },
}
