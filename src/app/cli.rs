use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `sysgate` - authenticated shell, filesystem and record gateway.
#[derive(Parser, Debug)]
#[command(name = "sysgate")]
#[command(version)]
#[command(about = "Policy-checked shell, file and record access over HTTP.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.sysgate/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at DEBUG instead of INFO
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Evaluate a command or path against the configured policy
    Check {
        #[command(subcommand)]
        target: CheckCommands,
    },

    /// Inspect or reset the item store
    Items {
        #[command(subcommand)]
        action: ItemCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CheckCommands {
    /// Would this shell command be allowed?
    Command {
        /// The full command line, quoted
        cmd: String,
    },
    /// Would this path be readable and writable?
    Path { path: String },
}

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Print every item
    List,
    /// Delete every item
    Reset,
}
