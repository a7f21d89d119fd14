use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "clipquery")]
#[command(version, about = "Process a video on the backend and ask questions about it", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Configuration file (RON). Defaults to ./clipquery.ron when present.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, value_name = "URL", env = "CLIPQUERY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Delay between job status checks, in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    pub poll_interval_ms: Option<u64>,

    /// Give up after this many status checks
    #[arg(long, value_name = "N", global = true)]
    pub max_poll_attempts: Option<u32>,

    /// Give up once a job has been polled for this long
    #[arg(long, value_name = "SECS", global = true)]
    pub poll_timeout_secs: Option<u64>,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal, global = true)]
    pub log: LogTarget,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogTarget {
    Off,
    #[default]
    Terminal,
    File,
    Both,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read commands from stdin (default)
    Interactive,

    /// Process one video, ask the given questions, then stop the session
    Ask {
        /// Video URL
        url: String,

        /// Questions, asked in order
        #[arg(required = true)]
        questions: Vec<String>,

        /// Leave the session running and print its id
        #[arg(long)]
        keep_session: bool,
    },

    /// Write the default configuration file
    InitConfig {
        /// Target path
        #[arg(default_value = "clipquery.ron")]
        path: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}
