use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Rebuilds a directory tree from a `cd`/`ls` transcript and reports its sizes
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Transcript to analyze
    #[clap(default_value = "input.txt")]
    pub input: PathBuf,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// YAML file with diskCapacity, requiredFreeSpace and sizeThreshold
    #[clap(long, short)]
    pub config: Option<PathBuf>,
    #[clap(long)]
    pub disk_capacity: Option<u64>,
    #[clap(long)]
    pub required_free_space: Option<u64>,
    /// Largest directory size counted by the bounded sum
    #[clap(long)]
    pub size_threshold: Option<u64>,

    /// Print the directory tree before the report
    #[clap(long, short)]
    pub tree: bool,
}
