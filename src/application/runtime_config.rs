use std::path::PathBuf;

use crate::cli::Cli;

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub disk_capacity: Option<u64>,
    pub required_free_space: Option<u64>,
    pub size_threshold: Option<u64>,
    pub print_tree: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            config: cli.config,
            disk_capacity: cli.disk_capacity,
            required_free_space: cli.required_free_space,
            size_threshold: cli.size_threshold,
            print_tree: cli.tree,
        }
    }
}
