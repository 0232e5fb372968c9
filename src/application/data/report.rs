use std::fmt;

/// What has to be removed so the update fits on the disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    NotNeeded { free_space: u64 },
    Delete { path: String, size: u64 },
}

/// Answers to both size queries, printed as two lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub size_threshold: u64,
    pub bounded_sum: u64,
    pub cleanup: Cleanup,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Sum of directory sizes up to {}: {}",
            self.size_threshold, self.bounded_sum
        )?;
        match &self.cleanup {
            Cleanup::NotNeeded { free_space } => {
                write!(f, "No deletion needed, {free_space} bytes already free")
            }
            Cleanup::Delete { path, size } => {
                write!(f, "Directory to delete for the update: {path} with size {size}")
            }
        }
    }
}
