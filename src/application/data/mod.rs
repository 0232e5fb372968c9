mod log_level;
mod report;

pub use log_level::LogLevel;
pub use report::{Cleanup, Report};
