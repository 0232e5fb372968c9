//! Shell transcript handling: grouping lines into command records and
//! replaying those commands onto a [`FileSystem`](crate::filesystem::FileSystem).

mod command;
mod parser;

pub use command::{BuildError, build_file_system};
