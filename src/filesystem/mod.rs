//! In-memory directory tree rebuilt from a shell transcript.
//!
//! The tree keeps a cumulative size on every directory, updated as files are
//! inserted, and offers read-only size queries over the finished tree.

mod display;
mod query;
mod tree;

pub use display::render_tree;
pub use query::{Deletion, QueryError, find_dir_to_delete, sum_dirs_up_to_threshold};
pub use tree::{FileSystem, NavigationError, SizeOverflowError};
