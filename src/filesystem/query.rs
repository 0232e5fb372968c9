use snafu::Snafu;
use tracing::{debug, info};

use crate::filesystem::tree::{DirId, FileSystem};

/// Outcome of looking for a directory to delete before an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// The disk already has the required free space
    NotNeeded { free_space: u64 },
    Delete {
        dir: DirId,
        size: u64,
        space_needed: u64,
    },
}

/// Sums the total size of every directory under `start` (inclusive) whose size
/// is at most `threshold`
pub fn sum_dirs_up_to_threshold(
    fs: &FileSystem,
    start: DirId,
    threshold: u64,
) -> Result<u64, QueryError> {
    let mut sum: u64 = 0;
    for id in pre_order(fs, start)? {
        let size = fs.dir(id).total_size();
        if size <= threshold {
            sum = sum
                .checked_add(size)
                .ok_or(QueryError::SumOverflow { threshold })?;
        }
    }
    Ok(sum)
}

/// Smallest directory under `start` (inclusive) holding at least `min_size` bytes.
///
/// Ties keep the directory seen first in pre-order. Returns `None` when not even
/// `start` is large enough.
pub fn find_smallest_dir_at_least(
    fs: &FileSystem,
    min_size: u64,
    start: DirId,
) -> Result<Option<DirId>, QueryError> {
    let mut smallest = start;
    for id in pre_order(fs, start)? {
        let size = fs.dir(id).total_size();
        if size < fs.dir(smallest).total_size() && size >= min_size {
            smallest = id;
        }
    }

    if fs.dir(smallest).total_size() >= min_size {
        Ok(Some(smallest))
    } else {
        Ok(None)
    }
}

pub fn find_dir_to_delete(
    fs: &FileSystem,
    required_free_space: u64,
) -> Result<Deletion, QueryError> {
    let free_space = fs.free_space();
    let space_needed = i128::from(required_free_space) - free_space;
    debug!(
        "Disk has {} bytes free, {} bytes needed",
        free_space, space_needed
    );

    // Positive free space here is at most the disk capacity, so it fits in u64
    if space_needed <= 0 {
        return Ok(Deletion::NotNeeded {
            free_space: u64::try_from(free_space).unwrap_or(u64::MAX),
        });
    }
    let space_needed = u64::try_from(space_needed).unwrap_or(u64::MAX);

    let dir = find_smallest_dir_at_least(fs, space_needed, fs.root())?
        .ok_or(QueryError::NoEligibleDirectory { space_needed })?;
    let size = fs.dir(dir).total_size();
    info!("Selected {} ({} bytes) for deletion", fs.path_of(dir), size);

    Ok(Deletion::Delete {
        dir,
        size,
        space_needed,
    })
}

/// Directories under `start` in pre-order, children in listing order
fn pre_order(fs: &FileSystem, start: DirId) -> Result<Vec<DirId>, QueryError> {
    fs.get(start)
        .ok_or(QueryError::UnknownDirectory { id: start })?;

    let mut order = Vec::with_capacity(fs.dir_count());
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        order.push(id);
        stack.extend(fs.dir(id).dirs().iter().rev().copied());
    }
    Ok(order)
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum QueryError {
    #[snafu(display("Cannot traverse from directory {}, it is not part of the tree", id))]
    UnknownDirectory { id: DirId },
    #[snafu(display(
        "Expected a directory of at least {} bytes, but even the root is smaller",
        space_needed
    ))]
    NoEligibleDirectory { space_needed: u64 },
    #[snafu(display(
        "Sum of directory sizes up to {} does not fit in 64 bits",
        threshold
    ))]
    SumOverflow { threshold: u64 },
}
