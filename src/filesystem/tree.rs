use derive_more::Display;
use snafu::Snafu;
use tracing::{debug, trace, warn};

const ROOT_NAME: &str = "/";

/// Handle of a directory inside the [`FileSystem`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("#{_0}")]
pub struct DirId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    name: String,
    size: u64,
}

impl File {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    #[cfg(test)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub fn size(&self) -> u64 {
        self.size
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    name: String,
    total_size: u64,
    files: Vec<File>,
    dirs: Vec<DirId>,
    parent: Option<DirId>,
}

impl Directory {
    fn new(name: impl Into<String>, parent: Option<DirId>) -> Self {
        Self {
            name: name.into(),
            total_size: 0,
            files: Vec::new(),
            dirs: Vec::new(),
            parent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of every file in this directory and all of its descendants
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    #[cfg(test)]
    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn dirs(&self) -> &[DirId] {
        &self.dirs
    }

    #[cfg(test)]
    pub fn parent(&self) -> Option<DirId> {
        self.parent
    }
}

/// Directory tree rebuilt from a transcript.
///
/// Directories are stored in an arena and refer to each other through [`DirId`]
/// handles, so the parent links never own anything. The root is always the
/// first entry of the arena.
#[derive(Debug, Clone)]
pub struct FileSystem {
    dirs: Vec<Directory>,
    current: DirId,
    disk_capacity: u64,
}

impl FileSystem {
    pub fn new(disk_capacity: u64) -> Self {
        Self {
            dirs: vec![Directory::new(ROOT_NAME, None)],
            current: DirId(0),
            disk_capacity,
        }
    }

    pub fn root(&self) -> DirId {
        DirId(0)
    }

    pub fn current_dir(&self) -> DirId {
        self.current
    }

    pub fn disk_capacity(&self) -> u64 {
        self.disk_capacity
    }

    pub fn get(&self, id: DirId) -> Option<&Directory> {
        self.dirs.get(id.0)
    }

    /// Handles are only minted by this arena, so indexing cannot fail for them
    pub fn dir(&self, id: DirId) -> &Directory {
        &self.dirs[id.0]
    }

    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    pub fn used_space(&self) -> u64 {
        self.dir(self.root()).total_size
    }

    /// Can be negative when the transcript lists more data than the disk holds
    pub fn free_space(&self) -> i128 {
        i128::from(self.disk_capacity) - i128::from(self.used_space())
    }

    pub fn cd_root(&mut self) {
        self.current = self.root();
        debug!("Moved to root");
    }

    pub fn cd_parent(&mut self) -> Result<(), NavigationError> {
        let parent = self
            .dir(self.current)
            .parent
            .ok_or(NavigationError::AscendFromRoot)?;
        self.current = parent;
        debug!("Moved up to {}", self.path_of(parent));
        Ok(())
    }

    pub fn cd_child(&mut self, name: &str) -> Result<(), NavigationError> {
        let child = self
            .find_child(self.current, name)
            .ok_or_else(|| NavigationError::NoSuchDirectory {
                name: name.to_string(),
                current: self.path_of(self.current),
            })?;
        self.current = child;
        debug!("Moved down to {}", self.path_of(child));
        Ok(())
    }

    /// First child directory of `parent` with the given name, in listing order
    pub fn find_child(&self, parent: DirId, name: &str) -> Option<DirId> {
        self.dir(parent)
            .dirs
            .iter()
            .copied()
            .find(|child| self.dir(*child).name == name)
    }

    pub fn add_dir(&mut self, name: impl Into<String>) -> DirId {
        let name = name.into();
        let parent = self.current;
        if self.find_child(parent, &name).is_some() {
            warn!(
                "Directory '{}' listed again under {}, keeping both entries",
                name,
                self.path_of(parent)
            );
        }

        let id = DirId(self.dirs.len());
        trace!("Adding directory '{}' under {}", name, self.path_of(parent));
        self.dirs.push(Directory::new(name, Some(parent)));
        self.dirs[parent.0].dirs.push(id);
        id
    }

    /// Adds a file to the current directory and grows every ancestor by its size.
    ///
    /// The root holds the largest total, so checking it first leaves the tree
    /// untouched when the size would not fit.
    pub fn add_file(
        &mut self,
        name: impl Into<String>,
        size: u64,
    ) -> Result<(), SizeOverflowError> {
        let file = File::new(name, size);
        if self.used_space().checked_add(file.size).is_none() {
            return Err(SizeOverflowError {
                name: file.name,
                size,
                dir: self.path_of(self.current),
            });
        }

        trace!(
            "Adding file '{}' ({} bytes) under {}",
            file.name,
            file.size,
            self.path_of(self.current)
        );
        self.dirs[self.current.0].files.push(file);

        let mut next = Some(self.current);
        while let Some(id) = next {
            let dir = &mut self.dirs[id.0];
            dir.total_size += size;
            next = dir.parent;
        }
        Ok(())
    }

    pub fn path_of(&self, id: DirId) -> String {
        let mut names = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            let dir = self.dir(current);
            if dir.parent.is_some() {
                names.push(dir.name.as_str());
            }
            next = dir.parent;
        }

        if names.is_empty() {
            return ROOT_NAME.to_string();
        }
        names
            .iter()
            .rev()
            .fold(String::new(), |mut path, name| {
                path.push('/');
                path.push_str(name);
                path
            })
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum NavigationError {
    #[snafu(display("Cannot ascend from root"))]
    AscendFromRoot,
    #[snafu(display(
        "Expected a directory named '{}' in {}, but it was never listed",
        name,
        current
    ))]
    NoSuchDirectory { name: String, current: String },
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display(
    "Adding file '{}' ({} bytes) under {} would overflow the directory sizes",
    name,
    size,
    dir
))]
pub struct SizeOverflowError {
    name: String,
    size: u64,
    dir: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sizes_consistent(fs: &FileSystem) {
        for index in 0..fs.dir_count() {
            let dir = fs.dir(DirId(index));
            let files: u64 = dir.files().iter().map(File::size).sum();
            let children: u64 = dir.dirs().iter().map(|id| fs.dir(*id).total_size()).sum();
            assert_eq!(dir.total_size(), files + children, "at {}", fs.path_of(DirId(index)));
        }
    }

    #[test]
    fn new_file_system_starts_at_empty_root() {
        let fs = FileSystem::new(100);
        let root = fs.dir(fs.root());

        assert_eq!(fs.current_dir(), fs.root());
        assert_eq!(root.name(), "/");
        assert_eq!(root.total_size(), 0);
        assert_eq!(root.parent(), None);
        assert_eq!(fs.disk_capacity(), 100);
    }

    #[test]
    fn add_file_propagates_size_to_every_ancestor() {
        let mut fs = FileSystem::new(1_000);
        let a = fs.add_dir("a");
        fs.cd_child("a").unwrap();
        let b = fs.add_dir("b");
        fs.cd_child("b").unwrap();
        fs.add_file("x", 10).unwrap();
        fs.cd_parent().unwrap();
        fs.add_file("y", 5).unwrap();

        assert_eq!(fs.dir(b).total_size(), 10);
        assert_eq!(fs.dir(a).total_size(), 15);
        assert_eq!(fs.used_space(), 15);
        assert_eq!(fs.free_space(), 985);
        assert_sizes_consistent(&fs);
    }

    #[test]
    fn cd_parent_from_root_fails() {
        let mut fs = FileSystem::new(0);
        assert_eq!(fs.cd_parent(), Err(NavigationError::AscendFromRoot));
        assert_eq!(fs.current_dir(), fs.root());
    }

    #[test]
    fn cd_child_requires_listed_directory() {
        let mut fs = FileSystem::new(0);
        fs.add_dir("a");
        fs.cd_child("a").unwrap();

        let err = fs.cd_child("missing").unwrap_err();
        assert_eq!(
            err,
            NavigationError::NoSuchDirectory {
                name: "missing".to_string(),
                current: "/a".to_string(),
            }
        );
        assert!(err.to_string().contains("'missing' in /a"));
    }

    #[test]
    fn duplicate_directories_are_kept_and_first_one_wins() {
        let mut fs = FileSystem::new(0);
        let first = fs.add_dir("a");
        let second = fs.add_dir("a");

        assert_ne!(first, second);
        assert_eq!(fs.dir(fs.root()).dirs(), &[first, second]);
        fs.cd_child("a").unwrap();
        assert_eq!(fs.current_dir(), first);
    }

    #[test]
    fn path_of_renders_absolute_paths() {
        let mut fs = FileSystem::new(0);
        fs.add_dir("a");
        fs.cd_child("a").unwrap();
        let e = fs.add_dir("e");

        assert_eq!(fs.path_of(fs.root()), "/");
        assert_eq!(fs.path_of(e), "/a/e");
    }

    #[test]
    fn get_rejects_foreign_handles() {
        let fs = FileSystem::new(0);
        assert!(fs.get(DirId(0)).is_some());
        assert!(fs.get(DirId(7)).is_none());
    }

    #[test]
    fn add_file_rejects_sizes_that_overflow_totals() {
        let mut fs = FileSystem::new(0);
        let a = fs.add_dir("a");
        fs.cd_child("a").unwrap();
        fs.add_file("huge", u64::MAX).unwrap();

        let err = fs.add_file("one", 1).unwrap_err();
        assert!(err.to_string().contains("'one' (1 bytes) under /a"));
        assert_eq!(fs.dir(a).files().len(), 1);
        assert_eq!(fs.dir(a).total_size(), u64::MAX);
        assert_eq!(fs.used_space(), u64::MAX);
        assert_sizes_consistent(&fs);
    }
}
