use std::path::{Path, PathBuf};

/// Canonical form of `path` when it exists, otherwise the path joined onto the
/// working directory
pub fn best_effort_path_display(path: &Path) -> String {
    if let Ok(canonical_path) = path.canonicalize() {
        return canonical_path.display().to_string();
    }

    match std::env::current_dir() {
        Ok(current_dir) if path.is_relative() => current_dir.join(path).display().to_string(),
        _ => path.display().to_string(),
    }
}

pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;
}

impl BestEffortPathExt for Path {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self)
    }
}

impl BestEffortPathExt for PathBuf {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn existing_paths_are_canonicalized() {
        let file = NamedTempFile::new().expect("Failed to create temp file");
        let expected = file.path().canonicalize().unwrap();

        assert_eq!(
            file.path().best_effort_path_display(),
            expected.display().to_string()
        );
    }

    #[test]
    fn missing_relative_paths_are_made_absolute() {
        let display = Path::new("no/such/input.txt").best_effort_path_display();

        assert!(Path::new(&display).is_absolute());
        assert!(display.ends_with("input.txt"));
    }
}
