use colored::Colorize;

use crate::filesystem::tree::{DirId, FileSystem};

/// Renders every directory with its total size, one line per directory,
/// indented by depth
pub fn render_tree(fs: &FileSystem, colored: bool) -> String {
    let mut out = String::new();
    render_dir(fs, fs.root(), 0, colored, &mut out);
    out
}

fn render_dir(fs: &FileSystem, id: DirId, level: usize, colored: bool, out: &mut String) {
    let dir = fs.dir(id);
    let size = format!("({})", dir.total_size());
    let line = if colored {
        format!("{} {}", dir.name().blue().bold(), size.dimmed())
    } else {
        format!("{} {}", dir.name(), size)
    };

    out.push_str(&" ".repeat(level));
    out.push_str(&line);
    out.push('\n');

    for child in dir.dirs() {
        render_dir(fs, *child, level + 1, colored, out);
    }
}
