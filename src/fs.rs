use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Every file and folder below `dir`, depth-first, sorted by name within each
/// folder. `dir` itself is not included. Nothing is filtered: hidden files and
/// ignored files are tagged along with the rest of the folder.
pub fn list_descendants(dir: &Path) -> Result<Vec<PathBuf>, String> {
    if !dir.is_dir() {
        return Err(format!("Not a directory: {}", dir.display()));
    }

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| format!("Failed to read entry: {e}"))?;
        if entry.depth() == 0 {
            continue;
        }
        paths.push(entry.into_path());
    }
    Ok(paths)
}
