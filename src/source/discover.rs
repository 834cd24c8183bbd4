use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", ".next", "target"];

/// Expands `paths` into the source files to process.
///
/// Files named explicitly are kept whatever their extension. Directories are
/// walked recursively in sorted order, skipping dependency, build and hidden
/// directories, and keeping files whose extension is in `extensions`.
pub fn discover_files(paths: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        let metadata =
            fs::metadata(path).with_context(|| format!("Path does not exist: {:?}", path))?;

        if metadata.is_dir() {
            walk(path, extensions, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}

fn walk(dir: &Path, extensions: &[String], files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {:?}", dir))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list directory: {:?}", dir))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if entry.file_type()?.is_dir() {
            if name.starts_with('.') || SKIPPED_DIRS.contains(&&*name) {
                tracing::trace!("Skipping directory {:?}", path);
                continue;
            }
            walk(&path, extensions, files)?;
        } else if has_extension(&path, extensions) {
            files.push(path);
        }
    }

    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
}
