use crate::error::{Error, Result};
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};

pub const CSV_EXTENSION: &str = ".csv";

pub fn pattern_for(prefix: &str) -> String {
    format!("{}*{}", prefix, CSV_EXTENSION)
}

pub fn matches_prefix(file_name: &str, prefix: &str) -> bool {
    file_name
        .strip_prefix(prefix)
        .map(|rest| rest.ends_with(CSV_EXTENSION))
        .unwrap_or(false)
}

pub fn scan_dir_for_runs(directory: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(directory).map_err(|e| {
        Error::Configuration(format!("cannot read directory {}: {}", directory.display(), e))
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::Configuration(format!("cannot list directory {}: {}", directory.display(), e))
        })?;
        let path = entry.path();
        let matched = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| matches_prefix(name, prefix))
            .unwrap_or(false);
        // Follows symlinks; a broken link is kept so loading reports it.
        if matched && fs::metadata(&path).map(|m| m.is_file()).unwrap_or(true) {
            paths.push(path);
        }
    }
    let paths: Vec<PathBuf> = paths
        .into_iter()
        .sorted_by(|a, b| a.file_name().cmp(&b.file_name()))
        .collect();

    if paths.is_empty() {
        return Err(Error::NoMatchingFiles {
            directory: directory.to_path_buf(),
            pattern: pattern_for(prefix),
        });
    }
    tracing::debug!(
        directory = %directory.display(),
        prefix,
        files = paths.len(),
        "discovered run files"
    );
    Ok(paths)
}
