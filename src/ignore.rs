use std::{io::ErrorKind, path::Path};

use log::debug;
use thiserror::Error;

pub const IGNORE_FILE_NAME: &str = ".gitignore";

#[derive(Error, Debug)]
pub enum IgnoreError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Makes sure `<project_root>/.gitignore` excludes the link directory.
///
/// A missing ignore file is created. Returns whether the file was written.
pub fn ensure_ignored(project_root: &Path, link_directory_name: &str) -> Result<bool, IgnoreError> {
    let path = project_root.join(IGNORE_FILE_NAME);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(IgnoreError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };

    let marker = format!("{link_directory_name}/");
    match append_marker(&content, &marker) {
        None => {
            debug!("{} already ignores {}", path.display(), marker);
            Ok(false)
        }
        Some(updated) => {
            std::fs::write(&path, updated).map_err(|source| IgnoreError::Write {
                path: path.display().to_string(),
                source,
            })?;
            debug!("Added {} to {}", marker, path.display());
            Ok(true)
        }
    }
}

/// `None` when some line, trimmed, already equals `marker`.
pub fn append_marker(content: &str, marker: &str) -> Option<String> {
    if content.lines().any(|line| line.trim() == marker) {
        return None;
    }

    let existing = content.trim_end();
    if existing.is_empty() {
        Some(format!("{marker}\n"))
    } else {
        Some(format!("{existing}\n{marker}\n"))
    }
}
