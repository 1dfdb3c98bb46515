use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::{debug, trace, warn};
use thiserror::Error;

use crate::{
    git::{GitError, GitTransport},
    model::RepositoryReference,
};

pub const DEFAULT_CACHE_DIRECTORY_NAME: &str = ".llml-src";

/// Machine wide store of full clones, one directory per repository name.
pub struct LlmlCache<G> {
    location: PathBuf,
    transport: G,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache location {location} is not a directory")]
    BadLocation { location: String },
    #[error("Failed to clone {url}: {source}")]
    CloneFailed {
        url: String,
        #[source]
        source: GitError,
    },
    #[error("Failed to update {name}: {source}")]
    RefreshFailed {
        name: String,
        #[source]
        source: GitError,
    },
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Cloned,
    Existing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub path: PathBuf,
    pub state: EntryState,
}

impl<G: GitTransport> LlmlCache<G> {
    /// The cache directory itself is created lazily, on the first clone.
    pub fn new(location: PathBuf, transport: G) -> Result<LlmlCache<G>, CacheError> {
        if location.exists() && !location.is_dir() {
            return Err(CacheError::BadLocation {
                location: location.display().to_string(),
            });
        }
        Ok(LlmlCache {
            location,
            transport,
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &G {
        &self.transport
    }

    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.location.join(name)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.entry_path(name).exists()
    }

    /// Clones `reference` unless an entry with the same name already exists.
    ///
    /// An existing entry is reused as is, even when it was cloned from a
    /// different remote; in that case only a warning is emitted.
    pub fn ensure_cloned(&self, reference: &RepositoryReference) -> Result<CacheEntry, CacheError> {
        std::fs::create_dir_all(&self.location)?;

        let path = self.entry_path(&reference.name);
        if path.exists() {
            trace!("Found cache entry at {}", path.display());
            self.check_origin(&path, reference);
            return Ok(CacheEntry {
                path,
                state: EntryState::Existing,
            });
        }

        debug!(
            "Cloning {} into {}",
            reference.canonical_url,
            path.display()
        );
        self.transport
            .clone_repo(&reference.canonical_url, &path)
            .map_err(|source| CacheError::CloneFailed {
                url: reference.canonical_url.clone(),
                source,
            })?;

        Ok(CacheEntry {
            path,
            state: EntryState::Cloned,
        })
    }

    pub fn refresh(&self, name: &str) -> Result<(), CacheError> {
        let path = self.entry_path(name);
        debug!("Updating {}", path.display());
        self.transport
            .pull(&path)
            .map_err(|source| CacheError::RefreshFailed {
                name: name.to_owned(),
                source,
            })
    }

    /// Names of all cached repositories, sorted.
    ///
    /// Returns `None` when the cache directory does not exist at all.
    pub fn list_cached(&self) -> Result<Option<Vec<String>>, CacheError> {
        let entries = match std::fs::read_dir(&self.location) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                trace!("Skipping non directory {}", entry.path().display());
                continue;
            }
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        Ok(Some(names))
    }

    fn check_origin(&self, path: &Path, reference: &RepositoryReference) {
        match self.transport.origin_url(path) {
            Ok(Some(url)) if url != reference.canonical_url => warn!(
                "Cached {} was cloned from {}, not {}; reusing it anyway",
                reference.name, url, reference.canonical_url
            ),
            Ok(_) => {}
            Err(error) => debug!(
                "Could not read the origin of {}: {}",
                path.display(),
                error
            ),
        }
    }
}
