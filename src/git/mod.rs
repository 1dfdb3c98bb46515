use std::path::Path;

use thiserror::Error;

mod transport;

pub use transport::Git2Transport;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
    #[error("HEAD of {path} is detached, nothing to update")]
    DetachedHead { path: String },
    #[error("Branch {branch} has no upstream on origin")]
    MissingUpstream { branch: String },
    #[error("Branch {branch} has diverged from origin/{branch} and cannot be fast-forwarded")]
    NotFastForward { branch: String },
    #[error("Local changes in {branch} would be overwritten by the update: {message}")]
    LocalChanges { branch: String, message: String },
}

/// Version control operations the cache relies on.
///
/// Implementations own authentication and transport concerns; errors are
/// surfaced to the operator as opaque text.
pub trait GitTransport {
    /// Clones `url` into `destination`, which must not exist yet.
    fn clone_repo(&self, url: &str, destination: &Path) -> Result<(), GitError>;

    /// Brings the checked out branch of an existing clone up to date with its remote.
    fn pull(&self, repository: &Path) -> Result<(), GitError>;

    /// URL of the `origin` remote of an existing clone, if any.
    fn origin_url(&self, repository: &Path) -> Result<Option<String>, GitError>;
}
