use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::debug;
use thiserror::Error;

pub const DEFAULT_LINK_DIRECTORY_NAME: &str = ".llml";

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Failed to create link directory {path}: {source}")]
    LinkRoot {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to link {link} to {target}: {source}")]
    LinkFailed {
        link: String,
        target: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    AlreadyLinked,
}

/// Creates `<link_root>/<name>` as a directory symlink to `target`.
///
/// Anything already present at the link path counts as linked; it is neither
/// replaced nor inspected.
pub fn ensure_linked(target: &Path, link_root: &Path, name: &str) -> Result<LinkOutcome, LinkError> {
    std::fs::create_dir_all(link_root).map_err(|source| LinkError::LinkRoot {
        path: link_root.display().to_string(),
        source,
    })?;

    let link: PathBuf = link_root.join(name);
    debug!("Linking {} to {}", link.display(), target.display());

    match symlink_dir(target, &link) {
        Ok(()) => Ok(LinkOutcome::Created),
        Err(error) if error.kind() == ErrorKind::AlreadyExists => Ok(LinkOutcome::AlreadyLinked),
        Err(source) => Err(LinkError::LinkFailed {
            link: link.display().to_string(),
            target: target.display().to_string(),
            source,
        }),
    }
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    use std::fs;

    use pretty_assertions::assert_eq;

    #[test]
    fn creates_link_and_link_root() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cache").join("repo");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("README.md"), "hello").unwrap();
        let link_root = dir.path().join("project").join(".llml");

        let outcome = ensure_linked(&target, &link_root, "repo").unwrap();

        assert_eq!(outcome, LinkOutcome::Created);
        assert_eq!(fs::read_link(link_root.join("repo")).unwrap(), target);
        assert_eq!(
            fs::read_to_string(link_root.join("repo").join("README.md")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn second_link_is_already_linked() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("repo");
        fs::create_dir(&target).unwrap();
        let link_root = dir.path().join(".llml");

        ensure_linked(&target, &link_root, "repo").unwrap();
        let outcome = ensure_linked(&target, &link_root, "repo").unwrap();

        assert_eq!(outcome, LinkOutcome::AlreadyLinked);
        assert_eq!(fs::read_link(link_root.join("repo")).unwrap(), target);
    }

    #[test]
    fn existing_link_to_elsewhere_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("repo");
        let elsewhere = dir.path().join("elsewhere");
        fs::create_dir(&target).unwrap();
        fs::create_dir(&elsewhere).unwrap();
        let link_root = dir.path().join(".llml");

        ensure_linked(&elsewhere, &link_root, "repo").unwrap();
        let outcome = ensure_linked(&target, &link_root, "repo").unwrap();

        assert_eq!(outcome, LinkOutcome::AlreadyLinked);
        assert_eq!(fs::read_link(link_root.join("repo")).unwrap(), elsewhere);
    }

    #[test]
    fn symlink_error_other_than_existing_link() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("repo");
        fs::create_dir(&target).unwrap();
        let link_root = dir.path().join(".llml");
        let name = "x".repeat(300);

        let result = ensure_linked(&target, &link_root, &name);

        assert!(matches!(result, Err(LinkError::LinkFailed { .. })));
        assert!(link_root.is_dir());
    }

    #[test]
    fn link_root_blocked_by_file() {
        let dir = tempfile::tempdir().unwrap();
        let link_root = dir.path().join(".llml");
        fs::write(&link_root, "").unwrap();

        assert!(matches!(
            ensure_linked(dir.path(), &link_root, "repo"),
            Err(LinkError::LinkRoot { .. })
        ));
    }
}
