use std::path::Path;

use git2::{
    build::{CheckoutBuilder, RepoBuilder},
    cert::Cert,
    AutotagOption, CertificateCheckStatus, Config, Cred, CredentialType, ErrorCode, FetchOptions,
    RemoteCallbacks, Repository,
};
use log::{debug, trace};
use ssh_key::{known_hosts::HostPatterns, KnownHosts};

use super::{GitError, GitTransport};

const ORIGIN: &str = "origin";
const GLOBAL_KNOWN_HOSTS: &str = "/etc/ssh/ssh_known_hosts";

/// [`GitTransport`] backed by libgit2.
pub struct Git2Transport {
    git_config: Option<Config>,
}

impl Git2Transport {
    pub fn new() -> Self {
        let git_config = match Config::open_default() {
            Ok(config) => Some(config),
            Err(error) => {
                debug!("Could not open the default git configuration: {}", error);
                None
            }
        };
        Self { git_config }
    }

    fn fetch_options(&self) -> FetchOptions<'_> {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed_types| {
            trace!(
                "Requested credentials for {}, username {:?}, allowed types {:?}",
                url,
                username,
                allowed_types
            );
            // Asking for ssh username
            if allowed_types.contains(CredentialType::USERNAME) {
                return Cred::username("git");
            }
            // SSH auth
            if allowed_types.contains(CredentialType::SSH_KEY) {
                return Cred::ssh_key_from_agent(username.unwrap_or("git"));
            }
            // HTTP auth
            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let Some(git_config) = &self.git_config {
                    return Cred::credential_helper(git_config, url, username);
                }
            }
            Err(git2::Error::from_str("no valid authentication available"))
        });

        callbacks.certificate_check(|certificate, host| check_certificate(certificate, host));

        let mut fetch_options = FetchOptions::new();
        fetch_options
            .remote_callbacks(callbacks)
            .download_tags(AutotagOption::Auto);
        fetch_options
    }
}

impl Default for Git2Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl GitTransport for Git2Transport {
    fn clone_repo(&self, url: &str, destination: &Path) -> Result<(), GitError> {
        trace!("Cloning {} into {}", url, destination.display());
        let mut builder = RepoBuilder::new();
        builder.fetch_options(self.fetch_options());
        builder.clone(url, destination)?;
        Ok(())
    }

    fn pull(&self, repository: &Path) -> Result<(), GitError> {
        let repo = Repository::open(repository)?;

        let head = repo.head()?;
        if !head.is_branch() {
            return Err(GitError::DetachedHead {
                path: repository.display().to_string(),
            });
        }
        let local_ref = head.name().unwrap_or_default().to_owned();
        let branch = head.shorthand().unwrap_or_default().to_owned();

        {
            let mut remote = repo.find_remote(ORIGIN)?;
            let refspecs: Vec<String> = remote
                .refspecs()
                .filter_map(|refspec| refspec.str().map(|s| s.to_string()))
                .collect();
            debug!("Fetching {} for {}", ORIGIN, repository.display());
            remote.fetch(&refspecs, Some(&mut self.fetch_options()), None)?;
        }

        let upstream = match repo.find_reference(&format!("refs/remotes/{ORIGIN}/{branch}")) {
            Ok(reference) => reference,
            Err(error) if error.code() == ErrorCode::NotFound => {
                return Err(GitError::MissingUpstream { branch })
            }
            Err(error) => return Err(error.into()),
        };
        let upstream_commit = repo.reference_to_annotated_commit(&upstream)?;

        let (analysis, _) = repo.merge_analysis(&[&upstream_commit])?;
        if analysis.is_up_to_date() {
            debug!("{} is already up to date", branch);
            Ok(())
        } else if analysis.is_fast_forward() {
            let target = upstream_commit.id();
            debug!("Fast-forwarding {} to {}", branch, target);
            let upstream_head = repo.find_commit(target)?;
            // Local edits to files the fast-forward does not touch are kept.
            match repo.checkout_tree(
                upstream_head.as_object(),
                Some(CheckoutBuilder::new().safe()),
            ) {
                Ok(()) => {}
                Err(error)
                    if matches!(error.code(), ErrorCode::Conflict | ErrorCode::MergeConflict) =>
                {
                    return Err(GitError::LocalChanges {
                        branch,
                        message: error.message().to_owned(),
                    })
                }
                Err(error) => return Err(error.into()),
            }
            let mut local = repo.find_reference(&local_ref)?;
            local.set_target(target, &format!("pull: fast-forward {branch} to {target}"))?;
            Ok(())
        } else {
            Err(GitError::NotFastForward { branch })
        }
    }

    fn origin_url(&self, repository: &Path) -> Result<Option<String>, GitError> {
        let repo = Repository::open(repository)?;
        let url = match repo.find_remote(ORIGIN) {
            Ok(remote) => remote.url().map(str::to_owned),
            Err(error) if error.code() == ErrorCode::NotFound => None,
            Err(error) => return Err(error.into()),
        };
        Ok(url)
    }
}

fn check_certificate(
    certificate: &Cert<'_>,
    host: &str,
) -> Result<CertificateCheckStatus, git2::Error> {
    if let Some(hostkey) = certificate.as_hostkey().and_then(|h| h.hostkey()) {
        trace!("Loading {}", GLOBAL_KNOWN_HOSTS);
        match KnownHosts::read_file(GLOBAL_KNOWN_HOSTS) {
            Ok(entries) => {
                for entry in entries {
                    if host_matches_patterns(host, entry.host_patterns())
                        && entry.public_key().to_bytes().as_deref() == Ok(hostkey)
                    {
                        trace!("Known host entry for {} matches the host key", host);
                        return Ok(CertificateCheckStatus::CertificateOk);
                    }
                }
                trace!("No known host entry matched the host key");
            }
            Err(error) => trace!("Could not load {}: {}", GLOBAL_KNOWN_HOSTS, error),
        }
    }
    Ok(CertificateCheckStatus::CertificatePassthrough)
}

fn host_matches_patterns(host: &str, patterns: &HostPatterns) -> bool {
    match patterns {
        HostPatterns::Patterns(patterns) => {
            let mut match_found = false;
            for pattern in patterns {
                let pattern = pattern.to_lowercase();
                // * and ? wildcards are not yet supported
                if let Some(pattern) = pattern.strip_prefix('!') {
                    if pattern == host {
                        return false;
                    }
                } else {
                    match_found |= pattern == host;
                }
            }
            match_found
        }
        // Not yet supported
        HostPatterns::HashedName { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use git2::Signature;

    fn commit_file(repo: &Repository, file: &str, content: &str, message: &str) {
        let workdir = repo.workdir().unwrap().to_owned();
        fs::write(workdir.join(file), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = Signature::now("test", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap();
    }

    #[test]
    fn host_patterns() {
        let patterns = HostPatterns::Patterns(vec!["github.com".to_owned()]);
        assert!(host_matches_patterns("github.com", &patterns));
        assert!(!host_matches_patterns("gitlab.com", &patterns));

        let negated = HostPatterns::Patterns(vec![
            "github.com".to_owned(),
            "!github.com".to_owned(),
        ]);
        assert!(!host_matches_patterns("github.com", &negated));
    }

    #[test]
    fn clone_then_pull_fast_forwards() {
        let dir = tempfile::tempdir().unwrap();
        let upstream_path = dir.path().join("upstream");
        let upstream = Repository::init(&upstream_path).unwrap();
        commit_file(&upstream, "README.md", "first", "initial");

        let transport = Git2Transport::new();
        let clone_path = dir.path().join("clone");
        transport
            .clone_repo(upstream_path.to_str().unwrap(), &clone_path)
            .unwrap();
        assert_eq!(
            fs::read_to_string(clone_path.join("README.md")).unwrap(),
            "first"
        );

        commit_file(&upstream, "README.md", "second", "update");
        transport.pull(&clone_path).unwrap();
        assert_eq!(
            fs::read_to_string(clone_path.join("README.md")).unwrap(),
            "second"
        );

        // Nothing new upstream.
        transport.pull(&clone_path).unwrap();
    }

    #[test]
    fn origin_url_of_clone() {
        let dir = tempfile::tempdir().unwrap();
        let upstream_path = dir.path().join("upstream");
        let upstream = Repository::init(&upstream_path).unwrap();
        commit_file(&upstream, "a.txt", "a", "initial");

        let transport = Git2Transport::new();
        let clone_path = dir.path().join("clone");
        let url = upstream_path.to_str().unwrap();
        transport.clone_repo(url, &clone_path).unwrap();

        assert_eq!(
            transport.origin_url(&clone_path).unwrap().as_deref(),
            Some(url)
        );
        assert_eq!(transport.origin_url(&upstream_path).unwrap(), None);
    }

    #[test]
    fn clone_of_missing_remote_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let result = Git2Transport::new().clone_repo(missing.to_str().unwrap(), &dir.path().join("x"));
        assert!(matches!(result, Err(GitError::Git(_))));
    }

    #[test]
    fn pull_keeps_unrelated_local_edits() {
        let dir = tempfile::tempdir().unwrap();
        let upstream_path = dir.path().join("upstream");
        let upstream = Repository::init(&upstream_path).unwrap();
        commit_file(&upstream, "README.md", "v1", "initial");
        commit_file(&upstream, "notes.txt", "n1", "notes");

        let transport = Git2Transport::new();
        let clone_path = dir.path().join("clone");
        transport
            .clone_repo(upstream_path.to_str().unwrap(), &clone_path)
            .unwrap();

        fs::write(clone_path.join("notes.txt"), "my local work").unwrap();
        commit_file(&upstream, "README.md", "v2", "update readme");

        transport.pull(&clone_path).unwrap();

        assert_eq!(
            fs::read_to_string(clone_path.join("README.md")).unwrap(),
            "v2"
        );
        assert_eq!(
            fs::read_to_string(clone_path.join("notes.txt")).unwrap(),
            "my local work"
        );
        let clone = Repository::open(&clone_path).unwrap();
        let upstream_head = upstream.head().unwrap().target().unwrap();
        assert_eq!(clone.head().unwrap().target().unwrap(), upstream_head);
    }

    #[test]
    fn pull_refuses_to_overwrite_conflicting_local_edits() {
        let dir = tempfile::tempdir().unwrap();
        let upstream_path = dir.path().join("upstream");
        let upstream = Repository::init(&upstream_path).unwrap();
        commit_file(&upstream, "README.md", "v1", "initial");

        let transport = Git2Transport::new();
        let clone_path = dir.path().join("clone");
        transport
            .clone_repo(upstream_path.to_str().unwrap(), &clone_path)
            .unwrap();
        let clone = Repository::open(&clone_path).unwrap();
        let head_before = clone.head().unwrap().target().unwrap();

        fs::write(clone_path.join("README.md"), "my local work").unwrap();
        commit_file(&upstream, "README.md", "v2", "update readme");

        assert!(matches!(
            transport.pull(&clone_path),
            Err(GitError::LocalChanges { .. })
        ));
        assert_eq!(
            fs::read_to_string(clone_path.join("README.md")).unwrap(),
            "my local work"
        );
        assert_eq!(clone.head().unwrap().target().unwrap(), head_before);
    }

    #[test]
    fn pull_of_diverged_branch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let upstream_path = dir.path().join("upstream");
        let upstream = Repository::init(&upstream_path).unwrap();
        commit_file(&upstream, "a.txt", "a", "initial");

        let transport = Git2Transport::new();
        let clone_path = dir.path().join("clone");
        transport
            .clone_repo(upstream_path.to_str().unwrap(), &clone_path)
            .unwrap();

        commit_file(&upstream, "a.txt", "upstream", "upstream change");
        let clone = Repository::open(&clone_path).unwrap();
        commit_file(&clone, "b.txt", "local", "local change");

        assert!(matches!(
            transport.pull(&clone_path),
            Err(GitError::NotFastForward { .. })
        ));
    }
}
