use std::{
    fmt::{Display, Formatter},
    sync::OnceLock,
};

use regex_lite::Regex;

use super::ParseError;

pub const DEFAULT_HOST_BASE_URL: &str = "https://github.com/";

const GIT_SUFFIX: &str = ".git";

/// A remote repository normalized from a user supplied identifier.
///
/// `name` is the last path segment of `canonical_url` without a trailing
/// `.git`, and is used as the directory name both in the cache and in the
/// project link directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryReference {
    pub canonical_url: String,
    pub name: String,
}

fn url_prefix() -> &'static Regex {
    static URL_PREFIX: OnceLock<Regex> = OnceLock::new();
    // scheme://... or scp-like user@host:path
    URL_PREFIX.get_or_init(|| {
        Regex::new(r"^(?:(?:https?|ssh|git|file)://|[\w.-]+@[\w.-]+:)").unwrap()
    })
}

impl RepositoryReference {
    /// Resolves either a full URL or an `owner/name` shorthand.
    ///
    /// Shorthands are prefixed with [`DEFAULT_HOST_BASE_URL`] verbatim, so a
    /// trailing `.git` stays in `canonical_url` and is only dropped from `name`.
    pub fn resolve(identifier: &str) -> Result<RepositoryReference, ParseError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ParseError::invalid(identifier, "identifier is empty"));
        }

        let canonical_url = if Self::looks_like_url(identifier) {
            identifier.to_owned()
        } else {
            format!("{DEFAULT_HOST_BASE_URL}{identifier}")
        };

        let name = Self::name_from_url(&canonical_url)
            .map_err(|reason| ParseError::invalid(identifier, reason))?;

        Ok(RepositoryReference {
            canonical_url,
            name,
        })
    }

    pub fn looks_like_url(identifier: &str) -> bool {
        url_prefix().is_match(identifier)
    }

    fn name_from_url(url: &str) -> Result<String, &'static str> {
        let trimmed = url.trim_end_matches('/');
        let last_segment = trimmed
            .rsplit(['/', ':'])
            .next()
            .unwrap_or_default();
        let name = last_segment
            .strip_suffix(GIT_SUFFIX)
            .unwrap_or(last_segment);

        match name {
            "" => Err("derived repository name is empty"),
            "." | ".." => Err("derived repository name is not a valid directory name"),
            name if name.contains('\\') => Err("derived repository name contains a path separator"),
            name => Ok(name.to_owned()),
        }
    }
}

impl Display for RepositoryReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.canonical_url)
    }
}
