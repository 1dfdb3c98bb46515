use thiserror::Error;

pub mod reference;

pub use reference::RepositoryReference;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid repository identifier `{identifier}`: {reason}")]
    InvalidIdentifier { identifier: String, reason: String },
}

impl ParseError {
    pub(crate) fn invalid(identifier: &str, reason: impl Into<String>) -> Self {
        ParseError::InvalidIdentifier {
            identifier: identifier.to_owned(),
            reason: reason.into(),
        }
    }
}
