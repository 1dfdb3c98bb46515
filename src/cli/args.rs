use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// Clone repositories into a shared cache and link them into the current project.
#[derive(Debug, Parser)]
#[command(version)]
#[command(group(ArgGroup::new("action").required(true).args(["repository", "update"])))]
pub struct CliArgs {
    /// Repository URL or `owner/name` shorthand for a GitHub repository
    pub repository: Option<String>,
    /// Interactively choose cached repositories to update
    #[arg(short, long)]
    pub update: bool,
    /// Update every cached repository without prompting
    #[arg(short, long, requires = "update")]
    pub all: bool,
    /// Location of the repository cache. Defaults to `$HOME/.llml-src`
    #[arg(short, long)]
    pub cache_directory: Option<PathBuf>,
    /// Log debug information
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Add { repository: String },
    Update { all: bool },
}

impl CliArgs {
    pub fn action(&self) -> Action {
        match &self.repository {
            Some(repository) => Action::Add {
                repository: repository.clone(),
            },
            None => Action::Update { all: self.all },
        }
    }
}
