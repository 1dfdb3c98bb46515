use std::path::{Path, PathBuf};

use crate::{
    cache::LlmlCache,
    cli::command_handlers::{do_add, do_update},
    git::{Git2Transport, GitTransport},
    update::{Selector, UpdateOutcome},
};

mod builder;

pub use builder::LlmlBuilder;

pub struct Llml<G = Git2Transport> {
    cache: LlmlCache<G>,
    root: PathBuf,
    link_directory_name: String,
}

impl Llml {
    pub fn builder() -> LlmlBuilder {
        LlmlBuilder::default()
    }
}

impl<G: GitTransport> Llml<G> {
    /// Clones a repository into the cache if needed and links it into the project
    pub fn add(&self, identifier: &str) -> anyhow::Result<()> {
        do_add(&self.cache, &self.root, &self.link_directory_name, identifier)
    }

    /// Pulls the cached repositories picked by `selector`
    ///
    /// Individual pull failures are part of the returned outcome, not an error.
    pub fn update(&self, selector: &dyn Selector) -> anyhow::Result<UpdateOutcome> {
        do_update(&self.cache, selector)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache_location(&self) -> &Path {
        self.cache.location()
    }

    pub fn link_root(&self) -> PathBuf {
        self.root.join(&self.link_directory_name)
    }
}
