use std::{env, path::PathBuf};

use anyhow::Context;
use home::home_dir;

use crate::{
    cache::{LlmlCache, DEFAULT_CACHE_DIRECTORY_NAME},
    git::{Git2Transport, GitTransport},
    link::DEFAULT_LINK_DIRECTORY_NAME,
    Llml,
};

#[derive(Default)]
pub struct LlmlBuilder {
    // Relative paths are resolved against `root`
    root: Option<PathBuf>,
    cache_directory_path: Option<PathBuf>,
    link_directory_name: Option<String>,
}

impl LlmlBuilder {
    /// Project root directory.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Location of the shared repository cache.
    ///
    /// Defaults to `$HOME/.llml-src`.
    pub fn cache_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_directory_path = Some(path.into());
        self
    }

    /// Name of the directory inside the project holding the links.
    ///
    /// Defaults to `.llml`.
    pub fn link_directory_name(mut self, name: impl Into<String>) -> Self {
        self.link_directory_name = Some(name.into());
        self
    }

    pub fn try_build(self) -> anyhow::Result<Llml> {
        self.try_build_with_transport(Git2Transport::new())
    }

    pub fn try_build_with_transport<G: GitTransport>(self, transport: G) -> anyhow::Result<Llml<G>> {
        let Self {
            root,
            cache_directory_path,
            link_directory_name,
        } = self;
        let root = match root {
            Some(root) => root,
            None => env::current_dir().context("Could not determine the current directory")?,
        };

        let cache_directory = match cache_directory_path {
            Some(path) => root.join(path),
            None => default_cache_directory()?,
        };

        let link_directory_name =
            link_directory_name.unwrap_or_else(|| DEFAULT_LINK_DIRECTORY_NAME.to_owned());

        let cache = LlmlCache::new(cache_directory, transport)?;

        Ok(Llml {
            cache,
            root,
            link_directory_name,
        })
    }
}

fn default_cache_directory() -> anyhow::Result<PathBuf> {
    let mut cache_directory = home_dir()
        .context("Could not find home dir. Please define $HOME env variable.")?;
    cache_directory.push(DEFAULT_CACHE_DIRECTORY_NAME);
    Ok(cache_directory)
}
