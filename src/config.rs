use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Location of the optional configuration file, relative to the home directory.
pub const CONFIG_FILE_PATH: &str = ".config/llml/config.toml";

pub struct LlmlConfig {
    pub cache_dir: Option<PathBuf>,
}

impl LlmlConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_file = home::home_dir().map(|home| home.join(CONFIG_FILE_PATH));
        let raw_config = RawConfig::load(config_file.as_deref(), None)?;

        Ok(Self {
            cache_dir: raw_config.cache.dir,
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    cache: CacheConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct CacheConfig {
    dir: Option<PathBuf>,
}

impl RawConfig {
    fn load(
        config_file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(config_file) = config_file {
            builder = builder.add_source(
                File::from(config_file)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        builder
            .add_source(Environment::with_prefix("LLML").separator("_").source(env))
            .build()?
            .try_deserialize()
    }
}
