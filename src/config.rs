//! Application configuration management.
//!
//! A [`Config`] is built once at startup from four layers, later layers
//! winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file: `--config <file>`, else `config.toml` in the platform
//!    config directory when it exists
//! 3. `DUPS_`-prefixed environment variables (`DUPS_ROOT`, `DUPS_NCPU`, ...)
//! 4. CLI flags that were actually given

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::actions::DeleteConfig;
use crate::cli::{Cli, OutputFormat};
use crate::duplicates::{default_workers, ReadErrorPolicy};

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "DUPS_";

/// Root scanned when none is configured.
pub const DEFAULT_ROOT: &str = "test";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory tree to scan.
    pub root: PathBuf,
    /// Delete redundant copies instead of only reporting them.
    pub delete: bool,
    /// Remove emptied parent directories after a deletion.
    pub emptydir: bool,
    /// Digest worker count; `None` means the available parallelism.
    pub ncpu: Option<usize>,
    /// Handling of mid-read failures.
    pub read_errors: ReadErrorPolicy,
    /// Report format.
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            delete: false,
            emptydir: false,
            ncpu: None,
            read_errors: ReadErrorPolicy::default(),
            output: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load the layered configuration and apply the CLI flags on top.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly given config file does not exist, or if any
    /// layer holds a value of the wrong type.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match cli.config {
            Some(ref path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.clone())
            }
            None => Self::default_path().filter(|p| p.is_file()),
        };

        let mut config: Config = Self::figment(file.as_deref())
            .extract()
            .context("Failed to load configuration")?;
        config.apply_cli(cli);
        config.validate();
        Ok(config)
    }

    /// Defaults, then the optional TOML file, then the environment.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            log::debug!("Loading config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Override with every flag that was given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref root) = cli.root {
            self.root = root.clone();
        }
        if cli.delete {
            self.delete = true;
        }
        if cli.emptydir {
            self.emptydir = true;
        }
        if let Some(ncpu) = cli.ncpu {
            self.ncpu = Some(ncpu);
        }
        if let Some(policy) = cli.read_errors {
            self.read_errors = policy;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
    }

    /// Warn about settings that have no effect.
    fn validate(&self) {
        if self.emptydir && !self.delete {
            log::warn!("emptydir has no effect without delete");
        }
        if self.ncpu == Some(0) {
            log::warn!("ncpu = 0 is treated as 1");
        }
    }

    /// Number of digest workers to spawn (at least one).
    #[must_use]
    pub fn workers(&self) -> usize {
        self.ncpu.unwrap_or_else(default_workers).max(1)
    }

    /// Deletion settings derived from this configuration.
    #[must_use]
    pub fn delete_config(&self) -> DeleteConfig {
        DeleteConfig {
            delete: self.delete,
            prune_empty_dirs: self.emptydir,
        }
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dups").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
