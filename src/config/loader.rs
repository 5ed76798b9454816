//! Configuration File Loading
//!
//! Handles locating, loading and saving the TOML configuration file, with a
//! search-path fallback chain and graceful defaults when nothing is found.

use super::Config;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file loader
pub struct ConfigLoader {
    /// Search paths for configuration files
    search_paths: Vec<PathBuf>,
    /// Current configuration file path (if loaded)
    current_path: Option<PathBuf>,
}

/// Loading behavior options
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Whether to fall back to defaults if no file exists
    pub create_default: bool,
    /// Whether to validate configuration after loading
    pub validate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            create_default: true,
            validate: true,
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader with the default search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
            current_path: None,
        }
    }

    /// Load configuration with default options
    pub fn load() -> Result<Config> {
        Self::load_with_options(LoadOptions::default())
    }

    /// Load configuration with custom options
    pub fn load_with_options(options: LoadOptions) -> Result<Config> {
        let mut loader = Self::new();

        if let Some((path, config)) = loader.find_and_load_config()? {
            debug!("loaded config from {}", path.display());
            loader.current_path = Some(path);
            if options.validate {
                loader.validate_config(&config)?;
            }
            return Ok(config);
        }

        if options.create_default {
            let config = Config::default();
            if options.validate {
                loader.validate_config(&config)?;
            }
            Ok(config)
        } else {
            Err(Error::ConfigNotFound)
        }
    }

    /// Save configuration to the current path or default location
    pub fn save(&self, config: &Config) -> Result<PathBuf> {
        let path = self
            .current_path
            .clone()
            .unwrap_or_else(Self::get_default_config_path);
        self.save_to_path(config, &path)?;
        Ok(path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_content =
            toml::to_string_pretty(config).map_err(|e| Error::ConfigSerializationFailed {
                format: "TOML".to_string(),
                reason: e.to_string(),
            })?;

        fs::write(path, toml_content).map_err(|e| Error::ConfigSaveFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Find and load configuration from search paths
    fn find_and_load_config(&self) -> Result<Option<(PathBuf, Config)>> {
        for base in &self.search_paths {
            let config_path = base.join("config.toml");
            if config_path.exists() {
                match self.load_config_file(&config_path) {
                    Ok(config) => return Ok(Some((config_path, config))),
                    Err(e) => {
                        warn!("failed to load config from {}: {}", config_path.display(), e);
                        continue;
                    }
                }
            }
        }
        Ok(None)
    }

    /// Load a specific configuration file
    pub fn load_config_file(&self, path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
            format: "TOML".to_string(),
            reason: e.to_string(),
        })
    }

    /// Get default search paths for configuration files
    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("shellmux"));
        }

        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("shellmux"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".shellmux"));
            paths.push(home.join(".config").join("shellmux"));
        }

        if let Ok(cwd) = env::current_dir() {
            paths.push(cwd.join(".shellmux"));
        }

        paths
    }

    /// Get the default configuration path
    fn get_default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shellmux")
            .join("config.toml")
    }

    /// Validate configuration
    fn validate_config(&self, config: &Config) -> Result<()> {
        if config.shell.program.trim().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "shell.program".to_string(),
                reason: "Shell program cannot be empty".to_string(),
            });
        }

        if let Some(dir) = &config.shell.working_directory {
            if dir.as_os_str().is_empty() {
                return Err(Error::ConfigValidationFailed {
                    field: "shell.working_directory".to_string(),
                    reason: "Working directory cannot be an empty path".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the current configuration file path
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// List all search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Clear all search paths and use a single path
    pub fn set_search_path(&mut self, path: PathBuf) {
        self.search_paths = vec![path];
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
