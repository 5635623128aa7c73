//! Configuration loader utilities

use crate::{Config, ConfigBuilder, ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Configuration loader with common loading patterns
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from default locations
    pub fn load_default() -> ConfigResult<Config> {
        let mut builder = ConfigBuilder::new().add_defaults();

        // Try common configuration file locations
        let config_paths = Self::get_default_config_paths();

        for path in config_paths {
            if path.exists() {
                builder = builder.add_source_file(&path);
                break; // Use the first found config file
            }
        }

        // Add environment variables
        builder = builder.add_env_prefix("DRIFTSYNC");

        builder.build()
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Configuration file not found",
                ),
            });
        }

        ConfigBuilder::new()
            .add_defaults()
            .add_source_file(path)
            .add_env_prefix("DRIFTSYNC")
            .build()
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(config: &Config, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        // Determine format from file extension
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::to_string(config).map_err(|e| ConfigError::Serialization {
                    message: format!("Failed to serialize to YAML: {}", e),
                })?
            }
            Some("toml") => {
                toml::to_string_pretty(config).map_err(|e| ConfigError::Serialization {
                    message: format!("Failed to serialize to TOML: {}", e),
                })?
            }
            Some("json") => {
                serde_json::to_string_pretty(config).map_err(|e| ConfigError::Serialization {
                    message: format!("Failed to serialize to JSON: {}", e),
                })?
            }
            _ => {
                // Default to YAML
                serde_yaml::to_string(config).map_err(|e| ConfigError::Serialization {
                    message: format!("Failed to serialize to YAML: {}", e),
                })?
            }
        };

        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> ConfigResult<()> {
        let config = Config::default();
        Self::save_to_file(&config, path)
    }

    /// Get default configuration file paths in order of preference
    fn get_default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Current directory
        paths.push(PathBuf::from("driftsync.yaml"));
        paths.push(PathBuf::from("driftsync.yml"));
        paths.push(PathBuf::from("driftsync.toml"));
        paths.push(PathBuf::from(".driftsync.yaml"));
        paths.push(PathBuf::from(".driftsync.yml"));
        paths.push(PathBuf::from(".driftsync.toml"));

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let driftsync_dir = config_dir.join("driftsync");
            paths.push(driftsync_dir.join("config.yaml"));
            paths.push(driftsync_dir.join("config.yml"));
            paths.push(driftsync_dir.join("config.toml"));
        }

        // System config directory (Unix-like systems)
        #[cfg(unix)]
        {
            paths.push(PathBuf::from("/etc/driftsync/config.yaml"));
            paths.push(PathBuf::from("/etc/driftsync/config.yml"));
            paths.push(PathBuf::from("/etc/driftsync/config.toml"));
        }

        paths
    }

    /// Check if a configuration file exists in default locations
    pub fn config_exists() -> Option<PathBuf> {
        Self::get_default_config_paths()
            .into_iter()
            .find(|path| path.exists())
    }

    /// Validate a configuration file without using it
    pub fn validate_file<P: AsRef<Path>>(path: P) -> ConfigResult<()> {
        let _config = Self::load_from_file(path)?;
        Ok(())
    }
}

// Cross-platform config directory detection
mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME").ok().map(|home| {
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
            })
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|home| PathBuf::from(home).join(".config"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
