use crate::{AnalyzerConfig, ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
pub const CONFIG_FILES: &[&str] = &[
    ".query-analyzer.yml",
    ".query-analyzer.yaml",
    ".query-analyzer.json",
    "query-analyzer.toml",
];

/// Find a config file by walking up the directory tree from the given start directory.
/// Returns the path to the config file if found.
#[tracing::instrument(fields(start = %start_dir.display()))]
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current_dir = start_dir.to_path_buf();
    let mut checked_dirs = 0;

    loop {
        tracing::trace!(dir = %current_dir.display(), "Checking directory for config files");
        for file_name in CONFIG_FILES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                tracing::info!(path = %config_path.display(), checked_dirs, "Found config file");
                return Ok(Some(config_path));
            }
        }

        checked_dirs += 1;
        if !current_dir.pop() {
            tracing::debug!(checked_dirs, "No config file found");
            break;
        }
    }

    Ok(None)
}

/// Load a config from the specified path.
/// Automatically detects the format based on file extension.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<AnalyzerConfig> {
    tracing::debug!("Reading config file");
    let contents = fs::read_to_string(path)?;
    let config = load_config_from_str(&contents, path)?;
    tracing::info!(
        api = %config.api,
        target = %config.target,
        paths = config.paths.len(),
        "Config loaded successfully"
    );
    Ok(config)
}

/// Load a config from a string.
/// The path is used for error messages and format detection.
#[tracing::instrument(skip(contents), fields(path = %path.display(), size = contents.len()))]
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<AnalyzerConfig> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    let config = match extension {
        "yml" | "yaml" => {
            tracing::trace!("Parsing as YAML");
            // An empty YAML document means "all defaults"
            if contents.trim().is_empty() {
                AnalyzerConfig::default()
            } else {
                serde_saphyr::from_str(contents).map_err(|e| invalid(path, "YAML", e))?
            }
        }
        "json" => {
            tracing::trace!("Parsing as JSON");
            serde_json::from_str(contents).map_err(|e| invalid(path, "JSON", e))?
        }
        "toml" => {
            tracing::trace!("Parsing as TOML");
            toml::from_str(contents).map_err(|e| invalid(path, "TOML", e))?
        }
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    validate_config(&config, path)?;
    Ok(config)
}

fn invalid(path: &Path, format: &str, error: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("{format} parse error: {error}"),
    }
}

fn validate_config(config: &AnalyzerConfig, path: &Path) -> Result<()> {
    if config.target.trim().is_empty() {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            message: "target version must not be empty".to_string(),
        });
    }

    if let Some(version) = &config.current_version {
        if version.trim().is_empty() {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                message: "currentVersion must not be empty".to_string(),
            });
        }
    }

    if let Some(extensions) = &config.extensions {
        if extensions.iter().any(|ext| ext.trim_start_matches('.').is_empty()) {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                message: "extensions must not contain empty entries".to_string(),
            });
        }
    }

    tracing::debug!("Config validation passed");
    Ok(())
}
