use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::DatadepsConfig;
use crate::xdg;

/// Project-level config file name
pub const CONFIG_FILE_NAME: &str = "datadeps.toml";

/// Discovers datadeps configuration by traversing up the directory tree
pub fn discover_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            return Some(config_path);
        }

        // Try to go up one level
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    // Fallback to global config
    let global_config = xdg::config_dir().join("config.toml");
    if global_config.is_file() {
        return Some(global_config);
    }

    None
}

/// Configuration loaded for a run, with the directory relative paths resolve against
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: DatadepsConfig,
    /// The config file, if one was found
    pub path: Option<PathBuf>,
    /// Directory of the project config file, or the working directory
    pub base_dir: PathBuf,
}

/// Loads configuration with auto-discovery support
///
/// If `explicit_path` is provided, loads config from that path. Otherwise
/// auto-discovers by traversing up from `start_dir`. Without any config
/// file the defaults apply and relative paths resolve against `cwd`.
pub fn load_config_with_discovery(
    explicit_path: Option<&Path>,
    start_dir: &Path,
    cwd: &Path,
) -> Result<LoadedConfig> {
    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(start_dir),
    };

    let Some(path) = path else {
        tracing::debug!("No configuration file found, using defaults");
        return Ok(LoadedConfig {
            config: DatadepsConfig::default(),
            path: None,
            base_dir: cwd.to_path_buf(),
        });
    };

    tracing::debug!(path = %path.display(), "Using config");
    let config = DatadepsConfig::from_file(&path)?;
    config.validate()?;

    // A global config has no project of its own; its relative paths follow the cwd
    let base_dir = match path.parent() {
        Some(parent) if !path.starts_with(xdg::config_dir()) => {
            if parent.as_os_str().is_empty() {
                cwd.to_path_buf()
            } else {
                cwd.join(parent)
            }
        }
        _ => cwd.to_path_buf(),
    };

    Ok(LoadedConfig {
        config,
        path: Some(path),
        base_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_discover_walks_up() {
        let temp = TempDir::new().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", temp.path().join("xdg"));

        let nested = temp.path().join("analysis/step1");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "").unwrap();

        assert_eq!(
            discover_config(&nested),
            Some(temp.path().join(CONFIG_FILE_NAME))
        );
        std::env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    #[serial]
    fn test_discover_falls_back_to_global() {
        let temp = TempDir::new().unwrap();
        let xdg_home = temp.path().join("xdg");
        fs::create_dir_all(xdg_home.join("datadeps")).unwrap();
        fs::write(xdg_home.join("datadeps/config.toml"), "").unwrap();
        std::env::set_var("XDG_CONFIG_HOME", &xdg_home);

        let project = temp.path().join("project");
        fs::create_dir_all(&project).unwrap();

        assert_eq!(
            discover_config(&project),
            Some(xdg_home.join("datadeps/config.toml"))
        );
        std::env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    #[serial]
    fn test_load_uses_config_directory_as_base() {
        let temp = TempDir::new().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", temp.path().join("xdg"));

        let project = temp.path().join("project");
        fs::create_dir_all(project.join("scripts")).unwrap();
        fs::write(
            project.join(CONFIG_FILE_NAME),
            "[data]\nroot = \"outputs\"\n",
        )
        .unwrap();

        let loaded =
            load_config_with_discovery(None, &project.join("scripts"), temp.path()).unwrap();
        assert_eq!(loaded.base_dir, project);
        assert_eq!(
            loaded.config.data_root(&loaded.base_dir),
            project.join("outputs")
        );
        std::env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(&path, "[archive]\ncompression = \"lzma\"\n").unwrap();

        let result = load_config_with_discovery(Some(&path), temp.path(), temp.path());
        assert!(result.is_err());
    }
}
