//! XDG Base Directory support for datadeps
//!
//! Follows the XDG Base Directory Specification:
//! - https://specifications.freedesktop.org/basedir-spec/basedir-spec-latest.html
//!
//! Only the configuration directory is used:
//! - `$XDG_CONFIG_HOME/datadeps/` (default: `~/.config/datadeps/`) - Global configuration

use std::path::PathBuf;

/// Get the datadeps configuration directory
///
/// Respects XDG_CONFIG_HOME environment variable.
/// Falls back to `$HOME/.config/datadeps`.
///
/// # Example
/// ```
/// let config_dir = datadeps::xdg::config_dir();
/// // Unix: ~/.config/datadeps or $XDG_CONFIG_HOME/datadeps
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("datadeps")
    } else if let Some(home) = dirs::home_dir() {
        // XDG spec default: $HOME/.config
        home.join(".config").join("datadeps")
    } else {
        PathBuf::from(".datadeps-config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_dir_respects_xdg_env() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test-config");
        let dir = config_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-config/datadeps"));
        std::env::remove_var("XDG_CONFIG_HOME");
    }
}
