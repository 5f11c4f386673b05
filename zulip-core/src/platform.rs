//! Where the client keeps its files on each OS, and how it names the OS
//! in the `User-Agent`.

use std::fmt;
use std::path::PathBuf;

use crate::constants::APP_NAME;
use crate::error::{ZulipError, ZulipResult};

/// Operating system the binary was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    /// `<config dir>/zulip`, home of `config.toml`.
    ///
    /// `~/.config/zulip` on Linux, `~/Library/Application Support/zulip` on
    /// macOS, `%APPDATA%\zulip` on Windows.
    pub fn config_dir() -> ZulipResult<PathBuf> {
        dirs::config_dir()
            .map(|base| base.join(APP_NAME))
            .ok_or_else(|| ZulipError::Config("could not determine config directory".into()))
    }

    /// `<data dir>/zulip/logs`, the default log directory.
    pub fn log_dir() -> ZulipResult<PathBuf> {
        dirs::data_dir()
            .map(|base| base.join(APP_NAME).join("logs"))
            .ok_or_else(|| ZulipError::Config("could not determine data directory".into()))
    }

    /// Short name used in the `User-Agent` header.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
            Platform::Other => "Unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_platform_has_a_name() {
        assert!(!Platform::current().name().is_empty());
        assert_eq!(Platform::MacOs.to_string(), "macOS");
    }

    #[test]
    fn test_dirs_are_namespaced() {
        if let Ok(dir) = Platform::config_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
        if let Ok(dir) = Platform::log_dir() {
            assert!(dir.ends_with("zulip/logs"));
        }
    }
}
