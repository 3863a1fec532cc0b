// SPDX-License-Identifier: MPL-2.0
//! Locations of the config and data directories.
//!
//! Each directory is looked up in this order:
//! 1. The explicit override passed to a `_with_override` function
//! 2. `--config-dir` / `--data-dir`, recorded by [`init_cli_overrides`]
//! 3. `IMAGE_PAGE_CONFIG_DIR` / `IMAGE_PAGE_DATA_DIR`
//! 4. The platform directory from `dirs`, with `ImagePage` appended
//!
//! Web servers often run CGI programs without `HOME`, in which case the
//! platform lookup yields `None` and callers pick their own fallback.

use std::path::PathBuf;
use std::sync::OnceLock;

const APP_NAME: &str = "ImagePage";

/// Overrides the data directory, which holds crash dumps.
pub const ENV_DATA_DIR: &str = "IMAGE_PAGE_DATA_DIR";

/// Overrides the config directory, which holds `settings.toml`.
pub const ENV_CONFIG_DIR: &str = "IMAGE_PAGE_CONFIG_DIR";

static CLI_DATA_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppDir {
    Data,
    Config,
}

impl AppDir {
    fn cli_override(self) -> Option<PathBuf> {
        let cell = match self {
            AppDir::Data => &CLI_DATA_DIR,
            AppDir::Config => &CLI_CONFIG_DIR,
        };
        cell.get().cloned().flatten()
    }

    fn env_override(self) -> Option<PathBuf> {
        let name = match self {
            AppDir::Data => ENV_DATA_DIR,
            AppDir::Config => ENV_CONFIG_DIR,
        };
        std::env::var_os(name)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    fn platform_default(self) -> Option<PathBuf> {
        let base = match self {
            AppDir::Data => dirs::data_dir(),
            AppDir::Config => dirs::config_dir(),
        };
        base.map(|base| base.join(APP_NAME))
    }

    fn resolve(self, override_path: Option<PathBuf>) -> Option<PathBuf> {
        override_path
            .or_else(|| self.cli_override())
            .or_else(|| self.env_override())
            .or_else(|| self.platform_default())
    }
}

/// Records the directories given on the command line.
///
/// Only the first call has an effect.
pub fn init_cli_overrides(data_dir: Option<String>, config_dir: Option<String>) {
    let _ = CLI_DATA_DIR.set(data_dir.map(PathBuf::from));
    let _ = CLI_CONFIG_DIR.set(config_dir.map(PathBuf::from));
}

/// Returns the data directory, e.g. `~/.local/share/ImagePage` on Linux.
pub fn get_app_data_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    AppDir::Data.resolve(override_path)
}

/// Returns the config directory, e.g. `~/.config/ImagePage` on Linux.
pub fn get_app_config_dir() -> Option<PathBuf> {
    AppDir::Config.resolve(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests touching the process environment must not overlap.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn env_name(kind: AppDir) -> &'static str {
        match kind {
            AppDir::Data => ENV_DATA_DIR,
            AppDir::Config => ENV_CONFIG_DIR,
        }
    }

    #[test]
    fn explicit_override_wins() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        std::env::set_var(ENV_DATA_DIR, "/from/env");

        let explicit = PathBuf::from("/srv/page-data");
        assert_eq!(
            get_app_data_dir_with_override(Some(explicit.clone())),
            Some(explicit)
        );

        std::env::remove_var(ENV_DATA_DIR);
    }

    #[test]
    fn environment_overrides_platform_default() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        for kind in [AppDir::Data, AppDir::Config] {
            std::env::set_var(env_name(kind), "/var/lib/page");
            assert_eq!(kind.env_override(), Some(PathBuf::from("/var/lib/page")));
            std::env::remove_var(env_name(kind));
        }
    }

    #[test]
    fn empty_environment_value_is_ignored() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        std::env::set_var(ENV_CONFIG_DIR, "");

        assert_eq!(AppDir::Config.env_override(), None);
        if let Some(path) = AppDir::Config.platform_default() {
            assert!(path.ends_with(APP_NAME));
        }

        std::env::remove_var(ENV_CONFIG_DIR);
    }

    #[test]
    fn platform_defaults_are_named_after_the_app() {
        for kind in [AppDir::Data, AppDir::Config] {
            if let Some(path) = kind.platform_default() {
                assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(APP_NAME));
            }
        }
    }
}
