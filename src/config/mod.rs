// SPDX-License-Identifier: MPL-2.0
//! This module handles the page configuration stored in a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - top level `prefix` - Directory the requested image paths are resolved against
//! - `[page]` - Stylesheet, icons and accepted image extensions
//! - `[diagnostics]` - Trace levels, trace file and crash dumps
//!
//! # Path Resolution
//!
//! The config file location is resolved in this order:
//! 1. An explicit path passed to [`load_with_override`] (the `--config` flag)
//! 2. The `IMAGE_PAGE_CONFIG` environment variable
//! 3. `settings.toml` in the config directory (see [`crate::app::paths`])
//!
//! A missing file is not an error: the defaults are used.
//!
//! # Examples
//!
//! ```no_run
//! use image_page::config::{self, Config};
//!
//! // Load the configuration (returns tuple with optional warning)
//! let (config, _warning) = config::load();
//! assert!(config.page.extension_set().contains("png"));
//! ```

pub mod defaults;

pub use defaults::*;

use crate::app::paths;
use crate::diagnostics::TraceLevel;
use crate::error::{Error, Result};
use crate::navigation::{ExtensionSet, DEFAULT_EXTENSIONS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

/// Environment variable naming the config file directly.
pub const ENV_CONFIG_FILE: &str = "IMAGE_PAGE_CONFIG";

// =============================================================================
// Section Structs
// =============================================================================

/// Assets referenced by the rendered page and the images it navigates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageConfig {
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,

    #[serde(default = "default_previous_icon")]
    pub previous_icon: String,

    #[serde(default = "default_next_icon")]
    pub next_icon: String,

    /// Zoom icon while scaled to fit.
    #[serde(default = "default_scale_icon")]
    pub scale_icon: String,

    /// Zoom icon while at original size.
    #[serde(default = "default_original_icon")]
    pub original_icon: String,

    /// Extensions of the files that take part in navigation.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl PageConfig {
    /// Returns the accepted extensions, falling back to the defaults when
    /// the configured list is empty.
    pub fn extension_set(&self) -> ExtensionSet {
        let set = ExtensionSet::new(&self.extensions);
        if set.is_empty() {
            ExtensionSet::default()
        } else {
            set
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            stylesheet: default_stylesheet(),
            previous_icon: default_previous_icon(),
            next_icon: default_next_icon(),
            scale_icon: default_scale_icon(),
            original_icon: default_original_icon(),
            extensions: default_extensions(),
        }
    }
}

/// Diagnostics settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticsConfig {
    /// Global trace level; nothing above it is emitted.
    #[serde(default = "default_level")]
    pub level: TraceLevel,

    #[serde(default = "default_package_level")]
    pub default_package_level: TraceLevel,

    #[serde(default = "default_function_level")]
    pub default_function_level: TraceLevel,

    /// File the trace lines are appended to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Root directory for crash dumps. Defaults to `<data dir>/dumps`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dump_dir: Option<PathBuf>,

    /// Write a dump when a request fails.
    #[serde(default)]
    pub dump_on_error: bool,

    /// Per package levels, keyed by package name.
    #[serde(default)]
    pub package_levels: BTreeMap<String, TraceLevel>,

    /// Per function levels, keyed by `<package>_<function>`.
    #[serde(default)]
    pub function_levels: BTreeMap<String, TraceLevel>,
}

impl DiagnosticsConfig {
    /// Returns the dump root, resolving the default below the data directory.
    pub fn dump_root(&self) -> PathBuf {
        self.dump_root_with_override(None)
    }

    /// Returns the dump root with an optional data directory override.
    pub fn dump_root_with_override(&self, data_dir: Option<PathBuf>) -> PathBuf {
        if let Some(dir) = &self.dump_dir {
            return dir.clone();
        }
        paths::get_app_data_dir_with_override(data_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DUMP_DIR_NAME)
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            default_package_level: default_package_level(),
            default_function_level: default_function_level(),
            log_file: None,
            dump_dir: None,
            dump_on_error: false,
            package_levels: BTreeMap::new(),
            function_levels: BTreeMap::new(),
        }
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Page configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// Directory requested images are resolved against. The `PREFIX`
    /// environment variable takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PathBuf>,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_stylesheet() -> String {
    DEFAULT_STYLESHEET.to_string()
}

fn default_previous_icon() -> String {
    DEFAULT_PREVIOUS_ICON.to_string()
}

fn default_next_icon() -> String {
    DEFAULT_NEXT_ICON.to_string()
}

fn default_scale_icon() -> String {
    DEFAULT_SCALE_ICON.to_string()
}

fn default_original_icon() -> String {
    DEFAULT_ORIGINAL_ICON.to_string()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

fn default_level() -> TraceLevel {
    TraceLevel::new(DEFAULT_TRACE_LEVEL)
}

fn default_package_level() -> TraceLevel {
    TraceLevel::new(DEFAULT_PACKAGE_TRACE_LEVEL)
}

fn default_function_level() -> TraceLevel {
    TraceLevel::new(DEFAULT_FUNCTION_TRACE_LEVEL)
}

// =============================================================================
// Config Path Resolution
// =============================================================================

/// Returns the config file path with an optional override.
fn get_config_path_with_override(file: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = file {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_FILE) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    paths::get_app_config_dir().map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning message explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from an explicit file, if given.
pub fn load_with_override(file: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(file) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    return (
                        Config::default(),
                        Some(format!(
                            "could not load {}, using defaults: {}",
                            path.display(),
                            err
                        )),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
