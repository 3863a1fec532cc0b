// SPDX-License-Identifier: MPL-2.0
//! Leveled tracing context.
//!
//! A [`Tracer`] is built once from [`DiagnosticsConfig`] and handed down to
//! the code that traces. Packages and functions get their own thresholds:
//!
//! ```
//! use image_page::config::DiagnosticsConfig;
//! use image_page::diagnostics::{DumpStore, TraceLevel, Tracer};
//!
//! let tracer = Tracer::new(&DiagnosticsConfig::default(), DumpStore::new("dumps"));
//! let package = tracer.package("navigation");
//! let function = package.function("navigate");
//!
//! assert!(function.enabled(TraceLevel::INFO));
//! assert!(!function.enabled(TraceLevel::VERBOSE));
//! ```

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;

use super::dump::{Dump, DumpInfo, DumpStore};
use super::export::trace_timestamp;
use super::level::TraceLevel;
use super::sanitizer::sanitize_request_body;
use crate::config::DiagnosticsConfig;
use crate::error::Result;
use crate::version::build_info;

/// Prefix written after the timestamp of each trace line.
const TRACE_PREFIX: &str = "page";

/// Tracing context for one process.
#[derive(Debug)]
pub struct Tracer {
    level: TraceLevel,
    default_package_level: TraceLevel,
    default_function_level: TraceLevel,
    package_levels: BTreeMap<String, TraceLevel>,
    function_levels: BTreeMap<String, TraceLevel>,
    sink: Option<Mutex<File>>,
    dumps: DumpStore,
}

impl Tracer {
    /// Creates a tracer that only emits through the `log` facade.
    #[must_use]
    pub fn new(config: &DiagnosticsConfig, dumps: DumpStore) -> Self {
        Self {
            level: config.level,
            default_package_level: config.default_package_level,
            default_function_level: config.default_function_level,
            package_levels: config.package_levels.clone(),
            function_levels: config.function_levels.clone(),
            sink: None,
            dumps,
        }
    }

    /// Creates a tracer that also appends to the configured trace file.
    ///
    /// # Errors
    ///
    /// Returns an error if the trace file cannot be opened.
    pub fn open(config: &DiagnosticsConfig, dumps: DumpStore) -> Result<Self> {
        let tracer = Self::new(config, dumps);
        match &config.log_file {
            Some(path) => tracer.with_log_file(path),
            None => Ok(tracer),
        }
    }

    /// Appends trace lines to `path` from now on.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened for appending.
    pub fn with_log_file(mut self, path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        self.sink = Some(Mutex::new(file));
        Ok(self)
    }

    /// Flushes and releases the trace file.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered lines cannot be written out.
    pub fn close(self) -> Result<()> {
        if let Some(sink) = self.sink {
            let mut file = sink.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
            file.flush()?;
        }
        Ok(())
    }

    /// Returns the tracer for a package.
    #[must_use]
    pub fn package(&self, name: &str) -> PackageTracer<'_> {
        let level = self
            .package_levels
            .get(name)
            .copied()
            .unwrap_or(self.default_package_level);
        PackageTracer {
            tracer: self,
            name: name.to_string(),
            level,
        }
    }

    fn emit(&self, level: TraceLevel, package: &str, function: &str, message: &str) {
        log::log!(target: package, level.log_level(), "{}.{} {}", package, function, message);

        if let Some(sink) = &self.sink {
            let line = format!(
                "{} {} {}.{} {}\n",
                trace_timestamp(&Local::now()),
                TRACE_PREFIX,
                package,
                function,
                message
            );
            let mut file = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Err(err) = file.write_all(line.as_bytes()) {
                log::warn!("failed to write trace line: {}", err);
            }
        }
    }
}

/// Tracer scoped to a package.
#[derive(Debug, Clone)]
pub struct PackageTracer<'a> {
    tracer: &'a Tracer,
    name: String,
    level: TraceLevel,
}

impl<'a> PackageTracer<'a> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn level(&self) -> TraceLevel {
        self.level
    }

    /// Returns the tracer for a function of this package.
    ///
    /// Function levels are keyed by `<package>_<function>`.
    #[must_use]
    pub fn function(&self, name: &str) -> FunctionTracer<'a> {
        let key = format!("{}_{}", self.name, name);
        let level = self
            .tracer
            .function_levels
            .get(&key)
            .copied()
            .unwrap_or(self.tracer.default_function_level);
        FunctionTracer {
            tracer: self.tracer,
            package: self.name.clone(),
            package_level: self.level,
            name: name.to_string(),
            level,
        }
    }
}

/// Tracer scoped to a function.
#[derive(Debug, Clone)]
pub struct FunctionTracer<'a> {
    tracer: &'a Tracer,
    package: String,
    package_level: TraceLevel,
    name: String,
    level: TraceLevel,
}

impl FunctionTracer<'_> {
    /// The most verbose level this function emits.
    #[must_use]
    pub fn effective_level(&self) -> TraceLevel {
        self.tracer.level.min(self.package_level).min(self.level)
    }

    #[must_use]
    pub fn enabled(&self, level: TraceLevel) -> bool {
        level <= self.effective_level()
    }

    /// Emits `message` if `level` passes the global, package and function thresholds.
    pub fn trace(&self, level: TraceLevel, message: impl AsRef<str>) {
        if self.enabled(level) {
            self.tracer
                .emit(level, &self.package, &self.name, message.as_ref());
        }
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.trace(TraceLevel::ERROR, message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.trace(TraceLevel::WARNING, message);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.trace(TraceLevel::INFO, message);
    }

    pub fn api(&self, message: impl AsRef<str>) {
        self.trace(TraceLevel::API, message);
    }

    pub fn verbose(&self, message: impl AsRef<str>) {
        self.trace(TraceLevel::VERBOSE, message);
    }

    /// Traces the request line and headers at API level.
    pub fn trace_request(&self, method: &str, uri: &str, headers: &[(String, String)]) {
        if !self.enabled(TraceLevel::API) {
            return;
        }
        self.api(format!("{} {}", method, uri));
        for (name, value) in headers {
            self.api(format!("{}: {}", name.to_lowercase(), value));
        }
    }

    /// Traces a sanitized request body at API level.
    pub fn trace_request_body(&self, body: &[u8]) {
        if self.enabled(TraceLevel::API) {
            self.api(format!("request body: {}", sanitize_request_body(body)));
        }
    }

    /// Writes a crash dump attributed to this function and its caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the dump directory or its files cannot be written.
    #[track_caller]
    pub fn dump(&self, message: impl Into<String>) -> Result<Dump> {
        let caller = std::panic::Location::caller();
        let info = DumpInfo::new(
            &Local::now(),
            &self.package,
            &self.name,
            caller,
            build_info(),
            message,
        );
        self.error(format!("DUMP: writing dump:[{}]", info.timestamp));
        self.tracer.dumps.create(&info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config(level: u32) -> DiagnosticsConfig {
        DiagnosticsConfig {
            level: TraceLevel::new(level),
            ..DiagnosticsConfig::default()
        }
    }

    #[test]
    fn effective_level_is_the_minimum_of_all_thresholds() {
        let mut cfg = config(50);
        cfg.package_levels
            .insert("navigation".to_string(), TraceLevel::API);
        cfg.function_levels
            .insert("navigation_navigate".to_string(), TraceLevel::WARNING);
        let tracer = Tracer::new(&cfg, DumpStore::new("unused"));

        let package = tracer.package("navigation");
        assert_eq!(package.level(), TraceLevel::API);
        assert_eq!(
            package.function("navigate").effective_level(),
            TraceLevel::WARNING
        );
        assert_eq!(
            package.function("other").effective_level(),
            TraceLevel::API
        );
        assert_eq!(
            tracer.package("app").function("run").effective_level(),
            TraceLevel::VERBOSE
        );
    }

    #[test]
    fn global_level_caps_everything() {
        let tracer = Tracer::new(&config(10), DumpStore::new("unused"));
        let function = tracer.package("app").function("run");

        assert!(function.enabled(TraceLevel::ERROR));
        assert!(!function.enabled(TraceLevel::WARNING));
    }

    #[test]
    fn trace_file_receives_only_enabled_lines() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let log_path = temp_dir.path().join("trace.log");
        let cfg = DiagnosticsConfig {
            log_file: Some(log_path.clone()),
            ..config(30)
        };

        let tracer = Tracer::open(&cfg, DumpStore::new(temp_dir.path())).expect("open tracer");
        let function = tracer.package("app").function("handle_request");
        function.info("visible line");
        function.verbose("hidden line");
        tracer.close().expect("close tracer");

        let content = fs::read_to_string(&log_path).expect("read trace file");
        assert!(content.contains(" page app.handle_request visible line"));
        assert!(!content.contains("hidden line"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn trace_file_is_appended_across_tracers() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let log_path = temp_dir.path().join("trace.log");
        let cfg = DiagnosticsConfig {
            log_file: Some(log_path.clone()),
            ..config(30)
        };

        for message in ["first", "second"] {
            let tracer =
                Tracer::open(&cfg, DumpStore::new(temp_dir.path())).expect("open tracer");
            tracer.package("app").function("run").error(message);
            tracer.close().expect("close tracer");
        }

        let content = fs::read_to_string(&log_path).expect("read trace file");
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn trace_request_lowercases_headers_and_masks_body() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let log_path = temp_dir.path().join("trace.log");
        let cfg = DiagnosticsConfig {
            log_file: Some(log_path.clone()),
            ..config(40)
        };

        let tracer = Tracer::open(&cfg, DumpStore::new(temp_dir.path())).expect("open tracer");
        let function = tracer.package("app").function("handle_request");
        function.trace_request(
            "GET",
            "/page?image=a.jpg",
            &[("User-Agent".to_string(), "curl".to_string())],
        );
        function.trace_request_body(br#"{"password": "hunter2"}"#);
        tracer.close().expect("close tracer");

        let content = fs::read_to_string(&log_path).expect("read trace file");
        assert!(content.contains("GET /page?image=a.jpg"));
        assert!(content.contains("user-agent: curl"));
        assert!(!content.contains("hunter2"));
    }

    #[test]
    fn trace_request_is_silent_below_api_level() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let log_path = temp_dir.path().join("trace.log");
        let cfg = DiagnosticsConfig {
            log_file: Some(log_path.clone()),
            ..config(30)
        };

        let tracer = Tracer::open(&cfg, DumpStore::new(temp_dir.path())).expect("open tracer");
        tracer
            .package("app")
            .function("handle_request")
            .trace_request("GET", "/page", &[]);
        tracer.close().expect("close tracer");

        let content = fs::read_to_string(&log_path).expect("read trace file");
        assert!(content.is_empty());
    }

    #[test]
    fn dump_records_function_and_caller() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let tracer = Tracer::new(&config(30), DumpStore::new(temp_dir.path().join("dumps")));

        let dump = tracer
            .package("app")
            .function("handle_request")
            .dump("file not found")
            .expect("write dump");

        let info = dump.info().expect("read dump info");
        assert_eq!(info.package, "app");
        assert_eq!(info.function, "handle_request");
        assert_eq!(info.message, "file not found");
        assert!(info.filename.ends_with("tracer.rs"));
        assert!(info.line > 0);
    }

    #[test]
    fn open_fails_for_unwritable_log_file() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let cfg = DiagnosticsConfig {
            log_file: Some(temp_dir.path().join("missing").join("trace.log")),
            ..config(30)
        };

        assert!(Tracer::open(&cfg, DumpStore::new(temp_dir.path())).is_err());
    }
}
