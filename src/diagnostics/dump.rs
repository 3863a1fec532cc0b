// SPDX-License-Identifier: MPL-2.0
//! Crash dumps.
//!
//! A dump is a timestamped directory below the dump root holding
//! `dump.json` ([`DumpInfo`]), `callstack.txt` and any extra files attached
//! with [`Dump::add_bytes`].

use std::backtrace::Backtrace;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::export::{dump_directory_name, write_atomic};
use crate::error::{Error, Result};
use crate::version::BuildInfo;

const INFO_FILE: &str = "dump.json";
const CALLSTACK_FILE: &str = "callstack.txt";

/// Contents of `dump.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpInfo {
    pub artifact: String,
    pub timestamp: String,
    pub time_unix: i64,
    pub time_unix_nano: i64,
    pub package: String,
    pub function: String,
    /// Source file that requested the dump.
    pub filename: String,
    pub line: u32,
    pub version: String,
    pub build_date: String,
    pub git_commit: String,
    pub git_branch: String,
    pub git_url: String,
    pub message: String,
}

impl DumpInfo {
    /// Describes a dump taken at `now` from `package.function`.
    pub fn new(
        now: &DateTime<Local>,
        package: &str,
        function: &str,
        caller: &std::panic::Location<'_>,
        build: &BuildInfo,
        message: impl Into<String>,
    ) -> Self {
        Self {
            artifact: env!("CARGO_PKG_NAME").to_string(),
            timestamp: dump_directory_name(now),
            time_unix: now.timestamp(),
            time_unix_nano: now.timestamp_nanos_opt().unwrap_or_default(),
            package: package.to_string(),
            function: function.to_string(),
            filename: caller.file().to_string(),
            line: caller.line(),
            version: build.version.to_string(),
            build_date: build.build_date.to_string(),
            git_commit: build.git_commit.to_string(),
            git_branch: build.git_branch.to_string(),
            git_url: build.git_url.to_string(),
            message: message.into(),
        }
    }
}

/// One dump directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dump {
    directory: PathBuf,
}

impl Dump {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Name of the dump directory (its timestamp).
    pub fn name(&self) -> String {
        self.directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Attaches an extra file to the dump.
    ///
    /// `title` must be a plain file name.
    pub fn add_bytes(&self, title: &str, data: &[u8]) -> Result<()> {
        let is_plain = !title.is_empty()
            && Path::new(title).file_name().is_some_and(|name| name == title)
            && !title.contains(['/', '\\']);
        if !is_plain {
            return Err(Error::Dump(format!("invalid dump attachment name: {}", title)));
        }
        fs::write(self.directory.join(title), data)?;
        Ok(())
    }

    /// Reads back `dump.json`.
    pub fn info(&self) -> Result<DumpInfo> {
        let data = fs::read(self.directory.join(INFO_FILE))?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Deletes the dump directory and everything in it.
    pub fn remove(self) -> Result<()> {
        fs::remove_dir_all(&self.directory)?;
        Ok(())
    }
}

/// The directory dumps are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpStore {
    root: PathBuf,
}

impl DumpStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a new dump for `info` with the current call stack.
    pub fn create(&self, info: &DumpInfo) -> Result<Dump> {
        fs::create_dir_all(&self.root)?;

        let mut directory = self.root.join(&info.timestamp);
        let mut attempt = 1;
        loop {
            match fs::create_dir(&directory) {
                Ok(()) => break,
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    directory = self.root.join(format!("{}-{}", info.timestamp, attempt));
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        let json = serde_json::to_vec_pretty(info)?;
        write_atomic(&directory.join(INFO_FILE), &json)?;

        let callstack = Backtrace::force_capture().to_string();
        fs::write(directory.join(CALLSTACK_FILE), callstack)?;

        Ok(Dump { directory })
    }

    /// Lists all dumps, oldest first. A missing root holds no dumps.
    pub fn list(&self) -> Result<Vec<Dump>> {
        let mut dumps: Vec<Dump> = self
            .dump_names()?
            .into_iter()
            .map(|name| Dump {
                directory: self.root.join(name),
            })
            .collect();
        dumps.sort_by(|a, b| a.directory.cmp(&b.directory));
        Ok(dumps)
    }

    /// Removes every dump.
    pub fn clear(&self) -> Result<usize> {
        let dumps = self.list()?;
        let count = dumps.len();
        for dump in dumps {
            dump.remove()?;
        }
        Ok(count)
    }

    /// Remembers the dumps that exist now, see [`DumpMark::list_new`].
    pub fn mark(&self) -> Result<DumpMark> {
        Ok(DumpMark {
            store: self.clone(),
            existing: self.dump_names()?.into_iter().collect(),
        })
    }

    fn dump_names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }
}

/// Snapshot of the dump root used to find dumps written afterwards.
#[derive(Debug, Clone)]
pub struct DumpMark {
    store: DumpStore,
    existing: HashSet<String>,
}

impl DumpMark {
    /// Lists dumps created since the mark was taken.
    pub fn list_new(&self) -> Result<Vec<Dump>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|dump| !self.existing.contains(&dump.name()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::build_info;
    use tempfile::tempdir;

    fn sample_info(message: &str) -> DumpInfo {
        DumpInfo::new(
            &Local::now(),
            "app",
            "handle_request",
            std::panic::Location::caller(),
            build_info(),
            message,
        )
    }

    #[test]
    fn create_writes_info_and_callstack() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = DumpStore::new(temp_dir.path().join("dumps"));

        let dump = store.create(&sample_info("boom")).expect("create dump");

        assert!(dump.directory().join(INFO_FILE).exists());
        assert!(dump.directory().join(CALLSTACK_FILE).exists());

        let info = dump.info().expect("read dump info");
        assert_eq!(info.message, "boom");
        assert_eq!(info.package, "app");
        assert_eq!(info.function, "handle_request");
        assert_eq!(info.artifact, "image_page");
        assert!(info.filename.ends_with("dump.rs"));
        assert_eq!(info.timestamp, dump.name());
    }

    #[test]
    fn same_timestamp_gets_a_distinct_directory() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = DumpStore::new(temp_dir.path());
        let info = sample_info("twice");

        let first = store.create(&info).expect("first dump");
        let second = store.create(&info).expect("second dump");

        assert_ne!(first.directory(), second.directory());
        assert_eq!(store.list().expect("list dumps").len(), 2);
    }

    #[test]
    fn add_bytes_attaches_files() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = DumpStore::new(temp_dir.path());
        let dump = store.create(&sample_info("with body")).expect("create dump");

        dump.add_bytes("request.txt", b"GET /page")
            .expect("attach request");

        let saved = fs::read(dump.directory().join("request.txt")).expect("read attachment");
        assert_eq!(saved, b"GET /page");
    }

    #[test]
    fn add_bytes_rejects_nested_names() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = DumpStore::new(temp_dir.path());
        let dump = store.create(&sample_info("names")).expect("create dump");

        for title in ["", "../escape.txt", "a/b.txt", ".."] {
            assert!(
                matches!(dump.add_bytes(title, b"x"), Err(Error::Dump(_))),
                "{title:?} should be rejected"
            );
        }
    }

    #[test]
    fn list_of_missing_root_is_empty() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = DumpStore::new(temp_dir.path().join("never-created"));

        assert!(store.list().expect("list dumps").is_empty());
        assert_eq!(store.clear().expect("clear dumps"), 0);
    }

    #[test]
    fn list_ignores_plain_files() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        fs::write(temp_dir.path().join("README"), b"notes").expect("write file");
        let store = DumpStore::new(temp_dir.path());

        assert!(store.list().expect("list dumps").is_empty());
    }

    #[test]
    fn mark_reports_only_new_dumps() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = DumpStore::new(temp_dir.path());
        let old = store.create(&sample_info("old")).expect("old dump");

        let mark = store.mark().expect("take mark");
        assert!(mark.list_new().expect("list new").is_empty());

        let new = store.create(&sample_info("new")).expect("new dump");
        let fresh = mark.list_new().expect("list new");

        assert_eq!(fresh, vec![new]);
        assert!(!fresh.contains(&old));
    }

    #[test]
    fn clear_removes_every_dump() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = DumpStore::new(temp_dir.path());
        store.create(&sample_info("one")).expect("dump one");
        store.create(&sample_info("two")).expect("dump two");

        assert_eq!(store.clear().expect("clear dumps"), 2);
        assert!(store.list().expect("list dumps").is_empty());
    }
}
