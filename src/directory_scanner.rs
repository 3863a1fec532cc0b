// SPDX-License-Identifier: MPL-2.0
//! Directory scanner module for listing the entries of a single directory.
//!
//! The listing is a plain snapshot of names and directory flags. Deciding
//! which entries are images and how they are ordered is left to
//! [`crate::navigation`].

use crate::error::Result;
use std::path::Path;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Base name of the entry, without any directory component
    pub name: String,
    /// Whether the entry is itself a directory
    pub is_dir: bool,
}

impl DirectoryEntry {
    /// Creates an entry for a regular file.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    /// Creates an entry for a directory.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Lists the entries of `directory` (non-recursive).
///
/// Entries whose names are not valid UTF-8 cannot be matched against a
/// request and are skipped. Symlinks are followed when deciding whether an
/// entry is a directory.
///
/// Returns an error if the directory cannot be read.
pub fn list_directory(directory: &Path) -> Result<Vec<DirectoryEntry>> {
    let mut entries = Vec::new();

    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;

        let Ok(name) = entry.file_name().into_string() else {
            log::debug!(
                "skipping non UTF-8 entry in {}: {:?}",
                directory.display(),
                entry.file_name()
            );
            continue;
        };

        let is_dir = entry.path().is_dir();
        entries.push(DirectoryEntry { name, is_dir });
    }

    Ok(entries)
}
