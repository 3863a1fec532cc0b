// SPDX-License-Identifier: MPL-2.0
//! File helpers for writing diagnostic dumps.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, TimeZone};

// =============================================================================
// Name Generation
// =============================================================================

/// Generates the directory name of a dump taken at `now`.
///
/// Format: `YYYY-MM-DD_HH-MM-SS.nnnnnnnnn`, which sorts chronologically.
#[must_use]
pub fn dump_directory_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y-%m-%d_%H-%M-%S%.9f").to_string()
}

/// Formats the timestamp written at the start of each trace line.
#[must_use]
pub fn trace_timestamp<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y/%m/%d %H:%M:%S").to_string()
}

// =============================================================================
// Atomic File Write
// =============================================================================

/// Writes content to a file atomically.
///
/// Uses a temporary file with `.tmp` extension, then renames to the final path.
/// This prevents partial writes from corrupting the target file.
///
/// # Errors
///
/// Returns an error if writing or renaming fails.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, content)?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(())
}
