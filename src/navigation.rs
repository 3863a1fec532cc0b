// SPDX-License-Identifier: MPL-2.0
//! Sibling navigation for the image page.
//!
//! Given a directory snapshot and the base name of the requested image, this
//! module keeps the eligible image files, orders them by name and works out
//! which images come before and after the target.
//!
//! Ordering is ordinal (byte-wise) and case-sensitive. Only the extension test
//! ignores case, so `x.PNG` is eligible but still sorts after `a.png`.

use crate::directory_scanner::DirectoryEntry;

/// Image extensions accepted when no configuration overrides them.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Case-insensitive set of accepted file extensions.
///
/// Extensions are stored lower-case and without the leading dot, so
/// `".JPG"`, `"jpg"` and `"Jpg"` all describe the same entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: Vec<String>,
}

impl ExtensionSet {
    /// Builds a set from any list of extensions, normalizing case and dots.
    /// Empty entries are dropped.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        normalized.sort();
        normalized.dedup();
        Self {
            extensions: normalized,
        }
    }

    /// Returns true if `extension` (without the dot) is accepted.
    pub fn contains(&self, extension: &str) -> bool {
        let lowered = extension.to_lowercase();
        self.extensions.iter().any(|ext| *ext == lowered)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// Returns the extension of `name`: everything after the last `.`.
///
/// A name without a dot has no extension.
fn extension_of(name: &str) -> Option<&str> {
    name.rfind('.').map(|idx| &name[idx + 1..])
}

/// Checks if a file name carries an accepted extension.
pub fn is_eligible(name: &str, extensions: &ExtensionSet) -> bool {
    extension_of(name).is_some_and(|ext| extensions.contains(ext))
}

/// Ordered siblings of one target image and its position among them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationResult {
    ordered_names: Vec<String>,
    target_index: Option<usize>,
}

impl NavigationResult {
    /// Eligible sibling names in ordinal order.
    pub fn ordered_names(&self) -> &[String] {
        &self.ordered_names
    }

    /// Position of the target in [`Self::ordered_names`], if it was found.
    pub fn target_index(&self) -> Option<usize> {
        self.target_index
    }

    pub fn is_found(&self) -> bool {
        self.target_index.is_some()
    }

    /// Name of the target itself, if it was found.
    pub fn target(&self) -> Option<&str> {
        self.target_index
            .and_then(|idx| self.ordered_names.get(idx))
            .map(String::as_str)
    }

    /// The sibling immediately before the target.
    pub fn previous(&self) -> Option<&str> {
        let idx = self.target_index?.checked_sub(1)?;
        self.ordered_names.get(idx).map(String::as_str)
    }

    /// The sibling immediately after the target.
    ///
    /// The last image has no next sibling; navigation does not wrap.
    pub fn next(&self) -> Option<&str> {
        let idx = self.target_index? + 1;
        self.ordered_names.get(idx).map(String::as_str)
    }

    pub fn is_at_first(&self) -> bool {
        matches!(self.target_index, Some(0))
    }

    pub fn is_at_last(&self) -> bool {
        matches!(self.target_index, Some(idx) if idx + 1 == self.ordered_names.len())
    }

    pub fn len(&self) -> usize {
        self.ordered_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_names.is_empty()
    }
}

/// Computes the ordered siblings of `target_base_name` within `entries`.
///
/// Directories and files whose extension is not in `extensions` are ignored.
/// The target is matched exactly against the base names. Should the listing
/// contain the same name twice, the later position in sorted order is used.
pub fn navigate(
    entries: &[DirectoryEntry],
    target_base_name: &str,
    extensions: &ExtensionSet,
) -> NavigationResult {
    let mut ordered_names: Vec<String> = entries
        .iter()
        .filter(|entry| !entry.is_dir && is_eligible(&entry.name, extensions))
        .map(|entry| entry.name.clone())
        .collect();

    ordered_names.sort_unstable();

    let target_index = ordered_names
        .iter()
        .rposition(|name| name == target_base_name);

    NavigationResult {
        ordered_names,
        target_index,
    }
}
