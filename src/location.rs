// SPDX-License-Identifier: MPL-2.0
//! Resolution of a requested image to filesystem and URL locations.
//!
//! The requested image is a URL-style path (`/photos/2020/a.jpg`). It is
//! joined component by component below the configured prefix, so separators
//! never depend on string concatenation and `..` cannot climb out of the
//! prefix.

use crate::error::RequestError;
use std::path::{Path, PathBuf};

/// Where the requested image lives on disk and in URL space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLocation {
    /// Full path of the image file
    pub file_path: PathBuf,
    /// Directory holding the image and its siblings
    pub directory: PathBuf,
    /// File name of the image
    pub base_name: String,
    /// The requested path with empty and `.` segments removed
    pub url_path: String,
    /// Directory part of `url_path`, `/` separated, `.` if none
    pub url_directory: String,
}

/// Resolves `image` below `prefix`.
///
/// With an empty or missing prefix the image path is used as given, which
/// keeps absolute requests absolute.
pub fn resolve(prefix: Option<&Path>, image: &str) -> Result<ImageLocation, RequestError> {
    let requested = image.replace('\\', "/");
    let absolute = requested.starts_with('/');

    let mut segments = Vec::new();
    for segment in requested.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(RequestError::PathTraversal(image.to_string())),
            segment => segments.push(segment),
        }
    }

    let Some((base_name, parents)) = segments.split_last() else {
        return Err(RequestError::MissingImage);
    };
    if requested.ends_with('/') {
        return Err(RequestError::MissingImage);
    }

    let mut directory = match prefix.filter(|p| !p.as_os_str().is_empty()) {
        Some(prefix) => prefix.to_path_buf(),
        None if absolute => PathBuf::from("/"),
        None => PathBuf::new(),
    };
    for parent in parents {
        directory.push(parent);
    }
    if directory.as_os_str().is_empty() {
        directory.push(".");
    }
    let file_path = directory.join(base_name);

    let root = if absolute { "/" } else { "" };
    let url_directory = match (absolute, parents.is_empty()) {
        (false, true) => String::from("."),
        _ => format!("{}{}", root, parents.join("/")),
    };

    Ok(ImageLocation {
        file_path,
        directory,
        base_name: (*base_name).to_string(),
        url_path: format!("{}{}", root, segments.join("/")),
        url_directory,
    })
}

/// Checks that the resolved image exists.
pub fn ensure_exists(location: &ImageLocation, image: &str) -> Result<(), RequestError> {
    std::fs::metadata(&location.file_path)
        .map(|_| ())
        .map_err(|_| RequestError::ImageNotFound(image.to_string()))
}
