// SPDX-License-Identifier: MPL-2.0
//! Build script for embedding build metadata.
//!
//! Exposes the build date and git details to the crate as compile-time
//! environment variables. Values fall back to `unknown` when git is not
//! available (e.g. building from a source tarball).

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn main() {
    let commit = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let branch =
        git(&["rev-parse", "--abbrev-ref", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let url = git(&["config", "--get", "remote.origin.url"]).unwrap_or_else(|| "unknown".into());
    let date = git(&["log", "-1", "--format=%cI"]).unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=IMAGE_PAGE_GIT_COMMIT={commit}");
    println!("cargo:rustc-env=IMAGE_PAGE_GIT_BRANCH={branch}");
    println!("cargo:rustc-env=IMAGE_PAGE_GIT_URL={url}");
    println!("cargo:rustc-env=IMAGE_PAGE_BUILD_DATE={date}");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
