// SPDX-License-Identifier: MPL-2.0
//! Build metadata embedded by `build.rs`.

/// Version and source control details of the running binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_date: &'static str,
    pub git_commit: &'static str,
    pub git_branch: &'static str,
    pub git_url: &'static str,
}

const BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    build_date: env!("IMAGE_PAGE_BUILD_DATE"),
    git_commit: env!("IMAGE_PAGE_GIT_COMMIT"),
    git_branch: env!("IMAGE_PAGE_GIT_BRANCH"),
    git_url: env!("IMAGE_PAGE_GIT_URL"),
};

/// Returns the metadata of this build.
#[must_use]
pub fn build_info() -> &'static BuildInfo {
    &BUILD_INFO
}
