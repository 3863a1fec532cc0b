// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Page**: Stylesheet and icon locations used by the rendered page
//! - **Diagnostics**: Trace levels and dump behavior

// ==========================================================================
// Page Defaults
// ==========================================================================

/// Stylesheet linked from every page.
pub const DEFAULT_STYLESHEET: &str = "../css/diary.css";

/// Icon for the link to the previous image.
pub const DEFAULT_PREVIOUS_ICON: &str = "images/previous.png";

/// Icon for the link to the next image.
pub const DEFAULT_NEXT_ICON: &str = "images/next.png";

/// Zoom icon shown while the image is scaled to fit.
pub const DEFAULT_SCALE_ICON: &str = "images/minus.png";

/// Zoom icon shown while the image is at its original size.
pub const DEFAULT_ORIGINAL_ICON: &str = "images/plus.png";

// ==========================================================================
// Diagnostics Defaults
// ==========================================================================

/// Global trace level (info).
pub const DEFAULT_TRACE_LEVEL: u32 = 30;

/// Trace level for packages without an explicit entry (verbose).
pub const DEFAULT_PACKAGE_TRACE_LEVEL: u32 = 50;

/// Trace level for functions without an explicit entry (verbose).
pub const DEFAULT_FUNCTION_TRACE_LEVEL: u32 = 50;

/// Name of the dump directory below the data directory.
pub const DEFAULT_DUMP_DIR_NAME: &str = "dumps";
