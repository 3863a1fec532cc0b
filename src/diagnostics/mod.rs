// SPDX-License-Identifier: MPL-2.0
//! Diagnostics module for tracing requests and capturing crash dumps.
//!
//! # Architecture
//!
//! - [`Tracer`]: Context built from the `[diagnostics]` settings and passed to
//!   the code that traces. Hands out [`PackageTracer`]s and [`FunctionTracer`]s.
//! - [`TraceLevel`]: Numeric severity, filtered by the global, package and
//!   function thresholds.
//! - [`DumpStore`]: Timestamped dump directories with JSON metadata and a
//!   call stack.
//!
//! # Privacy
//!
//! Request bodies are sanitized before they are traced: whitespace is
//! collapsed and `password` fields are masked.

mod dump;
mod export;
mod level;
mod sanitizer;
mod tracer;

pub use dump::{Dump, DumpInfo, DumpMark, DumpStore};
pub use export::{dump_directory_name, write_atomic};
pub use level::TraceLevel;
pub use sanitizer::{sanitize_request_body, MASK};
pub use tracer::{FunctionTracer, PackageTracer, Tracer};
