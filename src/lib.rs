// SPDX-License-Identifier: MPL-2.0
//! `image_page` renders a single-image viewer page for a CGI request.
//!
//! It finds the images next to the requested one, orders them by name and
//! links the previous and next image, with a toggle between fit-to-box and
//! original size.

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod directory_scanner;
pub mod error;
pub mod location;
pub mod navigation;
pub mod render;
pub mod request;
pub mod version;
