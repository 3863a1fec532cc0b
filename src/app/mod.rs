// SPDX-License-Identifier: MPL-2.0
//! Request orchestration for the image page.
//!
//! [`handle_request`] runs one CGI request end to end: it parses the request,
//! resolves the image below the prefix, lists the image's directory, finds the
//! neighbouring images and renders the page. The caller decides what to do
//! with a failure; nothing here exits the process.

pub mod paths;

use crate::config::Config;
use crate::diagnostics::Tracer;
use crate::directory_scanner;
use crate::error::{RequestError, Result};
use crate::location;
use crate::navigation;
use crate::render::{self, PageModel};
use crate::request;
use std::path::PathBuf;

/// The parts of the CGI environment the page cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CgiRequest {
    /// `PREFIX`: directory requested images are resolved against
    pub prefix: Option<String>,
    /// `REQUEST_URI`
    pub request_uri: Option<String>,
    /// `REQUEST_METHOD`
    pub method: Option<String>,
    /// `HTTP_*` variables, with the prefix removed
    pub headers: Vec<(String, String)>,
    /// Request body, when one was sent
    pub body: Option<Vec<u8>>,
}

impl CgiRequest {
    /// Collects the request from environment variables.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut request = CgiRequest::default();
        for (name, value) in vars {
            match name.as_str() {
                "PREFIX" => request.prefix = Some(value),
                "REQUEST_URI" => request.request_uri = Some(value),
                "REQUEST_METHOD" => request.method = Some(value),
                _ => {
                    if let Some(header) = name.strip_prefix("HTTP_") {
                        request.headers.push((header.replace('_', "-"), value));
                    }
                }
            }
        }
        request.headers.sort();
        request
    }
}

/// A rendered page plus the notices raised while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub notices: Vec<String>,
    pub html: String,
}

impl Page {
    /// Returns the response body: notices first, then the document.
    pub fn body(&self) -> String {
        let mut body: String = self
            .notices
            .iter()
            .map(|notice| render::render_notice(notice))
            .collect();
        body.push_str(&self.html);
        body
    }
}

/// Runs one request.
///
/// The `PREFIX` of the request wins over the configured prefix.
pub fn handle_request(cgi: &CgiRequest, config: &Config, tracer: &Tracer) -> Result<Page> {
    let package = tracer.package("app");
    let trace = package.function("handle_request");

    let request_uri = cgi
        .request_uri
        .as_deref()
        .ok_or(RequestError::MissingRequestUri)?;
    trace.trace_request(cgi.method.as_deref().unwrap_or("GET"), request_uri, &cgi.headers);
    if let Some(body) = &cgi.body {
        trace.trace_request_body(body);
    }

    let view = request::parse(request_uri)?;
    let notices: Vec<String> = view.notices.iter().map(ToString::to_string).collect();
    for notice in &notices {
        trace.warn(notice);
    }

    let prefix = cgi
        .prefix
        .as_deref()
        .filter(|prefix| !prefix.is_empty())
        .map(PathBuf::from)
        .or_else(|| config.prefix.clone());
    let location = location::resolve(prefix.as_deref(), &view.image)?;
    trace.verbose(format!("resolved {} to {}", view.image, location.file_path.display()));
    location::ensure_exists(&location, &view.image)?;

    let entries = directory_scanner::list_directory(&location.directory)?;
    let extensions = config.page.extension_set();
    let result = navigation::navigate(&entries, &location.base_name, &extensions);

    let nav_trace = tracer.package("navigation").function("navigate");
    nav_trace.verbose(format!(
        "{} eligible of {} entries, target index {:?}",
        result.len(),
        entries.len(),
        result.target_index()
    ));

    if !result.is_found() {
        return Err(RequestError::NotAmongSiblings(view.image.clone()).into());
    }
    trace.info(format!(
        "{}: previous={:?} next={:?}",
        view.image,
        result.previous(),
        result.next()
    ));

    let model = PageModel {
        image: &location.url_path,
        zoom: view.zoom,
        url_directory: &location.url_directory,
        previous: result.previous(),
        next: result.next(),
    };
    let html = render::render_page(&model, &config.page);

    Ok(Page { notices, html })
}
