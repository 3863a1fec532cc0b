// SPDX-License-Identifier: MPL-2.0
//! Parsing of the CGI request into a [`ViewRequest`].
//!
//! Only the query string of `REQUEST_URI` matters. It carries the `image` to
//! show and an optional `zoom` mode. Anomalies that still allow a page to be
//! rendered are collected as [`RequestNotice`]s instead of failing the
//! request.

use crate::error::RequestError;
use std::fmt;

/// How the image is laid out on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoomMode {
    /// Fit the image to the viewing box
    #[default]
    Scale,
    /// Show the image at its original size
    Original,
}

impl ZoomMode {
    /// Parses a query value, ignoring case.
    pub fn from_query(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "scale" => Some(ZoomMode::Scale),
            "orig" => Some(ZoomMode::Original),
            _ => None,
        }
    }

    /// Returns the value used for this mode in query strings.
    pub fn as_query(self) -> &'static str {
        match self {
            ZoomMode::Scale => "scale",
            ZoomMode::Original => "orig",
        }
    }

    /// Returns the other mode.
    pub fn toggled(self) -> Self {
        match self {
            ZoomMode::Scale => ZoomMode::Original,
            ZoomMode::Original => ZoomMode::Scale,
        }
    }
}

/// Non-fatal problems found while parsing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestNotice {
    /// More than one `image` parameter; the first one is used
    MultipleImages(Vec<String>),
    /// More than one `zoom` parameter; the default mode is used
    MultipleZooms(Vec<String>),
    /// A `zoom` value that is neither `scale` nor `orig`
    UnknownZoom(String),
}

impl fmt::Display for RequestNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestNotice::MultipleImages(images) => {
                write!(f, "too many files: {}", images.join(","))
            }
            RequestNotice::MultipleZooms(zooms) => write!(f, "too many zooms: {}", zooms.join(",")),
            RequestNotice::UnknownZoom(zoom) => write!(f, "unknown zoom: {}", zoom),
        }
    }
}

/// A parsed request for the image page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    /// The requested image path, percent-decoded
    pub image: String,
    pub zoom: ZoomMode,
    pub notices: Vec<RequestNotice>,
}

/// Splits a query string into decoded key/value pairs.
///
/// `+` stands for a space. A pair without `=` has an empty value.
fn query_pairs(query: &str) -> Result<Vec<(String, String)>, RequestError> {
    let decode = |raw: &str| -> Result<String, RequestError> {
        let spaced = raw.replace('+', " ");
        urlencoding::decode(&spaced)
            .map(|decoded| decoded.into_owned())
            .map_err(|_| RequestError::InvalidRequestUri(raw.to_string()))
    };

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((decode(key)?, decode(value)?))
        })
        .collect()
}

/// Returns the query part of a request URI, without any fragment.
fn query_of(request_uri: &str) -> &str {
    let without_fragment = request_uri
        .split_once('#')
        .map_or(request_uri, |(head, _)| head);
    without_fragment
        .split_once('?')
        .map_or("", |(_, query)| query)
}

/// Parses a request URI such as `/cgi-bin/page?image=/photos/a.jpg&zoom=orig`.
pub fn parse(request_uri: &str) -> Result<ViewRequest, RequestError> {
    let pairs = query_pairs(query_of(request_uri)).map_err(|err| match err {
        RequestError::InvalidRequestUri(_) => {
            RequestError::InvalidRequestUri(request_uri.to_string())
        }
        other => other,
    })?;

    let values = |name: &str| -> Vec<String> {
        pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .collect()
    };

    let mut notices = Vec::new();

    let zooms = values("zoom");
    let zoom = match zooms.as_slice() {
        [] => ZoomMode::default(),
        [value] => ZoomMode::from_query(value).unwrap_or_else(|| {
            notices.push(RequestNotice::UnknownZoom(value.clone()));
            ZoomMode::default()
        }),
        _ => {
            notices.push(RequestNotice::MultipleZooms(zooms.clone()));
            ZoomMode::default()
        }
    };

    let images = values("image");
    let image = match images.first() {
        None => return Err(RequestError::MissingImage),
        Some(image) if image.is_empty() => return Err(RequestError::MissingImage),
        Some(image) => image.clone(),
    };
    if images.len() > 1 {
        notices.push(RequestNotice::MultipleImages(images));
    }

    Ok(ViewRequest {
        image,
        zoom,
        notices,
    })
}
