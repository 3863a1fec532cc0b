// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Io(String),
    Config(String),
    Request(RequestError),
    Dump(String),
}

/// Problems with the incoming request or with resolving the image it names.
/// All of these stop the page from being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The `REQUEST_URI` variable is not set
    MissingRequestUri,

    /// The request URI could not be decoded
    InvalidRequestUri(String),

    /// No usable `image` query parameter
    MissingImage,

    /// The image path tries to climb out of the prefix
    PathTraversal(String),

    /// The image does not exist on disk
    ImageNotFound(String),

    /// The image exists but is not one of the eligible siblings
    NotAmongSiblings(String),
}

impl RequestError {
    /// Returns a stable identifier for traces and dumps.
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::MissingRequestUri => "missing-request-uri",
            RequestError::InvalidRequestUri(_) => "invalid-request-uri",
            RequestError::MissingImage => "missing-image",
            RequestError::PathTraversal(_) => "path-traversal",
            RequestError::ImageNotFound(_) => "image-not-found",
            RequestError::NotAmongSiblings(_) => "not-among-siblings",
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingRequestUri => {
                write!(f, "environment variable 'REQUEST_URI' not found")
            }
            RequestError::InvalidRequestUri(uri) => {
                write!(f, "could not parse REQUEST_URI: {}", uri)
            }
            RequestError::MissingImage => write!(f, "no image requested"),
            RequestError::PathTraversal(path) => {
                write!(f, "image path leaves the prefix: {}", path)
            }
            RequestError::ImageNotFound(path) => write!(f, "could not stat file: {}", path),
            RequestError::NotAmongSiblings(path) => write!(f, "file not found: {}", path),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Request(e) => write!(f, "Request Error: {}", e),
            Error::Dump(e) => write!(f, "Dump Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        Error::Request(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Dump(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }

    #[test]
    fn request_error_wraps_into_error() {
        let err: Error = RequestError::MissingImage.into();
        assert_eq!(err, Error::Request(RequestError::MissingImage));
        assert_eq!(format!("{}", err), "Request Error: no image requested");
    }

    #[test]
    fn request_error_messages_name_the_path() {
        let err = RequestError::NotAmongSiblings("/photos/a.jpg".into());
        assert_eq!(format!("{}", err), "file not found: /photos/a.jpg");

        let err = RequestError::ImageNotFound("/photos/b.jpg".into());
        assert!(format!("{}", err).contains("/photos/b.jpg"));
    }

    #[test]
    fn request_error_codes_are_distinct() {
        let codes = [
            RequestError::MissingRequestUri.code(),
            RequestError::InvalidRequestUri(String::new()).code(),
            RequestError::MissingImage.code(),
            RequestError::PathTraversal(String::new()).code(),
            RequestError::ImageNotFound(String::new()).code(),
            RequestError::NotAmongSiblings(String::new()).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn json_error_maps_to_dump_variant() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Dump(_)));
    }
}
