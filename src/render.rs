// SPDX-License-Identifier: MPL-2.0
//! HTML rendering of the image page.
//!
//! Paths are percent-encoded segment by segment and every attribute value is
//! HTML-escaped, so file names with spaces, quotes or `&` produce valid links.

use crate::config::PageConfig;
use crate::request::ZoomMode;
use crate::version::BuildInfo;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;
use std::path::Path;

/// Everything the page shows for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageModel<'a> {
    /// URL path of the image (see `ImageLocation::url_path`)
    pub image: &'a str,
    pub zoom: ZoomMode,
    /// Directory of the image in URL form (see `ImageLocation::url_directory`)
    pub url_directory: &'a str,
    pub previous: Option<&'a str>,
    pub next: Option<&'a str>,
}

/// Percent-encodes each segment of a `/` separated path.
fn encode_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// URL of a sibling file next to the requested image.
fn sibling_href(url_directory: &str, name: &str) -> String {
    let directory = encode_path(url_directory);
    let name = urlencoding::encode(name);
    if directory.ends_with('/') {
        format!("{}{}", directory, name)
    } else {
        format!("{}/{}", directory, name)
    }
}

/// Link back to this page with the other zoom mode.
fn zoom_toggle_href(image: &str, zoom: ZoomMode) -> String {
    format!(
        "?image={}&zoom={}",
        urlencoding::encode(image),
        zoom.toggled().as_query()
    )
}

fn nav_button(out: &mut String, class: &str, href: &str, icon: &str) {
    let _ = writeln!(
        out,
        " <div class=\"{}\"><a href=\"{}\"><img src=\"{}\"></a></div>",
        class,
        encode_double_quoted_attribute(href),
        encode_double_quoted_attribute(icon)
    );
}

/// Renders the full HTML document for `model`.
#[must_use]
pub fn render_page(model: &PageModel<'_>, assets: &PageConfig) -> String {
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    out.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    let _ = writeln!(
        out,
        "<link rel=\"stylesheet\" type=\"text/css\" href=\"{}\">",
        encode_double_quoted_attribute(&assets.stylesheet)
    );
    out.push_str("</head>\n<body>\n<div class=\"imgbox\">\n");

    let src = encode_path(model.image);
    match model.zoom {
        ZoomMode::Scale => {
            let _ = writeln!(
                out,
                " <img src=\"{}\" class=\"center-fit\">",
                encode_double_quoted_attribute(&src)
            );
        }
        ZoomMode::Original => {
            let _ = writeln!(out, " <img src=\"{}\">", encode_double_quoted_attribute(&src));
        }
    }

    if let Some(previous) = model.previous {
        let href = sibling_href(model.url_directory, previous);
        nav_button(&mut out, "center-left", &href, &assets.previous_icon);
    }

    let zoom_icon = match model.zoom {
        ZoomMode::Scale => &assets.scale_icon,
        ZoomMode::Original => &assets.original_icon,
    };
    nav_button(
        &mut out,
        "top-center",
        &zoom_toggle_href(model.image, model.zoom),
        zoom_icon,
    );

    if let Some(next) = model.next {
        let href = sibling_href(model.url_directory, next);
        nav_button(&mut out, "center-right", &href, &assets.next_icon);
    }

    out.push_str("</div>\n</body>\n</html>\n");
    out
}

/// Renders the block that precedes any reported problem: program version
/// and working directory.
#[must_use]
pub fn render_context(build: &BuildInfo, cwd: Option<&Path>) -> String {
    let cwd = cwd
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    format!(
        "<p>page, version: {}</p>\n<p>Current Working Directory: {}</p>\n",
        encode_text(build.version),
        encode_text(&cwd)
    )
}

/// Renders a non-fatal problem with the request.
#[must_use]
pub fn render_notice(message: &str) -> String {
    format!("<p>WARNING: {}</p>\n", encode_text(message))
}

/// Renders the body returned when no page can be produced.
#[must_use]
pub fn render_error_page(message: &str, build: &BuildInfo, cwd: Option<&Path>) -> String {
    let mut out = render_context(build, cwd);
    let _ = writeln!(out, "<p>ERROR: {}</p>", encode_text(message));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::build_info;

    fn model<'a>(image: &'a str, dir: &'a str) -> PageModel<'a> {
        PageModel {
            image,
            zoom: ZoomMode::Scale,
            url_directory: dir,
            previous: None,
            next: None,
        }
    }

    #[test]
    fn page_links_previous_and_next_siblings() {
        let page = render_page(
            &PageModel {
                previous: Some("a.png"),
                next: Some("c.jpeg"),
                ..model("/photos/b.jpg", "/photos")
            },
            &PageConfig::default(),
        );

        assert!(page.starts_with("<!DOCTYPE html>\n"));
        assert!(page.contains(" <img src=\"/photos/b.jpg\" class=\"center-fit\">"));
        assert!(page.contains(
            "<div class=\"center-left\"><a href=\"/photos/a.png\"><img src=\"images/previous.png\"></a></div>"
        ));
        assert!(page.contains(
            "<div class=\"center-right\"><a href=\"/photos/c.jpeg\"><img src=\"images/next.png\"></a></div>"
        ));
        assert!(page.contains("href=\"../css/diary.css\""));
        assert!(page.ends_with("</html>\n"));
    }

    #[test]
    fn page_without_neighbours_has_only_zoom_button() {
        let page = render_page(&model("/photos/b.jpg", "/photos"), &PageConfig::default());

        assert!(!page.contains("center-left"));
        assert!(!page.contains("center-right"));
        assert!(page.contains("top-center"));
    }

    #[test]
    fn buttons_follow_image_in_document_order() {
        let page = render_page(
            &PageModel {
                previous: Some("a.png"),
                next: Some("c.png"),
                ..model("b.png", ".")
            },
            &PageConfig::default(),
        );

        let img = page.find("class=\"center-fit\"").expect("image");
        let left = page.find("center-left").expect("previous");
        let zoom = page.find("top-center").expect("zoom");
        let right = page.find("center-right").expect("next");
        assert!(img < left && left < zoom && zoom < right);
    }

    #[test]
    fn zoom_toggle_points_at_the_other_mode() {
        let scaled = render_page(&model("/p/a.jpg", "/p"), &PageConfig::default());
        assert!(scaled.contains(
            "<a href=\"?image=%2Fp%2Fa.jpg&amp;zoom=orig\"><img src=\"images/minus.png\"></a>"
        ));

        let original = render_page(
            &PageModel {
                zoom: ZoomMode::Original,
                ..model("/p/a.jpg", "/p")
            },
            &PageConfig::default(),
        );
        assert!(original.contains("zoom=scale\"><img src=\"images/plus.png\">"));
        assert!(original.contains(" <img src=\"/p/a.jpg\">"));
        assert!(!original.contains("center-fit"));
    }

    #[test]
    fn names_are_encoded_and_escaped() {
        let page = render_page(
            &PageModel {
                next: Some("say \"hi\" & <run>.png"),
                ..model("/my photos/a.png", "/my photos")
            },
            &PageConfig::default(),
        );

        assert!(page.contains("src=\"/my%20photos/a.png\""));
        assert!(page.contains("href=\"/my%20photos/say%20%22hi%22%20%26%20%3Crun%3E.png\""));
        assert!(!page.contains("<run>"));
    }

    #[test]
    fn root_and_current_directories_join_cleanly() {
        assert_eq!(sibling_href("/", "b.png"), "/b.png");
        assert_eq!(sibling_href(".", "b.png"), "./b.png");
        assert_eq!(sibling_href("photos/2020", "b.png"), "photos/2020/b.png");
    }

    #[test]
    fn custom_assets_are_used() {
        let assets = PageConfig {
            stylesheet: "/static/view.css".to_string(),
            next_icon: "/icons/next.svg".to_string(),
            ..PageConfig::default()
        };
        let page = render_page(
            &PageModel {
                next: Some("b.png"),
                ..model("a.png", ".")
            },
            &assets,
        );

        assert!(page.contains("href=\"/static/view.css\""));
        assert!(page.contains("<img src=\"/icons/next.svg\">"));
    }

    #[test]
    fn error_page_reports_version_directory_and_message() {
        let body = render_error_page(
            "file not found: <a.png>",
            build_info(),
            Some(Path::new("/srv/cgi-bin")),
        );

        assert!(body.contains(&format!("<p>page, version: {}</p>", build_info().version)));
        assert!(body.contains("<p>Current Working Directory: /srv/cgi-bin</p>"));
        assert!(body.contains("<p>ERROR: file not found: &lt;a.png&gt;</p>"));
    }

    #[test]
    fn notices_are_escaped() {
        assert_eq!(
            render_notice("too many files: a&b"),
            "<p>WARNING: too many files: a&amp;b</p>\n"
        );
    }
}
