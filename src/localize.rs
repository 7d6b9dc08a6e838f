//! Point remote asset references at local folders.
//!
//! A mirrored page keeps its original `https://…` and `/static/…` URLs.
//! This pass rewrites them to `<dir>/<basename>` so the page loads the
//! copies sitting next to it:
//!
//! | Reference                     | Folder       |
//! |-------------------------------|--------------|
//! | `link[rel=stylesheet] href`   | `css_dir`    |
//! | `script[src]`                 | `js_dir`     |
//! | `img[src]`                    | `images_dir` |
//! | `url(...)` inside `<style>`   | `images_dir` |
//!
//! `data:` URLs and paths that are already relative are left alone.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::LocalizeConfig;
use crate::dom::{Document, DomError};

/// `url(...)` with optional quotes. ASCII classes only.
static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\([ \t\r\n]*(['"]?)([^'")]+)(['"]?)[ \t\r\n]*\)"#).unwrap()
});

/// References rewritten by one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LocalizeReport {
    pub stylesheets: usize,
    pub scripts: usize,
    pub images: usize,
    pub style_urls: usize,
}

impl LocalizeReport {
    pub fn total(&self) -> usize {
        self.stylesheets + self.scripts + self.images + self.style_urls
    }
}

/// Rewrite every remote asset reference in `doc`.
pub fn localize(doc: &mut Document, config: &LocalizeConfig) -> Result<LocalizeReport, DomError> {
    let mut report = LocalizeReport {
        stylesheets: rewrite_attr(doc, "link[rel~=stylesheet][href]", "href", &config.css_dir)?,
        scripts: rewrite_attr(doc, "script[src]", "src", &config.js_dir)?,
        images: rewrite_attr(doc, "img[src]", "src", &config.images_dir)?,
        ..Default::default()
    };

    for style in doc.query("style")? {
        let Some(css) = doc.text(style) else {
            continue;
        };
        let (rewritten, count) = rewrite_css_urls(&css, &config.images_dir);
        if count > 0 {
            doc.set_raw_text(style, &rewritten)?;
            report.style_urls += count;
        }
    }

    crate::debug!("localize"; "rewrote {} references", report.total());
    Ok(report)
}

fn rewrite_attr(
    doc: &mut Document,
    selector: &str,
    attr: &str,
    dir: &str,
) -> Result<usize, DomError> {
    let mut count = 0;
    for id in doc.query(selector)? {
        let Some(local) = doc.attr(id, attr).and_then(|url| local_path(url, dir)) else {
            continue;
        };
        doc.set_attribute(id, attr, &local)?;
        count += 1;
    }
    Ok(count)
}

/// Rewrite `url(...)` references in a stylesheet.
fn rewrite_css_urls<'a>(css: &'a str, dir: &str) -> (Cow<'a, str>, usize) {
    let mut count = 0;
    let rewritten = CSS_URL.replace_all(css, |caps: &Captures<'_>| match local_path(&caps[2], dir) {
        Some(local) => {
            count += 1;
            format!("url({}{}{})", &caps[1], local, &caps[3])
        }
        None => caps[0].to_owned(),
    });
    (rewritten, count)
}

/// `<dir>/<basename>` for absolute and root-relative URLs.
pub fn local_path(url: &str, dir: &str) -> Option<String> {
    let url = url.trim();
    let path = if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .or_else(|| url.strip_prefix("//"))
    {
        // Drop the host.
        rest.find('/').map_or("", |i| &rest[i..])
    } else if url.starts_with('/') {
        url
    } else {
        return None;
    };

    let path = path.split(['?', '#']).next().unwrap_or_default();
    let name = path.rsplit('/').next().filter(|name| !name.is_empty())?;
    Some(format!("{}/{}", dir.trim_end_matches('/'), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LocalizeConfig {
        LocalizeConfig {
            enable: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_local_path() {
        assert_eq!(
            local_path("https://cdn.example.com/assets/app.css?v=3", "css").as_deref(),
            Some("css/app.css")
        );
        assert_eq!(local_path("//cdn.example.com/a/b.js", "js/").as_deref(), Some("js/b.js"));
        assert_eq!(local_path("/static/logo.png#x", "images").as_deref(), Some("images/logo.png"));
        assert_eq!(local_path("images/logo.png", "images"), None);
        assert_eq!(local_path("data:image/png;base64,AAAA", "images"), None);
        assert_eq!(local_path("https://example.com/", "css"), None);
        assert_eq!(local_path("https://example.com", "css"), None);
    }

    #[test]
    fn test_rewrite_css_urls() {
        let css = r#"a { background: url("https://x.io/bg.webp") } b { background: url(data:x) }
            c { src: url( /fonts/inter.woff2 ) }"#;
        let (rewritten, count) = rewrite_css_urls(css, "images");
        assert_eq!(count, 2);
        assert!(rewritten.contains(r#"url("images/bg.webp")"#));
        assert!(rewritten.contains("url(images/inter.woff2)"));
        assert!(rewritten.contains("url(data:x)"));
    }

    #[test]
    fn test_localize_document() {
        let mut doc = Document::parse(
            r#"<html><head>
                <link rel="stylesheet" href="https://thorswap.finance/_next/main.css">
                <link rel="icon" href="/favicon.ico">
                <script src="/_next/chunks/app.js"></script>
                <style>.hero { background: url('/img/hero.jpg') }</style>
            </head><body>
                <img src="https://thorswap.finance/img/coin.svg" alt="coin">
                <img src="./watch.svg">
            </body></html>"#,
        );

        let report = localize(&mut doc, &config()).unwrap();
        assert_eq!(
            report,
            LocalizeReport {
                stylesheets: 1,
                scripts: 1,
                images: 1,
                style_urls: 1,
            }
        );

        let html = doc.to_html();
        assert!(html.contains(r#"href="css/main.css""#));
        assert!(html.contains(r#"href="/favicon.ico""#));
        assert!(html.contains(r#"src="js/app.js""#));
        assert!(html.contains(r#"src="images/coin.svg""#));
        assert!(html.contains(r#"alt="coin""#));
        assert!(html.contains(r#"src="./watch.svg""#));
        assert!(html.contains("url('images/hero.jpg')"));
    }
}
