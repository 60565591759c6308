//! Extract visible text and audit signals from raw HTML.
//!
//! Parses with the `scraper` crate. Subtrees rooted at `script`, `style`,
//! `nav`, `footer` and `svg` are treated as removed: they contribute no text
//! and none of the elements below them are counted.

use crate::types::{ExtractedPage, ImageSignal};
use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose whole subtree is ignored.
const PRUNED_TAGS: &[&str] = &["script", "style", "nav", "footer", "svg"];

/// Anchor classes that mark a call-to-action.
const CTA_CLASSES: &[&str] = &["btn", "button", "cta"];

/// Extract all audit signals from a fetched page.
///
/// `url` is the normalized request URL; `has_https` is derived from it,
/// not from the response. Deterministic for identical input.
pub fn extract(html: &[u8], url: &str) -> ExtractedPage {
    let html = String::from_utf8_lossy(html);
    let document = Html::parse_document(&html);

    let text = visible_text(&document);
    let word_count = text.split_whitespace().count();

    let title = select_kept(&document, "title")
        .next()
        .map(|t| element_text(&t))
        .filter(|t| !t.is_empty());

    let headings_h1 = select_kept(&document, "h1")
        .map(|h| element_text(&h))
        .collect();

    let images = select_kept(&document, "img")
        .map(|img| ImageSignal {
            has_alt: img.value().attr("alt").is_some(),
        })
        .collect();

    let lang_attr = document
        .root_element()
        .value()
        .attr("lang")
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from);

    let cta_elements_count = select_kept(&document, "button, a")
        .filter(|e| is_cta(e))
        .count();
    let headings_h2_count = select_kept(&document, "h2").count();
    let paragraph_count = select_kept(&document, "p").count();
    let links_count = select_kept(&document, "a").count();
    let has_og_image = select_kept(&document, r#"meta[property="og:image"]"#)
        .next()
        .is_some();
    let has_viewport_meta = select_kept(&document, r#"meta[name="viewport"]"#)
        .next()
        .is_some();

    ExtractedPage {
        text,
        title,
        headings_h1,
        headings_h2_count,
        paragraph_count,
        word_count,
        images,
        links_count,
        has_https: is_https(url),
        lang_attr,
        has_og_image,
        has_viewport_meta,
        cta_elements_count,
    }
}

/// Whether the URL's scheme is https.
pub fn is_https(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| u.scheme() == "https")
        .unwrap_or(false)
}

// ── Tree helpers ────────────────────────────────────────────────────────────

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}

/// Select elements that do not sit inside a pruned subtree.
fn select_kept<'a>(document: &'a Html, css: &str) -> impl Iterator<Item = ElementRef<'a>> {
    let sel = selector(css);
    document
        .select(&sel)
        .filter(|e| !is_pruned(e))
        .collect::<Vec<_>>()
        .into_iter()
}

fn is_pruned(element: &ElementRef<'_>) -> bool {
    PRUNED_TAGS.contains(&element.value().name())
        || element.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| PRUNED_TAGS.contains(&e.name()))
        })
}

/// Text of every kept text node, each trimmed, blanks dropped, joined by one space.
fn visible_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let in_pruned = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| PRUNED_TAGS.contains(&e.name()))
        });
        if in_pruned {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    parts.join(" ")
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

fn is_cta(element: &ElementRef<'_>) -> bool {
    match element.value().name() {
        "button" => true,
        "a" => element.value().classes().any(|c| CTA_CLASSES.contains(&c)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> ExtractedPage {
        extract(html.as_bytes(), "https://example.com/")
    }

    #[test]
    fn test_text_skips_pruned_subtrees() {
        let p = page(
            r#"<html><head><title>Home</title><style>body{color:red}</style></head>
            <body>
              <nav>Menu Items</nav>
              <p>Hello   world</p>
              <script>var x = "hidden";</script>
              <svg><text>vector</text></svg>
              <footer>Legal stuff</footer>
              <div>Bye</div>
            </body></html>"#,
        );
        assert_eq!(p.text, "Home Hello   world Bye");
        assert_eq!(p.word_count, 4);
        assert!(!p.text.contains("Menu"));
        assert!(!p.text.contains("hidden"));
        assert!(!p.text.contains("vector"));
        assert!(!p.text.contains("Legal"));
    }

    #[test]
    fn test_title_and_headings() {
        let p = page(
            r#"<html><head><title>  My Page  </title></head><body>
            <h1>First</h1><h1>Second <em>part</em></h1>
            <h2>A</h2><h2>B</h2><h2>C</h2>
            <p>1</p><p>2</p></body></html>"#,
        );
        assert_eq!(p.title.as_deref(), Some("My Page"));
        assert_eq!(p.headings_h1, vec!["First", "Second  part"]);
        assert_eq!(p.headings_h2_count, 3);
        assert_eq!(p.paragraph_count, 2);
    }

    #[test]
    fn test_blank_title_is_none() {
        let p = page("<html><head><title>   </title></head><body></body></html>");
        assert!(p.title.is_none());
        let p = page("<html><body>No head</body></html>");
        assert!(p.title.is_none());
    }

    #[test]
    fn test_alt_presence_is_lenient() {
        let p = page(
            r#"<html><body>
            <img src="a.png" alt="A logo">
            <img src="b.png" alt="">
            <img src="c.png">
            </body></html>"#,
        );
        assert_eq!(p.images.len(), 3);
        assert!(p.images[0].has_alt);
        assert!(p.images[1].has_alt);
        assert!(!p.images[2].has_alt);
        assert_eq!(p.images_missing_alt(), 1);
    }

    #[test]
    fn test_links_inside_nav_and_footer_are_not_counted() {
        let p = page(
            r#"<html><body>
            <nav><a href="/a">a</a><a href="/b">b</a></nav>
            <main><a href="/c">c</a></main>
            <footer><a href="/d">d</a></footer>
            </body></html>"#,
        );
        assert_eq!(p.links_count, 1);
    }

    #[test]
    fn test_meta_signals() {
        let p = page(
            r#"<html lang="fr"><head>
            <meta property="og:image" content="https://example.com/card.png">
            <meta name="viewport" content="width=device-width">
            </head><body></body></html>"#,
        );
        assert_eq!(p.lang_attr.as_deref(), Some("fr"));
        assert!(p.has_og_image);
        assert!(p.has_viewport_meta);

        let p = page("<html><head><meta property=\"og:title\" content=\"x\"></head></html>");
        assert!(p.lang_attr.is_none());
        assert!(!p.has_og_image);
        assert!(!p.has_viewport_meta);
    }

    #[test]
    fn test_cta_detection() {
        let p = page(
            r#"<html><body>
            <button>Buy</button>
            <a class="btn btn-primary" href="/x">Go</a>
            <a class="cta" href="/y">Start</a>
            <a class="btn-large" href="/z">Not a cta</a>
            <a href="/w">Plain</a>
            <nav><button>Menu</button></nav>
            </body></html>"#,
        );
        assert_eq!(p.cta_elements_count, 3);
        assert_eq!(p.links_count, 4);
    }

    #[test]
    fn test_https_from_url_not_response() {
        let html = b"<html></html>";
        assert!(extract(html, "https://example.com").has_https);
        assert!(!extract(html, "http://example.com").has_https);
        assert!(!extract(html, "not a url").has_https);
    }

    #[test]
    fn test_deterministic() {
        let html = br#"<html lang="en"><body><h1>x</h1><p>some words here</p></body></html>"#;
        assert_eq!(
            extract(html, "https://example.com"),
            extract(html, "https://example.com")
        );
    }
}
