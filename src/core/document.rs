// src/core/document.rs

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static HTML_ROOT: Lazy<Selector> = Lazy::new(|| Selector::parse("html").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Elements whose text never counts as page text.
pub const NON_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// The raw result of the page fetch. `Send`, so it can cross await points.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: Url,
    pub body: String,
    pub bytes: usize,
    pub fetched_at: DateTime<Utc>,
}

/// Immutable parsed snapshot of the fetched page.
///
/// Every document analyzer borrows the same `Document`; none of them can
/// modify the tree. The parsed tree is not `Send`, so a `Document` lives
/// only inside the synchronous analysis phase of a run.
pub struct Document<'a> {
    page: &'a FetchedPage,
    html: Html,
}

impl<'a> Document<'a> {
    pub fn parse(page: &'a FetchedPage) -> Self {
        Self {
            page,
            html: Html::parse_document(&page.body),
        }
    }

    pub fn url(&self) -> &Url {
        &self.page.url
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn raw(&self) -> &str {
        &self.page.body
    }

    pub fn page_bytes(&self) -> usize {
        self.page.bytes
    }

    pub fn title(&self) -> Option<String> {
        self.html
            .select(&TITLE)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    }

    pub fn first_h1(&self) -> Option<String> {
        self.html
            .select(&H1)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    }

    /// The detected subject of the page: its title, else its first h1.
    pub fn topic(&self) -> Option<String> {
        self.title().or_else(|| self.first_h1())
    }

    /// Value of `<html lang>`, lower-cased.
    pub fn lang(&self) -> Option<String> {
        self.html
            .select(&HTML_ROOT)
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
    }

    /// Visible text of the body, whitespace-normalized.
    pub fn plain_text(&self) -> String {
        match self.html.select(&BODY).next() {
            Some(body) => element_text(body, NON_TEXT_TAGS),
            None => element_text(self.html.root_element(), NON_TEXT_TAGS),
        }
    }

    /// Text of every `<p>`, in document order.
    pub fn paragraphs(&self) -> Vec<String> {
        self.html
            .select(&PARAGRAPH)
            .map(|p| normalize_whitespace(&p.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Collects the text below `el`, skipping whole subtrees whose tag is in `skip`.
pub fn element_text(el: ElementRef<'_>, skip: &[&str]) -> String {
    let mut out = String::new();
    push_text(el, skip, &mut out);
    normalize_whitespace(&out)
}

fn push_text(el: ElementRef<'_>, skip: &[&str], out: &mut String) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if !skip.contains(&child_el.value().name()) {
                push_text(child_el, skip, out);
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::FetchedPage;
    use chrono::Utc;
    use url::Url;

    pub fn page(url: &str, body: &str) -> FetchedPage {
        let url = Url::parse(url).unwrap();
        FetchedPage {
            url,
            body: body.to_string(),
            bytes: body.len(),
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::page;
    use super::*;

    #[test]
    fn plain_text_skips_scripts_and_styles() {
        let page = page(
            "https://example.com",
            "<html><body><style>p{}</style><p>Hello  <b>world</b></p><script>var x=1;</script></body></html>",
        );
        let doc = Document::parse(&page);
        assert_eq!(doc.plain_text(), "Hello world");
    }

    #[test]
    fn topic_prefers_title_then_h1() {
        let with_title = page("https://example.com", "<html><head><title> Rust Guide </title></head><body><h1>Other</h1></body></html>");
        assert_eq!(Document::parse(&with_title).topic().as_deref(), Some("Rust Guide"));

        let h1_only = page("https://example.com", "<html><body><h1>Only Heading</h1></body></html>");
        assert_eq!(Document::parse(&h1_only).topic().as_deref(), Some("Only Heading"));
    }

    #[test]
    fn lang_is_lowercased() {
        let p = page("https://example.com", r#"<html lang="pt-BR"><body></body></html>"#);
        assert_eq!(Document::parse(&p).lang().as_deref(), Some("pt-br"));
    }
}
