//! Document model for rendered chart markup
//!
//! `Document::parse` hands the markup to `scraper` (html5ever), which builds
//! the same tree a browser would: void elements stay empty, unclosed tags are
//! closed, character references are decoded. `ElementExt` adds the text
//! accessors the extractors share on top of `scraper::ElementRef`.
//!
//! Every walk here is iterative, so nesting depth never grows the call stack.

pub use scraper::{ElementRef, Selector};

use scraper::Html;

/// Elements whose text children are never rendered
const NON_RENDERED: [&str; 4] = ["script", "style", "template", "noscript"];

/// An already-rendered document tree for one browsing context
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse HTML markup into a document. Malformed markup is recovered the
    /// way a browser recovers it, so parsing never fails.
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        if !html.errors.is_empty() {
            tracing::debug!(errors = html.errors.len(), "Recovered from markup errors");
        }
        Self { html }
    }

    /// The `<html>` element
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// All elements matching `selector`, in document order
    pub fn select(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        self.html.select(selector).collect()
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    pub fn exists(&self, selector: &Selector) -> bool {
        self.select_first(selector).is_some()
    }
}

/// Text helpers over `scraper::ElementRef`
pub trait ElementExt<'a> {
    /// Concatenated rendered text of every descendant (DOM `textContent`
    /// without script and style bodies)
    fn text_content(&self) -> String;

    /// `text_content()` with whitespace runs collapsed and the ends trimmed
    fn normalized_text(&self) -> String;

    /// Direct text children, trimmed, blanks dropped
    fn own_text_nodes(&self) -> Vec<String>;

    /// Text of every sibling that follows `child`, which must be a direct
    /// child of `self`. Empty when it is not one.
    fn text_after(&self, child: &ElementRef<'a>) -> String;

    fn select_first(&self, selector: &Selector) -> Option<ElementRef<'a>>;

    /// True when `self` or any descendant matches `selector`
    fn contains_match(&self, selector: &Selector) -> bool;

    fn parent_element(&self) -> Option<ElementRef<'a>>;

    fn has_class(&self, class: &str) -> bool;

    /// `<html>` or `<body>`: the document itself rather than a container
    fn is_document_level(&self) -> bool;
}

impl<'a> ElementExt<'a> for ElementRef<'a> {
    fn text_content(&self) -> String {
        let mut out = String::new();
        for node in self.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node
                .parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|parent| NON_RENDERED.contains(&parent.value().name()));
            if !hidden {
                out.push_str(text);
            }
        }
        out
    }

    fn normalized_text(&self) -> String {
        collapse_whitespace(&self.text_content())
    }

    fn own_text_nodes(&self) -> Vec<String> {
        self.children()
            .filter_map(|node| node.value().as_text().map(|text| collapse_whitespace(text)))
            .filter(|text| !text.is_empty())
            .collect()
    }

    fn text_after(&self, child: &ElementRef<'a>) -> String {
        if child.parent().map(|parent| parent.id()) != Some(self.id()) {
            return String::new();
        }

        let mut out = String::new();
        for sibling in child.next_siblings() {
            if let Some(text) = sibling.value().as_text() {
                out.push_str(text);
            } else if let Some(el) = ElementRef::wrap(sibling) {
                out.push_str(&el.text_content());
            }
        }
        out
    }

    fn select_first(&self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.select(selector).next()
    }

    fn contains_match(&self, selector: &Selector) -> bool {
        selector.matches(self) || self.select_first(selector).is_some()
    }

    fn parent_element(&self) -> Option<ElementRef<'a>> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn has_class(&self, class: &str) -> bool {
        self.value().classes().any(|c| c == class)
    }

    fn is_document_level(&self) -> bool {
        matches!(self.value().name(), "html" | "body")
    }
}

/// Collapse whitespace runs to a single space and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn test_text_nodes_keep_inline_whitespace() {
        let doc = Document::parse("<p>Take <b>two</b> tablets &amp; rest</p>");
        let p = doc.select_first(&sel("p")).unwrap();
        assert_eq!(p.text_content(), "Take two tablets & rest");
        assert_eq!(p.own_text_nodes(), vec!["Take", "tablets & rest"]);
    }

    #[test]
    fn test_named_character_references() {
        let doc = Document::parse("<td>x10&sup3;/&micro;L</td><p>&frac12; &ndash; 1</p>");
        assert_eq!(doc.select_first(&sel("p")).unwrap().normalized_text(), "½ – 1");
        let doc = Document::parse("<table><tr><td>x10&sup3;/&micro;L</td></tr></table>");
        assert_eq!(doc.select_first(&sel("td")).unwrap().normalized_text(), "x10³/µL");
    }

    #[test]
    fn test_attributes_and_classes() {
        let doc = Document::parse(
            r#"<ul><li class="med active" data-element="medication-item" title="'x'">x</li></ul>"#,
        );
        let li = doc.select_first(&sel("li")).unwrap();
        assert_eq!(li.attr("data-element"), Some("medication-item"));
        assert_eq!(li.attr("title"), Some("'x'"));
        assert!(li.has_class("active"));
        assert!(!li.has_class("act"));
        assert_eq!(li.parent_element().unwrap().value().name(), "ul");
        assert!(!li.is_document_level());
        assert!(doc.root().is_document_level());
    }

    #[test]
    fn test_comments_and_scripts_do_not_leak_into_text() {
        let doc = Document::parse(
            "<div>alpha<!-- hidden -->beta<script>var x = 1;</script><style>p{}</style></div>",
        );
        let div = doc.select_first(&sel("div")).unwrap();
        assert_eq!(div.text_content(), "alphabeta");
    }

    #[test]
    fn test_select_is_in_document_order() {
        let doc = Document::parse("<div><a>1</a><span><a>2</a></span><a>3</a></div>");
        let texts: Vec<String> = doc.select(&sel("a")).iter().map(|a| a.text_content()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_text_after_child() {
        let doc = Document::parse("<li><a>Lisinopril</a> 10 MG <br> Oral <i>Tablet</i></li>");
        let li = doc.select_first(&sel("li")).unwrap();
        let link = li.select_first(&sel("a")).unwrap();
        assert_eq!(collapse_whitespace(&li.text_after(&link)), "10 MG Oral Tablet");

        let italic = li.select_first(&sel("i")).unwrap();
        assert_eq!(doc.root().text_after(&italic), "");
    }

    #[test]
    fn test_void_and_unclosed_elements() {
        let doc = Document::parse("<ul><li>one<br>two<li>three</ul>");
        let items = doc.select(&sel("li"));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].own_text_nodes(), vec!["one", "two"]);
        assert_eq!(items[1].normalized_text(), "three");
    }

    #[test]
    fn test_br_separated_text_stays_on_the_item() {
        let doc = Document::parse("<ul><li><a>Atorvastatin</a>20 MG<br>Oral<br>Tablet</li></ul>");
        let li = doc.select_first(&sel("li")).unwrap();
        assert_eq!(li.own_text_nodes(), vec!["20 MG", "Oral", "Tablet"]);
        let br = li.select_first(&sel("br")).unwrap();
        assert_eq!(br.children().count(), 0);
    }

    #[test]
    fn test_contains_match_includes_self() {
        let doc = Document::parse(r#"<ul><li class="active"><span class="flag"></span></li></ul>"#);
        let li = doc.select_first(&sel("li")).unwrap();
        assert!(li.contains_match(&sel(".active")));
        assert!(li.contains_match(&sel(".flag")));
        assert!(!li.contains_match(&sel(".historical")));
    }

    #[test]
    fn test_deep_nesting_is_walked_without_recursion() {
        let depth = 5000;
        let markup = format!(
            "{}<span class=\"leaf\">deep text</span>{}",
            "<div>".repeat(depth),
            "</div>".repeat(depth)
        );
        let doc = Document::parse(&markup);
        let leaf = doc.select_first(&sel(".leaf")).unwrap();
        assert_eq!(leaf.normalized_text(), "deep text");
        assert_eq!(doc.root().normalized_text(), "deep text");
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::parse("");
        assert_eq!(doc.root().value().name(), "html");
        assert!(doc.select(&sel("div")).is_empty());
    }
}
