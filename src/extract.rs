//! HTML text extraction.
//!
//! Two strategies over a parsed [`Html`] document:
//!
//! - [`extract_article`] isolates the main content and drops navigation,
//!   sidebars, link lists and other boilerplate.
//! - [`extract_full_text`] returns every visible text node, boilerplate and all.

use scraper::{ElementRef, Html, Node, Selector};

/// Semantic containers that usually hold the main content, best first
const CONTAINER_SELECTORS: [&str; 8] = [
    "article",
    "main",
    "[role='main']",
    "#content",
    ".content",
    ".post-content",
    ".entry-content",
    ".article-body",
];

/// Elements whose text becomes a fragment of the extracted article
const FRAGMENT_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, blockquote, pre";

/// Candidate containers when no semantic container has content
const BLOCK_SELECTOR: &str = "div, section, td";

/// Subtrees that never contribute to article text
const BOILERPLATE_TAGS: [&str; 11] = [
    "nav", "header", "footer", "aside", "form", "script", "style", "noscript", "template",
    "svg", "iframe",
];

/// Subtrees whose text is never rendered
const INVISIBLE_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Non-heading fragments at or below this length are dropped
const MIN_FRAGMENT_CHARS: usize = 20;

/// Fragments with a higher share of link text are dropped
const MAX_LINK_DENSITY: f64 = 0.5;

/// Extract the page title from <title> or <h1>
pub fn extract_title(document: &Html) -> Option<String> {
    for tag in ["title", "h1"] {
        let Ok(selector) = Selector::parse(tag) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let title = collapse_whitespace(element.text());
            if !title.is_empty() {
                return Some(title);
            }
        }
    }

    None
}

/// Extract the main article text, without boilerplate.
///
/// Returns an empty string when nothing qualifies.
pub fn extract_article(document: &Html) -> String {
    let root = document.root_element();
    for selector_str in CONTAINER_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            // A `.content` inside <nav> or an <article> inside <aside> is still boilerplate.
            if has_ancestor_within(element, root, |name| BOILERPLATE_TAGS.contains(&name)) {
                continue;
            }
            let text = collect_fragments(element);
            if !text.is_empty() {
                tracing::trace!(container = selector_str, "article container matched");
                return text;
            }
        }
    }

    if let Some(block) = densest_block(document) {
        let text = collect_fragments(block);
        if !text.is_empty() {
            tracing::trace!(tag = block.value().name(), "densest block selected");
            return text;
        }
    }

    collect_fragments(document.root_element())
}

/// Extract every visible text node, one per line.
pub fn extract_full_text(document: &Html) -> String {
    let root = document.root_element();
    let mut lines: Vec<String> = Vec::new();

    for node in (*root).descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let cleaned = collapse_whitespace(std::iter::once(&**text));
        if !cleaned.is_empty() {
            lines.push(cleaned);
        }
    }

    lines.join("\n")
}

/// Collect paragraph-like fragments under `root`, joined by blank lines
fn collect_fragments(root: ElementRef<'_>) -> String {
    let (Ok(fragment_selector), Ok(link_selector)) =
        (Selector::parse(FRAGMENT_SELECTOR), Selector::parse("a"))
    else {
        return String::new();
    };

    let mut fragments: Vec<String> = Vec::new();

    for element in root.select(&fragment_selector) {
        if has_ancestor_within(element, root, |name| BOILERPLATE_TAGS.contains(&name)) {
            continue;
        }
        // Nested fragments (a <p> inside an <li>) are covered by the outer one.
        if has_ancestor_within(element, root, is_fragment_tag) {
            continue;
        }

        let text = collapse_whitespace(element.text());
        if text.is_empty() {
            continue;
        }
        let text_chars = text.chars().count();
        if !is_heading(element.value().name()) && text_chars <= MIN_FRAGMENT_CHARS {
            continue;
        }

        let link_chars: usize = element
            .select(&link_selector)
            .map(|link| char_count(link.text()))
            .sum();
        if link_chars as f64 / text_chars as f64 > MAX_LINK_DENSITY {
            continue;
        }

        fragments.push(text);
    }

    fragments.join("\n\n")
}

/// The block whose direct <p> children carry the most non-link text
fn densest_block(document: &Html) -> Option<ElementRef<'_>> {
    let (Ok(block_selector), Ok(link_selector)) =
        (Selector::parse(BLOCK_SELECTOR), Selector::parse("a"))
    else {
        return None;
    };
    let root = document.root_element();

    let mut best: Option<(f64, ElementRef<'_>)> = None;
    for block in document.select(&block_selector) {
        if has_ancestor_within(block, root, |name| BOILERPLATE_TAGS.contains(&name)) {
            continue;
        }

        let mut text_chars = 0usize;
        let mut link_chars = 0usize;
        for paragraph in (*block)
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "p")
        {
            text_chars += char_count(paragraph.text());
            link_chars += paragraph
                .select(&link_selector)
                .map(|link| char_count(link.text()))
                .sum::<usize>();
        }
        if text_chars == 0 {
            continue;
        }

        let link_density = link_chars as f64 / text_chars as f64;
        let score = text_chars as f64 * (1.0 - link_density.min(1.0));
        if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
            best = Some((score, block));
        }
    }

    best.filter(|(score, _)| *score > 0.0).map(|(_, block)| block)
}

/// Check the ancestors of `element`, stopping before `root`
fn has_ancestor_within(
    element: ElementRef<'_>,
    root: ElementRef<'_>,
    predicate: impl Fn(&str) -> bool,
) -> bool {
    let root_id = (*root).id();
    if (*element).id() == root_id {
        return false;
    }
    (*element)
        .ancestors()
        .take_while(|ancestor| ancestor.id() != root_id)
        .filter_map(|ancestor| ancestor.value().as_element().map(|el| el.name()))
        .any(predicate)
}

fn is_fragment_tag(name: &str) -> bool {
    matches!(name, "p" | "li" | "blockquote" | "pre") || is_heading(name)
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Characters after whitespace collapsing
fn char_count<'a>(parts: impl Iterator<Item = &'a str>) -> usize {
    collapse_whitespace(parts).chars().count()
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let text = parts.collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
