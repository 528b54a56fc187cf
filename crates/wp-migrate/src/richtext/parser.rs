//! HTML fragment to portable blocks.
//!
//! The fragment is parsed with `scraper` (html5ever) and walked once.
//! Block-level elements open text blocks, lists become one block per item,
//! layout containers are flattened and loose inline content is gathered into
//! `normal` blocks. A `<figure>` holding an `<img>` becomes an
//! [`ExternalImage`] placeholder that still points at the original URL.

use scraper::{ElementRef, Html};

use crate::model::document::new_key;
use crate::model::{ExternalImage, LinkMark, PortableBlock, Span, TextBlock};

/// Elements that never produce content.
const IGNORED: &[&str] = &[
    "script", "style", "noscript", "iframe", "hr", "img", "template", "head", "title", "meta",
    "link",
];

/// Phrasing elements, rendered as spans inside the enclosing block.
const INLINE: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "del", "dfn", "em", "i", "ins",
    "kbd", "mark", "q", "s", "samp", "small", "span", "strike", "strong", "sub", "sup", "time",
    "u", "var",
];

/// Style for a block-level element, if it opens a text block.
fn block_style(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "p" | "pre" => "normal",
        "h1" => "h1",
        "h2" => "h2",
        "h3" => "h3",
        "h4" => "h4",
        "h5" => "h5",
        "h6" => "h6",
        "blockquote" => "blockquote",
        _ => return None,
    })
}

/// Decorator for a phrasing element.
fn decorator(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "strong" | "b" => "strong",
        "em" | "i" => "em",
        "u" => "underline",
        "s" | "strike" | "del" => "strike-through",
        "code" => "code",
        _ => return None,
    })
}

fn list_kind(tag: &str) -> Option<&'static str> {
    match tag {
        "ul" => Some("bullet"),
        "ol" => Some("number"),
        _ => None,
    }
}

/// Parses an HTML fragment into portable blocks.
///
/// Blocks come back in document order. Text blocks may be blank and image
/// placeholders are unresolved; [`super::convert`] takes care of both.
#[must_use]
pub fn parse_html(html: &str) -> Vec<PortableBlock> {
    let fragment = Html::parse_fragment(html);
    let mut builder = BlockBuilder::default();
    builder.walk(fragment.root_element());
    builder.finish()
}

/// Inline state while filling a text block.
#[derive(Clone)]
struct Inline {
    marks: Vec<String>,
    preserve_whitespace: bool,
}

impl Inline {
    fn plain() -> Self {
        Self {
            marks: Vec::new(),
            preserve_whitespace: false,
        }
    }

    fn with_mark(&self, mark: impl Into<String>) -> Self {
        let mut next = self.clone();
        let mark = mark.into();
        if !next.marks.contains(&mark) {
            next.marks.push(mark);
        }
        next
    }
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<PortableBlock>,
    loose: Option<TextBlock>,
}

impl BlockBuilder {
    /// Walks the children of a container element at block level.
    fn walk(&mut self, container: ElementRef<'_>) {
        for child in container.children() {
            if let Some(text) = child.value().as_text() {
                if self.loose.is_some() || !text.trim().is_empty() {
                    let block = self.loose.get_or_insert_with(|| TextBlock::new("normal"));
                    push_text(block, text, &Inline::plain());
                }
                continue;
            }
            let Some(element) = ElementRef::wrap(child) else {
                continue;
            };
            let tag = element.value().name();

            if IGNORED.contains(&tag) {
                continue;
            }
            if INLINE.contains(&tag) {
                let block = self.loose.get_or_insert_with(|| TextBlock::new("normal"));
                collect_inline(element, block, &Inline::plain(), &mut self.blocks);
                continue;
            }

            self.flush();
            if let Some(style) = block_style(tag) {
                let mut block = TextBlock::new(style);
                let inline = if tag == "pre" {
                    Inline {
                        marks: vec!["code".to_string()],
                        preserve_whitespace: true,
                    }
                } else {
                    Inline::plain()
                };
                collect_inline(element, &mut block, &inline, &mut self.blocks);
                self.push(block);
            } else if let Some(kind) = list_kind(tag) {
                self.walk_list(element, kind, 1);
            } else if tag == "figure" {
                match figure_image(element) {
                    Some(url) => self.blocks.push(image_placeholder(url)),
                    None => self.walk(element),
                }
            } else {
                self.walk(element);
            }
            self.flush();
        }
    }

    fn walk_list(&mut self, list: ElementRef<'_>, kind: &'static str, level: u32) {
        for child in list.children().filter_map(ElementRef::wrap) {
            let tag = child.value().name();
            if let Some(nested) = list_kind(tag) {
                self.walk_list(child, nested, level + 1);
                continue;
            }
            if tag != "li" {
                continue;
            }

            let mut item = TextBlock::new("normal");
            item.list_item = Some(kind.to_string());
            item.level = Some(level);
            let mut sublists = Vec::new();
            for grandchild in child.children() {
                if let Some(text) = grandchild.value().as_text() {
                    push_text(&mut item, text, &Inline::plain());
                } else if let Some(element) = ElementRef::wrap(grandchild) {
                    match list_kind(element.value().name()) {
                        Some(nested) => sublists.push((element, nested)),
                        None => {
                            collect_element(element, &mut item, &Inline::plain(), &mut self.blocks)
                        }
                    }
                }
            }
            self.push(item);
            for (sublist, nested) in sublists {
                self.walk_list(sublist, nested, level + 1);
            }
        }
    }

    fn push(&mut self, block: TextBlock) {
        self.blocks.push(finish_text(block));
    }

    fn flush(&mut self) {
        if let Some(block) = self.loose.take() {
            self.push(block);
        }
    }

    fn finish(mut self) -> Vec<PortableBlock> {
        self.flush();
        self.blocks
    }
}

/// The `src` of the first `<img>` inside a figure.
fn figure_image(figure: ElementRef<'_>) -> Option<String> {
    figure
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "img")
        .find_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

fn image_placeholder(url: String) -> PortableBlock {
    PortableBlock::ExternalImage(ExternalImage {
        key: Some(new_key()),
        url,
    })
}

/// Trims a finished text block and drops link definitions no span uses.
fn finish_text(mut block: TextBlock) -> PortableBlock {
    trim_edges(&mut block);
    let children = &block.children;
    block
        .mark_defs
        .retain(|def| children.iter().any(|s| s.marks.contains(&def.key)));
    PortableBlock::Text(block)
}

/// Closes `block` at an image found mid-block.
///
/// The text so far goes to `out`, then the placeholder. `block` continues
/// empty with the same style, list position and link definitions.
fn split_at_image(block: &mut TextBlock, url: String, out: &mut Vec<PortableBlock>) {
    let continuation = TextBlock {
        mark_defs: block.mark_defs.clone(),
        list_item: block.list_item.clone(),
        level: block.level,
        ..TextBlock::new(block.style.clone())
    };
    let before = std::mem::replace(block, continuation);
    if !before.children.is_empty() {
        out.push(finish_text(before));
    }
    out.push(image_placeholder(url));
}

/// Appends the inline content of `element`'s children to `block`.
///
/// Figures with an image split the block; the pieces land in `out`.
fn collect_inline(
    element: ElementRef<'_>,
    block: &mut TextBlock,
    inline: &Inline,
    out: &mut Vec<PortableBlock>,
) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            push_text(block, text, inline);
        } else if let Some(child) = ElementRef::wrap(child) {
            collect_element(child, block, inline, out);
        }
    }
}

/// Appends one element, and its subtree, to `block`.
fn collect_element(
    element: ElementRef<'_>,
    block: &mut TextBlock,
    inline: &Inline,
    out: &mut Vec<PortableBlock>,
) {
    let tag = element.value().name();
    if IGNORED.contains(&tag) {
        return;
    }
    if tag == "br" {
        push_raw(block, "\n", &inline.marks);
        return;
    }
    if tag == "figure" {
        if let Some(url) = figure_image(element) {
            split_at_image(block, url, out);
            return;
        }
    }

    if let Some(mark) = decorator(tag) {
        collect_inline(element, block, &inline.with_mark(mark), out);
    } else if tag == "a" {
        match element.value().attr("href").filter(|h| !h.trim().is_empty()) {
            Some(href) => {
                let key = new_key();
                block.mark_defs.push(LinkMark {
                    key: key.clone(),
                    href: href.trim().to_string(),
                });
                collect_inline(element, block, &inline.with_mark(key), out);
            }
            None => collect_inline(element, block, inline, out),
        }
    } else if INLINE.contains(&tag) {
        collect_inline(element, block, inline, out);
    } else {
        // Block content nested where only inline content fits, such as the
        // paragraphs inside a blockquote or list item.
        if !block.plain_text().trim().is_empty() {
            push_raw(block, "\n", &inline.marks);
        }
        collect_inline(element, block, inline, out);
    }
}

fn push_text(block: &mut TextBlock, text: &str, inline: &Inline) {
    if inline.preserve_whitespace {
        push_raw(block, text, &inline.marks);
    } else {
        push_raw(block, &collapse_whitespace(text), &inline.marks);
    }
}

/// Appends text, merging into the previous span when the marks match.
fn push_raw(block: &mut TextBlock, text: &str, marks: &[String]) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = block.children.last_mut() {
        if last.marks == marks {
            // Avoid doubled spaces across element boundaries.
            if last.text.ends_with(' ') && text.starts_with(' ') {
                last.text.push_str(&text[1..]);
            } else {
                last.text.push_str(text);
            }
            return;
        }
    }
    block.children.push(Span::new(text, marks.to_vec()));
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Trims leading whitespace of the first span and trailing whitespace of the
/// last, except in preformatted blocks.
fn trim_edges(block: &mut TextBlock) {
    let preformatted = block
        .children
        .first()
        .is_some_and(|s| s.marks.iter().any(|m| m == "code"))
        && block.children.iter().all(|s| s.marks.iter().any(|m| m == "code"));
    if preformatted {
        return;
    }
    if let Some(first) = block.children.first_mut() {
        first.text = first.text.trim_start_matches(' ').to_string();
    }
    if let Some(last) = block.children.last_mut() {
        last.text = last.text.trim_end_matches(' ').to_string();
    }
    if block.children.len() > 1 {
        block.children.retain(|s| !s.text.is_empty());
    }
}
