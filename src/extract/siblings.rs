//! Linear scanning over the flat sibling runs that hold book lines
//!
//! Detail pages list books as bare runs of siblings with no per-book
//! container:
//!
//! ```text
//! <img> <a href="/b/1">Title</a> - <a href="/a/2">Author</a> скачать <a href="/b/1/fb2">(fb2)</a> <br>
//! ```
//!
//! A parent's children are flattened once into [`Segment`]s. Every link in
//! the run then anchors a [`SiblingLine`], whose boundaries are recovered by
//! scanning that list: backward to the icon that opens the line, forward to
//! the line break that closes it.

use scraper::{ElementRef, Node};

/// One child node of a book line's parent, reduced to what the scan needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// `<img>` or `<svg>` opening a book line
    Icon,
    /// `<br>` closing a book line
    LineBreak,
    Link {
        href: Option<&'a str>,
        text: String,
    },
    Text(&'a str),
    /// Any other element (text content kept) or non-text node
    Other(String),
}

impl Segment<'_> {
    fn text(&self) -> &str {
        match self {
            Segment::Link { text, .. } => text.as_str(),
            Segment::Text(text) => text,
            Segment::Other(text) => text.as_str(),
            Segment::Icon | Segment::LineBreak => "",
        }
    }
}

/// The flattened children of one element
#[derive(Debug, Clone)]
pub(crate) struct SiblingRun<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> SiblingRun<'a> {
    pub(crate) fn of(parent: ElementRef<'a>) -> Self {
        let segments = parent
            .children()
            .map(|child| match child.value() {
                Node::Text(text) => Segment::Text(&**text),
                Node::Element(element) => match element.name() {
                    "img" | "svg" => Segment::Icon,
                    "br" => Segment::LineBreak,
                    "a" => Segment::Link {
                        href: element.attr("href"),
                        text: ElementRef::wrap(child)
                            .map(super::element_text)
                            .unwrap_or_default(),
                    },
                    _ => Segment::Other(
                        ElementRef::wrap(child)
                            .map(super::element_text)
                            .unwrap_or_default(),
                    ),
                },
                _ => Segment::Other(String::new()),
            })
            .collect();

        Self { segments }
    }

    /// One line per link of the run, in document order
    pub(crate) fn link_lines(&self) -> impl Iterator<Item = SiblingLine<'_, 'a>> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| matches!(segment, Segment::Link { .. }))
            .map(|(anchor, _)| SiblingLine {
                segments: &self.segments,
                anchor,
            })
    }
}

/// A link within its run
#[derive(Debug, Clone, Copy)]
pub(crate) struct SiblingLine<'r, 'a> {
    segments: &'r [Segment<'a>],
    anchor: usize,
}

impl<'r, 'a> SiblingLine<'r, 'a> {
    pub(crate) fn href(&self) -> Option<&'a str> {
        match &self.segments[self.anchor] {
            Segment::Link { href, .. } => *href,
            _ => None,
        }
    }

    /// Trimmed text of the anchoring link
    pub(crate) fn text(&self) -> &'r str {
        self.segments[self.anchor].text()
    }

    /// Walks backward from the link; true if an icon is met before a line
    /// break or the start of the run
    pub(crate) fn has_leading_icon(&self) -> bool {
        for segment in self.segments[..self.anchor].iter().rev() {
            match segment {
                Segment::Icon => return true,
                Segment::LineBreak => return false,
                _ => {}
            }
        }
        false
    }

    /// Index one past the last segment of the link's line
    fn line_end(&self) -> usize {
        self.segments[self.anchor + 1..]
            .iter()
            .position(|segment| matches!(segment, Segment::LineBreak))
            .map_or(self.segments.len(), |offset| self.anchor + 1 + offset)
    }

    /// Links following the anchor on the same line, as (href, text)
    pub(crate) fn trailing_links(&self) -> Vec<(&'a str, &'r str)> {
        let segments: &'r [Segment<'a>] = self.segments;
        segments[self.anchor + 1..self.line_end()]
            .iter()
            .filter_map(|segment| match segment {
                Segment::Link {
                    href: Some(href),
                    text,
                } => Some((*href, text.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Links on the same line whose immediately preceding sibling mentions
    /// `marker`, as (href, text)
    pub(crate) fn trailing_links_after(&self, marker: &str) -> Vec<(&'a str, &'r str)> {
        let segments: &'r [Segment<'a>] = self.segments;
        (self.anchor + 1..self.line_end())
            .filter(|&index| segments[index - 1].text().contains(marker))
            .filter_map(|index| match &segments[index] {
                Segment::Link {
                    href: Some(href),
                    text,
                } => Some((*href, text.as_str())),
                _ => None,
            })
            .collect()
    }
}
