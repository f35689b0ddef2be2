//! Byte-span view over an HTML document.
//!
//! `tl` parses the document read-only; every element is then located in the
//! original source by byte offset. Edits are expressed as [`Splice`]s against
//! those offsets and applied in one pass, so everything outside a mutated
//! region is reproduced byte for byte.

use std::collections::HashMap;
use std::ops::Range;

use tracing::warn;

/// Failures raised while reading a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    /// Input bytes are not UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    NotUtf8(String),
    /// The parser rejected the document.
    #[error("document could not be parsed: {0}")]
    Unparsable(String),
    /// A parsed element has no span in the source.
    #[error("element <{0}> could not be located in the document source")]
    Unlocatable(String),
    /// Selector the engine cannot parse.
    #[error("unsupported selector `{0}`")]
    InvalidSelector(String),
}

/// Decode a stored document.
pub fn decode_document(bytes: Vec<u8>) -> Result<String, MarkupError> {
    String::from_utf8(bytes).map_err(|error| MarkupError::NotUtf8(error.to_string()))
}

#[derive(Debug, Clone)]
struct Attribute {
    name: String,
    span: Range<usize>,
    value: Option<Range<usize>>,
}

/// One element with its byte offsets in the source.
#[derive(Debug, Clone)]
pub struct Element {
    node: usize,
    name: String,
    span: Range<usize>,
    name_end: usize,
    inner: Option<Range<usize>>,
    attributes: Vec<Attribute>,
}

impl Element {
    /// Lowercased tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte range of the whole element, closing tag included.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    fn contains(&self, other: &Self) -> bool {
        other.span.start > self.span.start && other.span.end <= self.span.end
    }

    fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .rev()
            .find(|attribute| attribute.name.eq_ignore_ascii_case(name))
    }
}

/// Replacement of one byte range of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    range: Range<usize>,
    replacement: String,
}

impl Splice {
    /// Replace `range` of the source with `replacement`.
    #[must_use]
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }
}

/// Parsed document with located elements in document order.
pub struct Markup<'a> {
    source: &'a str,
    dom: tl::VDom<'a>,
    elements: Vec<Element>,
    by_node: HashMap<usize, usize>,
}

impl<'a> Markup<'a> {
    /// Parse `source`; it is never modified.
    pub fn parse(source: &'a str) -> Result<Self, MarkupError> {
        let dom = tl::parse(source, tl::ParserOptions::default())
            .map_err(|error| MarkupError::Unparsable(format!("{error:?}")))?;

        let mut elements = Vec::new();
        for (node, entry) in dom.nodes().iter().enumerate() {
            let Some(tag) = entry.as_tag() else {
                continue;
            };
            elements.push(locate(source, node, tag)?);
        }
        elements.sort_by_key(|element| (element.span.start, std::cmp::Reverse(element.span.end)));
        let by_node = elements
            .iter()
            .enumerate()
            .map(|(position, element)| (element.node, position))
            .collect();

        Ok(Self {
            source,
            dom,
            elements,
            by_node,
        })
    }

    /// Document text the spans index into.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// All elements in document order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Attribute value; valueless attributes read as `""`.
    #[must_use]
    pub fn attr(&self, element: &Element, name: &str) -> Option<&'a str> {
        let attribute = element.attribute(name)?;
        match &attribute.value {
            Some(range) => self.source.get(range.clone()),
            None => Some(""),
        }
    }

    /// Text content of the element, markup stripped.
    #[must_use]
    pub fn text(&self, element: &Element) -> String {
        self.dom
            .nodes()
            .get(element.node)
            .and_then(tl::Node::as_tag)
            .map(|tag| tag.inner_text(self.dom.parser()).into_owned())
            .unwrap_or_default()
    }

    /// Descendants of `element` with the given tag name, in document order.
    #[must_use]
    pub fn descendants<'s>(
        &'s self,
        element: &'s Element,
        name: &'s str,
    ) -> impl Iterator<Item = &'s Element> + 's {
        self.elements
            .iter()
            .filter(move |candidate| element.contains(candidate))
            .filter(move |candidate| candidate.name.eq_ignore_ascii_case(name))
    }

    /// Elements carrying `name` with exactly `value`.
    #[must_use]
    pub fn with_attr<'s>(
        &'s self,
        name: &'s str,
        value: &'s str,
    ) -> impl Iterator<Item = &'s Element> + 's {
        self.elements
            .iter()
            .filter(move |element| self.attr(element, name) == Some(value))
    }

    /// Elements matched by a CSS selector, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<&Element>, MarkupError> {
        let handles = self
            .dom
            .query_selector(selector)
            .ok_or_else(|| MarkupError::InvalidSelector(selector.to_owned()))?;
        let mut positions: Vec<usize> = handles
            .filter_map(|handle| self.by_node.get(&(handle.get_inner() as usize)).copied())
            .collect();
        positions.sort_unstable();
        positions.dedup();
        Ok(positions
            .into_iter()
            .filter_map(|position| self.elements.get(position))
            .collect())
    }

    /// Splice replacing everything between the element's tags, or `None` for
    /// void and unclosed elements.
    #[must_use]
    pub fn replace_inner(&self, element: &Element, replacement: impl Into<String>) -> Option<Splice> {
        element
            .inner
            .clone()
            .map(|range| Splice::new(range, replacement))
    }

    /// Splice setting an attribute, rewriting it in place or inserting it
    /// right after the tag name.
    #[must_use]
    pub fn set_attr(&self, element: &Element, name: &str, value: &str) -> Splice {
        let rendered = format!("{name}=\"{}\"", escape_attribute(value));
        match element.attribute(name) {
            Some(attribute) => Splice::new(attribute.span.clone(), rendered),
            None => Splice::new(element.name_end..element.name_end, format!(" {rendered}")),
        }
    }

    /// Apply splices to the source. A splice overlapping an earlier one
    /// (typically an edit nested inside a replaced region) is dropped.
    #[must_use]
    pub fn apply(&self, mut splices: Vec<Splice>) -> String {
        splices.sort_by_key(|splice| (splice.range.start, splice.range.end));
        let mut output = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for splice in splices {
            if splice.range.start < cursor {
                warn!(
                    start = splice.range.start,
                    end = splice.range.end,
                    "skipping edit nested inside an already replaced region"
                );
                continue;
            }
            output.push_str(self.source.get(cursor..splice.range.start).unwrap_or_default());
            output.push_str(&splice.replacement);
            cursor = splice.range.end;
        }
        output.push_str(self.source.get(cursor..).unwrap_or_default());
        output
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('"', "&quot;")
}

fn locate(source: &str, node: usize, tag: &tl::HTMLTag<'_>) -> Result<Element, MarkupError> {
    let name = tag.name().as_utf8_str().to_ascii_lowercase();
    let raw = tag.raw().as_bytes();
    let start = (raw.as_ptr() as usize).checked_sub(source.as_ptr() as usize);
    let span = start
        .and_then(|start| start.checked_add(raw.len()).map(|end| start..end))
        .filter(|span| source.as_bytes().get(span.clone()) == Some(raw))
        .filter(|span| source.is_char_boundary(span.start) && source.is_char_boundary(span.end))
        .ok_or_else(|| MarkupError::Unlocatable(name.clone()))?;

    let start_tag = scan_start_tag(source, span.start, span.end)
        .ok_or_else(|| MarkupError::Unlocatable(name.clone()))?;
    let inner = closing_tag_start(source, &name, start_tag.end, span.end)
        .map(|close| start_tag.end..close);

    Ok(Element {
        node,
        name,
        span,
        name_end: start_tag.name_end,
        inner,
        attributes: start_tag.attributes,
    })
}

fn closing_tag_start(source: &str, name: &str, open_end: usize, end: usize) -> Option<usize> {
    let body = source.get(open_end..end)?;
    let close = body.rfind("</")?;
    let closing_name = body.get(close + 2..)?.strip_suffix('>')?;
    closing_name
        .trim()
        .eq_ignore_ascii_case(name)
        .then_some(open_end + close)
}

struct StartTag {
    name_end: usize,
    end: usize,
    attributes: Vec<Attribute>,
}

fn is_name_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'>' | b'/' | b'=')
}

fn skip_whitespace(bytes: &[u8], mut pos: usize, limit: usize) -> usize {
    while pos < limit && bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

fn scan_start_tag(source: &str, start: usize, limit: usize) -> Option<StartTag> {
    let bytes = source.as_bytes();
    let mut pos = start + 1;
    while pos < limit && !bytes.get(pos).copied().is_some_and(is_name_delimiter) {
        pos += 1;
    }
    let name_end = pos;
    let mut attributes = Vec::new();

    loop {
        while pos < limit
            && bytes
                .get(pos)
                .is_some_and(|byte| byte.is_ascii_whitespace() || *byte == b'/')
        {
            pos += 1;
        }
        if pos >= limit {
            return None;
        }
        if bytes.get(pos) == Some(&b'>') {
            return Some(StartTag {
                name_end,
                end: pos + 1,
                attributes,
            });
        }

        let attr_start = pos;
        while pos < limit && !bytes.get(pos).copied().is_some_and(is_name_delimiter) {
            pos += 1;
        }
        if pos == attr_start {
            pos += 1;
            continue;
        }
        let name = source.get(attr_start..pos)?.to_ascii_lowercase();

        let after_name = skip_whitespace(bytes, pos, limit);
        if bytes.get(after_name) != Some(&b'=') {
            attributes.push(Attribute {
                name,
                span: attr_start..pos,
                value: None,
            });
            continue;
        }

        let value_start = skip_whitespace(bytes, after_name + 1, limit);
        let (value, attr_end) = match bytes.get(value_start) {
            Some(&quote @ (b'"' | b'\'')) => {
                let inner_start = value_start + 1;
                let offset = bytes
                    .get(inner_start..limit)?
                    .iter()
                    .position(|byte| *byte == quote)?;
                let inner_end = inner_start + offset;
                (inner_start..inner_end, inner_end + 1)
            }
            _ => {
                let mut end = value_start;
                while end < limit
                    && !bytes
                        .get(end)
                        .is_some_and(|byte| byte.is_ascii_whitespace() || *byte == b'>')
                {
                    end += 1;
                }
                (value_start..end, end)
            }
        };
        attributes.push(Attribute {
            name,
            span: attr_start..attr_end,
            value: Some(value),
        });
        pos = attr_end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PAGE: &str = concat!(
        "<html><body>",
        "<h1 class='x' x-binding-key=hero data-flag>Hi <b>there</b></h1>",
        "<div id=\"gallery\"><img src=\"a.png\"><p><img alt='b'></p></div>",
        "</body></html>"
    );

    fn element<'m>(markup: &'m Markup<'_>, name: &str) -> &'m Element {
        markup
            .elements()
            .iter()
            .find(|element| element.name() == name)
            .expect("element present")
    }

    #[rstest]
    fn locates_elements_in_document_order() {
        let markup = Markup::parse(PAGE).expect("parse");
        let names: Vec<&str> = markup.elements().iter().map(Element::name).collect();
        assert_eq!(names, ["html", "body", "h1", "b", "div", "img", "p", "img"]);
    }

    #[rstest]
    fn reads_quoted_unquoted_and_valueless_attributes() {
        let markup = Markup::parse(PAGE).expect("parse");
        let heading = element(&markup, "h1");
        assert_eq!(markup.attr(heading, "class"), Some("x"));
        assert_eq!(markup.attr(heading, "x-binding-key"), Some("hero"));
        assert_eq!(markup.attr(heading, "data-flag"), Some(""));
        assert_eq!(markup.attr(heading, "missing"), None);
    }

    #[rstest]
    fn text_strips_nested_markup() {
        let markup = Markup::parse(PAGE).expect("parse");
        assert_eq!(markup.text(element(&markup, "h1")), "Hi there");
    }

    #[rstest]
    fn replacing_inner_content_preserves_surroundings() {
        let markup = Markup::parse(PAGE).expect("parse");
        let splice = markup
            .replace_inner(element(&markup, "h1"), "{{ hero }}")
            .expect("h1 has a body");
        let output = markup.apply(vec![splice]);
        assert_eq!(output, PAGE.replace("Hi <b>there</b>", "{{ hero }}"));
    }

    #[rstest]
    fn set_attr_rewrites_or_inserts() {
        let markup = Markup::parse(PAGE).expect("parse");
        let gallery = element(&markup, "div");
        let images: Vec<&Element> = markup.descendants(gallery, "img").collect();
        assert_eq!(images.len(), 2);
        let splices = vec![
            markup.set_attr(gallery, "id", "g\"1"),
            markup.set_attr(images[1], "src", "c.png"),
        ];
        let output = markup.apply(splices);
        assert!(output.contains("<div id=\"g&quot;1\">"));
        assert!(output.contains("<img src=\"c.png\" alt='b'>"));
    }

    #[rstest]
    fn nested_edits_are_dropped() {
        let markup = Markup::parse(PAGE).expect("parse");
        let outer = markup
            .replace_inner(element(&markup, "h1"), "X")
            .expect("h1 body");
        let inner = markup
            .replace_inner(element(&markup, "b"), "Y")
            .expect("b body");
        let output = markup.apply(vec![inner, outer]);
        assert!(output.contains("<h1 class='x' x-binding-key=hero data-flag>X</h1>"));
        assert!(!output.contains('Y'));
    }

    #[rstest]
    fn void_elements_have_no_inner_range() {
        let markup = Markup::parse(PAGE).expect("parse");
        assert!(markup.replace_inner(element(&markup, "img"), "x").is_none());
    }

    #[rstest]
    fn selects_by_css_selector() {
        let markup = Markup::parse(PAGE).expect("parse");
        let matched = markup.select("#gallery").expect("selector supported");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name(), "div");
    }

    #[rstest]
    fn applying_no_splices_is_identity() {
        let markup = Markup::parse(PAGE).expect("parse");
        assert_eq!(markup.apply(Vec::new()), PAGE);
    }

    #[rstest]
    fn rejects_non_utf8_bytes() {
        assert!(matches!(
            decode_document(vec![0xff, 0xfe]),
            Err(MarkupError::NotUtf8(_))
        ));
    }
}
