//! Discovery of bindable regions in a document.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::markup::{Element, Markup, MarkupError};
use crate::domain::{Section, SectionContent, SectionKind};

/// Attribute naming the binding key of a region.
pub const BINDING_KEY_ATTR: &str = "x-binding-key";
/// Attribute naming the semantic type of a region.
pub const BINDING_TYPE_ATTR: &str = "x-binding-type";

/// Extract every element carrying both binding markers.
///
/// Container regions yield the `src` of every `img` descendant (empty when
/// absent); other regions yield their trimmed text. Character references
/// are kept as written, so persisted text can be substituted back into the
/// template without re-escaping. When a key repeats, the later element in
/// document order wins.
///
/// # Examples
/// ```
/// use pagebind::domain::binding::extract;
///
/// let sections = extract(r#"<h1 x-binding-key="hero" x-binding-type="title"> Hi </h1>"#)
///     .expect("parses");
/// assert_eq!(sections["hero"].kind().as_str(), "title");
/// ```
pub fn extract(document: &str) -> Result<BTreeMap<String, Section>, MarkupError> {
    let markup = Markup::parse(document)?;
    let mut sections = BTreeMap::new();

    for element in markup.elements() {
        let (Some(key), Some(kind)) = (
            markup.attr(element, BINDING_KEY_ATTR),
            markup.attr(element, BINDING_TYPE_ATTR),
        ) else {
            continue;
        };
        let kind = SectionKind::parse(kind);
        let content = read_content(&markup, element, &kind);
        match Section::try_new(key, kind, content) {
            Ok(section) => {
                if sections.insert(key.to_owned(), section).is_some() {
                    debug!(key, "binding key repeated; later element wins");
                }
            }
            Err(error) => warn!(%error, "ignoring malformed binding marker"),
        }
    }

    Ok(sections)
}

fn read_content(markup: &Markup<'_>, element: &Element, kind: &SectionKind) -> SectionContent {
    if kind.is_container() {
        SectionContent::Images(
            markup
                .descendants(element, "img")
                .map(|image| markup.attr(image, "src").unwrap_or_default().to_owned())
                .collect(),
        )
    } else {
        SectionContent::Text(markup.text(element).trim().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn extracts_text_and_container_sections() {
        let document = concat!(
            "<main>",
            "<h1 x-binding-key=\"hero\" x-binding-type=\"title\">\n  Welcome <em>home</em>  </h1>",
            "<section x-binding-key=\"gallery\" x-binding-type=\"container\">",
            "<img src=\"one.png\"><figure><img></figure><img src='three.png'/>",
            "</section>",
            "<p x-binding-key=\"orphan\">no type marker</p>",
            "</main>"
        );

        let sections = extract(document).expect("parses");

        assert_eq!(sections.len(), 2);
        let hero = &sections["hero"];
        assert_eq!(hero.kind(), &SectionKind::Title);
        assert_eq!(hero.content(), &SectionContent::Text("Welcome home".to_owned()));
        assert!(hero.show());
        assert_eq!(
            sections["gallery"].content(),
            &SectionContent::Images(vec!["one.png".into(), String::new(), "three.png".into()])
        );
    }

    #[rstest]
    fn later_duplicate_keys_win() {
        let document = concat!(
            "<h2 x-binding-key=\"faq\" x-binding-type=\"question\">first</h2>",
            "<p x-binding-key=\"faq\" x-binding-type=\"answer\">second</p>"
        );

        let sections = extract(document).expect("parses");

        assert_eq!(sections["faq"].kind(), &SectionKind::Answer);
        assert_eq!(sections["faq"].content(), &SectionContent::Text("second".into()));
    }

    #[rstest]
    #[case("Caf&eacute; &amp; bar")]
    #[case("1 &lt; 2")]
    fn character_references_stay_encoded(#[case] raw: &str) {
        let document = format!("<p x-binding-key=\"menu\" x-binding-type=\"content\">{raw}</p>");

        let sections = extract(&document).expect("parses");

        assert_eq!(sections["menu"].content(), &SectionContent::Text(raw.to_owned()));
    }

    #[rstest]
    fn documents_without_markers_yield_empty_mapping() {
        let sections = extract("<html><body><p>plain</p></body></html>").expect("parses");
        assert!(sections.is_empty());
    }

    #[rstest]
    fn custom_types_are_kept_verbatim() {
        let sections =
            extract("<span x-binding-key=\"cta\" x-binding-type=\"button-label\">Go</span>")
                .expect("parses");
        assert_eq!(sections["cta"].kind().as_str(), "button-label");
    }

    #[rstest]
    fn extraction_leaves_the_input_untouched() {
        let document = String::from("<div x-binding-key='k' x-binding-type='content'> x </div>");
        let before = document.clone();
        let _ = extract(&document).expect("parses");
        assert_eq!(document, before);
    }
}
