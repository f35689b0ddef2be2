use std::collections::HashMap;

use super::{CLOSE, OPEN, image_id};
use crate::domain::markup::{Element, Markup, MarkupError};
use crate::domain::{SectionContent, SectionMap};

/// Render a working template with persisted content.
///
/// Visible text sections replace every occurrence of their placeholder. The
/// template is scanned once, so tokens inside inserted content stay verbatim.
/// Visible container sections set `src` on the images carrying their
/// positional ids, index-aligned: surplus template images keep their source
/// and surplus list entries are ignored. Hidden sections are not substituted.
pub fn substitute(template: &str, sections: &SectionMap) -> Result<String, MarkupError> {
    let visible = || sections.values().filter(|section| section.show());

    let galleries: Vec<(&str, &[String])> = visible()
        .filter_map(|section| match section.content() {
            SectionContent::Images(sources) => Some((section.key(), sources.as_slice())),
            SectionContent::Text(_) => None,
        })
        .collect();

    let texts: HashMap<&str, &str> = visible()
        .filter_map(|section| match section.content() {
            SectionContent::Text(text) => Some((section.key(), text.as_str())),
            SectionContent::Images(_) => None,
        })
        .collect();

    if galleries.is_empty() {
        Ok(fill_placeholders(template, &texts))
    } else {
        Ok(fill_placeholders(&substitute_images(template, &galleries)?, &texts))
    }
}

fn fill_placeholders(template: &str, texts: &HashMap<&str, &str>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        let (before, token) = rest.split_at(start);
        rendered.push_str(before);
        let after_open = token.get(OPEN.len()..).unwrap_or_default();
        let bound = after_open.find(CLOSE).and_then(|end| {
            let (key, tail) = after_open.split_at(end);
            texts.get(key).map(|text| (*text, tail))
        });
        if let Some((text, tail)) = bound {
            rendered.push_str(text);
            rest = tail.get(CLOSE.len()..).unwrap_or_default();
            continue;
        }
        rendered.push_str(OPEN);
        rest = after_open;
    }
    rendered.push_str(rest);
    rendered
}

fn substitute_images(template: &str, galleries: &[(&str, &[String])]) -> Result<String, MarkupError> {
    let markup = Markup::parse(template)?;
    let mut images: HashMap<&str, Vec<&Element>> = HashMap::new();
    for element in markup.elements().iter().filter(|element| element.name() == "img") {
        if let Some(id) = markup.attr(element, "id") {
            images.entry(id).or_default().push(element);
        }
    }

    let mut splices = Vec::new();
    for (key, sources) in galleries {
        for (index, source) in sources.iter().enumerate() {
            let Some(targets) = images.get(image_id(key, index).as_str()) else {
                continue;
            };
            splices.extend(targets.iter().map(|image| markup.set_attr(image, "src", source)));
        }
    }
    Ok(markup.apply(splices))
}
