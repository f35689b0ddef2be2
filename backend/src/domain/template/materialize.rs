use tracing::{debug, warn};

use super::{image_id, placeholder};
use crate::domain::binding::BINDING_KEY_ATTR;
use crate::domain::markup::{Element, Markup, MarkupError};
use crate::domain::{SectionBinding, SectionMapping};

/// Rewrite `document` into a working template.
///
/// Each visible text entry has its element's content replaced by the entry's
/// placeholder; each container entry has its images tagged with positional
/// ids. Entries are located by binding key, or by CSS selector when the
/// mapping key differs from the storage key. All other bytes are preserved.
pub fn materialize(document: &str, mapping: &SectionMapping) -> Result<String, MarkupError> {
    let markup = Markup::parse(document)?;
    let mut splices = Vec::new();

    for (locator, binding) in mapping.iter().filter(|(_, binding)| binding.show) {
        let targets = locate(&markup, locator, binding);
        if targets.is_empty() {
            debug!(locator, key = %binding.db_map, "no element matches mapping entry");
        }
        for element in targets {
            if binding.kind.is_container() {
                splices.extend(
                    markup
                        .descendants(element, "img")
                        .enumerate()
                        .map(|(index, image)| {
                            markup.set_attr(image, "id", &image_id(&binding.db_map, index))
                        }),
                );
            } else if let Some(splice) = markup.replace_inner(element, placeholder(&binding.db_map))
            {
                splices.push(splice);
            } else {
                warn!(
                    locator,
                    element = element.name(),
                    "bound element has no body to hold a placeholder"
                );
            }
        }
    }

    Ok(markup.apply(splices))
}

fn locate<'m>(markup: &'m Markup<'_>, locator: &str, binding: &SectionBinding) -> Vec<&'m Element> {
    if locator == binding.db_map {
        return markup
            .elements()
            .iter()
            .filter(|element| markup.attr(element, BINDING_KEY_ATTR) == Some(locator))
            .collect();
    }
    markup.select(locator).unwrap_or_else(|error| {
        warn!(%error, locator, "skipping mapping entry with unusable selector");
        Vec::new()
    })
}
