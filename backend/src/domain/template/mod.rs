//! Working template materialization and content substitution.
//!
//! Text regions are bound through `{{ key }}` placeholders; container regions
//! are bound by position through `id="key-image-N"` on their images.

mod materialize;
mod substitute;

pub use materialize::materialize;
pub use substitute::substitute;

const OPEN: &str = "{{ ";
const CLOSE: &str = " }}";

/// Placeholder token standing in for a text section.
///
/// # Examples
/// ```
/// assert_eq!(pagebind::domain::template::placeholder("hero"), "{{ hero }}");
/// ```
#[must_use]
pub fn placeholder(key: &str) -> String {
    format!("{OPEN}{key}{CLOSE}")
}

/// Positional identifier of the `index`-th image of a container section.
#[must_use]
pub fn image_id(key: &str, index: usize) -> String {
    format!("{key}-image-{index}")
}
