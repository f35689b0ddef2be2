//! Persisted content for one binding key.
//!
//! A section is either a text section (scalar content) or a container section
//! (an ordered list of image sources). The pairing of kind and content shape
//! is enforced by the constructors, so a container never carries scalar
//! content and a text section never carries a list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker value identifying gallery-style container regions.
pub const CONTAINER_KIND: &str = "container";

/// Semantic kind of a section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Heading text.
    Title,
    /// Body text.
    Content,
    /// FAQ question.
    Question,
    /// FAQ answer.
    Answer,
    /// Image list bound by position.
    Container,
    /// Any other text kind, kept verbatim.
    Custom(String),
}

impl SectionKind {
    /// Interpret a binding type marker value. Unrecognised values become
    /// [`SectionKind::Custom`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "title" => Self::Title,
            "content" => Self::Content,
            "question" => Self::Question,
            "answer" => Self::Answer,
            CONTAINER_KIND => Self::Container,
            other => Self::Custom(other.to_owned()),
        }
    }

    /// Wire name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Container => CONTAINER_KIND,
            Self::Custom(value) => value.as_str(),
        }
    }

    /// Whether the kind holds images.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SectionKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SectionKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Section content: scalar text or an ordered list of image sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionContent {
    /// Inner text of a text section.
    Text(String),
    /// Image sources of a container section.
    Images(Vec<String>),
}

impl SectionContent {
    /// Whether the content is an image list.
    #[must_use]
    pub fn is_images(&self) -> bool {
        matches!(self, Self::Images(_))
    }

    /// Whether this content shape is valid for `kind`.
    #[must_use]
    pub fn fits(&self, kind: &SectionKind) -> bool {
        self.is_images() == kind.is_container()
    }
}

/// Validation errors raised when constructing a [`Section`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionValidationError {
    /// The binding key was empty.
    EmptyKey,
    /// Content shape does not match the kind.
    ContentShape {
        /// Binding key of the section.
        key: String,
        /// Wire name of the declared kind.
        kind: String,
    },
}

impl fmt::Display for SectionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "section key must not be empty"),
            Self::ContentShape { key, kind } if kind == CONTAINER_KIND => write!(
                f,
                "section `{key}` is a container and needs a list of image sources"
            ),
            Self::ContentShape { key, kind } => {
                write!(f, "section `{key}` of type `{kind}` needs scalar text content")
            }
        }
    }
}

impl std::error::Error for SectionValidationError {}

/// Persisted content and metadata for one binding key.
///
/// # Examples
/// ```
/// use pagebind::domain::{Section, SectionContent, SectionKind};
///
/// let section = Section::try_new(
///     "hero",
///     SectionKind::Title,
///     SectionContent::Text("Welcome".into()),
/// )
/// .expect("valid section");
/// assert!(section.show());
/// assert!(Section::try_new("gallery", SectionKind::Container, SectionContent::Text("x".into())).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SectionDto", into = "SectionDto")]
pub struct Section {
    key: String,
    kind: SectionKind,
    content: SectionContent,
    show: bool,
    selector: Option<String>,
}

impl Section {
    /// Build a shown section, checking the key and the content shape.
    pub fn try_new(
        key: impl Into<String>,
        kind: SectionKind,
        content: SectionContent,
    ) -> Result<Self, SectionValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(SectionValidationError::EmptyKey);
        }
        if !content.fits(&kind) {
            return Err(SectionValidationError::ContentShape {
                key,
                kind: kind.as_str().to_owned(),
            });
        }
        Ok(Self {
            key,
            kind,
            content,
            show: true,
            selector: None,
        })
    }

    /// Set visibility, builder style.
    #[must_use]
    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    /// Attach a legacy CSS selector used to locate the region.
    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Replace the content, keeping the kind/shape pairing intact.
    pub fn replace_content(&mut self, content: SectionContent) -> Result<(), SectionValidationError> {
        if !content.fits(&self.kind) {
            return Err(SectionValidationError::ContentShape {
                key: self.key.clone(),
                kind: self.kind.as_str().to_owned(),
            });
        }
        self.content = content;
        Ok(())
    }

    /// Set visibility in place.
    pub fn set_show(&mut self, show: bool) {
        self.show = show;
    }

    /// Binding key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Semantic kind.
    #[must_use]
    pub fn kind(&self) -> &SectionKind {
        &self.kind
    }

    /// Persisted content.
    #[must_use]
    pub fn content(&self) -> &SectionContent {
        &self.content
    }

    /// Whether the section is rendered.
    #[must_use]
    pub fn show(&self) -> bool {
        self.show
    }

    /// CSS selector recorded at extraction, if any.
    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    /// Locator used by the materializer: the legacy selector when present,
    /// otherwise the binding key.
    #[must_use]
    pub fn locator(&self) -> &str {
        self.selector.as_deref().unwrap_or(&self.key)
    }
}

/// Field-level edit of one persisted section. Absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionEdit {
    /// Replacement content.
    pub content: Option<SectionContent>,
    /// Replacement visibility.
    pub show: Option<bool>,
}

impl SectionEdit {
    /// True when the edit changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.show.is_none()
    }

    /// Check the edit against the persisted section's kind.
    pub fn validate_for(&self, section: &Section) -> Result<(), SectionValidationError> {
        match &self.content {
            Some(content) if !content.fits(section.kind()) => {
                Err(SectionValidationError::ContentShape {
                    key: section.key().to_owned(),
                    kind: section.kind().as_str().to_owned(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Apply the edit to an in-memory section.
    pub fn apply_to(&self, section: &mut Section) -> Result<(), SectionValidationError> {
        if let Some(content) = &self.content {
            section.replace_content(content.clone())?;
        }
        if let Some(show) = self.show {
            section.set_show(show);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SectionDto {
    key: String,
    #[serde(rename = "type")]
    kind: SectionKind,
    content: SectionContent,
    #[serde(default = "default_show")]
    show: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selector: Option<String>,
}

const fn default_show() -> bool {
    true
}

impl From<Section> for SectionDto {
    fn from(value: Section) -> Self {
        Self {
            key: value.key,
            kind: value.kind,
            content: value.content,
            show: value.show,
            selector: value.selector,
        }
    }
}

impl TryFrom<SectionDto> for Section {
    type Error = SectionValidationError;

    fn try_from(value: SectionDto) -> Result<Self, Self::Error> {
        let SectionDto {
            key,
            kind,
            content,
            show,
            selector,
        } = value;
        let mut section = Section::try_new(key, kind, content)?.with_show(show);
        section.selector = selector;
        Ok(section)
    }
}
