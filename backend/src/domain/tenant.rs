//! Tenant records, environments and document addressing.
//!
//! A tenant record holds two environments (`dev` and `prod`); each environment
//! holds one section map per channel. Documents are addressed by name and map
//! one-to-one onto channels.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Section;

/// Sections of one channel keyed by binding key.
pub type SectionMap = BTreeMap<String, Section>;

/// Numeric tenant identifier, the record store's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(u64);

impl TenantId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors raised while parsing a [`TenantId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantIdValidationError {
    /// The identifier was blank.
    Empty,
    /// The identifier is not an unsigned integer.
    NotNumeric,
}

impl fmt::Display for TenantIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "client id must not be empty"),
            Self::NotNumeric => write!(f, "client id must be a non-negative integer"),
        }
    }
}

impl std::error::Error for TenantIdValidationError {}

impl FromStr for TenantId {
    type Err = TenantIdValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TenantIdValidationError::Empty);
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TenantIdValidationError::NotNumeric)
    }
}

/// Named environment slot inside a tenant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentName {
    /// Staging slot edited by the editor.
    Dev,
    /// Production slot served to visitors.
    Prod,
}

impl EnvironmentName {
    /// Attribute name used in persisted records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery channel owning one section map per environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Web pages.
    Website,
    /// Text messages.
    Sms,
    /// Email bodies.
    Email,
}

impl Channel {
    /// Every channel, in persisted attribute order.
    pub const ALL: [Self; 3] = [Self::Website, Self::Sms, Self::Email];

    /// Attribute name used in persisted records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Sms => "sms",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical document served for a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentName {
    /// `index.html`, bound to the website channel.
    Index,
    /// `sms.html`, bound to the sms channel.
    Sms,
    /// `email.html`, bound to the email channel.
    Email,
}

impl DocumentName {
    /// Object key of the document in every bucket.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Index => "index.html",
            Self::Sms => "sms.html",
            Self::Email => "email.html",
        }
    }

    /// Channel whose sections bind into this document.
    #[must_use]
    pub const fn channel(self) -> Channel {
        match self {
            Self::Index => Channel::Website,
            Self::Sms => Channel::Sms,
            Self::Email => Channel::Email,
        }
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Raised when a document name does not address a known channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDocumentName(pub String);

impl fmt::Display for UnknownDocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown document `{}`; expected index.html, sms.html or email.html",
            self.0
        )
    }
}

impl std::error::Error for UnknownDocumentName {}

impl FromStr for DocumentName {
    type Err = UnknownDocumentName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "index.html" => Ok(Self::Index),
            "sms.html" => Ok(Self::Sms),
            "email.html" => Ok(Self::Email),
            other => Err(UnknownDocumentName(other.to_owned())),
        }
    }
}

/// One environment slot: activation flag plus a section map per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentRecord {
    /// Last write, in epoch milliseconds.
    pub updated: i64,
    /// Whether the slot is in use.
    pub environment_active: bool,
    /// Website sections.
    #[serde(default)]
    pub website: SectionMap,
    /// Sms sections.
    #[serde(default)]
    pub sms: SectionMap,
    /// Email sections.
    #[serde(default)]
    pub email: SectionMap,
}

impl EnvironmentRecord {
    /// Active environment with no sections.
    #[must_use]
    pub fn empty(updated: i64) -> Self {
        Self {
            updated,
            environment_active: true,
            website: SectionMap::new(),
            sms: SectionMap::new(),
            email: SectionMap::new(),
        }
    }

    /// Sections bound into the given channel.
    #[must_use]
    pub fn sections(&self, channel: Channel) -> &SectionMap {
        match channel {
            Channel::Website => &self.website,
            Channel::Sms => &self.sms,
            Channel::Email => &self.email,
        }
    }

    /// Mutable access to a channel's sections.
    pub fn sections_mut(&mut self, channel: Channel) -> &mut SectionMap {
        match channel {
            Channel::Website => &mut self.website,
            Channel::Sms => &mut self.sms,
            Channel::Email => &mut self.email,
        }
    }
}

/// Both environment slots of a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environments {
    /// Staging slot.
    pub dev: EnvironmentRecord,
    /// Production slot.
    pub prod: EnvironmentRecord,
}

impl Environments {
    /// Slot named `name`.
    #[must_use]
    pub fn get(&self, name: EnvironmentName) -> &EnvironmentRecord {
        match name {
            EnvironmentName::Dev => &self.dev,
            EnvironmentName::Prod => &self.prod,
        }
    }

    /// Mutable slot named `name`.
    pub fn get_mut(&mut self, name: EnvironmentName) -> &mut EnvironmentRecord {
        match name {
            EnvironmentName::Dev => &mut self.dev,
            EnvironmentName::Prod => &mut self.prod,
        }
    }
}

/// Persisted per-tenant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    /// Tenant owning the record.
    pub client_id: TenantId,
    /// Last write, in epoch milliseconds.
    pub updated: i64,
    /// Staging and production slots.
    pub environments: Environments,
}

impl TenantRecord {
    /// Freshly provisioned record with empty `dev` and `prod` environments.
    ///
    /// # Examples
    /// ```
    /// use pagebind::domain::{Channel, TenantId, TenantRecord};
    ///
    /// let record = TenantRecord::provisioned(TenantId::new(7), 1_700_000_000_000);
    /// assert!(record.environments.dev.sections(Channel::Website).is_empty());
    /// ```
    #[must_use]
    pub fn provisioned(client_id: TenantId, now_millis: i64) -> Self {
        Self {
            client_id,
            updated: now_millis,
            environments: Environments {
                dev: EnvironmentRecord::empty(now_millis),
                prod: EnvironmentRecord::empty(now_millis),
            },
        }
    }

    /// Sections of `channel` in the `dev` environment.
    #[must_use]
    pub fn dev_sections(&self, channel: Channel) -> &SectionMap {
        self.environments.dev.sections(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1)]
    #[case(" 42 ", 42)]
    fn tenant_id_parses_numeric_text(#[case] raw: &str, #[case] expected: u64) {
        assert_eq!(raw.parse::<TenantId>(), Ok(TenantId::new(expected)));
    }

    #[rstest]
    #[case("", TenantIdValidationError::Empty)]
    #[case("abc", TenantIdValidationError::NotNumeric)]
    #[case("-3", TenantIdValidationError::NotNumeric)]
    fn tenant_id_rejects_invalid_text(#[case] raw: &str, #[case] expected: TenantIdValidationError) {
        assert_eq!(raw.parse::<TenantId>(), Err(expected));
    }

    #[rstest]
    #[case("index.html", DocumentName::Index, Channel::Website)]
    #[case("sms.html", DocumentName::Sms, Channel::Sms)]
    #[case("email.html", DocumentName::Email, Channel::Email)]
    fn document_names_map_onto_channels(
        #[case] raw: &str,
        #[case] document: DocumentName,
        #[case] channel: Channel,
    ) {
        let parsed: DocumentName = raw.parse().expect("known document");
        assert_eq!(parsed, document);
        assert_eq!(parsed.channel(), channel);
        assert_eq!(parsed.file_name(), raw);
    }

    #[rstest]
    fn unknown_document_names_are_rejected() {
        let err = "about.html".parse::<DocumentName>().expect_err("unknown");
        assert!(err.to_string().contains("about.html"));
    }

    #[rstest]
    fn provisioned_record_serialises_in_persisted_shape() {
        let record = TenantRecord::provisioned(TenantId::new(3), 10);
        let value = serde_json::to_value(&record).expect("serialise");
        assert_eq!(value["clientId"], 3);
        assert_eq!(value["environments"]["dev"]["environmentActive"], true);
        assert!(value["environments"]["prod"]["website"].as_object().is_some());
    }
}
