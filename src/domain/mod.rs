use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::UNKNOWN;

/// Operator-supplied values used when live extraction cannot produce a field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FallbackMetadata {
    #[serde(default, rename = "type")]
    pub project_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
}

impl FallbackMetadata {
    fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => None,
            Field::Location => self.location.as_deref(),
            Field::ProjectType => self.project_type.as_deref(),
            Field::ContactName => self.contact_name.as_deref(),
            Field::MobileNumber => self.mobile_number.as_deref(),
        }
    }
}

/// One configured website to extract data from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub name: String,
    pub url: String,
    #[serde(default, rename = "metadata", alias = "fallback")]
    pub fallback: FallbackMetadata,
}

impl TargetDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>, fallback: FallbackMetadata) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            fallback,
        }
    }

    /// Fallback value for a field, if one is configured and non-blank.
    /// The target's own name stands in for the `name` field.
    pub fn fallback_for(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Name => Some(self.name.as_str()),
            other => self.fallback.get(other),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Page content handed over by the fetcher
#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    Page(String),
    FetchFailed { reason: String },
}

impl RawContent {
    pub fn failed(reason: impl Into<String>) -> Self {
        RawContent::FetchFailed {
            reason: reason.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RawContent::FetchFailed { .. })
    }
}

/// The five record fields every stage works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Name,
    Location,
    ProjectType,
    ContactName,
    MobileNumber,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Location,
        Field::ProjectType,
        Field::ContactName,
        Field::MobileNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Location => "location",
            Field::ProjectType => "type",
            Field::ContactName => "contact_name",
            Field::MobileNumber => "mobile_number",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Where a reconciled value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Live,
    Fallback,
    Unknown,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Live => "live",
            SourceTag::Fallback => "fallback",
            SourceTag::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: String,
    pub source: SourceTag,
}

impl FieldValue {
    pub fn live(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: SourceTag::Live,
        }
    }

    pub fn fallback(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: SourceTag::Fallback,
        }
    }

    pub fn unknown() -> Self {
        Self {
            value: UNKNOWN.to_string(),
            source: SourceTag::Unknown,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.source == SourceTag::Unknown
    }
}

/// A full set of tagged field values. Every field is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    pub name: FieldValue,
    pub location: FieldValue,
    pub project_type: FieldValue,
    pub contact_name: FieldValue,
    pub mobile_number: FieldValue,
}

impl RecordFields {
    pub fn from_fn(mut f: impl FnMut(Field) -> FieldValue) -> Self {
        Self {
            name: f(Field::Name),
            location: f(Field::Location),
            project_type: f(Field::ProjectType),
            contact_name: f(Field::ContactName),
            mobile_number: f(Field::MobileNumber),
        }
    }

    pub fn get(&self, field: Field) -> &FieldValue {
        match field {
            Field::Name => &self.name,
            Field::Location => &self.location,
            Field::ProjectType => &self.project_type,
            Field::ContactName => &self.contact_name,
            Field::MobileNumber => &self.mobile_number,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut FieldValue {
        match field {
            Field::Name => &mut self.name,
            Field::Location => &mut self.location,
            Field::ProjectType => &mut self.project_type,
            Field::ContactName => &mut self.contact_name,
            Field::MobileNumber => &mut self.mobile_number,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> + '_ {
        Field::ALL.into_iter().map(move |field| (field, self.get(field)))
    }

    pub fn count_tagged(&self, tag: SourceTag) -> usize {
        self.iter().filter(|(_, v)| v.source == tag).count()
    }

    /// Compact provenance summary, e.g. `name:live; location:fallback; ...`
    pub fn source_tags(&self) -> String {
        self.iter()
            .map(|(field, value)| format!("{}:{}", field, value.source))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
