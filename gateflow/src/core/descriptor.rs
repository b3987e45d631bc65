//! Filter descriptor and stage kind types.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// The pipeline stage a filter is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Runs before routing.
    Pre,
    /// Routes the request to its target.
    Route,
    /// Runs after routing, on success and on recovered failures.
    Post,
    /// Runs the failure-recovery branch.
    Error,
    /// Any stage name outside the four built-in stages.
    #[serde(other)]
    Custom,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pre => write!(f, "pre"),
            Self::Route => write!(f, "route"),
            Self::Post => write!(f, "post"),
            Self::Error => write!(f, "error"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// An immutable filter descriptor as published by the filter source.
///
/// Two descriptors denote the same revision iff every field compares equal;
/// there is no separate version counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    /// Unique id of the filter within one synchronization cycle.
    pub id: String,
    /// The stage this filter belongs to.
    pub kind: FilterKind,
    /// The script name, used as the on-disk file stem.
    pub name: String,
    /// The filter script body, persisted verbatim.
    pub content: String,
}

impl FilterDescriptor {
    /// Creates a new descriptor.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: FilterKind,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            content: content.into(),
        }
    }

    /// Returns the artifact file name for the given script extension.
    #[must_use]
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.name, extension)
    }

    /// Returns a stable hex digest over all fields.
    ///
    /// Used as a compact revision label in events and logs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.id.as_bytes());
        hasher.update([0]);
        hasher.update(self.kind.to_string().as_bytes());
        hasher.update([0]);
        hasher.update(self.name.as_bytes());
        hasher.update([0]);
        hasher.update(self.content.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(FilterKind::Pre.to_string(), "pre");
        assert_eq!(FilterKind::Error.to_string(), "error");
    }

    #[test]
    fn test_unknown_kind_deserializes_to_custom() {
        let kind: FilterKind = serde_json::from_str("\"throttle\"").unwrap();
        assert_eq!(kind, FilterKind::Custom);
    }

    #[test]
    fn test_file_name() {
        let desc = FilterDescriptor::new("F1", FilterKind::Pre, "auth_check", "body");
        assert_eq!(desc.file_name("groovy"), "auth_check.groovy");
    }

    #[test]
    fn test_revision_is_full_value_equality() {
        let a = FilterDescriptor::new("F1", FilterKind::Pre, "f1", "v1");
        let b = FilterDescriptor::new("F1", FilterKind::Pre, "f1", "v1");
        let c = FilterDescriptor::new("F1", FilterKind::Pre, "f1", "v2");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = FilterDescriptor::new("F1", FilterKind::Pre, "f1", "v1");
        let b = FilterDescriptor::new("F1", FilterKind::Pre, "f1", "v2");

        assert_eq!(a.fingerprint(), a.clone().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
