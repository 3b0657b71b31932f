use std::fmt;

/// Unique identifier of a node within a single DAG.
///
/// The original implementation models this as a stringifiable integer
/// with a sentinel reserved for "no node" placeholders in the preview
/// API (spec §3). C++'s sentinel is a negative value; since this is a
/// `u64` here, the sentinel is `u64::MAX` instead (flagged as an
/// ambiguous/implementation-defined point in spec §9 — re-implementations
/// with unsigned ids must pick another distinguishable sentinel and
/// document it, which is what this is).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Sentinel used by the preview renderer for "no node available" (spec §9).
    pub const NONE: NodeId = NodeId(u64::MAX);

    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::NONE.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "_no_preview")
        }
    }
}

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        Self::new(raw)
    }
}

/// Identifier of a single field within a `VideoFieldRepresentation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct FieldId(u64);

impl FieldId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FieldId {
    fn from(raw: u64) -> Self {
        Self::new(raw)
    }
}

/// Content-derived fingerprint string identifying an artifact (spec §3).
///
/// Two artifacts with equal ids are guaranteed bit-for-bit identical
/// content; the id is a string (not a raw hash) purely so it reads
/// well in logs and as a cache key, matching the original's
/// `ArtifactID` typedef around a `std::string`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ArtifactId(String);

impl ArtifactId {
    #[must_use]
    pub fn new(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_sentinel_is_invalid() {
        assert!(!NodeId::NONE.is_valid());
        assert!(NodeId::new(0).is_valid());
    }

    #[test]
    fn node_id_display_matches_sentinel_convention() {
        assert_eq!(NodeId::NONE.to_string(), "_no_preview");
        assert_eq!(NodeId::new(7).to_string(), "7");
    }
}
