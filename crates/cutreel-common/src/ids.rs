//! Typed ID wrappers for type safety across cutreel.
//!
//! Resource identifiers in the archive format are small integers. The
//! newtype keeps them from being mixed up with other numeric values, and
//! `ResourceKey` combines an identifier with a language and a block index
//! to name exactly one stored movie blob.

use serde::{Deserialize, Serialize};

/// Identifier of a stored resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u16);

impl ResourceId {
    /// Return the identifier shifted by the given block index.
    ///
    /// Localized resources are stored in id-contiguous runs; the key's
    /// index selects within such a run.
    #[must_use]
    pub fn plus(self, offset: u8) -> Self {
        Self(self.0.wrapping_add(u16::from(offset)))
    }

    /// Raw numeric value.
    pub fn value(self) -> u16 {
        self.0
    }
}

impl From<u16> for ResourceId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// Localization of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    French,
    German,
}

impl Language {
    /// All supported languages, in archive order.
    pub const ALL: [Language; 3] = [Language::English, Language::French, Language::German];
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Language::English => "english",
            Language::French => "french",
            Language::German => "german",
        };
        f.write_str(name)
    }
}

/// Key naming one stored movie blob: identifier, language, block index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Base resource identifier.
    pub id: ResourceId,
    /// Localization the blob belongs to.
    pub language: Language,
    /// Index within the localized run.
    pub index: u8,
}

impl ResourceKey {
    /// Create a new key.
    pub fn new(id: ResourceId, language: Language, index: u8) -> Self {
        Self {
            id,
            language,
            index,
        }
    }

    /// Effective identifier of the addressed blob (base id plus index).
    pub fn effective_id(&self) -> ResourceId {
        self.id.plus(self.index)
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.id, self.language, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_plus() {
        let id = ResourceId(0x0BE0);
        assert_eq!(id.plus(2), ResourceId(0x0BE2));
    }

    #[test]
    fn test_resource_key_effective_id() {
        let key = ResourceKey::new(ResourceId(0x0BE0), Language::French, 3);
        assert_eq!(key.effective_id(), ResourceId(0x0BE3));
    }

    #[test]
    fn test_resource_key_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let key = ResourceKey::new(ResourceId(1), Language::English, 0);
        set.insert(key);
        assert!(set.contains(&key));
        assert!(!set.contains(&ResourceKey::new(ResourceId(1), Language::German, 0)));
    }

    #[test]
    fn test_resource_key_serialization() {
        let key = ResourceKey::new(ResourceId(7), Language::German, 1);
        let json = serde_json::to_string(&key).unwrap();
        let back: ResourceKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, back);
    }

    #[test]
    fn test_language_display() {
        assert_eq!(Language::French.to_string(), "french");
        assert_eq!(Language::ALL.len(), 3);
    }
}
