//! Shared domain enumerations aligned with the persisted block attributes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};

/// Rendering mode of the block.
///
/// Persisted with the tags `"static"` and `"dynamic_gb"`. Any other tag
/// (including a missing or non-string value) normalizes to [`BlockType::Static`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum BlockType {
    #[default]
    #[serde(rename = "static")]
    Static,
    #[serde(rename = "dynamic_gb")]
    Dynamic,
}

impl BlockType {
    pub const STATIC_TAG: &'static str = "static";
    pub const DYNAMIC_TAG: &'static str = "dynamic_gb";

    pub fn as_tag(self) -> &'static str {
        match self {
            BlockType::Static => Self::STATIC_TAG,
            BlockType::Dynamic => Self::DYNAMIC_TAG,
        }
    }

    /// Strict lookup; `None` for unrecognized tags.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        match tag {
            Self::STATIC_TAG => Some(BlockType::Static),
            Self::DYNAMIC_TAG => Some(BlockType::Dynamic),
            _ => None,
        }
    }

    /// Lookup with the documented fallback to [`BlockType::Static`].
    pub fn from_tag(tag: &str) -> Self {
        Self::parse_tag(tag).unwrap_or_default()
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTag {
    Text(String),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for BlockType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawTag::deserialize(deserializer)? {
            RawTag::Text(tag) => Self::from_tag(&tag),
            RawTag::Other(_) => Self::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_round_trip() {
        for mode in [BlockType::Static, BlockType::Dynamic] {
            assert_eq!(BlockType::parse_tag(mode.as_tag()), Some(mode));
        }
    }

    #[test]
    fn unknown_tag_falls_back_to_static() {
        assert_eq!(BlockType::parse_tag("dynamic"), None);
        assert_eq!(BlockType::from_tag("dynamic"), BlockType::Static);
        assert_eq!(BlockType::from_tag(""), BlockType::Static);
    }

    #[test]
    fn deserialization_normalizes_unexpected_values() {
        let dynamic: BlockType = serde_json::from_str(r#""dynamic_gb""#).expect("dynamic");
        let garbage: BlockType = serde_json::from_str(r#""carousel""#).expect("garbage");
        let number: BlockType = serde_json::from_str("3").expect("number");
        let null: BlockType = serde_json::from_str("null").expect("null");

        assert_eq!(dynamic, BlockType::Dynamic);
        assert_eq!(garbage, BlockType::Static);
        assert_eq!(number, BlockType::Static);
        assert_eq!(null, BlockType::Static);
    }

    #[test]
    fn serializes_with_persisted_tags() {
        let json = serde_json::to_string(&BlockType::Dynamic).expect("serialize");
        assert_eq!(json, r#""dynamic_gb""#);
    }
}
