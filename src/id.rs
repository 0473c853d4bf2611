use compact_str::{CompactString, ToCompactString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::client::encode::encode_path_segment;

/// Identifier of a project, group or user.
///
/// GitLab accepts either the numeric ID or the full path
/// (`"namespace/name"`) wherever a resource is addressed.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ResourceId {
    Numeric(u64),
    Path(CompactString),
}

impl ResourceId {
    pub fn new<S: Into<CompactString>>(path: S) -> Self {
        Self::Path(path.into())
    }

    /// Render the identifier as a single URL path segment.
    pub fn to_path_segment(&self) -> CompactString {
        match self {
            ResourceId::Numeric(id) => id.to_compact_string(),
            ResourceId::Path(path) => encode_path_segment(path),
        }
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::Numeric(0)
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for ResourceId {
    fn from(path: &str) -> Self {
        Self::Path(path.into())
    }
}

impl From<String> for ResourceId {
    fn from(path: String) -> Self {
        Self::Path(path.into())
    }
}

impl From<CompactString> for ResourceId {
    fn from(path: CompactString) -> Self {
        Self::Path(path)
    }
}

impl From<&ResourceId> for ResourceId {
    fn from(id: &ResourceId) -> Self {
        id.clone()
    }
}

/// Digits parse as a numeric ID, anything else as a path.
impl std::str::FromStr for ResourceId {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(value
            .parse::<u64>()
            .map(ResourceId::Numeric)
            .unwrap_or_else(|_| ResourceId::new(value)))
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<ResourceId, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct ResourceIdVisitor;

        impl<'de> Visitor<'de> for ResourceIdVisitor {
            type Value = ResourceId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string path or integer ID")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ResourceId::new(value))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ResourceId::new(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ResourceId::Numeric(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(ResourceId::Numeric)
                    .map_err(|_| E::custom(format!("negative resource ID {value}")))
            }
        }

        deserializer.deserialize_any(ResourceIdVisitor)
    }
}

impl Serialize for ResourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ResourceId::Numeric(id) => serializer.serialize_u64(*id),
            ResourceId::Path(path) => serializer.serialize_str(path),
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ResourceId::Numeric(id) => write!(f, "{}", id),
            ResourceId::Path(path) => write!(f, "{}", path),
        }
    }
}
