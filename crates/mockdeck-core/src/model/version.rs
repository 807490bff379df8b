use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Grouping bucket for a version in the gallery. Closed set; any other
/// wire string is rejected before storage is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantType {
    Final,
    Page,
    Element,
}

impl VariantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantType::Final => "final",
            VariantType::Page => "page",
            VariantType::Element => "element",
        }
    }
}

impl FromStr for VariantType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "final" => Ok(VariantType::Final),
            "page" => Ok(VariantType::Page),
            "element" => Ok(VariantType::Element),
            other => Err(CoreError::InvalidType(other.to_string())),
        }
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in the version registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub variant: VariantType,
    /// Import binding name tying the record to its import line.
    #[serde(skip)]
    pub component: String,
    /// Module path from the import line, relative to the versions root.
    #[serde(rename = "file")]
    pub import_path: String,
}

/// Ids double as file name roots, so anything that could carry a path
/// segment is refused up front.
pub fn validate_id(id: &str) -> Result<(), CoreError> {
    let mut chars = id.chars();
    let ok = match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(CoreError::UnsafeId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_type_round_trip() {
        for name in ["final", "page", "element"] {
            let variant: VariantType = name.parse().unwrap();
            assert_eq!(variant.as_str(), name);
        }
    }

    #[test]
    fn test_variant_type_rejects_unknown() {
        assert!(matches!(
            "hero".parse::<VariantType>(),
            Err(CoreError::InvalidType(_))
        ));
    }

    #[test]
    fn test_validate_id() {
        validate_id("v1").unwrap();
        validate_id("v1-draft_2").unwrap();
        assert!(validate_id("").is_err());
        assert!(validate_id("../etc").is_err());
        assert!(validate_id("v1/../../etc").is_err());
        assert!(validate_id("-v1").is_err());
        assert!(validate_id("v 1").is_err());
    }
}
