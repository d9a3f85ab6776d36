use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque recipe identifier.
///
/// Catalog recipes carry small sequential integers assigned by the catalog
/// API. Generated recipes carry a millisecond epoch timestamp minted at
/// generation time, which is the only durable identity they ever get.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub u64);

impl RecipeId {
    /// Mint an identifier for a freshly generated recipe from the current
    /// millisecond epoch timestamp.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        RecipeId(millis)
    }

    /// Number of decimal digits in the identifier
    fn digit_count(self) -> u32 {
        if self.0 == 0 {
            1
        } else {
            self.0.ilog10() + 1
        }
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecipeId {
    fn from(value: u64) -> Self {
        RecipeId(value)
    }
}

/// Which source a recipe identifier (and therefore its payload schema)
/// belongs to. Decided once per identifier and threaded through explicitly;
/// downstream code never re-sniffs payload shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Sourced from the third-party recipe catalog
    Catalog,
    /// Produced by a generative-language-model prompt, persisted only
    /// inside the owning user's stored document
    Generated,
}

/// Digit-count threshold separating catalog ids from timestamp ids.
/// Millisecond timestamps have had 13 digits since 2001; catalog ids are
/// well under 10. A catalog id crossing 10 digits would misclassify.
const CATALOG_MAX_DIGITS: u32 = 10;

impl SourceKind {
    /// Classify an identifier by its decimal digit count.
    ///
    /// Total over any identifier: more than 10 digits means a generated
    /// timestamp id, anything else is a catalog id.
    pub fn classify(id: RecipeId) -> SourceKind {
        if id.digit_count() > CATALOG_MAX_DIGITS {
            SourceKind::Generated
        } else {
            SourceKind::Catalog
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_ids_are_catalog() {
        assert_eq!(SourceKind::classify(RecipeId(0)), SourceKind::Catalog);
        assert_eq!(SourceKind::classify(RecipeId(1)), SourceKind::Catalog);
        assert_eq!(SourceKind::classify(RecipeId(716_429)), SourceKind::Catalog);
        // exactly ten digits stays catalog
        assert_eq!(
            SourceKind::classify(RecipeId(9_999_999_999)),
            SourceKind::Catalog
        );
    }

    #[test]
    fn test_timestamp_ids_are_generated() {
        // eleven digits is the first generated bucket
        assert_eq!(
            SourceKind::classify(RecipeId(10_000_000_000)),
            SourceKind::Generated
        );
        // a typical millisecond timestamp
        assert_eq!(
            SourceKind::classify(RecipeId(1_733_000_000_000)),
            SourceKind::Generated
        );
    }

    #[test]
    fn test_minted_ids_classify_as_generated() {
        let id = RecipeId::now();
        assert_eq!(SourceKind::classify(id), SourceKind::Generated);
    }

    #[test]
    fn test_display_renders_decimal() {
        assert_eq!(RecipeId(716_429).to_string(), "716429");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id: RecipeId = serde_json::from_str("716429").unwrap();
        assert_eq!(id, RecipeId(716_429));
        assert_eq!(serde_json::to_string(&id).unwrap(), "716429");
    }
}
