use serde::{Deserialize, Serialize};

use crate::identity::{RecipeId, SourceKind};

/// Fallback image for recipes without one (all generated recipes, plus
/// the occasional catalog entry missing its photo).
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x150?text=No%20Image";

/// Base path the catalog hosts its recipe images under when the payload
/// carries a bare filename instead of a full URL.
pub const CATALOG_IMAGE_BASE: &str = "https://spoonacular.com/recipeImages/";

/// The single normalized recipe shape used by presentation regardless of
/// source. Serialized camelCase so generated recipes stored inline in a
/// user's document round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecipe {
    pub id: RecipeId,
    pub title: String,
    /// Always an absolute URL, never a bare filename
    pub image_url: String,
    pub ready_in_minutes: u32,
    pub servings: u32,
    /// Display-ready ingredient lines
    pub ingredients: Vec<String>,
    pub instruction_groups: Vec<InstructionGroup>,
    /// Rich-text summary, catalog recipes only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_html: Option<String>,
    pub source_kind: SourceKind,
}

/// A named (or unnamed) run of numbered instruction steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub steps: Vec<InstructionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionStep {
    pub number: u32,
    pub text: String,
}

/// Per-user favorites record, keyed by the authenticated user id.
///
/// Catalog favorites are stored as bare ids and re-fetched in bulk when the
/// list is rendered. Generated recipes have no durable catalog entry, so
/// the full canonical document is stored inline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub saved_recipe_ids: Vec<RecipeId>,
    #[serde(default)]
    pub saved_generated_recipes: Vec<CanonicalRecipe>,
}

/// Signed-in user as reported by the authentication provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub uid: String,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_recipe_round_trips_camel_case() {
        let recipe = CanonicalRecipe {
            id: RecipeId(1_733_000_000_000),
            title: "Garlic Butter Chicken".to_string(),
            image_url: PLACEHOLDER_IMAGE.to_string(),
            ready_in_minutes: 25,
            servings: 2,
            ingredients: vec!["2 cups rice".to_string()],
            instruction_groups: vec![InstructionGroup {
                name: None,
                steps: vec![InstructionStep {
                    number: 1,
                    text: "Cook the rice.".to_string(),
                }],
            }],
            summary_html: None,
            source_kind: SourceKind::Generated,
        };

        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["readyInMinutes"], 25);
        assert_eq!(json["imageUrl"], PLACEHOLDER_IMAGE);
        assert_eq!(json["sourceKind"], "generated");

        let back: CanonicalRecipe = serde_json::from_value(json).unwrap();
        assert_eq!(back, recipe);
    }

    #[test]
    fn test_stored_record_tolerates_missing_fields() {
        let record: StoredUserRecord = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert!(record.saved_recipe_ids.is_empty());
        assert!(record.saved_generated_recipes.is_empty());
    }
}
