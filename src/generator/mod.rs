mod factory;
mod google;
mod open_ai;
mod prompt;

pub use factory::ProviderFactory;
pub use google::GoogleProvider;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_generation_prompt, RECIPE_FORMAT_PROMPT};

use async_trait::async_trait;
use serde_json::{json, Value};
use std::error::Error as StdError;

use crate::error::Error;
use crate::identity::{RecipeId, SourceKind};
use crate::model::CanonicalRecipe;
use crate::normalize::normalize;

/// Unified trait for all generative model providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "google", "openai")
    fn provider_name(&self) -> &str;

    /// Send one prompt and return the model's raw text reply
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn StdError + Send + Sync>>;
}

/// What a generation request produced.
///
/// `Refused` is a normal outcome, not a failure: the model answered with
/// free text instead of a recipe (a refusal or a clarifying question) and
/// that reply is shown to the user verbatim. Only transport problems
/// surface as [`Error::GenerationFailed`].
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Recipe(CanonicalRecipe),
    Refused(String),
}

/// Generate a recipe from a free-text request.
///
/// The model's reply is expected to be a JSON object matching the format
/// prompt, optionally wrapped in markdown code fences. A fresh timestamp
/// id is minted for the recipe before normalization, so the result can be
/// saved and later routed like any other generated recipe.
pub async fn generate_recipe(
    provider: &dyn LlmProvider,
    request: &str,
) -> Result<GenerationOutcome, Error> {
    let prompt = build_generation_prompt(request);
    let reply = provider
        .generate(&prompt)
        .await
        .map_err(|e| Error::GenerationFailed(e.to_string()))?;

    // Models regularly wrap the object in ```json fences
    let cleaned = reply.replace("```json", "").replace("```", "");
    let mut raw: Value = match serde_json::from_str(cleaned.trim()) {
        Ok(raw) => raw,
        Err(_) => return Ok(GenerationOutcome::Refused(reply)),
    };

    if let Some(fields) = raw.as_object_mut() {
        fields.insert("id".to_string(), json!(RecipeId::now().0));
    }

    match normalize(&raw, SourceKind::Generated) {
        Ok(recipe) => Ok(GenerationOutcome::Recipe(recipe)),
        // Parsed as JSON but not recipe-shaped, e.g. a quoted refusal
        Err(_) => Ok(GenerationOutcome::Refused(reply)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PLACEHOLDER_IMAGE;

    struct CannedProvider {
        reply: Result<String, String>,
    }

    impl CannedProvider {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn generate(
            &self,
            _prompt: &str,
        ) -> Result<String, Box<dyn StdError + Send + Sync>> {
            self.reply.clone().map_err(|e| e.into())
        }
    }

    #[tokio::test]
    async fn test_fenced_json_reply_becomes_a_recipe() {
        let provider = CannedProvider::replying(
            "```json\n{\"title\": \"Fried Rice\", \"readyInMinutes\": 15, \
             \"ingredients\": [\"2 cups rice\", {\"quantity\": \"1\", \"unit\": \"tbsp\", \"name\": \"oil\"}], \
             \"instructions\": [\"Heat the oil.\", \"Fry the rice.\"]}\n```",
        );

        let outcome = generate_recipe(&provider, "rice and oil").await.unwrap();

        let GenerationOutcome::Recipe(recipe) = outcome else {
            panic!("expected a recipe");
        };
        assert_eq!(recipe.title, "Fried Rice");
        assert_eq!(recipe.ready_in_minutes, 15);
        assert_eq!(recipe.ingredients, vec!["2 cups rice", "1 tbsp oil"]);
        assert_eq!(recipe.instruction_groups.len(), 1);
        assert_eq!(recipe.instruction_groups[0].steps[1].number, 2);
        assert_eq!(recipe.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(recipe.source_kind, SourceKind::Generated);
        // Minted ids route back to the generated branch
        assert_eq!(SourceKind::classify(recipe.id), SourceKind::Generated);
    }

    #[tokio::test]
    async fn test_free_text_reply_is_a_refusal_with_exact_text() {
        let reply = "I can't help with that request.";
        let provider = CannedProvider::replying(reply);

        let outcome = generate_recipe(&provider, "something else").await.unwrap();

        assert_eq!(outcome, GenerationOutcome::Refused(reply.to_string()));
    }

    #[tokio::test]
    async fn test_json_but_not_recipe_shaped_is_a_refusal() {
        let provider = CannedProvider::replying("\"Please tell me what ingredients you have.\"");

        let outcome = generate_recipe(&provider, "").await.unwrap();

        assert!(matches!(outcome, GenerationOutcome::Refused(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        let provider = CannedProvider::failing("connection reset");

        let result = generate_recipe(&provider, "soup").await;

        assert!(matches!(result, Err(Error::GenerationFailed(_))));
    }
}
