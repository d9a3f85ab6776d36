use log::{debug, warn};
use serde_json::json;
use std::sync::Arc;

use crate::catalog::CatalogClient;
use crate::error::Error;
use crate::identity::{RecipeId, SourceKind};
use crate::model::{CanonicalRecipe, StoredUserRecord, UserInfo};
use crate::normalize::normalize;
use crate::store::{ArrayOp, DocumentStore};

/// Document-store collection holding one record per authenticated user
pub const USERS_COLLECTION: &str = "users";

/// Resolves and mutates a user's saved recipes.
///
/// Catalog favorites are stored as bare ids and re-fetched with one bulk
/// request when the list is rendered; generated favorites are stored as
/// full documents and only re-normalized. All record mutations go through
/// the store's atomic merge and array operations, never through a
/// read-modify-write of the whole record.
pub struct FavoritesService {
    store: Arc<dyn DocumentStore>,
    catalog: CatalogClient,
}

impl FavoritesService {
    pub fn new(store: Arc<dyn DocumentStore>, catalog: CatalogClient) -> Self {
        Self { store, catalog }
    }

    /// The user's stored record, or `None` if they have never saved anything
    pub async fn record_for(&self, uid: &str) -> Result<Option<StoredUserRecord>, Error> {
        let document = self
            .store
            .get_document(USERS_COLLECTION, uid)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        match document {
            Some(document) => {
                let record = serde_json::from_value(document)
                    .map_err(|e| Error::Store(format!("Unreadable user record: {}", e)))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// All of the user's saved recipes in display order: catalog favorites
    /// first (bulk-fetch response order), then generated favorites (stored
    /// order).
    ///
    /// A user with no stored record gets an empty list. A failed bulk
    /// fetch fails the whole operation; the generated subset is never
    /// returned on its own, so the view cannot silently render a partial
    /// list as if it were complete.
    pub async fn resolve(&self, uid: &str) -> Result<Vec<CanonicalRecipe>, Error> {
        let Some(record) = self.record_for(uid).await? else {
            return Ok(Vec::new());
        };

        let payloads = self
            .catalog
            .get_bulk(&record.saved_recipe_ids)
            .await
            .map_err(|e| Error::FavoritesUnavailable(e.to_string()))?;

        let mut recipes = Vec::with_capacity(payloads.len() + record.saved_generated_recipes.len());
        for payload in &payloads {
            match normalize(payload, SourceKind::Catalog) {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => warn!("Skipping unreadable catalog favorite: {}", e),
            }
        }

        for saved in &record.saved_generated_recipes {
            let raw = serde_json::to_value(saved).map_err(|e| Error::Store(e.to_string()))?;
            match normalize(&raw, SourceKind::Generated) {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => warn!("Skipping unreadable generated favorite: {}", e),
            }
        }

        debug!("Resolved {} favorites for {}", recipes.len(), uid);
        Ok(recipes)
    }

    /// Whether the given recipe id is currently saved by the user
    pub async fn is_saved(&self, uid: &str, id: RecipeId) -> Result<bool, Error> {
        let Some(record) = self.record_for(uid).await? else {
            return Ok(false);
        };
        Ok(record.saved_recipe_ids.contains(&id)
            || record.saved_generated_recipes.iter().any(|r| r.id == id))
    }

    /// Flip the saved state of a recipe for the given user.
    ///
    /// Catalog recipes flip membership of their id in `savedRecipeIds`;
    /// generated recipes add or remove their full document in
    /// `savedGeneratedRecipes`. Returns the new saved state.
    pub async fn toggle(&self, user: &UserInfo, recipe: &CanonicalRecipe) -> Result<bool, Error> {
        match recipe.source_kind {
            SourceKind::Catalog => self.toggle_catalog(user, recipe.id).await,
            SourceKind::Generated => self.toggle_generated(user, recipe).await,
        }
    }

    /// Flip membership of a catalog id in the user's saved set
    pub async fn toggle_catalog(&self, user: &UserInfo, id: RecipeId) -> Result<bool, Error> {
        self.ensure_record(user).await?;

        let saved = self.is_saved(&user.uid, id).await?;
        let op = if saved {
            ArrayOp::Remove(json!(id.0))
        } else {
            ArrayOp::Union(json!(id.0))
        };
        self.store
            .update_array(USERS_COLLECTION, &user.uid, "savedRecipeIds", op)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        Ok(!saved)
    }

    /// Flip the presence of a generated recipe's full document in the
    /// user's saved list. Removal uses the stored copy of the document so
    /// the array operation matches element-for-element.
    pub async fn toggle_generated(
        &self,
        user: &UserInfo,
        recipe: &CanonicalRecipe,
    ) -> Result<bool, Error> {
        self.ensure_record(user).await?;

        let stored = self
            .record_for(&user.uid)
            .await?
            .and_then(|record| {
                record
                    .saved_generated_recipes
                    .into_iter()
                    .find(|saved| saved.id == recipe.id)
            });

        let (op, now_saved) = match stored {
            Some(saved) => {
                let raw = serde_json::to_value(&saved).map_err(|e| Error::Store(e.to_string()))?;
                (ArrayOp::Remove(raw), false)
            }
            None => {
                let raw = serde_json::to_value(recipe).map_err(|e| Error::Store(e.to_string()))?;
                (ArrayOp::Union(raw), true)
            }
        };

        self.store
            .update_array(USERS_COLLECTION, &user.uid, "savedGeneratedRecipes", op)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        Ok(now_saved)
    }

    /// Create the user's record if absent and keep its email current
    async fn ensure_record(&self, user: &UserInfo) -> Result<(), Error> {
        let partial = match &user.email {
            Some(email) => json!({ "email": email }),
            None => json!({}),
        };
        self.store
            .merge_document(USERS_COLLECTION, &user.uid, partial)
            .await
            .map_err(|e| Error::Store(e.to_string()))
    }
}
