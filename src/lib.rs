//! Recipe discovery over two sources: a hosted recipe catalog and a
//! generative language model. Both are reduced to one canonical recipe
//! shape, and per-user favorites are persisted to a pluggable document
//! store.

pub mod auth;
mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod generator;
pub mod identity;
pub mod model;
pub mod normalize;
pub mod store;

pub use builder::RecipefyBuilder;
pub use error::Error;
pub use generator::GenerationOutcome;
pub use identity::{RecipeId, SourceKind};
pub use model::{CanonicalRecipe, UserInfo};

use log::warn;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

use crate::auth::AuthGateway;
use crate::catalog::CatalogClient;
use crate::favorites::FavoritesService;
use crate::generator::{generate_recipe, LlmProvider};
use crate::normalize::normalize;
use crate::store::DocumentStore;

/// The application service tying catalog, generator, store and auth
/// together behind one API.
///
/// Construct through [`Recipefy::builder`]; every collaborator can be
/// swapped there, so tests run against in-process fakes with no
/// process-wide state.
pub struct Recipefy {
    catalog: CatalogClient,
    favorites: FavoritesService,
    auth: Arc<dyn AuthGateway>,
    generator: Option<Box<dyn LlmProvider>>,
}

impl Recipefy {
    /// Creates a new builder for assembling the service
    pub fn builder() -> RecipefyBuilder {
        RecipefyBuilder::default()
    }

    pub(crate) fn from_parts(
        catalog: CatalogClient,
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthGateway>,
        generator: Option<Box<dyn LlmProvider>>,
    ) -> Self {
        let favorites = FavoritesService::new(store, catalog.clone());
        Recipefy {
            catalog,
            favorites,
            auth,
            generator,
        }
    }

    /// Search the catalog by keyword, optionally restricted to a meal type.
    /// Pages are zero-based.
    pub async fn search(
        &self,
        keyword: &str,
        meal_type: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<CanonicalRecipe>, Error> {
        let payloads = self
            .catalog
            .search(keyword, meal_type, page, page_size)
            .await?;
        Ok(normalize_hits(&payloads))
    }

    /// A page of the catalog's most popular recipes
    pub async fn popular(&self, page: u32, page_size: u32) -> Result<Vec<CanonicalRecipe>, Error> {
        let payloads = self.catalog.popular(page, page_size).await?;
        Ok(normalize_hits(&payloads))
    }

    /// Fetch one recipe by id, routed by the id's shape: catalog ids go to
    /// the catalog API, timestamp ids are looked up in the signed-in
    /// user's saved generated recipes.
    ///
    /// Returns `Ok(None)` when a generated recipe is not among the user's
    /// saved documents (or nobody is signed in); generated recipes exist
    /// nowhere else.
    pub async fn recipe_by_id(&self, id: RecipeId) -> Result<Option<CanonicalRecipe>, Error> {
        match SourceKind::classify(id) {
            SourceKind::Catalog => {
                let payload = self.catalog.get_by_id(id).await?;
                Ok(Some(normalize(&payload, SourceKind::Catalog)?))
            }
            SourceKind::Generated => {
                let Some(user) = self.auth.current_user() else {
                    return Ok(None);
                };
                let Some(record) = self.favorites.record_for(&user.uid).await? else {
                    return Ok(None);
                };
                Ok(record
                    .saved_generated_recipes
                    .into_iter()
                    .find(|recipe| recipe.id == id))
            }
        }
    }

    /// Generate a recipe from a free-text request
    pub async fn generate(&self, request: &str) -> Result<GenerationOutcome, Error> {
        let provider = self.generator.as_deref().ok_or_else(|| {
            Error::GenerationFailed("No generative provider is configured".to_string())
        })?;
        generate_recipe(provider, request).await
    }

    /// The signed-in user's saved recipes, catalog favorites first.
    /// Signed out, the list is empty.
    pub async fn favorites(&self) -> Result<Vec<CanonicalRecipe>, Error> {
        match self.auth.current_user() {
            Some(user) => self.favorites.resolve(&user.uid).await,
            None => Ok(Vec::new()),
        }
    }

    /// Flip the saved state of a recipe for the signed-in user; returns
    /// the new state
    pub async fn toggle_save(&self, recipe: &CanonicalRecipe) -> Result<bool, Error> {
        let user = self.auth.current_user().ok_or(Error::SaveRequiresAuth)?;
        self.favorites.toggle(&user, recipe).await
    }

    /// Whether the signed-in user has saved the given recipe id
    pub async fn is_saved(&self, id: RecipeId) -> Result<bool, Error> {
        match self.auth.current_user() {
            Some(user) => self.favorites.is_saved(&user.uid, id).await,
            None => Ok(false),
        }
    }

    pub async fn sign_in(&self) -> Result<UserInfo, Error> {
        self.auth
            .sign_in()
            .await
            .map_err(|e| Error::Auth(e.to_string()))
    }

    pub async fn sign_out(&self) -> Result<(), Error> {
        self.auth
            .sign_out()
            .await
            .map_err(|e| Error::Auth(e.to_string()))
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        self.auth.current_user()
    }

    /// Subscribe to authentication-state changes; drop the receiver to
    /// unsubscribe
    pub fn subscribe_auth(&self) -> watch::Receiver<Option<UserInfo>> {
        self.auth.subscribe()
    }
}

/// Normalize a page of raw catalog hits, dropping entries that are not
/// recipe-shaped so one bad hit cannot blank a whole results page
fn normalize_hits(payloads: &[Value]) -> Vec<CanonicalRecipe> {
    payloads
        .iter()
        .filter_map(|payload| match normalize(payload, SourceKind::Catalog) {
            Ok(recipe) => Some(recipe),
            Err(e) => {
                warn!("Skipping unreadable catalog hit: {}", e);
                None
            }
        })
        .collect()
}
