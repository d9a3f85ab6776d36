use std::sync::Arc;

use log::debug;

use crate::auth::{AuthGateway, MemoryAuth};
use crate::catalog::CatalogClient;
use crate::config::AppConfig;
use crate::error::Error;
use crate::generator::{LlmProvider, ProviderFactory};
use crate::store::{DocumentStore, MemoryStore};
use crate::Recipefy;

/// Builder for assembling a [`Recipefy`] service.
///
/// Every collaborator has a default: configuration is loaded from
/// `config.toml` and `RECIPEFY__*` environment variables, the document
/// store and auth gateway fall back to their in-process implementations,
/// and the generative provider comes from the configured default. Swap
/// any of them for production backends or test doubles.
#[derive(Default)]
pub struct RecipefyBuilder {
    config: Option<AppConfig>,
    store: Option<Arc<dyn DocumentStore>>,
    auth: Option<Arc<dyn AuthGateway>>,
    generator: Option<Box<dyn LlmProvider>>,
}

impl RecipefyBuilder {
    /// Use the given configuration instead of loading it from file and
    /// environment
    ///
    /// # Example
    /// ```
    /// use recipefy::config::AppConfig;
    /// use recipefy::Recipefy;
    ///
    /// let builder = Recipefy::builder().config(AppConfig::default());
    /// ```
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use the given document store for per-user state
    ///
    /// # Example
    /// ```
    /// use recipefy::store::MemoryStore;
    /// use recipefy::Recipefy;
    ///
    /// let builder = Recipefy::builder().store(MemoryStore::new());
    /// ```
    pub fn store(mut self, store: impl DocumentStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Use the given authentication gateway
    ///
    /// # Example
    /// ```
    /// use recipefy::auth::MemoryAuth;
    /// use recipefy::model::UserInfo;
    /// use recipefy::Recipefy;
    ///
    /// let profile = UserInfo {
    ///     uid: "u1".to_string(),
    ///     email: Some("a@b.c".to_string()),
    /// };
    /// let builder = Recipefy::builder().auth(MemoryAuth::signed_in(profile));
    /// ```
    pub fn auth(mut self, auth: impl AuthGateway + 'static) -> Self {
        self.auth = Some(Arc::new(auth));
        self
    }

    /// Use the given generative provider instead of the configured default
    pub fn generator(mut self, provider: impl LlmProvider + 'static) -> Self {
        self.generator = Some(Box::new(provider));
        self
    }

    /// Assemble the service
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or the catalog
    /// client cannot be constructed (no API key in config or environment).
    /// A missing generative provider is not an error: generation requests
    /// then fail individually while search and favorites keep working.
    pub fn build(self) -> Result<Recipefy, Error> {
        let config = match self.config {
            Some(config) => config,
            None => AppConfig::load()?,
        };

        let catalog = CatalogClient::new(&config.catalog)?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let auth = self
            .auth
            .unwrap_or_else(|| Arc::new(MemoryAuth::default()));

        let generator = match self.generator {
            Some(provider) => Some(provider),
            None => match ProviderFactory::get_default_provider(&config.generator) {
                Ok(provider) => Some(provider),
                Err(e) => {
                    debug!("No generative provider available: {}", e);
                    None
                }
            },
        };

        Ok(Recipefy::from_parts(catalog, store, auth, generator))
    }
}
