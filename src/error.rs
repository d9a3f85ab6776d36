use thiserror::Error;

/// Errors that can occur across recipe discovery, generation and favorites
#[derive(Error, Debug)]
pub enum Error {
    /// Raw payload is missing required fields or is not recipe-shaped.
    /// Presentation treats this exactly like "not found", never as a crash.
    #[error("Malformed recipe payload: {0}")]
    MalformedRecipe(String),

    /// The bulk catalog fetch backing the favorites list failed
    #[error("Favorites are unavailable: {0}")]
    FavoritesUnavailable(String),

    /// Transport failure while calling the generative API
    #[error("Recipe generation failed: {0}")]
    GenerationFailed(String),

    /// A save or unsave was attempted with no signed-in user
    #[error("Saving recipes requires a signed-in user")]
    SaveRequiresAuth,

    /// Sign-in or sign-out against the authentication provider failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Document store read or write failed
    #[error("Document store error: {0}")]
    Store(String),

    /// Failed to reach the recipe catalog
    #[error("Failed to fetch from catalog: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
