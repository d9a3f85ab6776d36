use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::CatalogConfig;
use crate::error::Error;
use crate::identity::RecipeId;

/// HTTP client for the hosted recipe catalog.
///
/// All methods return the catalog's raw JSON payloads; callers run them
/// through [`crate::normalize::normalize`] before presenting them. Cheap to
/// clone, so the favorites resolver and the main service share one
/// underlying connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CatalogClient {
    /// Create a new catalog client from configuration
    pub fn new(config: &CatalogConfig) -> Result<Self, Error> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("SPOONACULAR_API_KEY").ok())
            .ok_or_else(|| {
                Error::Builder("SPOONACULAR_API_KEY not found in config or environment".to_string())
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(CatalogClient {
            client,
            api_key,
            base_url: config.base_url.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        CatalogClient {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Search the catalog by keyword, optionally restricted to one meal type.
    ///
    /// Pages are zero-based; each result already carries the full recipe
    /// information, so no follow-up per-recipe request is needed to render a
    /// result card.
    pub async fn search(
        &self,
        keyword: &str,
        meal_type: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Value>, Error> {
        let mut params = vec![
            ("apiKey".to_string(), self.api_key.clone()),
            ("query".to_string(), keyword.to_string()),
            ("addRecipeInformation".to_string(), "true".to_string()),
            ("number".to_string(), page_size.to_string()),
            ("offset".to_string(), (page * page_size).to_string()),
        ];
        if let Some(meal_type) = meal_type {
            params.push(("type".to_string(), meal_type.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/recipes/complexSearch", self.base_url))
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        debug!("Catalog search '{}' page {}: {:?}", keyword, page, body);
        extract_results(body)
    }

    /// Fetch a page of the catalog's most popular recipes
    pub async fn popular(&self, page: u32, page_size: u32) -> Result<Vec<Value>, Error> {
        let response = self
            .client
            .get(format!("{}/recipes/search", self.base_url))
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("sort", "popularity"),
                ("sortDirection", "desc"),
                ("number", &page_size.to_string()),
                ("offset", &(page * page_size).to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        debug!("Catalog popular page {}: {:?}", page, body);
        extract_results(body)
    }

    /// Fetch the full information payload for a single catalog recipe
    pub async fn get_by_id(&self, id: RecipeId) -> Result<Value, Error> {
        let response = self
            .client
            .get(format!("{}/recipes/{}/information", self.base_url, id))
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        debug!("Catalog recipe {}: {:?}", id, body);
        Ok(body)
    }

    /// Fetch several recipes in one request.
    ///
    /// An empty id list short-circuits to an empty result without touching
    /// the network, since the bulk endpoint rejects an empty `ids` value.
    pub async fn get_bulk(&self, ids: &[RecipeId]) -> Result<Vec<Value>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .client
            .get(format!("{}/recipes/informationBulk", self.base_url))
            .query(&[("apiKey", self.api_key.as_str()), ("ids", &joined)])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        debug!("Catalog bulk [{}]: {:?}", joined, body);
        match body {
            Value::Array(items) => Ok(items),
            other => Err(Error::MalformedRecipe(format!(
                "Bulk response is not an array: {}",
                other
            ))),
        }
    }
}

/// Search-style endpoints wrap their hits in a `results` array
fn extract_results(body: Value) -> Result<Vec<Value>, Error> {
    match body.get("results") {
        Some(Value::Array(items)) => Ok(items.clone()),
        _ => Err(Error::MalformedRecipe(
            "Search response has no 'results' array".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> CatalogClient {
        CatalogClient::with_base_url("fake_api_key".to_string(), server.url())
    }

    #[tokio::test]
    async fn test_search_pages_with_offset() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/recipes/complexSearch")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("apiKey".into(), "fake_api_key".into()),
                Matcher::UrlEncoded("query".into(), "pasta".into()),
                Matcher::UrlEncoded("addRecipeInformation".into(), "true".into()),
                Matcher::UrlEncoded("number".into(), "10".into()),
                Matcher::UrlEncoded("offset".into(), "20".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": [{"id": 1}, {"id": 2}], "totalResults": 412}"#)
            .create_async()
            .await;

        let results = client_for(&server)
            .search("pasta", None, 2, 10)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["id"], 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_forwards_meal_type() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/recipes/complexSearch")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "tart".into()),
                Matcher::UrlEncoded("type".into(), "dessert".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let results = client_for(&server)
            .search("tart", Some("dessert"), 0, 10)
            .await
            .unwrap();

        assert!(results.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_popular_sorts_by_popularity() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/recipes/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sort".into(), "popularity".into()),
                Matcher::UrlEncoded("sortDirection".into(), "desc".into()),
                Matcher::UrlEncoded("offset".into(), "0".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": [{"id": 7, "title": "Pad Thai"}]}"#)
            .create_async()
            .await;

        let results = client_for(&server).popular(0, 12).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["title"], "Pad Thai");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_by_id_fetches_information() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/recipes/716429/information")
            .match_query(Matcher::UrlEncoded("apiKey".into(), "fake_api_key".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 716429, "title": "Pasta with Garlic"}"#)
            .create_async()
            .await;

        let recipe = client_for(&server)
            .get_by_id(RecipeId(716_429))
            .await
            .unwrap();

        assert_eq!(recipe["title"], "Pasta with Garlic");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_bulk_joins_ids_into_one_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/recipes/informationBulk")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ids".into(), "1,2,3".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 1}, {"id": 2}, {"id": 3}]"#)
            .create_async()
            .await;

        let results = client_for(&server)
            .get_bulk(&[RecipeId(1), RecipeId(2), RecipeId(3)])
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_bulk_with_no_ids_skips_the_network() {
        let server = Server::new_async().await;
        let results = client_for(&server).get_bulk(&[]).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_surfaces_as_fetch() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/recipes/complexSearch")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let result = client_for(&server).search("pasta", None, 0, 10).await;

        assert!(matches!(result, Err(Error::Fetch(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_results_array_is_malformed() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/recipes/complexSearch")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "quota exceeded"}"#)
            .create_async()
            .await;

        let result = client_for(&server).search("pasta", None, 0, 10).await;

        assert!(matches!(result, Err(Error::MalformedRecipe(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_example_payload_normalizes() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/recipes/complexSearch")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "results": [{
                        "id": 716429,
                        "title": "Pasta with Garlic",
                        "image": "https://img.spoonacular.com/recipes/716429-312x231.jpg",
                        "readyInMinutes": 45,
                        "servings": 2,
                        "extendedIngredients": [
                            {"original": "1 tbsp butter"},
                            {"original": "2 cloves garlic"}
                        ],
                        "analyzedInstructions": [
                            {"name": "", "steps": [{"number": 1, "step": "Melt the butter."}]}
                        ]
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let results = client_for(&server)
            .search("pasta", None, 0, 10)
            .await
            .unwrap();
        let recipe =
            crate::normalize::normalize(&results[0], crate::identity::SourceKind::Catalog).unwrap();

        assert_eq!(recipe.title, "Pasta with Garlic");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.instruction_groups[0].steps[0].text, "Melt the butter.");
    }
}
