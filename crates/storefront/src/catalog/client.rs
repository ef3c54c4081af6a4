//! HTTP client for the remote product catalog.

use std::sync::Arc;

use reqwest::header::ACCEPT;
use shopcart_core::Product;
use tracing::instrument;
use url::Url;

use super::CatalogError;

/// Longest slice of an error body kept for diagnostics.
const ERROR_BODY_PREVIEW: usize = 200;

/// Client for the remote product API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl CatalogClient {
    /// Create a client for the given endpoint.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                endpoint,
            }),
        }
    }

    /// The endpoint this client reads from.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Fetch the full product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the endpoint answers with a
    /// non-success status, or the body is not a JSON array of products.
    #[instrument(skip(self), fields(endpoint = %self.inner.endpoint))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self
            .inner
            .client
            .get(self.inner.endpoint.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();

        // Read as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            tracing::error!(status = %status, body = %preview, "Catalog API returned non-success status");
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }

        let products: Vec<Product> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(ERROR_BODY_PREVIEW).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })?;

        tracing::debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn remote_products() -> serde_json::Value {
        json!([
            {
                "id": "1",
                "title": "Desk lamp",
                "img": "https://img.example/lamp.png",
                "price": 39.5,
                "unitsInStock": 3,
                "createdAt": "2021-01-01T00:00:00Z",
                "updatedAt": "2021-01-02T00:00:00Z",
                "isFavorite": false,
                "votes": {
                    "upVotes": { "currentValue": 0, "lowerLimit": 0, "upperLimit": 10 },
                    "downVotes": { "currentValue": 0, "lowerLimit": 0, "upperLimit": 10 }
                }
            }
        ])
    }

    fn client_for(server: &MockServer) -> CatalogClient {
        CatalogClient::new(Url::parse(&format!("{}/products", server.uri())).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_products() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(remote_products()))
            .expect(1)
            .mount(&server)
            .await;

        let products = client_for(&server).fetch_products().await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Desk lamp");
        assert_eq!(products[0].units_in_stock, 3);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_products().await.unwrap_err();

        assert!(matches!(err, CatalogError::Status { status: 503, ref body } if body == "maintenance"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_products().await.unwrap_err();

        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
