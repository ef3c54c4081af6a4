//! Integration tests for Shopcart.
//!
//! Each test starts the storefront router on an ephemeral port, backed by a
//! temporary storage directory and a mock product API, and drives it over
//! HTTP with a cookie-keeping client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopcart-integration-tests
//! ```

use std::path::Path;
use std::sync::Arc;

use reqwest::{Client, Response, redirect};
use serde_json::{Value, json};
use shopcart_storefront::catalog::CatalogLoader;
use shopcart_storefront::config::StorefrontConfig;
use shopcart_storefront::state::AppState;
use shopcart_storefront::storage::FileStorage;
use shopcart_storefront::store::Shop;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Products served by the mock catalog API.
#[must_use]
pub fn sample_products() -> Value {
    json!([
        {
            "id": 1,
            "title": "Kettle",
            "img": "https://img.example/kettle.png",
            "price": "24.00",
            "unitsInStock": 2,
            "createdAt": "2021-05-01T00:00:00Z",
            "updatedAt": "2021-05-01T00:00:00Z",
            "isFavorite": false,
            "votes": {
                "upVotes": { "currentValue": 9, "lowerLimit": 0, "upperLimit": 10 },
                "downVotes": { "currentValue": 0, "lowerLimit": 0, "upperLimit": 10 }
            }
        },
        {
            "id": 2,
            "title": "Mug",
            "img": "https://img.example/mug.png",
            "price": 8.5,
            "unitsInStock": 5,
            "createdAt": "2021-05-02T00:00:00Z",
            "updatedAt": "2021-05-02T00:00:00Z"
        }
    ])
}

/// A running storefront.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: Client,
    catalog: MockServer,
    storage_dir: TempDir,
    server: JoinHandle<()>,
}

impl TestServer {
    /// Start with the sample catalog loaded.
    pub async fn start() -> Self {
        Self::with_catalog_response(ResponseTemplate::new(200).set_body_json(sample_products()))
            .await
    }

    /// Start with the product API answering `response`.
    ///
    /// The startup fetch is awaited before the server accepts requests.
    pub async fn with_catalog_response(response: ResponseTemplate) -> Self {
        let catalog = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(response)
            .mount(&catalog)
            .await;

        let storage_dir = tempfile::tempdir().expect("Failed to create storage dir");
        let endpoint = Url::parse(&format!("{}/products", catalog.uri())).expect("Bad mock URL");
        let config = StorefrontConfig::local(endpoint, storage_dir.path().to_path_buf());

        let shop = open_shop(storage_dir.path());
        let state = AppState::new(config, shop);

        if let Some(loader) =
            CatalogLoader::start_if_empty(state.shop().clone(), state.catalog().clone()).await
        {
            loader.wait().await;
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let app = shopcart_storefront::app(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{addr}"),
            state,
            client,
            catalog,
            storage_dir,
            server,
        }
    }

    /// Directory holding the storage files.
    #[must_use]
    pub fn storage_dir(&self) -> &Path {
        self.storage_dir.path()
    }

    /// Requests the mock product API received.
    pub async fn catalog_requests(&self) -> usize {
        self.catalog
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("GET failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .form(form)
            .send()
            .await
            .expect("POST failed")
    }

    /// GET a page and return its body.
    pub async fn page(&self, path: &str) -> String {
        self.get(path).await.text().await.expect("Unreadable body")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Open a shop over the storage files in `dir`, as a fresh process would.
#[must_use]
pub fn open_shop(dir: &Path) -> Shop {
    let storage = FileStorage::open(dir).expect("Failed to open storage");
    Shop::load(Arc::new(storage))
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
}
