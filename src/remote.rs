//! Remote product API client.
//!
//! The catalog can be backed by a REST service exposing `api/productos`. This module
//! holds the wire representation of a product, the [`ProductApi`] seam the
//! repository talks to, and [`HttpProductApi`], its `reqwest` implementation.
//!
//! The service sends prices as decimal strings (`"15000.00"`) and may send a null
//! category. Unparseable prices become 0.0 and missing categories become
//! [`DEFAULT_CATEGORY`].

use crate::core::catalog::NewProduct;
use crate::entities::product;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Category assigned to remote products that arrive without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Connect and read timeout for every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gets the remote API base URL from `CATALOG_API_URL`, if configured.
#[must_use]
pub fn get_api_url() -> Option<String> {
    std::env::var("CATALOG_API_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// Failure talking to the remote service.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The service answered with a non-success status
    #[error("Remote API returned HTTP {0}")]
    Status(u16),

    /// The service answered successfully with a null body
    #[error("Remote API returned an empty body")]
    EmptyBody,

    /// Connection, timeout or decoding failure
    #[error("Remote API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Product as exchanged with the remote service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    /// Remote identifier
    pub id: i64,
    /// Display name
    #[serde(rename = "nombre")]
    pub name: String,
    /// Description
    #[serde(rename = "descripcion", default)]
    pub description: String,
    /// Unit price as a decimal string
    #[serde(rename = "precio")]
    pub price: String,
    /// Image reference
    #[serde(rename = "imagen", default)]
    pub image_url: String,
    /// Category label, absent for uncategorized products
    #[serde(rename = "categoria_nombre", default)]
    pub category: Option<String>,
    /// Units available
    #[serde(default)]
    pub stock: i32,
}

impl ProductDto {
    /// Parsed price; anything that is not a finite, non-negative number reads as 0.0.
    #[must_use]
    pub fn parsed_price(&self) -> f64 {
        self.price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite() && *price >= 0.0)
            .unwrap_or(0.0)
    }
}

impl From<ProductDto> for product::Model {
    fn from(dto: ProductDto) -> Self {
        let price = dto.parsed_price();
        Self {
            id: dto.id,
            name: dto.name,
            description: dto.description,
            price,
            image_url: dto.image_url,
            category: dto
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            stock: dto.stock.max(0),
        }
    }
}

impl From<&NewProduct> for ProductDto {
    fn from(product: &NewProduct) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: format!("{:.2}", product.price),
            image_url: product.image_url.clone(),
            category: Some(product.category.clone()),
            stock: product.stock,
        }
    }
}

/// Operations offered by the remote product service.
#[async_trait]
pub trait ProductApi: Send + Sync {
    /// Fetches every product.
    async fn list_products(&self) -> Result<Vec<ProductDto>, ApiError>;

    /// Fetches one product; `None` when the service does not know the id.
    async fn get_product(&self, id: i64) -> Result<Option<ProductDto>, ApiError>;

    /// Creates a product and returns the service's copy.
    async fn create_product(&self, product: &ProductDto) -> Result<ProductDto, ApiError>;

    /// Replaces the product with `id`.
    async fn update_product(&self, id: i64, product: &ProductDto) -> Result<ProductDto, ApiError>;

    /// Removes the product with `id`.
    async fn delete_product(&self, id: i64) -> Result<(), ApiError>;
}

/// [`ProductApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProductApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProductApi {
    /// Builds a client for the service rooted at `base_url` (e.g. `https://shop.example/`).
    ///
    /// # Errors
    /// Returns `Transport` if the TLS backend cannot be initialized.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/productos{}", self.base_url, path)
    }
}

fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ApiError::Status(status.as_u16()))
    }
}

#[async_trait]
impl ProductApi for HttpProductApi {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<ProductDto>, ApiError> {
        let resp = ensure_success(self.client.get(self.url("")).send().await?)?;
        let products: Option<Vec<ProductDto>> = resp.json().await?;
        let products = products.ok_or(ApiError::EmptyBody)?;
        debug!("Fetched {} remote products", products.len());
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: i64) -> Result<Option<ProductDto>, ApiError> {
        let resp = self.client.get(self.url(&format!("/{id}"))).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = ensure_success(resp)?;
        Ok(resp.json().await?)
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn create_product(&self, product: &ProductDto) -> Result<ProductDto, ApiError> {
        let resp = self.client.post(self.url("")).json(product).send().await?;
        let resp = ensure_success(resp)?;
        Ok(resp.json().await?)
    }

    #[instrument(skip(self, product))]
    async fn update_product(&self, id: i64, product: &ProductDto) -> Result<ProductDto, ApiError> {
        let resp = self
            .client
            .put(self.url(&format!("/{id}")))
            .json(product)
            .send()
            .await?;
        let resp = ensure_success(resp)?;
        Ok(resp.json().await?)
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        let resp = self
            .client
            .delete(self.url(&format!("/{id}")))
            .send()
            .await?;
        ensure_success(resp)?;
        Ok(())
    }
}
