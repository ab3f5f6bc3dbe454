//! Remote-first catalog access with a local fallback.
//!
//! [`CatalogRepository`] puts a [`ProductApi`] in front of a [`CatalogStore`]. Reads try
//! the remote service first and fall back to the local catalog when it fails. Writes
//! are attempted remotely and then always applied locally, so the local catalog stays
//! usable offline. Batch inserts and clearing the catalog only touch the local store.
//!
//! Remote failures never surface as errors; they are logged with `warn!` and the
//! local result is returned instead, tagged with [`Source::Local`].

use crate::{
    core::catalog::{CatalogStore, NewProduct},
    entities::product,
    errors::Result,
    remote::{ProductApi, ProductDto},
};
use tracing::{debug, info, instrument, warn};

/// Where a read was served from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// The remote service answered
    Remote,
    /// The remote service failed and the local catalog answered
    Local,
}

/// A read result together with its origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Fetched<T> {
    /// The data
    pub value: T,
    /// Where it came from
    pub source: Source,
}

impl<T> Fetched<T> {
    const fn remote(value: T) -> Self {
        Self {
            value,
            source: Source::Remote,
        }
    }

    const fn local(value: T) -> Self {
        Self {
            value,
            source: Source::Local,
        }
    }
}

/// Catalog access that prefers the remote service.
#[derive(Debug, Clone)]
pub struct CatalogRepository<A> {
    api: A,
    catalog: CatalogStore,
}

impl<A: ProductApi> CatalogRepository<A> {
    /// Wraps `catalog` behind `api`.
    #[must_use]
    pub const fn new(api: A, catalog: CatalogStore) -> Self {
        Self { api, catalog }
    }

    /// The local catalog, for live views and local-only queries.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Lists products from the remote service, falling back to the local listing.
    ///
    /// A successful remote listing is also written into the local catalog so a later
    /// offline read sees it. Failing to cache is logged and does not affect the result.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Fetched<Vec<product::Model>>> {
        match self.api.list_products().await {
            Ok(dtos) => {
                let products: Vec<product::Model> =
                    dtos.into_iter().map(product::Model::from).collect();
                info!("Fetched {} products from remote API", products.len());

                let cached = products.iter().map(NewProduct::from).collect();
                if let Err(e) = self.catalog.upsert_many(cached).await {
                    warn!("Failed to cache remote products locally: {}", e);
                }
                Ok(Fetched::remote(products))
            }
            Err(e) => {
                warn!("Remote product listing failed, using local catalog: {}", e);
                let products = self.catalog.list_all().await?;
                if products.is_empty() {
                    warn!("Local catalog is empty");
                }
                Ok(Fetched::local(products))
            }
        }
    }

    /// Looks a product up remotely, falling back to the local catalog when the
    /// service fails or does not know the id.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<Fetched<Option<product::Model>>> {
        match self.api.get_product(id).await {
            Ok(Some(dto)) => {
                debug!("Product {} found remotely", id);
                return Ok(Fetched::remote(Some(product::Model::from(dto))));
            }
            Ok(None) => debug!("Product {} not found remotely, checking locally", id),
            Err(e) => warn!("Remote lookup of product {} failed, checking locally: {}", id, e),
        }
        Ok(Fetched::local(self.catalog.get_by_id(id).await?))
    }

    /// Creates the product remotely, then stores it locally regardless of the outcome.
    ///
    /// # Errors
    /// Returns `ConstraintViolation` for invalid fields before contacting the service,
    /// or whatever the local insert returns.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn insert_one(&self, product: NewProduct) -> Result<i64> {
        product.validate()?;
        match self.api.create_product(&ProductDto::from(&product)).await {
            Ok(created) => debug!("Remote API created product {}", created.id),
            Err(e) => warn!("Remote create failed, storing locally only: {}", e),
        }
        self.catalog.insert_one(product).await
    }

    /// Updates the product remotely, then locally regardless of the outcome.
    ///
    /// # Errors
    /// Returns `ConstraintViolation` for invalid fields before contacting the service,
    /// or `NotFound` if the product does not exist locally.
    #[instrument(skip(self, product), fields(id = product.id))]
    pub async fn update(&self, product: &product::Model) -> Result<product::Model> {
        let fields = NewProduct::from(product);
        fields.validate()?;
        if let Err(e) = self
            .api
            .update_product(product.id, &ProductDto::from(&fields))
            .await
        {
            warn!("Remote update of product {} failed: {}", product.id, e);
        }
        self.catalog.update(product).await
    }

    /// Deletes the product remotely, then locally regardless of the outcome.
    /// Returns the number of local rows removed.
    #[instrument(skip(self, product), fields(id = product.id))]
    pub async fn delete(&self, product: &product::Model) -> Result<u64> {
        if let Err(e) = self.api.delete_product(product.id).await {
            warn!("Remote delete of product {} failed: {}", product.id, e);
        }
        self.catalog.delete(product).await
    }

    /// Inserts a batch into the local catalog only.
    pub async fn insert_many(&self, products: Vec<NewProduct>) -> Result<Vec<i64>> {
        self.catalog.insert_many(products).await
    }

    /// Clears the local catalog only.
    pub async fn delete_all(&self) -> Result<u64> {
        self.catalog.delete_all().await
    }
}
