use crate::error::CatalogError;
use crate::model::ProductKey;
use crate::sanity::record::RemoteProduct;
use async_trait::async_trait;

/// A remote place products can be fetched from.
///
/// `Ok(None)` means the store answered and has no such product; transport
/// and decoding problems are `Err`. Callers rely on the two being distinct.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_product(&self, key: &ProductKey) -> Result<Option<RemoteProduct>, CatalogError>;

    async fn list_products(&self) -> Result<Vec<RemoteProduct>, CatalogError>;
}
