//! Persistence collaborators consumed by the recommender
//!
//! The catalog and the like/dislike records live behind these traits so the
//! ranking services run the same against PostgreSQL or the in-memory store.

use crate::{
    error::AppResult,
    models::{NewVariant, Paging, Swipe, Variant},
};

/// Read and ingest access to the variant catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Lists variants ordered by id, windowed by `paging`
    async fn list_variants(&self, paging: Paging) -> AppResult<Vec<Variant>>;

    /// Fetches one variant by id
    async fn get_variant(&self, id: i64) -> AppResult<Option<Variant>>;

    /// Fetches the variants whose ids are in `ids`; unknown ids are ignored
    async fn variants_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Variant>>;

    /// All variants whose technical sheet was scraped successfully
    async fn successful_variants(&self) -> AppResult<Vec<Variant>>;

    /// Up to `limit` successfully scraped variants chosen at random, skipping `exclude`
    async fn random_variants(&self, limit: usize, exclude: &[i64]) -> AppResult<Vec<Variant>>;

    /// Adds a variant to the catalog
    async fn insert_variant(&self, variant: NewVariant) -> AppResult<Variant>;
}

/// Like/dislike records
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SwipeStore: Send + Sync {
    /// Stores a swipe, replacing any earlier swipe of the same user on the same variant
    async fn record_swipe(&self, swipe: Swipe) -> AppResult<()>;

    /// Every swipe recorded for `user_id`
    async fn swipes_for_user(&self, user_id: i64) -> AppResult<Vec<Swipe>>;
}
