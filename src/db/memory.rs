use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;

use crate::{
    db::store::{CatalogStore, SwipeStore},
    error::AppResult,
    models::{FetchState, NewVariant, Paging, Swipe, Variant},
};

/// Catalog and swipe store kept in process memory
///
/// Used when no database is configured and by the integration tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    next_id: i64,
    variants: BTreeMap<i64, Variant>,
    swipes: HashMap<(i64, i64), Swipe>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryStore {
    async fn list_variants(&self, paging: Paging) -> AppResult<Vec<Variant>> {
        let inner = self.inner.read().await;
        Ok(paging.apply(inner.variants.values().cloned().collect()))
    }

    async fn get_variant(&self, id: i64) -> AppResult<Option<Variant>> {
        let inner = self.inner.read().await;
        Ok(inner.variants.get(&id).cloned())
    }

    async fn variants_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Variant>> {
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        let inner = self.inner.read().await;
        Ok(inner
            .variants
            .values()
            .filter(|v| wanted.contains(&v.id))
            .cloned()
            .collect())
    }

    async fn successful_variants(&self) -> AppResult<Vec<Variant>> {
        let inner = self.inner.read().await;
        Ok(inner
            .variants
            .values()
            .filter(|v| v.fetch_state == FetchState::Success)
            .cloned()
            .collect())
    }

    async fn random_variants(&self, limit: usize, exclude: &[i64]) -> AppResult<Vec<Variant>> {
        let excluded: HashSet<i64> = exclude.iter().copied().collect();
        let mut candidates: Vec<Variant> = {
            let inner = self.inner.read().await;
            inner
                .variants
                .values()
                .filter(|v| v.fetch_state == FetchState::Success && !excluded.contains(&v.id))
                .cloned()
                .collect()
        };

        candidates.shuffle(&mut rand::rng());
        candidates.truncate(limit);
        Ok(candidates)
    }

    async fn insert_variant(&self, variant: NewVariant) -> AppResult<Variant> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;

        let stored = Variant::from_stored(
            id,
            variant.brand,
            variant.name,
            variant.fields,
            variant.fetch_state,
            variant.fetch_date,
            variant.extra,
        );
        inner.variants.insert(id, stored.clone());

        Ok(stored)
    }
}

#[async_trait::async_trait]
impl SwipeStore for MemoryStore {
    async fn record_swipe(&self, swipe: Swipe) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.swipes.insert((swipe.user_id, swipe.variant_id), swipe);
        Ok(())
    }

    async fn swipes_for_user(&self, user_id: i64) -> AppResult<Vec<Swipe>> {
        let inner = self.inner.read().await;
        let mut swipes: Vec<Swipe> = inner
            .swipes
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        swipes.sort_by_key(|s| s.created_at);
        Ok(swipes)
    }
}
