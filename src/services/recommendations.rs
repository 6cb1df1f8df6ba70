use std::collections::HashSet;
use std::time::Instant;

use crate::{
    cached,
    db::{Cache, CacheKey, CatalogStore, SwipeStore},
    error::{AppError, AppResult},
    models::{Attribute, Paging, PreferenceVector, RankedVariant, Swipe, SwipeRequest},
    services::{preferences::average_preferences, ranking},
};

/// Attributes the swipe recommender derives from likes and ranks on
pub const SWIPE_ATTRIBUTES: [Attribute; 5] = [
    Attribute::ModelYear,
    Attribute::Displacement,
    Attribute::Power,
    Attribute::Weight,
    Attribute::MaxSpeed,
];

/// Ranks the successfully scraped catalog against explicit preferences
///
/// Only the supplied attributes are compared. Results are paged after ranking
/// and, when a cache is configured, kept for `cache_ttl` seconds.
pub async fn recommend_for_preferences(
    catalog: &dyn CatalogStore,
    cache: Option<&Cache>,
    cache_ttl: u64,
    preferences: PreferenceVector,
    paging: Paging,
) -> AppResult<Vec<RankedVariant>> {
    if preferences.is_empty() {
        return Err(AppError::InvalidInput(
            "Provide at least one attribute preference".to_string(),
        ));
    }

    let start = Instant::now();
    let key = CacheKey::Recommendation(format!(
        "{}|page={}|size={}",
        preferences.canonical(),
        paging.page.map_or("-".to_string(), |p| p.to_string()),
        paging.page_size.map_or("-".to_string(), |s| s.to_string()),
    ));

    let ranked: Vec<RankedVariant> = cached!(cache, key, cache_ttl, async {
        let snapshot = catalog.successful_variants().await?;
        let ranked = ranking::rank(snapshot, &preferences, &[]);
        Ok::<_, AppError>(paging.apply(ranked))
    })?;

    tracing::info!(
        attributes = preferences.len(),
        returned = ranked.len(),
        processing_time_ms = start.elapsed().as_millis(),
        "Explicit recommendation completed"
    );

    Ok(ranked)
}

/// Recommends variants from what the user liked before
///
/// The liked variants are averaged into a preference vector and the whole
/// eligible catalog is ranked against it. Anything the user already liked or
/// disliked is dropped and at most `limit` variants are returned. Without a
/// usable like, a random sample of unswiped variants is returned instead, with
/// no matching score.
pub async fn recommend_for_user(
    catalog: &dyn CatalogStore,
    swipes: &dyn SwipeStore,
    user_id: i64,
    limit: usize,
) -> AppResult<Vec<RankedVariant>> {
    let start = Instant::now();

    // 1. Split the user's history into likes and everything seen
    let history = swipes.swipes_for_user(user_id).await?;
    let swiped: HashSet<i64> = history.iter().map(|s| s.variant_id).collect();
    let liked_ids: Vec<i64> = history
        .iter()
        .filter(|s| s.liked)
        .map(|s| s.variant_id)
        .collect();

    // 2. Derive implicit preferences
    let preferences = if liked_ids.is_empty() {
        None
    } else {
        let liked = catalog.variants_by_ids(&liked_ids).await?;
        average_preferences(&liked, &SWIPE_ATTRIBUTES)
    };

    let Some(preferences) = preferences else {
        tracing::info!(
            user_id,
            swiped = swiped.len(),
            "No usable likes, falling back to random sample"
        );
        let exclude: Vec<i64> = swiped.into_iter().collect();
        let sample = catalog.random_variants(limit, &exclude).await?;
        return Ok(sample.into_iter().map(RankedVariant::unranked).collect());
    };

    // 3. Rank the full catalog, then drop what the user has already seen
    let snapshot = catalog.successful_variants().await?;
    let ranked: Vec<RankedVariant> = ranking::rank(snapshot, &preferences, &SWIPE_ATTRIBUTES)
        .into_iter()
        .filter(|r| !swiped.contains(&r.variant.id))
        .take(limit)
        .collect();

    tracing::info!(
        user_id,
        liked = liked_ids.len(),
        swiped = swiped.len(),
        returned = ranked.len(),
        processing_time_ms = start.elapsed().as_millis(),
        "Swipe recommendation completed"
    );

    Ok(ranked)
}

/// Records a like or dislike of an existing variant
pub async fn record_swipe(
    catalog: &dyn CatalogStore,
    swipes: &dyn SwipeStore,
    user_id: i64,
    request: SwipeRequest,
) -> AppResult<Swipe> {
    if catalog.get_variant(request.variant_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Variant {} not found",
            request.variant_id
        )));
    }

    let swipe = Swipe::new(user_id, request.variant_id, request.liked);
    swipes.record_swipe(swipe.clone()).await?;

    tracing::info!(
        user_id,
        variant_id = request.variant_id,
        liked = request.liked,
        "Swipe recorded"
    );

    Ok(swipe)
}
