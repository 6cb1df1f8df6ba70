use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::collections::HashMap;

use crate::{
    db::store::{CatalogStore, SwipeStore},
    error::AppResult,
    models::{FetchState, NewVariant, Paging, ScrapedFields, Swipe, Variant},
};

const VARIANT_SELECT: &str = r#"
    SELECT v.id, b.name AS brand, v.name, v.year, v.model_year, v.cubic, v.engine,
           v.fuel, v.image, v.max_speed, v.power, v.weight, v.price, v.refrigeration,
           v.valves, v.category, v.extra, v.fetch_state, v.fetch_date
    FROM variants v
    LEFT JOIN brands b ON b.id = v.brand_id
"#;

/// Creates a PostgreSQL connection pool and applies pending migrations
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: i64,
    brand: Option<String>,
    name: String,
    year: Option<i32>,
    model_year: Option<i32>,
    cubic: Option<String>,
    engine: Option<String>,
    fuel: Option<String>,
    image: Option<String>,
    max_speed: Option<String>,
    power: Option<String>,
    weight: Option<String>,
    price: Option<f64>,
    refrigeration: Option<String>,
    valves: Option<String>,
    category: Option<String>,
    extra: Json<HashMap<String, String>>,
    fetch_state: Option<String>,
    fetch_date: Option<DateTime<Utc>>,
}

impl From<VariantRow> for Variant {
    fn from(row: VariantRow) -> Self {
        let fields = ScrapedFields {
            year: row.year,
            model_year: row.model_year,
            cubic: row.cubic,
            engine: row.engine,
            fuel: row.fuel,
            image: row.image,
            max_speed: row.max_speed,
            power: row.power,
            weight: row.weight,
            price: row.price,
            refrigeration: row.refrigeration,
            valves: row.valves,
            category: row.category,
        };

        Variant::from_stored(
            row.id,
            row.brand,
            row.name,
            fields,
            FetchState::from_column(row.fetch_state.as_deref()),
            row.fetch_date,
            row.extra.0,
        )
    }
}

/// Catalog and swipe store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgStore {
    async fn list_variants(&self, paging: Paging) -> AppResult<Vec<Variant>> {
        let (limit, offset) = match paging.limit_offset() {
            Some((limit, offset)) => (Some(limit as i64), offset as i64),
            None => (None, 0),
        };

        let sql = format!(
            "{} WHERE v.deleted_at IS NULL ORDER BY v.id LIMIT $1 OFFSET $2",
            VARIANT_SELECT
        );
        let rows = sqlx::query_as::<_, VariantRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Variant::from).collect())
    }

    async fn get_variant(&self, id: i64) -> AppResult<Option<Variant>> {
        let sql = format!("{} WHERE v.id = $1 AND v.deleted_at IS NULL", VARIANT_SELECT);
        let row = sqlx::query_as::<_, VariantRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Variant::from))
    }

    async fn variants_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Variant>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{} WHERE v.id = ANY($1) AND v.deleted_at IS NULL ORDER BY v.id",
            VARIANT_SELECT
        );
        let rows = sqlx::query_as::<_, VariantRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Variant::from).collect())
    }

    async fn successful_variants(&self) -> AppResult<Vec<Variant>> {
        let sql = format!(
            "{} WHERE v.fetch_state = $1 AND v.deleted_at IS NULL ORDER BY v.id",
            VARIANT_SELECT
        );
        let rows = sqlx::query_as::<_, VariantRow>(&sql)
            .bind(FetchState::Success.as_str())
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = rows.len(), "Loaded catalog snapshot");

        Ok(rows.into_iter().map(Variant::from).collect())
    }

    async fn random_variants(&self, limit: usize, exclude: &[i64]) -> AppResult<Vec<Variant>> {
        let sql = format!(
            "{} WHERE v.fetch_state = $1 AND v.deleted_at IS NULL AND NOT (v.id = ANY($2))
             ORDER BY random() LIMIT $3",
            VARIANT_SELECT
        );
        let rows = sqlx::query_as::<_, VariantRow>(&sql)
            .bind(FetchState::Success.as_str())
            .bind(exclude)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Variant::from).collect())
    }

    async fn insert_variant(&self, variant: NewVariant) -> AppResult<Variant> {
        let mut tx = self.pool.begin().await?;

        let brand_id: Option<i64> = match &variant.brand {
            Some(brand) => Some(
                sqlx::query_scalar(
                    r#"
                    INSERT INTO brands (name) VALUES ($1)
                    ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                    RETURNING id
                    "#,
                )
                .bind(brand)
                .fetch_one(&mut *tx)
                .await?,
            ),
            None => None,
        };

        let fields = &variant.fields;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO variants (
                brand_id, name, year, model_year, cubic, engine, fuel, image, max_speed,
                power, weight, price, refrigeration, valves, category, extra,
                fetch_state, fetch_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING id
            "#,
        )
        .bind(brand_id)
        .bind(&variant.name)
        .bind(fields.year)
        .bind(fields.model_year)
        .bind(&fields.cubic)
        .bind(&fields.engine)
        .bind(&fields.fuel)
        .bind(&fields.image)
        .bind(&fields.max_speed)
        .bind(&fields.power)
        .bind(&fields.weight)
        .bind(fields.price)
        .bind(&fields.refrigeration)
        .bind(&fields.valves)
        .bind(&fields.category)
        .bind(Json(&variant.extra))
        .bind(variant.fetch_state.as_str())
        .bind(variant.fetch_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(variant_id = id, name = %variant.name, "Variant added to catalog");

        Ok(Variant::from_stored(
            id,
            variant.brand,
            variant.name,
            variant.fields,
            variant.fetch_state,
            variant.fetch_date,
            variant.extra,
        ))
    }
}

#[async_trait::async_trait]
impl SwipeStore for PgStore {
    async fn record_swipe(&self, swipe: Swipe) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO swipes (user_id, variant_id, liked, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, variant_id)
            DO UPDATE SET liked = EXCLUDED.liked, created_at = EXCLUDED.created_at
            "#,
        )
        .bind(swipe.user_id)
        .bind(swipe.variant_id)
        .bind(swipe.liked)
        .bind(swipe.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn swipes_for_user(&self, user_id: i64) -> AppResult<Vec<Swipe>> {
        let rows: Vec<(i64, i64, bool, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT user_id, variant_id, liked, created_at
            FROM swipes
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, variant_id, liked, created_at)| Swipe {
                user_id,
                variant_id,
                liked,
                created_at,
            })
            .collect())
    }
}
