use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use rigforge_core::{Category, Component, ComponentCatalog, ComponentFilter, ComponentId};

use super::RepositoryError;
use crate::DbPool;

/// SQLite-backed catalog. Filter semantics mirror the in-process catalog:
/// brand and model matches are case-insensitive substring tests, results
/// come back ascending by price, and any backend failure degrades to an
/// empty result set.
pub struct SqlComponentCatalog {
    pool: DbPool,
}

impl SqlComponentCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, filter: &ComponentFilter) -> Result<Vec<Component>, RepositoryError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, component_type, brand, model, price, currency, image_url, source_url, \
             last_updated FROM components WHERE 1 = 1",
        );

        if let Some(category) = filter.category {
            builder.push(" AND component_type = ").push_bind(category.as_str());
        }
        if let Some(brand) = &filter.brand {
            builder.push(" AND brand LIKE ").push_bind(format!("%{brand}%"));
        }
        if let Some(model_query) = &filter.model_query {
            let tokens: Vec<&str> = model_query.split_whitespace().collect();
            if !tokens.is_empty() {
                builder.push(" AND (");
                let mut clauses = builder.separated(" OR ");
                for token in tokens {
                    clauses
                        .push("(brand || ' ' || model) LIKE ")
                        .push_bind_unseparated(format!("%{token}%"));
                }
                builder.push(")");
            }
        }
        if let Some(min_price) = filter.min_price.and_then(|price| price.to_f64()) {
            builder.push(" AND CAST(price AS REAL) >= ").push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price.and_then(|price| price.to_f64()) {
            builder.push(" AND CAST(price AS REAL) <= ").push_bind(max_price);
        }

        builder.push(" ORDER BY CAST(price AS REAL) ASC, id ASC");
        if filter.limit > 0 {
            builder.push(" LIMIT ").push_bind(i64::from(filter.limit));
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(decode_component).collect()
    }
}

#[async_trait]
impl ComponentCatalog for SqlComponentCatalog {
    async fn search(&self, filter: &ComponentFilter) -> Vec<Component> {
        match self.fetch(filter).await {
            Ok(components) => components,
            Err(error) => {
                tracing::warn!(%error, ?filter, "component search failed");
                Vec::new()
            }
        }
    }
}

fn decode_component(row: &SqliteRow) -> Result<Component, RepositoryError> {
    let raw_category: String = row.try_get("component_type")?;
    let category = Category::parse(&raw_category)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown component type {raw_category}")))?;

    let raw_price: String = row.try_get("price")?;
    let price = Decimal::from_str(&raw_price)
        .map_err(|error| RepositoryError::Decode(format!("bad price {raw_price}: {error}")))?;

    let last_updated = row
        .try_get::<Option<String>, _>("last_updated")?
        .and_then(|stamp| DateTime::parse_from_rfc3339(&stamp).ok())
        .map(|stamp| stamp.with_timezone(&Utc));

    Ok(Component {
        id: ComponentId(row.try_get("id")?),
        category,
        brand: row.try_get("brand")?,
        model: row.try_get("model")?,
        price,
        currency: row.try_get("currency")?,
        image_url: row.try_get("image_url")?,
        source_url: row.try_get("source_url")?,
        last_updated,
    })
}
