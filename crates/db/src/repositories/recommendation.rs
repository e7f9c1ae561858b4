use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Row;

use rigforge_core::{
    Category, Component, ComponentId, PreviousBuild, RecommendationStore, Recommendations,
};

use super::RepositoryError;
use crate::DbPool;

/// Persists generated recommendations per conversation thread and reads the
/// most recent one back as an upgrade baseline.
pub struct SqlRecommendationStore {
    pool: DbPool,
}

impl SqlRecommendationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Writes one recommendation row plus a component row per tier entry.
    /// Returns the new recommendation id.
    pub async fn save_recommendations(
        &self,
        thread_id: i64,
        query: &str,
        recommendations: &Recommendations,
    ) -> Result<i64, RepositoryError> {
        let user_budget = recommendations
            .budget_analysis
            .as_ref()
            .map(|analysis| analysis.user_budget.to_string());

        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO recommendations (thread_id, query, user_budget) VALUES (?1, ?2, ?3)",
        )
        .bind(thread_id)
        .bind(query)
        .bind(user_budget)
        .execute(&mut *tx)
        .await?;
        let recommendation_id = inserted.last_insert_rowid();

        for (tier, build) in &recommendations.builds {
            for component in build.components.values() {
                sqlx::query(
                    "INSERT INTO recommendation_components \
                     (recommendation_id, tier, component_type, brand, model, price, currency) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .bind(recommendation_id)
                .bind(tier.as_str())
                .bind(component.category.as_str())
                .bind(&component.brand)
                .bind(&component.model)
                .bind(component.price.to_string())
                .bind(&component.currency)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(recommendation_id)
    }

    async fn load_latest(&self, thread_id: i64) -> Result<Option<PreviousBuild>, RepositoryError> {
        let Some(head) = sqlx::query(
            "SELECT id, user_budget FROM recommendations \
             WHERE thread_id = ?1 ORDER BY id DESC LIMIT 1",
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };
        let recommendation_id: i64 = head.try_get("id")?;
        let budget = head
            .try_get::<Option<String>, _>("user_budget")?
            .and_then(|raw| Decimal::from_str(&raw).ok());

        let rows = sqlx::query(
            "SELECT tier, component_type, brand, model, price, currency \
             FROM recommendation_components WHERE recommendation_id = ?1 ORDER BY id ASC",
        )
        .bind(recommendation_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_tier: BTreeMap<String, BTreeMap<Category, Component>> = BTreeMap::new();
        for row in rows {
            let tier: String = row.try_get("tier")?;

            let raw_category: String = row.try_get("component_type")?;
            let Some(category) = Category::parse(&raw_category) else {
                return Err(RepositoryError::Decode(format!(
                    "unknown component type {raw_category}"
                )));
            };
            let raw_price: String = row.try_get("price")?;
            let price = Decimal::from_str(&raw_price).map_err(|error| {
                RepositoryError::Decode(format!("bad price {raw_price}: {error}"))
            })?;

            // Persisted rows carry no catalog identity.
            by_tier.entry(tier).or_default().insert(
                category,
                Component {
                    id: ComponentId(0),
                    category,
                    brand: row.try_get("brand")?,
                    model: row.try_get("model")?,
                    price,
                    currency: row.try_get("currency")?,
                    image_url: None,
                    source_url: None,
                    last_updated: None,
                },
            );
        }

        // The balanced tier is the headline recommendation; fall back to
        // whichever tier sorts first when it is absent.
        let components =
            by_tier.remove("balanced").or_else(|| by_tier.into_values().next());
        Ok(components
            .filter(|components| !components.is_empty())
            .map(|components| PreviousBuild { components, budget }))
    }
}

#[async_trait]
impl RecommendationStore for SqlRecommendationStore {
    async fn latest_build(&self, thread_id: i64) -> Option<PreviousBuild> {
        match self.load_latest(thread_id).await {
            Ok(build) => build,
            Err(error) => {
                tracing::warn!(%error, thread_id, "failed to load previous recommendation");
                None
            }
        }
    }
}
