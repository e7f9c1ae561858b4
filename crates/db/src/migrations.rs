use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::{connect_with_settings, migrations::MIGRATOR};

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "components",
        "recommendations",
        "recommendation_components",
        "idx_components_component_type",
        "idx_components_brand",
        "idx_recommendations_thread_id",
        "idx_recommendation_components_recommendation_id",
    ];

    async fn schema_object_count(pool: &sqlx::SqlitePool) -> usize {
        sqlx::query("SELECT name FROM sqlite_master WHERE type IN ('table', 'index')")
            .fetch_all(pool)
            .await
            .expect("load schema objects")
            .into_iter()
            .filter(|row| MANAGED_SCHEMA_OBJECTS.contains(&row.get::<String, _>("name").as_str()))
            .count()
    }

    #[tokio::test]
    async fn migrations_create_catalog_and_recommendation_tables() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        assert_eq!(schema_object_count(&pool).await, MANAGED_SCHEMA_OBJECTS.len());
    }

    #[tokio::test]
    async fn migrations_are_reversible() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");
        assert_eq!(schema_object_count(&pool).await, 0);

        run_pending(&pool).await.expect("re-run migrations");
        assert_eq!(schema_object_count(&pool).await, MANAGED_SCHEMA_OBJECTS.len());
    }
}
