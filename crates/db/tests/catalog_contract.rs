use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;

use rigforge_core::{
    Build, BudgetAnalysis, BuildTier, Category, CompatibilityReport, Component, ComponentCatalog,
    ComponentFilter, ComponentId, RecommendationStore, Recommendations,
};
use rigforge_db::{
    connect_with_settings, migrations, remove_seed_components, seed_components, DbPool,
    SqlComponentCatalog, SqlRecommendationStore, SEED_COMPONENTS,
};

async fn prepared_pool() -> DbPool {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("run migrations");
    seed_components(&pool).await.expect("seed catalog");
    pool
}

fn component(category: Category, brand: &str, model: &str, price: i64) -> Component {
    Component {
        id: ComponentId(0),
        category,
        brand: brand.to_string(),
        model: model.to_string(),
        price: Decimal::from(price),
        currency: "PHP".to_string(),
        image_url: None,
        source_url: None,
        last_updated: Some(Utc::now()),
    }
}

#[tokio::test]
async fn category_search_is_price_ordered_within_bounds() {
    let catalog = SqlComponentCatalog::new(prepared_pool().await);
    let filter = ComponentFilter::for_category(Category::Gpu)
        .with_price_range(Some(Decimal::from(10_000)), Some(Decimal::from(30_000)))
        .with_limit(3);

    let results = catalog.search(&filter).await;

    assert_eq!(results.len(), 3);
    for window in results.windows(2) {
        assert!(window[0].price <= window[1].price);
    }
    for gpu in &results {
        assert_eq!(gpu.category, Category::Gpu);
        assert!(gpu.price >= Decimal::from(10_000));
        assert!(gpu.price <= Decimal::from(30_000));
    }
}

#[tokio::test]
async fn brand_filter_matches_case_insensitively() {
    let catalog = SqlComponentCatalog::new(prepared_pool().await);
    let mut filter = ComponentFilter::for_category(Category::Motherboard);
    filter.brand = Some("msi".to_string());

    let results = catalog.search(&filter).await;

    assert!(!results.is_empty());
    assert!(results.iter().all(|board| board.brand == "MSI"));
}

#[tokio::test]
async fn model_query_matches_any_token() {
    let catalog = SqlComponentCatalog::new(prepared_pool().await);
    let mut filter = ComponentFilter::for_category(Category::Gpu);
    filter.model_query = Some("4060 stormx".to_string());

    let results = catalog.search(&filter).await;

    assert!(results.iter().any(|gpu| gpu.model.contains("4060")));
}

#[tokio::test]
async fn backend_failure_degrades_to_empty_results() {
    let pool = prepared_pool().await;
    sqlx::query("DROP TABLE components").execute(&pool).await.expect("drop table");

    let catalog = SqlComponentCatalog::new(pool);
    let results = catalog.search(&ComponentFilter::for_category(Category::Cpu)).await;

    assert!(results.is_empty());
}

#[tokio::test]
async fn seeding_twice_inserts_nothing_new() {
    let pool = prepared_pool().await;
    let second_pass = seed_components(&pool).await.expect("re-seed");
    assert_eq!(second_pass, 0);
}

#[tokio::test]
async fn removing_seeds_leaves_other_catalog_rows_alone() {
    let pool = prepared_pool().await;
    sqlx::query(
        "INSERT INTO components (component_type, brand, model, price) \
         VALUES ('gpu', 'Zotac', 'RTX 3060 Twin Edge', '17500')",
    )
    .execute(&pool)
    .await
    .expect("insert non-seed row");

    let removed = remove_seed_components(&pool).await.expect("remove seeds");
    assert_eq!(removed, SEED_COMPONENTS.len() as u64);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM components")
        .fetch_one(&pool)
        .await
        .expect("count remaining rows");
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn saved_recommendation_round_trips_as_upgrade_baseline() {
    let pool = prepared_pool().await;
    let store = SqlRecommendationStore::new(pool);

    let mut components = BTreeMap::new();
    components.insert(Category::Cpu, component(Category::Cpu, "AMD", "Ryzen 5 5600", 8_300));
    components.insert(Category::Gpu, component(Category::Gpu, "Palit", "RTX 4060 StormX 8GB", 18_900));
    let balanced =
        Build::assess(components, Decimal::from(50_000), CompatibilityReport::default());

    let mut builds = BTreeMap::new();
    builds.insert(BuildTier::Balanced, balanced);
    let recommendations = Recommendations {
        builds,
        budget_analysis: Some(BudgetAnalysis {
            user_budget: Decimal::from(50_000),
            min_required: Decimal::from(25_000),
            is_feasible: true,
            message: "Budget is sufficient for a basic build".to_string(),
        }),
        minimum_build: None,
    };

    store
        .save_recommendations(42, "gaming pc under 50000", &recommendations)
        .await
        .expect("save recommendations");

    let previous = store.latest_build(42).await.expect("previous build present");
    assert_eq!(previous.budget, Some(Decimal::from(50_000)));
    assert_eq!(previous.components.len(), 2);
    assert_eq!(previous.components[&Category::Gpu].price, Decimal::from(18_900));
}

#[tokio::test]
async fn unknown_thread_has_no_previous_build() {
    let pool = prepared_pool().await;
    let store = SqlRecommendationStore::new(pool);

    assert!(store.latest_build(7).await.is_none());
}
