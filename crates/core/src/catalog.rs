use async_trait::async_trait;

use crate::domain::component::{Component, ComponentFilter};

/// Read-only catalog access. Implementations must never surface backend
/// errors into the engine: a failed or empty lookup is an empty list, and
/// results are ordered ascending by price.
#[async_trait]
pub trait ComponentCatalog: Send + Sync {
    async fn search(&self, filter: &ComponentFilter) -> Vec<Component>;
}

/// One step of an ordered widening chain: a filter plus a short label for
/// tracing which fallback produced the candidates.
#[derive(Clone, Debug)]
pub struct SearchStrategy {
    pub filter: ComponentFilter,
    pub description: &'static str,
}

impl SearchStrategy {
    pub fn new(filter: ComponentFilter, description: &'static str) -> Self {
        Self { filter, description }
    }
}

/// Evaluates widening strategies in order and returns the first non-empty
/// result set. The fallback order is data, not nested conditionals, so
/// callers can see and test the exact chain.
pub async fn first_non_empty<C: ComponentCatalog + ?Sized>(
    catalog: &C,
    strategies: &[SearchStrategy],
) -> Vec<Component> {
    for strategy in strategies {
        let results = catalog.search(&strategy.filter).await;
        if !results.is_empty() {
            tracing::debug!(
                strategy = strategy.description,
                count = results.len(),
                "candidate search matched"
            );
            return results;
        }
        tracing::debug!(strategy = strategy.description, "candidate search empty, widening");
    }
    Vec::new()
}

/// In-process catalog over a fixed component list. Mirrors the SQL
/// implementation's filter semantics; used by tests and by embedders that
/// already hold the component data.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    components: Vec<Component>,
}

impl StaticCatalog {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[async_trait]
impl ComponentCatalog for StaticCatalog {
    async fn search(&self, filter: &ComponentFilter) -> Vec<Component> {
        let mut results: Vec<Component> = self
            .components
            .iter()
            .filter(|component| {
                if let Some(category) = filter.category {
                    if component.category != category {
                        return false;
                    }
                }
                if let Some(brand) = &filter.brand {
                    if !component.brand.to_ascii_lowercase().contains(&brand.to_ascii_lowercase())
                    {
                        return false;
                    }
                }
                if let Some(model_query) = &filter.model_query {
                    let haystack = format!("{} {}", component.brand, component.model)
                        .to_ascii_lowercase();
                    let matched = model_query
                        .to_ascii_lowercase()
                        .split_whitespace()
                        .any(|token| haystack.contains(token));
                    if !matched {
                        return false;
                    }
                }
                if let Some(min_price) = filter.min_price {
                    if component.price < min_price {
                        return false;
                    }
                }
                if let Some(max_price) = filter.max_price {
                    if component.price > max_price {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        results.sort_by(|left, right| left.price.cmp(&right.price));
        if filter.limit > 0 {
            results.truncate(filter.limit as usize);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::component::{Category, ComponentFilter};
    use crate::testing::{component, fixture_catalog};

    use super::{first_non_empty, ComponentCatalog, SearchStrategy, StaticCatalog};

    #[tokio::test]
    async fn search_orders_ascending_and_respects_bounds() {
        let catalog = fixture_catalog();
        let filter = ComponentFilter::for_category(Category::Gpu)
            .with_price_range(Some(Decimal::from(10_000)), Some(Decimal::from(30_000)));

        let results = catalog.search(&filter).await;
        assert!(!results.is_empty());
        for window in results.windows(2) {
            assert!(window[0].price <= window[1].price);
        }
        for component in &results {
            assert!(component.price >= Decimal::from(10_000));
            assert!(component.price <= Decimal::from(30_000));
        }
    }

    #[tokio::test]
    async fn widening_falls_through_to_later_strategies() {
        let catalog = StaticCatalog::new(vec![component(
            1,
            Category::Cpu,
            "AMD",
            "Ryzen 5 5600",
            9_500,
        )]);

        let strategies = [
            SearchStrategy::new(
                ComponentFilter::for_category(Category::Cpu)
                    .with_price_range(Some(Decimal::from(50_000)), None),
                "in allocation band",
            ),
            SearchStrategy::new(
                ComponentFilter::for_category(Category::Cpu),
                "any price",
            ),
        ];

        let results = first_non_empty(&catalog, &strategies).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].model, "Ryzen 5 5600");
    }

    #[tokio::test]
    async fn exhausted_widening_chain_yields_empty() {
        let catalog = StaticCatalog::default();
        let strategies =
            [SearchStrategy::new(ComponentFilter::for_category(Category::Gpu), "any price")];

        assert!(first_non_empty(&catalog, &strategies).await.is_empty());
    }
}
