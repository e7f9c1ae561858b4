use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::allocation::BudgetAllocator;
use crate::catalog::{first_non_empty, ComponentCatalog, SearchStrategy};
use crate::compat::CompatibilityChecker;
use crate::domain::build::{total_cost, Build};
use crate::domain::component::{Category, Component, ComponentFilter, ESSENTIAL_CATEGORIES};
use crate::domain::profile::{assembler_table, PerformanceProfile, ProfileSet};

/// Upgrades cheaper than this are not worth a catalog round-trip.
const MIN_UPGRADE_STEP: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const MAX_UPGRADE_PASSES: usize = 10;

/// Budget-aware build generator: allocation-driven initial fill followed by
/// surplus redistribution and repeated upgrade passes, so the finished build
/// lands as close to the budget as the catalog allows.
pub struct GreedyAssembler {
    catalog: Arc<dyn ComponentCatalog>,
    checker: CompatibilityChecker,
    allocator: BudgetAllocator,
}

impl GreedyAssembler {
    pub fn new(catalog: Arc<dyn ComponentCatalog>) -> Self {
        Self { catalog, checker: CompatibilityChecker, allocator: BudgetAllocator }
    }

    pub async fn assemble(
        &self,
        budget: Decimal,
        profiles: &ProfileSet,
        include_peripherals: bool,
    ) -> Build {
        let allocations = self.allocator.allocate(budget, &assembler_table(profiles));

        let mut components: BTreeMap<Category, Component> = BTreeMap::new();
        for category in ESSENTIAL_CATEGORIES {
            let Some(allocation) = allocations.get(category).copied() else {
                continue;
            };
            if let Some(pick) = self.closest_to_allocation(*category, allocation).await {
                components.insert(*category, pick);
            }
        }

        let mut remaining = budget - total_cost(&components);
        if remaining > budget * Decimal::new(5, 2) {
            self.redistribute_surplus(&mut components, &allocations, remaining).await;
            remaining = budget - total_cost(&components);
        }

        if remaining >= MIN_UPGRADE_STEP {
            self.upgrade_aggressively(&mut components, remaining).await;
            remaining = budget - total_cost(&components);
        }

        if include_peripherals && remaining > Decimal::ZERO {
            self.add_peripherals(&mut components, profiles, remaining).await;
        }

        if total_cost(&components) > budget {
            self.correct_over_budget(&mut components, budget).await;
        }

        let report = self.checker.check(&components);
        Build::assess(components, budget, report)
    }

    /// Picks the candidate whose price is nearest the category's sub-budget.
    /// The band widens to "anything under the ceiling" when the preferred
    /// [0.5x, 1.2x] window comes back empty.
    async fn closest_to_allocation(
        &self,
        category: Category,
        allocation: Decimal,
    ) -> Option<Component> {
        let floor = allocation * Decimal::new(5, 1);
        let ceiling = allocation * Decimal::new(12, 1);

        let strategies = [
            SearchStrategy::new(
                ComponentFilter::for_category(category)
                    .with_price_range(Some(floor), Some(ceiling)),
                "allocation band",
            ),
            SearchStrategy::new(
                ComponentFilter::for_category(category)
                    .with_price_range(None, Some(ceiling))
                    .with_limit(30),
                "below allocation ceiling",
            ),
        ];

        let candidates = first_non_empty(self.catalog.as_ref(), &strategies).await;
        candidates.into_iter().min_by_key(|candidate| (candidate.price - allocation).abs())
    }

    /// One upgrade attempt per under-allocated category, most under-allocated
    /// first. Each category may spend up to min(surplus, its deficit).
    async fn redistribute_surplus(
        &self,
        components: &mut BTreeMap<Category, Component>,
        allocations: &BTreeMap<Category, Decimal>,
        mut remaining: Decimal,
    ) {
        let mut under_allocated: Vec<(Category, Decimal)> = components
            .iter()
            .filter_map(|(category, component)| {
                let deficit = *allocations.get(category)? - component.price;
                (deficit > Decimal::ZERO).then_some((*category, deficit))
            })
            .collect();
        under_allocated.sort_by(|left, right| right.1.cmp(&left.1));

        for (category, deficit) in under_allocated {
            if remaining < MIN_UPGRADE_STEP {
                break;
            }
            let current_price = components[&category].price;
            let target = current_price + remaining.min(deficit);
            let filter = ComponentFilter::for_category(category)
                .with_price_range(Some(current_price), Some(target * Decimal::new(12, 1)))
                .with_limit(20);
            let candidates = self.catalog.search(&filter).await;

            if let Some(upgrade) =
                self.best_affordable_upgrade(components, &candidates, current_price, remaining)
            {
                remaining -= upgrade.price - current_price;
                tracing::debug!(category = %category, price = %upgrade.price, "redistributed surplus");
                components.insert(category, upgrade);
            }
        }
    }

    /// Repeated cheapest-first upgrade passes until the surplus is spent, a
    /// pass changes nothing, or the pass cap is reached.
    async fn upgrade_aggressively(
        &self,
        components: &mut BTreeMap<Category, Component>,
        mut remaining: Decimal,
    ) {
        for pass in 0..MAX_UPGRADE_PASSES {
            if remaining < MIN_UPGRADE_STEP {
                break;
            }
            let mut changed = false;

            let mut order: Vec<Category> = components.keys().copied().collect();
            order.sort_by_key(|category| components[category].price);

            for category in order {
                if remaining < MIN_UPGRADE_STEP {
                    break;
                }
                let current_price = components[&category].price;
                let filter = ComponentFilter::for_category(category)
                    .with_price_range(
                        Some(current_price + MIN_UPGRADE_STEP),
                        Some(current_price + remaining),
                    )
                    .with_limit(30);
                let candidates = self.catalog.search(&filter).await;

                if let Some(upgrade) =
                    self.best_affordable_upgrade(components, &candidates, current_price, remaining)
                {
                    remaining -= upgrade.price - current_price;
                    tracing::debug!(
                        pass,
                        category = %category,
                        price = %upgrade.price,
                        "aggressive upgrade"
                    );
                    components.insert(category, upgrade);
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }
    }

    /// Highest-priced compatible candidate that is strictly more expensive
    /// than the current pick and fits in the remaining surplus. Candidates
    /// arrive sorted ascending, so scan from the top.
    fn best_affordable_upgrade(
        &self,
        components: &BTreeMap<Category, Component>,
        candidates: &[Component],
        current_price: Decimal,
        remaining: Decimal,
    ) -> Option<Component> {
        candidates
            .iter()
            .rev()
            .find(|candidate| {
                let step = candidate.price - current_price;
                step > Decimal::ZERO
                    && step <= remaining
                    && self.checker.check_with(components, candidate).is_compatible
            })
            .cloned()
    }

    /// Use-case extras beyond the essential list, paid for out of whatever
    /// surplus the upgrade passes left behind.
    async fn add_peripherals(
        &self,
        components: &mut BTreeMap<Category, Component>,
        profiles: &ProfileSet,
        peripheral_budget: Decimal,
    ) {
        if profiles.contains(&PerformanceProfile::Gaming) {
            let keyboard_budget = peripheral_budget * Decimal::new(6, 1);
            let mouse_budget = peripheral_budget * Decimal::new(4, 1);
            self.add_peripheral(components, Category::Keyboard, keyboard_budget).await;
            self.add_peripheral(components, Category::Mouse, mouse_budget).await;
        }
        if profiles.contains(&PerformanceProfile::Streaming) {
            self.add_peripheral(components, Category::Headphones, peripheral_budget).await;
        }
    }

    async fn add_peripheral(
        &self,
        components: &mut BTreeMap<Category, Component>,
        category: Category,
        budget: Decimal,
    ) {
        if components.contains_key(&category) {
            return;
        }
        let filter = ComponentFilter::for_category(category)
            .with_price_range(None, Some(budget))
            .with_limit(1);
        if let Some(pick) = self.catalog.search(&filter).await.into_iter().next() {
            tracing::debug!(category = %category, price = %pick.price, "added peripheral");
            components.insert(category, pick);
        }
    }

    /// Swaps the most expensive components for cheaper compatible
    /// alternatives (at most 80% of the current price) until the build fits
    /// the budget or every category has been tried.
    async fn correct_over_budget(
        &self,
        components: &mut BTreeMap<Category, Component>,
        budget: Decimal,
    ) {
        let mut by_price_desc: Vec<Category> = components.keys().copied().collect();
        by_price_desc.sort_by(|left, right| components[right].price.cmp(&components[left].price));

        let mut total = total_cost(components);
        for category in by_price_desc {
            if total <= budget {
                break;
            }
            let current_price = components[&category].price;
            let filter = ComponentFilter::for_category(category)
                .with_price_range(None, Some(current_price * Decimal::new(8, 1)))
                .with_limit(5);
            let candidates = self.catalog.search(&filter).await;

            let replacement = candidates
                .into_iter()
                .find(|candidate| self.checker.check_with(components, candidate).is_compatible);
            if let Some(replacement) = replacement {
                total -= current_price - replacement.price;
                tracing::debug!(
                    category = %category,
                    price = %replacement.price,
                    "downgraded to fit budget"
                );
                components.insert(category, replacement);
            }
        }
    }
}
