use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rust_decimal::Decimal;

use crate::allocation::BudgetAllocator;
use crate::catalog::ComponentCatalog;
use crate::compat::CompatibilityChecker;
use crate::domain::build::{total_cost, Build};
use crate::domain::component::{Category, Component, ComponentFilter, ESSENTIAL_CATEGORIES};
use crate::domain::profile::{premade_table, ProfileSet};

const MIN_UPGRADE_STEP: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const MAX_CANDIDATES_PER_CATEGORY: usize = 30;
const MAX_SEARCH_CANDIDATES: usize = 10;
const MAX_PROBES_PER_NODE: usize = 5;

/// Termination bounds for the backtracking search. Injectable so tests can
/// shrink them instead of waiting out wall-clock deadlines.
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    pub time_budget: Duration,
    pub max_iterations: u64,
    /// Stop as soon as a combination lands within this fraction of the
    /// target cost.
    pub early_exit_fraction: Decimal,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(10),
            max_iterations: 50_000,
            early_exit_fraction: Decimal::new(2, 2),
        }
    }
}

/// The ascending ladder of round budget values a user budget is quantized
/// onto before hitting the premade cache.
#[derive(Clone, Debug)]
pub struct BudgetLadder {
    tiers: Vec<Decimal>,
}

impl Default for BudgetLadder {
    fn default() -> Self {
        let tiers = [
            20_000, 25_000, 30_000, 35_000, 40_000, 45_000, 50_000, 55_000, 60_000, 65_000,
            70_000, 75_000, 80_000, 85_000, 90_000, 95_000, 100_000, 120_000, 150_000, 200_000,
        ];
        Self { tiers: tiers.into_iter().map(Decimal::from).collect() }
    }
}

impl BudgetLadder {
    pub fn new(tiers: Vec<Decimal>) -> Self {
        Self { tiers }
    }

    /// Snaps a budget to the nearest tier when it is within 10% of one;
    /// otherwise rounds to the nearest 5,000 clamped to the ladder's range.
    pub fn snap(&self, budget: Decimal) -> Decimal {
        let closest = self
            .tiers
            .iter()
            .copied()
            .min_by_key(|tier| (*tier - budget).abs())
            .unwrap_or(budget);

        if budget > Decimal::ZERO && (budget - closest).abs() / budget < Decimal::new(1, 1) {
            return closest;
        }

        let step = Decimal::from(5_000);
        let rounded = (budget / step).round() * step;
        let floor = self.tiers.first().copied().unwrap_or(rounded);
        let ceiling = self.tiers.last().copied().unwrap_or(rounded);
        rounded.clamp(floor, ceiling)
    }
}

/// Process-wide build cache keyed by (budget tier, sorted profile set).
/// Entries are computed lazily and never evicted; concurrent first access
/// may compute the same build twice. Generation is a pure function of the
/// key, so both computations produce the same entry.
#[derive(Debug, Default)]
pub struct PremadeBuildCache {
    entries: Mutex<HashMap<String, Build>>,
}

impl PremadeBuildCache {
    fn get(&self, key: &str) -> Option<Build> {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).cloned()
    }

    fn insert(&self, key: String, build: Build) {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key, build);
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(tier: Decimal, profiles: &ProfileSet) -> String {
    let mut key = tier.to_string();
    for profile in profiles {
        key.push('_');
        key.push_str(profile.as_str());
    }
    key
}

/// Premade build generator: bounded backtracking over banded candidate sets,
/// post-processed for utilization and compatibility, cached per budget tier.
pub struct PremadeGenerator {
    catalog: Arc<dyn ComponentCatalog>,
    checker: CompatibilityChecker,
    allocator: BudgetAllocator,
    ladder: BudgetLadder,
    limits: SearchLimits,
    cache: PremadeBuildCache,
}

impl PremadeGenerator {
    pub fn new(catalog: Arc<dyn ComponentCatalog>) -> Self {
        Self::with_limits(catalog, BudgetLadder::default(), SearchLimits::default())
    }

    pub fn with_limits(
        catalog: Arc<dyn ComponentCatalog>,
        ladder: BudgetLadder,
        limits: SearchLimits,
    ) -> Self {
        Self {
            catalog,
            checker: CompatibilityChecker,
            allocator: BudgetAllocator,
            ladder,
            limits,
            cache: PremadeBuildCache::default(),
        }
    }

    pub fn ladder(&self) -> &BudgetLadder {
        &self.ladder
    }

    /// Returns the cached build for the tier nearest the user's budget,
    /// generating and caching it on first access.
    pub async fn closest_premade_build(
        &self,
        user_budget: Decimal,
        profiles: &ProfileSet,
    ) -> Option<Build> {
        let tier = self.ladder.snap(user_budget);
        let key = cache_key(tier, profiles);

        if let Some(build) = self.cache.get(&key) {
            tracing::debug!(%tier, key, "premade cache hit");
            return Some(build);
        }

        let build = self.generate(tier, profiles).await?;
        self.cache.insert(key, build.clone());
        Some(build)
    }

    async fn generate(&self, target: Decimal, profiles: &ProfileSet) -> Option<Build> {
        tracing::info!(%target, "generating premade build");

        let allocations = self.allocator.allocate(target, &premade_table(profiles));
        let mut candidates: BTreeMap<Category, Vec<Component>> = BTreeMap::new();
        for category in ESSENTIAL_CATEGORIES {
            if let Some(allocation) = allocations.get(category).copied() {
                let pool = self.banded_candidates(*category, allocation).await;
                if !pool.is_empty() {
                    candidates.insert(*category, pool);
                }
            }
        }
        if candidates.is_empty() {
            tracing::warn!(%target, "no candidates in any category");
            return None;
        }

        let mut components = self.search_combination(&candidates, target)?;

        let utilization = total_cost(&components) / target * Decimal::from(100);
        if utilization < Decimal::from(90) {
            tracing::info!(%utilization, "utilization below 90%, maximizing");
            self.maximize_budget_use(&mut components, &candidates, target);
        }

        if !self.checker.check(&components).is_compatible {
            self.fix_compatibility(&mut components, &candidates, target);
        }

        let report = self.checker.check(&components);
        let build = Build::assess(components, target, report);
        tracing::info!(
            components = build.components.len(),
            total = %build.total_cost,
            utilization = %build.budget_utilization,
            "premade build generated"
        );
        Some(build)
    }

    /// Collects candidates from five descending price bands of the
    /// category's allocation until 30 unique components are found, then
    /// keeps the 30 most expensive.
    async fn banded_candidates(&self, category: Category, allocation: Decimal) -> Vec<Component> {
        const BANDS: [(i64, i64); 5] = [(95, 100), (80, 95), (65, 80), (50, 65), (30, 50)];

        let mut candidates: Vec<Component> = Vec::new();
        for (low, high) in BANDS {
            let filter = ComponentFilter::for_category(category)
                .with_price_range(
                    Some(allocation * Decimal::new(low, 2)),
                    Some(allocation * Decimal::new(high, 2)),
                )
                .with_limit(10);
            for found in self.catalog.search(&filter).await {
                if !candidates.iter().any(|existing| existing.id == found.id) {
                    candidates.push(found);
                }
            }
            if candidates.len() >= MAX_CANDIDATES_PER_CATEGORY {
                break;
            }
        }

        candidates.sort_by(|left, right| right.price.cmp(&left.price));
        candidates.truncate(MAX_CANDIDATES_PER_CATEGORY);
        candidates
    }

    /// Bounded backtracking over categories in a fixed order. Per node the
    /// ten candidates closest to a pro-rata share of the target are kept
    /// and at most five are descended into.
    fn search_combination(
        &self,
        candidates: &BTreeMap<Category, Vec<Component>>,
        target: Decimal,
    ) -> Option<BTreeMap<Category, Component>> {
        let categories: Vec<Category> = candidates.keys().copied().collect();
        let share = target / Decimal::from(categories.len().max(1) as i64);

        let mut limited: BTreeMap<Category, Vec<Component>> = BTreeMap::new();
        for (category, pool) in candidates {
            let mut pool = pool.clone();
            pool.sort_by_key(|candidate| (candidate.price - share).abs());
            pool.truncate(MAX_SEARCH_CANDIDATES);
            limited.insert(*category, pool);
        }

        let mut state = SearchState {
            checker: &self.checker,
            categories: &categories,
            candidates: &limited,
            target,
            ceiling: target,
            limits: &self.limits,
            started: Instant::now(),
            iterations: 0,
            best: None,
            best_diff: Decimal::MAX,
        };

        let mut current = BTreeMap::new();
        state.backtrack(&mut current, Decimal::ZERO, 0);

        tracing::debug!(
            iterations = state.iterations,
            elapsed_ms = state.started.elapsed().as_millis() as u64,
            found = state.best.is_some(),
            "combination search finished"
        );
        state.best
    }

    /// Up to five cheapest-first upgrade rounds over the banded candidate
    /// pools, followed by one headroom-ordered round if budget is still
    /// idle.
    fn maximize_budget_use(
        &self,
        components: &mut BTreeMap<Category, Component>,
        candidates: &BTreeMap<Category, Vec<Component>>,
        budget: Decimal,
    ) {
        let mut remaining = budget - total_cost(components);
        if remaining < budget * Decimal::new(1, 2) {
            return;
        }

        for _ in 0..5 {
            if remaining < budget * Decimal::new(5, 3) {
                break;
            }
            let mut upgraded = false;

            let mut order: Vec<Category> = components.keys().copied().collect();
            order.sort_by_key(|category| components[category].price);

            for category in order {
                if remaining < Decimal::from(100) {
                    break;
                }
                let Some(pool) = candidates.get(&category) else {
                    continue;
                };
                let current_price = components[&category].price;
                if let Some(upgrade) =
                    self.best_pool_upgrade(components, pool, current_price, remaining)
                {
                    remaining -= upgrade.price - current_price;
                    components.insert(category, upgrade);
                    upgraded = true;
                }
            }

            if !upgraded {
                break;
            }
        }

        if remaining > budget * Decimal::new(1, 2) {
            self.upgrade_by_headroom(components, candidates, remaining);
        }
    }

    /// One more round, visiting the categories with the priciest candidate
    /// pools first since that is where leftover budget buys the most.
    fn upgrade_by_headroom(
        &self,
        components: &mut BTreeMap<Category, Component>,
        candidates: &BTreeMap<Category, Vec<Component>>,
        mut remaining: Decimal,
    ) {
        let mut order: Vec<Category> = components.keys().copied().collect();
        order.sort_by_key(|category| {
            let ceiling = candidates
                .get(category)
                .and_then(|pool| pool.iter().map(|candidate| candidate.price).max())
                .unwrap_or(Decimal::ZERO);
            std::cmp::Reverse(ceiling)
        });

        for category in order {
            if remaining < MIN_UPGRADE_STEP {
                break;
            }
            let Some(pool) = candidates.get(&category) else {
                continue;
            };
            let current_price = components[&category].price;
            if let Some(upgrade) = self.best_pool_upgrade(components, pool, current_price, remaining)
            {
                remaining -= upgrade.price - current_price;
                components.insert(category, upgrade);
            }
        }
    }

    /// Highest-priced compatible upgrade from a banded pool (sorted
    /// descending) that fits in the remaining budget.
    fn best_pool_upgrade(
        &self,
        components: &BTreeMap<Category, Component>,
        pool: &[Component],
        current_price: Decimal,
        remaining: Decimal,
    ) -> Option<Component> {
        pool.iter()
            .find(|candidate| {
                let step = candidate.price - current_price;
                step > Decimal::ZERO
                    && step <= remaining
                    && self.checker.check_with(components, candidate).is_compatible
            })
            .cloned()
    }

    /// Replaces one flagged component with the first candidate that makes
    /// the whole build compatible without blowing the budget.
    fn fix_compatibility(
        &self,
        components: &mut BTreeMap<Category, Component>,
        candidates: &BTreeMap<Category, Vec<Component>>,
        budget: Decimal,
    ) {
        let categories: Vec<Category> = components.keys().copied().collect();
        for category in categories {
            let Some(pool) = candidates.get(&category) else {
                continue;
            };
            for candidate in pool {
                if !self.checker.check_with(components, candidate).is_compatible {
                    continue;
                }
                let new_total =
                    total_cost(components) - components[&category].price + candidate.price;
                if new_total <= budget {
                    tracing::info!(category = %category, "replaced component to restore compatibility");
                    components.insert(category, candidate.clone());
                    return;
                }
            }
        }
        tracing::warn!("compatibility repair found no viable replacement");
    }
}

struct SearchState<'a> {
    checker: &'a CompatibilityChecker,
    categories: &'a [Category],
    candidates: &'a BTreeMap<Category, Vec<Component>>,
    target: Decimal,
    ceiling: Decimal,
    limits: &'a SearchLimits,
    started: Instant,
    iterations: u64,
    best: Option<BTreeMap<Category, Component>>,
    best_diff: Decimal,
}

impl SearchState<'_> {
    /// Returns true when the search should stop entirely (deadline,
    /// iteration cap, or a combination close enough to the target).
    fn backtrack(
        &mut self,
        current: &mut BTreeMap<Category, Component>,
        total: Decimal,
        depth: usize,
    ) -> bool {
        self.iterations += 1;
        if self.started.elapsed() > self.limits.time_budget {
            tracing::warn!("combination search hit its time budget");
            return true;
        }
        if self.iterations > self.limits.max_iterations {
            tracing::warn!("combination search hit its iteration cap");
            return true;
        }

        if depth == self.categories.len() {
            let diff = (total - self.target).abs();
            if diff < self.best_diff && total <= self.ceiling {
                self.best_diff = diff;
                self.best = Some(current.clone());
                if diff < self.target * self.limits.early_exit_fraction {
                    return true;
                }
            }
            return false;
        }

        if total >= self.ceiling {
            return false;
        }

        let category = self.categories[depth];
        let Some(pool) = self.candidates.get(&category).filter(|pool| !pool.is_empty()) else {
            return self.backtrack(current, total, depth + 1);
        };

        let mut probed = 0;
        for candidate in pool {
            if probed >= MAX_PROBES_PER_NODE {
                break;
            }
            if total + candidate.price > self.ceiling {
                continue;
            }
            if !self.checker.check_with(current, candidate).is_compatible {
                continue;
            }

            current.insert(category, candidate.clone());
            let stop = self.backtrack(current, total + candidate.price, depth + 1);
            current.remove(&category);
            if stop {
                return true;
            }
            probed += 1;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rust_decimal::Decimal;

    use crate::catalog::StaticCatalog;
    use crate::domain::profile::{PerformanceProfile, ProfileSet};
    use crate::testing::fixture_catalog;

    use super::{BudgetLadder, PremadeGenerator, SearchLimits};

    fn gaming() -> ProfileSet {
        [PerformanceProfile::Gaming].into_iter().collect()
    }

    #[test]
    fn budget_within_ten_percent_snaps_to_tier() {
        let ladder = BudgetLadder::default();
        assert_eq!(ladder.snap(Decimal::from(21_000)), Decimal::from(20_000));
        assert_eq!(ladder.snap(Decimal::from(50_000)), Decimal::from(50_000));
    }

    #[test]
    fn budget_outside_tolerance_rounds_to_five_thousand() {
        let ladder = BudgetLadder::default();
        assert_eq!(ladder.snap(Decimal::from(37_000)), Decimal::from(35_000));
    }

    #[test]
    fn snapping_clamps_to_ladder_bounds() {
        let ladder = BudgetLadder::default();
        assert_eq!(ladder.snap(Decimal::from(4_000)), Decimal::from(20_000));
        assert_eq!(ladder.snap(Decimal::from(900_000)), Decimal::from(200_000));
    }

    #[tokio::test]
    async fn premade_build_is_compatible_and_within_tier() {
        let generator = PremadeGenerator::new(Arc::new(fixture_catalog()));
        let build = generator
            .closest_premade_build(Decimal::from(50_000), &gaming())
            .await
            .expect("fixture catalog supports a 50k gaming build");

        assert!(build.total_cost <= Decimal::from(50_000));
        assert!(build.is_compatible, "issues: {:?}", build.compatibility_issues);
        assert!(!build.components.is_empty());
    }

    #[tokio::test]
    async fn repeated_requests_return_the_cached_build() {
        let generator = PremadeGenerator::new(Arc::new(fixture_catalog()));

        let first = generator
            .closest_premade_build(Decimal::from(50_000), &gaming())
            .await
            .expect("first generation succeeds");
        let second = generator
            .closest_premade_build(Decimal::from(50_000), &gaming())
            .await
            .expect("cache hit succeeds");

        assert_eq!(first, second);
        assert_eq!(generator.cache.len(), 1);

        // A budget that snaps to the same tier reuses the entry.
        let snapped = generator
            .closest_premade_build(Decimal::from(51_000), &gaming())
            .await
            .expect("snapped budget hits the same tier");
        assert_eq!(first, snapped);
        assert_eq!(generator.cache.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_iteration_cap_still_returns_best_found() {
        let limits = SearchLimits {
            time_budget: Duration::from_secs(10),
            max_iterations: 3,
            early_exit_fraction: Decimal::new(2, 2),
        };
        let generator = PremadeGenerator::with_limits(
            Arc::new(fixture_catalog()),
            BudgetLadder::default(),
            limits,
        );

        // With only three iterations the search cannot complete a full
        // combination, so generation reports no build rather than hanging.
        let build = generator.closest_premade_build(Decimal::from(50_000), &gaming()).await;
        assert!(build.is_none());
    }

    #[tokio::test]
    async fn exhausted_time_budget_terminates_without_a_build() {
        let limits = SearchLimits {
            time_budget: Duration::ZERO,
            max_iterations: 50_000,
            early_exit_fraction: Decimal::new(2, 2),
        };
        let generator = PremadeGenerator::with_limits(
            Arc::new(fixture_catalog()),
            BudgetLadder::default(),
            limits,
        );

        // An already-expired deadline stops the search at its first step,
        // so generation reports no build instead of exploring combinations.
        let build = generator.closest_premade_build(Decimal::from(50_000), &gaming()).await;
        assert!(build.is_none());
    }

    #[tokio::test]
    async fn empty_catalog_produces_no_premade_build() {
        let generator = PremadeGenerator::new(Arc::new(StaticCatalog::default()));
        assert!(generator.closest_premade_build(Decimal::from(50_000), &gaming()).await.is_none());
    }
}
