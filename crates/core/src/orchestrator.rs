use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::BudgetAllocator;
use crate::assembler::GreedyAssembler;
use crate::catalog::{ComponentCatalog, SearchStrategy};
use crate::compat::CompatibilityChecker;
use crate::domain::build::Build;
use crate::domain::component::{Category, Component, ComponentFilter};
use crate::domain::profile::{floor_table, PerformanceProfile, ProfileSet};
use crate::domain::query::ParsedQuery;
use crate::premade::PremadeGenerator;

/// Budgets at or above this get a premium variant alongside budget/balanced.
const PREMIUM_THRESHOLD: Decimal = Decimal::from_parts(40_000, 0, 0, false, 0);
const PREMIUM_HEADROOM: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Tier budgets used when the query carries no budget at all.
const DEFAULT_TIER_BUDGETS: [(BuildTier, i64); 3] = [
    (BuildTier::Budget, 30_000),
    (BuildTier::Balanced, 50_000),
    (BuildTier::Premium, 75_000),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTier {
    Budget,
    Balanced,
    Premium,
}

impl BuildTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Balanced => "balanced",
            Self::Premium => "premium",
        }
    }
}

impl std::fmt::Display for BuildTier {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Feasibility verdict for a requested budget against the profile floor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetAnalysis {
    pub user_budget: Decimal,
    pub min_required: Decimal,
    pub is_feasible: bool,
    pub message: String,
}

/// Everything the orchestrator produces for one query: up to three tiered
/// builds, the feasibility analysis, and a cheapest-feasible fallback when
/// the budget is below the floor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub builds: BTreeMap<BuildTier, Build>,
    pub budget_analysis: Option<BudgetAnalysis>,
    pub minimum_build: Option<Build>,
}

/// Decides feasibility and fans a query out into budget/balanced/premium
/// variants, falling back from premade generation to direct greedy assembly
/// and finally to a cheapest-feasible build.
pub struct TierOrchestrator {
    catalog: Arc<dyn ComponentCatalog>,
    checker: CompatibilityChecker,
    allocator: BudgetAllocator,
    assembler: GreedyAssembler,
    premade: PremadeGenerator,
}

impl TierOrchestrator {
    pub fn new(catalog: Arc<dyn ComponentCatalog>) -> Self {
        Self {
            checker: CompatibilityChecker,
            allocator: BudgetAllocator,
            assembler: GreedyAssembler::new(catalog.clone()),
            premade: PremadeGenerator::new(catalog.clone()),
            catalog,
        }
    }

    /// Builds an orchestrator around an existing premade generator, keeping
    /// its cache and search limits.
    pub fn with_premade(catalog: Arc<dyn ComponentCatalog>, premade: PremadeGenerator) -> Self {
        Self {
            checker: CompatibilityChecker,
            allocator: BudgetAllocator,
            assembler: GreedyAssembler::new(catalog.clone()),
            premade,
            catalog,
        }
    }

    pub async fn recommend(&self, query: &ParsedQuery) -> Recommendations {
        let profiles = &query.performance_needs;

        let Some(budget) = query.max_budget() else {
            return self.default_tiers(profiles).await;
        };

        let min_required = minimum_feasible_budget(profiles);
        if budget < min_required {
            let profile_name =
                profiles.iter().next().map(PerformanceProfile::as_str).unwrap_or("general");
            tracing::info!(%budget, %min_required, "budget below profile floor");
            return Recommendations {
                builds: BTreeMap::new(),
                budget_analysis: Some(BudgetAnalysis {
                    user_budget: budget,
                    min_required,
                    is_feasible: false,
                    message: format!(
                        "A proper {profile_name} PC build starts at around \u{20b1}{min_required}"
                    ),
                }),
                minimum_build: Some(self.cheapest_feasible(profiles).await),
            };
        }

        let mut builds = BTreeMap::new();

        let budget_target = budget * Decimal::new(7, 1);
        if let Some(build) = self.premade.closest_premade_build(budget_target, profiles).await {
            builds.insert(BuildTier::Budget, build);
        } else {
            tracing::warn!(target = %budget_target, "budget tier generation failed");
        }

        if let Some(build) = self.premade.closest_premade_build(budget, profiles).await {
            builds.insert(BuildTier::Balanced, build);
        } else {
            tracing::warn!(target = %budget, "balanced tier generation failed");
        }

        if budget >= PREMIUM_THRESHOLD {
            let premium_target = (budget * Decimal::new(115, 2)).min(budget + PREMIUM_HEADROOM);
            if let Some(build) = self.premade.closest_premade_build(premium_target, profiles).await
            {
                builds.insert(BuildTier::Premium, build);
            } else {
                tracing::warn!(target = %premium_target, "premium tier generation failed");
            }
        }

        // Last resort before giving up on tiers entirely: one direct greedy
        // pass at the full budget.
        if !builds.contains_key(&BuildTier::Budget) && !builds.contains_key(&BuildTier::Balanced) {
            tracing::warn!("all premade tiers failed, falling back to direct assembly");
            let direct = self
                .assembler
                .assemble(budget, profiles, query.should_generate_complete_build)
                .await;
            if !direct.is_empty() {
                builds.insert(BuildTier::Balanced, direct);
            }
        }

        Recommendations {
            builds,
            budget_analysis: Some(BudgetAnalysis {
                user_budget: budget,
                min_required,
                is_feasible: true,
                message: "Budget is sufficient for a basic build".to_string(),
            }),
            minimum_build: None,
        }
    }

    async fn default_tiers(&self, profiles: &ProfileSet) -> Recommendations {
        let mut builds = BTreeMap::new();
        for (tier, budget) in DEFAULT_TIER_BUDGETS {
            if let Some(build) =
                self.premade.closest_premade_build(Decimal::from(budget), profiles).await
            {
                builds.insert(tier, build);
            }
        }
        Recommendations { builds, budget_analysis: None, minimum_build: None }
    }

    /// The cheapest build that still honors the profile's spending shape:
    /// median-priced pick per floor-table category, cheapest available as
    /// fallback.
    async fn cheapest_feasible(&self, profiles: &ProfileSet) -> Build {
        let min_budget = minimum_feasible_budget(profiles);
        let allocations = self.allocator.allocate(min_budget, &floor_table(profiles));

        let mut components: BTreeMap<Category, Component> = BTreeMap::new();
        for (category, allocation) in allocations {
            let strategies = [
                SearchStrategy::new(
                    ComponentFilter::for_category(category)
                        .with_price_range(None, Some(allocation * Decimal::new(12, 1)))
                        .with_limit(10),
                    "below allocation ceiling",
                ),
                SearchStrategy::new(
                    ComponentFilter::for_category(category).with_limit(1),
                    "cheapest available",
                ),
            ];

            let candidates =
                crate::catalog::first_non_empty(self.catalog.as_ref(), &strategies).await;
            let pick = if candidates.len() >= 3 {
                candidates.get(candidates.len() / 2).cloned()
            } else {
                candidates.into_iter().next()
            };
            if let Some(pick) = pick {
                components.insert(category, pick);
            }
        }

        let report = self.checker.check(&components);
        Build::assess(components, min_budget, report)
    }
}

/// Highest floor across the requested profiles; `general` when none given.
pub fn minimum_feasible_budget(profiles: &ProfileSet) -> Decimal {
    let floor = profiles.iter().map(|profile| profile_floor(*profile)).max().unwrap_or(18_000);
    Decimal::from(floor)
}

fn profile_floor(profile: PerformanceProfile) -> i64 {
    match profile {
        PerformanceProfile::Gaming => 25_000,
        PerformanceProfile::Professional => 35_000,
        PerformanceProfile::Productivity => 20_000,
        PerformanceProfile::Streaming => 30_000,
        PerformanceProfile::General => 18_000,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use crate::domain::profile::{PerformanceProfile, ProfileSet};
    use crate::domain::query::{Intent, ParsedQuery, PriceConstraints};
    use crate::testing::fixture_catalog;

    use super::{minimum_feasible_budget, BuildTier, TierOrchestrator};

    fn build_query(max_price: Option<Decimal>, profiles: &[PerformanceProfile]) -> ParsedQuery {
        ParsedQuery {
            original_query: "build me a pc".to_string(),
            performance_needs: profiles.iter().copied().collect(),
            price_constraints: PriceConstraints { min_price: None, max_price },
            component_type: None,
            brand: None,
            model_keywords: Vec::new(),
            intent: Intent::Build,
            should_generate_complete_build: true,
            upgrade_targets: Vec::new(),
        }
    }

    #[test]
    fn floor_is_the_max_over_requested_profiles() {
        let profiles: ProfileSet =
            [PerformanceProfile::Gaming, PerformanceProfile::Professional].into_iter().collect();
        assert_eq!(minimum_feasible_budget(&profiles), Decimal::from(35_000));
        assert_eq!(minimum_feasible_budget(&ProfileSet::new()), Decimal::from(18_000));
    }

    #[tokio::test]
    async fn budget_below_floor_reports_infeasible_with_fallback_build() {
        let orchestrator = TierOrchestrator::new(Arc::new(fixture_catalog()));
        let query = build_query(Some(Decimal::from(10_000)), &[PerformanceProfile::Gaming]);

        let recommendations = orchestrator.recommend(&query).await;

        let analysis = recommendations.budget_analysis.expect("analysis present");
        assert!(!analysis.is_feasible);
        assert_eq!(analysis.min_required, Decimal::from(25_000));
        assert!(analysis.message.contains("25000"));

        assert!(recommendations.builds.is_empty());
        let minimum = recommendations.minimum_build.expect("fallback build present");
        assert!(!minimum.is_empty());
        assert!(minimum.components.len() >= 5);
    }

    #[tokio::test]
    async fn feasible_budget_produces_three_tiers() {
        let orchestrator = TierOrchestrator::new(Arc::new(fixture_catalog()));
        let query = build_query(Some(Decimal::from(50_000)), &[PerformanceProfile::Gaming]);

        let recommendations = orchestrator.recommend(&query).await;

        let analysis = recommendations.budget_analysis.expect("analysis present");
        assert!(analysis.is_feasible);

        for tier in [BuildTier::Budget, BuildTier::Balanced, BuildTier::Premium] {
            let build = recommendations.builds.get(&tier).unwrap_or_else(|| panic!("{tier} tier"));
            assert!(!build.is_empty(), "{tier} tier is empty");
            assert!(build.total_cost <= build.target_budget, "{tier} over its tier budget");
        }

        // 0.70 x 50k snaps straight onto the 35k ladder tier.
        assert_eq!(
            recommendations.builds[&BuildTier::Budget].target_budget,
            Decimal::from(35_000)
        );
    }

    #[tokio::test]
    async fn missing_budget_falls_back_to_default_tiers() {
        let orchestrator = TierOrchestrator::new(Arc::new(fixture_catalog()));
        let query = build_query(None, &[PerformanceProfile::Gaming]);

        let recommendations = orchestrator.recommend(&query).await;

        assert!(recommendations.budget_analysis.is_none());
        assert_eq!(recommendations.builds.len(), 3);
        assert_eq!(
            recommendations.builds[&BuildTier::Balanced].target_budget,
            Decimal::from(50_000)
        );
    }
}
