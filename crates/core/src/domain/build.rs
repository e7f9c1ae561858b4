use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::component::{Category, Component};
use crate::compat::CompatibilityReport;

/// A complete (or partially complete) build: at most one component per
/// category plus the derived budget and compatibility status. Nothing here
/// is clamped — an over-budget build reports a negative `budget_remaining`
/// rather than hiding the failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub components: BTreeMap<Category, Component>,
    pub total_cost: Decimal,
    pub target_budget: Decimal,
    pub within_budget: bool,
    /// Percentage, e.g. 97.5 for a build using 97.5% of the target budget.
    pub budget_utilization: Decimal,
    pub budget_remaining: Decimal,
    pub is_compatible: bool,
    pub compatibility_issues: Vec<String>,
}

impl Build {
    pub fn assess(
        components: BTreeMap<Category, Component>,
        target_budget: Decimal,
        report: CompatibilityReport,
    ) -> Self {
        let total_cost = total_cost(&components);
        let budget_utilization = if target_budget.is_zero() {
            Decimal::ZERO
        } else {
            total_cost / target_budget * Decimal::ONE_HUNDRED
        };

        Self {
            total_cost,
            target_budget,
            within_budget: total_cost <= target_budget,
            budget_utilization,
            budget_remaining: target_budget - total_cost,
            is_compatible: report.is_compatible,
            compatibility_issues: report.issues,
            components,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

pub fn total_cost(components: &BTreeMap<Category, Component>) -> Decimal {
    components.values().map(|component| component.price).sum()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;

    use crate::compat::CompatibilityReport;
    use crate::domain::component::Category;
    use crate::testing::component;

    use super::Build;

    #[test]
    fn assess_reports_utilization_as_percentage() {
        let mut components = BTreeMap::new();
        components.insert(Category::Cpu, component(1, Category::Cpu, "AMD", "Ryzen 5 5600", 9_500));
        components.insert(Category::Gpu, component(2, Category::Gpu, "MSI", "RTX 4060", 19_500));

        let build = Build::assess(
            components,
            Decimal::from(50_000),
            CompatibilityReport::default(),
        );

        assert_eq!(build.total_cost, Decimal::from(29_000));
        assert_eq!(build.budget_utilization, Decimal::from(58));
        assert_eq!(build.budget_remaining, Decimal::from(21_000));
        assert!(build.within_budget);
    }

    #[test]
    fn over_budget_build_reports_negative_remaining() {
        let mut components = BTreeMap::new();
        components.insert(Category::Gpu, component(1, Category::Gpu, "Asus", "RTX 4090", 120_000));

        let build = Build::assess(
            components,
            Decimal::from(100_000),
            CompatibilityReport::default(),
        );

        assert!(!build.within_budget);
        assert_eq!(build.budget_remaining, Decimal::from(-20_000));
        assert!(build.budget_utilization > Decimal::ONE_HUNDRED);
    }
}
