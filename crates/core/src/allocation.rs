use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::component::Category;
use crate::domain::profile::AllocationTable;

/// Splits a total budget into per-category sub-budgets from an allocation
/// table. Pure arithmetic, no error cases: the table supplies the category
/// set, renormalized so the sub-budgets sum back to the budget.
#[derive(Clone, Copy, Debug, Default)]
pub struct BudgetAllocator;

impl BudgetAllocator {
    pub fn allocate(
        &self,
        budget: Decimal,
        table: &AllocationTable,
    ) -> BTreeMap<Category, Decimal> {
        table
            .normalized()
            .into_iter()
            .map(|(category, fraction)| (category, budget * fraction))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::component::Category;
    use crate::domain::profile::{assembler_table, premade_table, PerformanceProfile, ProfileSet};

    use super::BudgetAllocator;

    #[test]
    fn sub_budgets_sum_to_total() {
        let allocator = BudgetAllocator;
        let profiles: ProfileSet = [PerformanceProfile::Professional].into_iter().collect();

        for budget in [Decimal::from(20_000), Decimal::from(50_000), Decimal::from(185_000)] {
            let allocations = allocator.allocate(budget, &assembler_table(&profiles));
            let sum: Decimal = allocations.values().copied().sum();
            let drift = (sum - budget).abs();
            assert!(drift < Decimal::new(1, 6), "budget {budget}, sum {sum}");
        }
    }

    #[test]
    fn gaming_premade_table_gives_expected_gpu_share() {
        let allocator = BudgetAllocator;
        let profiles: ProfileSet = [PerformanceProfile::Gaming].into_iter().collect();

        let allocations =
            allocator.allocate(Decimal::from(50_000), &premade_table(&profiles));
        let gpu = allocations[&Category::Gpu];

        // 0.36 of 50k before renormalization; the table sums to 0.96 so the
        // renormalized share lands slightly higher.
        assert!(gpu >= Decimal::from(18_000), "gpu allocation {gpu}");
        assert!(gpu <= Decimal::from(19_000), "gpu allocation {gpu}");
    }

    #[test]
    fn empty_profile_set_uses_balanced_table() {
        let allocator = BudgetAllocator;
        let none = ProfileSet::new();
        let allocations =
            allocator.allocate(Decimal::from(40_000), &assembler_table(&none));

        assert!(allocations[&Category::Cpu] > allocations[&Category::Ram]);
        assert!(allocations.contains_key(&Category::Speakers));
    }
}
