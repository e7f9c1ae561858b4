use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::component::Category;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceProfile {
    Gaming,
    Professional,
    Productivity,
    Streaming,
    General,
}

impl PerformanceProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gaming => "gaming",
            Self::Professional => "professional",
            Self::Productivity => "productivity",
            Self::Streaming => "streaming",
            Self::General => "general",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gaming" => Some(Self::Gaming),
            "professional" => Some(Self::Professional),
            "productivity" => Some(Self::Productivity),
            "streaming" => Some(Self::Streaming),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

pub type ProfileSet = BTreeSet<PerformanceProfile>;

/// Per-category budget fractions. Fractions are renormalized to sum to
/// exactly 1 before any allocation is computed; `normalized` is the only
/// way to get fractions out, so the invariant holds everywhere downstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationTable {
    fractions: BTreeMap<Category, Decimal>,
}

impl AllocationTable {
    pub fn new(fractions: BTreeMap<Category, Decimal>) -> Self {
        Self { fractions }
    }

    /// Fractions scaled so that they sum to exactly 1.
    pub fn normalized(&self) -> BTreeMap<Category, Decimal> {
        let sum: Decimal = self.fractions.values().copied().sum();
        if sum.is_zero() {
            return BTreeMap::new();
        }
        self.fractions.iter().map(|(category, share)| (*category, share / sum)).collect()
    }
}

fn table(entries: &[(Category, i64)]) -> AllocationTable {
    // Fractions are stored as hundredths (17 -> 0.17).
    AllocationTable::new(
        entries
            .iter()
            .map(|(category, hundredths)| (*category, Decimal::new(*hundredths, 2)))
            .collect(),
    )
}

/// Tables used by the greedy budget-aware assembler.
/// Precedence: gaming > professional/streaming > default.
pub fn assembler_table(profiles: &ProfileSet) -> AllocationTable {
    use Category::*;

    if profiles.contains(&PerformanceProfile::Gaming) {
        table(&[
            (Cpu, 17),
            (Motherboard, 11),
            (Ram, 7),
            (Gpu, 38),
            (Storage, 7),
            (Psu, 6),
            (Case, 2),
            (Cooler, 3),
            (CaseFan, 2),
            (Keyboard, 3),
            (Mouse, 2),
            (Speakers, 2),
        ])
    } else if profiles.contains(&PerformanceProfile::Professional)
        || profiles.contains(&PerformanceProfile::Streaming)
    {
        table(&[
            (Cpu, 28),
            (Motherboard, 13),
            (Ram, 15),
            (Gpu, 20),
            (Storage, 9),
            (Psu, 7),
            (Case, 2),
            (Cooler, 4),
            (CaseFan, 2),
            (Keyboard, 3),
            (Mouse, 2),
            (Speakers, 2),
        ])
    } else {
        table(&[
            (Cpu, 20),
            (Motherboard, 12),
            (Ram, 9),
            (Gpu, 33),
            (Storage, 8),
            (Psu, 6),
            (Case, 2),
            (Cooler, 3),
            (CaseFan, 2),
            (Keyboard, 3),
            (Mouse, 2),
            (Speakers, 2),
        ])
    }
}

/// Tables used by the premade generator's candidate construction. Slightly
/// more conservative gpu share than the assembler family.
pub fn premade_table(profiles: &ProfileSet) -> AllocationTable {
    use Category::*;

    if profiles.contains(&PerformanceProfile::Gaming) {
        table(&[
            (Cpu, 16),
            (Motherboard, 10),
            (Ram, 7),
            (Gpu, 36),
            (Storage, 7),
            (Psu, 6),
            (Case, 2),
            (Cooler, 3),
            (CaseFan, 2),
            (Keyboard, 3),
            (Mouse, 2),
            (Speakers, 2),
        ])
    } else if profiles.contains(&PerformanceProfile::Professional)
        || profiles.contains(&PerformanceProfile::Streaming)
    {
        table(&[
            (Cpu, 26),
            (Motherboard, 12),
            (Ram, 14),
            (Gpu, 19),
            (Storage, 9),
            (Psu, 7),
            (Case, 2),
            (Cooler, 4),
            (CaseFan, 2),
            (Keyboard, 3),
            (Mouse, 2),
            (Speakers, 2),
        ])
    } else {
        table(&[
            (Cpu, 19),
            (Motherboard, 11),
            (Ram, 9),
            (Gpu, 31),
            (Storage, 8),
            (Psu, 6),
            (Case, 2),
            (Cooler, 3),
            (CaseFan, 2),
            (Keyboard, 3),
            (Mouse, 2),
            (Speakers, 2),
        ])
    }
}

/// Lean tables for the cheapest-feasible fallback build: core categories
/// only, peripherals excluded.
pub fn floor_table(profiles: &ProfileSet) -> AllocationTable {
    use Category::*;

    if profiles.contains(&PerformanceProfile::Gaming) {
        table(&[
            (Cpu, 15),
            (Motherboard, 10),
            (Ram, 8),
            (Gpu, 50),
            (Storage, 8),
            (Psu, 7),
            (Case, 2),
        ])
    } else if profiles.contains(&PerformanceProfile::Professional)
        || profiles.contains(&PerformanceProfile::Streaming)
    {
        table(&[
            (Cpu, 40),
            (Motherboard, 12),
            (Ram, 20),
            (Gpu, 15),
            (Storage, 8),
            (Psu, 8),
            (Case, 2),
        ])
    } else {
        table(&[
            (Cpu, 20),
            (Motherboard, 12),
            (Ram, 10),
            (Gpu, 40),
            (Storage, 8),
            (Psu, 8),
            (Case, 2),
        ])
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        assembler_table, floor_table, premade_table, PerformanceProfile, ProfileSet,
    };

    fn profile_sets() -> Vec<ProfileSet> {
        vec![
            ProfileSet::new(),
            [PerformanceProfile::Gaming].into_iter().collect(),
            [PerformanceProfile::Professional].into_iter().collect(),
            [PerformanceProfile::Streaming].into_iter().collect(),
            [PerformanceProfile::Gaming, PerformanceProfile::Streaming]
                .into_iter()
                .collect(),
        ]
    }

    #[test]
    fn every_builtin_table_renormalizes_to_one() {
        for profiles in profile_sets() {
            for table in [
                assembler_table(&profiles),
                premade_table(&profiles),
                floor_table(&profiles),
            ] {
                let sum: Decimal = table.normalized().values().copied().sum();
                let drift = (sum - Decimal::ONE).abs();
                assert!(drift < Decimal::new(1, 12), "profiles {profiles:?}, sum {sum}");
            }
        }
    }

    #[test]
    fn gaming_takes_precedence_over_streaming() {
        let both: ProfileSet =
            [PerformanceProfile::Gaming, PerformanceProfile::Streaming].into_iter().collect();
        assert_eq!(assembler_table(&both), assembler_table(&[PerformanceProfile::Gaming].into_iter().collect()));
    }

    #[test]
    fn profile_round_trips() {
        for profile in [
            PerformanceProfile::Gaming,
            PerformanceProfile::Professional,
            PerformanceProfile::Productivity,
            PerformanceProfile::Streaming,
            PerformanceProfile::General,
        ] {
            assert_eq!(PerformanceProfile::parse(profile.as_str()), Some(profile));
        }
    }
}
