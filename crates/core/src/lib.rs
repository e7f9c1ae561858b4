pub mod allocation;
pub mod assembler;
pub mod catalog;
pub mod compat;
pub mod config;
pub mod domain;
pub mod orchestrator;
pub mod premade;
pub mod query;
pub mod upgrade;

#[cfg(test)]
pub(crate) mod testing;

pub use allocation::BudgetAllocator;
pub use assembler::GreedyAssembler;
pub use catalog::{first_non_empty, ComponentCatalog, SearchStrategy, StaticCatalog};
pub use compat::{CompatibilityChecker, CompatibilityReport};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::build::Build;
pub use domain::component::{Category, Component, ComponentFilter, ComponentId, ESSENTIAL_CATEGORIES};
pub use domain::profile::{
    assembler_table, floor_table, premade_table, AllocationTable, PerformanceProfile, ProfileSet,
};
pub use domain::query::{Intent, ParsedQuery, PriceConstraints};
pub use orchestrator::{BudgetAnalysis, BuildTier, Recommendations, TierOrchestrator};
pub use premade::{BudgetLadder, PremadeBuildCache, PremadeGenerator, SearchLimits};
pub use query::{QueryParser, QueryParserError};
pub use upgrade::{
    extract_previous_build, recover_previous_build, ConversationMessage, PreviousBuild,
    RecommendationStore, UpgradeAdvisor, UpgradeSuggestion,
};
