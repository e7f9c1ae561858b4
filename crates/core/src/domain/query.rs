use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::component::Category;
use super::profile::ProfileSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Search,
    Compare,
    Build,
    Upgrade,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceConstraints {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl PriceConstraints {
    pub fn is_empty(&self) -> bool {
        self.min_price.is_none() && self.max_price.is_none()
    }
}

/// Structured output of the query parser; one per request, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub original_query: String,
    pub performance_needs: ProfileSet,
    pub price_constraints: PriceConstraints,
    pub component_type: Option<Category>,
    pub brand: Option<String>,
    pub model_keywords: Vec<String>,
    pub intent: Intent,
    pub should_generate_complete_build: bool,
    /// Categories named in an upgrade request; empty means "all".
    pub upgrade_targets: Vec<Category>,
}

impl ParsedQuery {
    pub fn max_budget(&self) -> Option<Decimal> {
        self.price_constraints.max_price
    }
}
