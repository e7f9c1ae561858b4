use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::ComponentCatalog;
use crate::compat::CompatibilityChecker;
use crate::domain::component::{Category, Component, ComponentFilter, ComponentId};

/// A build recovered from a previous recommendation, either parsed out of
/// conversation history or read back from the recommendation store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreviousBuild {
    pub components: BTreeMap<Category, Component>,
    pub budget: Option<Decimal>,
}

impl PreviousBuild {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Read path into persisted recommendations. Implementations convert
/// backend failures into `None`, mirroring the catalog contract.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn latest_build(&self, thread_id: i64) -> Option<PreviousBuild>;
}

/// One conversation turn, as handed over by the chat layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
}

impl ConversationMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Deserialize)]
struct RecommendationPayload {
    components: Vec<PayloadComponent>,
    budget_analysis: Option<PayloadBudget>,
}

#[derive(Debug, Deserialize)]
struct PayloadComponent {
    #[serde(rename = "type", alias = "component_type")]
    category: Category,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    price: Decimal,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    source_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PayloadBudget {
    user_budget: Option<Decimal>,
    max_budget: Option<Decimal>,
}

impl PayloadComponent {
    /// History payloads carry no catalog identity, so recovered components
    /// get a zero id.
    fn into_component(self) -> Component {
        Component {
            id: ComponentId(0),
            category: self.category,
            brand: self.brand,
            model: self.model,
            price: self.price,
            currency: self.currency.unwrap_or_else(|| "PHP".to_string()),
            image_url: self.image_url,
            source_url: self.source_url,
            last_updated: None,
        }
    }
}

/// Walks the history newest-first looking for an assistant turn with an
/// embedded recommendation payload.
pub fn extract_previous_build(history: &[ConversationMessage]) -> Option<PreviousBuild> {
    for message in history.iter().rev() {
        if message.role != "assistant" {
            continue;
        }
        let content = message.content.trim();
        if !content.starts_with('{') {
            continue;
        }
        let Ok(payload) = serde_json::from_str::<RecommendationPayload>(content) else {
            continue;
        };

        let mut components = BTreeMap::new();
        for component in payload.components {
            components.insert(component.category, component.into_component());
        }
        if components.is_empty() {
            continue;
        }

        let budget = payload
            .budget_analysis
            .and_then(|analysis| analysis.user_budget.or(analysis.max_budget));
        return Some(PreviousBuild { components, budget });
    }
    None
}

/// Conversation history first, recommendation store second.
pub async fn recover_previous_build(
    history: &[ConversationMessage],
    store: Option<&dyn RecommendationStore>,
    thread_id: Option<i64>,
) -> Option<PreviousBuild> {
    if let Some(build) = extract_previous_build(history) {
        return Some(build);
    }
    match (store, thread_id) {
        (Some(store), Some(thread_id)) => store.latest_build(thread_id).await,
        _ => None,
    }
}

/// The price window an upgrade candidate must fall into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceWindow {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeSuggestion {
    pub current: Component,
    /// Up to three options, ascending by price.
    pub options: Vec<Component>,
    pub price_window: PriceWindow,
}

/// Per-category widen-and-filter upgrade advisor; no joint optimization.
/// Candidates must be strictly more expensive (the 1.2x window floor takes
/// care of that), a different model, and compatible with the rest of the
/// build.
pub struct UpgradeAdvisor {
    catalog: Arc<dyn ComponentCatalog>,
    checker: CompatibilityChecker,
}

impl UpgradeAdvisor {
    pub fn new(catalog: Arc<dyn ComponentCatalog>) -> Self {
        Self { catalog, checker: CompatibilityChecker }
    }

    /// `targets` empty means "all categories in the current build".
    pub async fn suggest_upgrades(
        &self,
        current: &BTreeMap<Category, Component>,
        targets: &[Category],
        budget: Option<Decimal>,
    ) -> BTreeMap<Category, UpgradeSuggestion> {
        let targets: Vec<Category> = if targets.is_empty() {
            current.keys().copied().collect()
        } else {
            targets.to_vec()
        };

        let mut suggestions = BTreeMap::new();
        for category in targets {
            let Some(component) = current.get(&category) else {
                continue;
            };
            if component.price <= Decimal::ZERO {
                continue;
            }

            let window = upgrade_window(category, component.price, budget);
            let filter = ComponentFilter::for_category(category)
                .with_price_range(Some(window.min), Some(window.max))
                .with_limit(5);
            let candidates = self.catalog.search(&filter).await;

            let current_model = component.model.to_ascii_lowercase();
            let mut options: Vec<Component> = candidates
                .into_iter()
                .filter(|candidate| {
                    candidate.model.to_ascii_lowercase() != current_model
                        && self.checker.check_with(current, candidate).is_compatible
                })
                .collect();
            options.truncate(3);

            if !options.is_empty() {
                tracing::debug!(category = %category, options = options.len(), "upgrade options found");
                suggestions.insert(
                    category,
                    UpgradeSuggestion { current: component.clone(), options, price_window: window },
                );
            }
        }
        suggestions
    }
}

/// 20-50% above the current price, widened to a budget-derived ceiling when
/// an overall upgrade budget is known.
fn upgrade_window(category: Category, current_price: Decimal, budget: Option<Decimal>) -> PriceWindow {
    let min = current_price * Decimal::new(12, 1);
    let mut max = current_price * Decimal::new(15, 1);

    if let Some(budget) = budget {
        max = max.max(budget * budget_ratio(category));
    }

    PriceWindow { min, max }
}

fn budget_ratio(category: Category) -> Decimal {
    let hundredths = match category {
        Category::Cpu => 20,
        Category::Gpu => 35,
        Category::Ram => 10,
        Category::Storage => 10,
        Category::Motherboard => 12,
        Category::Psu => 8,
        Category::Case => 2,
        Category::Cooler => 3,
        _ => 10,
    };
    Decimal::new(hundredths, 2)
}
