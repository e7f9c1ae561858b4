use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog-assigned component identity. Components are read-only to the
/// engine; identity and pricing come from the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub i64);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Cpu,
    Motherboard,
    Ram,
    Gpu,
    Storage,
    Psu,
    Case,
    Cooler,
    CaseFan,
    Keyboard,
    Mouse,
    Speakers,
    Monitor,
    Headphones,
}

/// Categories every complete build tries to fill, in assembly order.
/// Peripherals (keyboard, mouse, speakers) carry their own allocation slice
/// and are filled like any other category.
pub const ESSENTIAL_CATEGORIES: &[Category] = &[
    Category::Cpu,
    Category::Motherboard,
    Category::Ram,
    Category::Gpu,
    Category::Storage,
    Category::Psu,
    Category::Case,
    Category::Cooler,
    Category::CaseFan,
    Category::Keyboard,
    Category::Mouse,
    Category::Speakers,
];

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Motherboard => "motherboard",
            Self::Ram => "ram",
            Self::Gpu => "gpu",
            Self::Storage => "storage",
            Self::Psu => "psu",
            Self::Case => "case",
            Self::Cooler => "cooler",
            Self::CaseFan => "case-fan",
            Self::Keyboard => "keyboard",
            Self::Mouse => "mouse",
            Self::Speakers => "speakers",
            Self::Monitor => "monitor",
            Self::Headphones => "headphones",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cpu" => Some(Self::Cpu),
            "motherboard" => Some(Self::Motherboard),
            "ram" => Some(Self::Ram),
            "gpu" => Some(Self::Gpu),
            "storage" => Some(Self::Storage),
            "psu" => Some(Self::Psu),
            "case" => Some(Self::Case),
            "cooler" => Some(Self::Cooler),
            "case-fan" => Some(Self::CaseFan),
            "keyboard" => Some(Self::Keyboard),
            "mouse" => Some(Self::Mouse),
            "speakers" => Some(Self::Speakers),
            "monitor" => Some(Self::Monitor),
            "headphones" => Some(Self::Headphones),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single catalog component. Price is normalized to `Decimal` at the
/// catalog boundary; currency is carried but never converted here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub category: Category,
    pub brand: String,
    pub model: String,
    pub price: Decimal,
    pub currency: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Component {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }
}

/// Catalog query contract: results are ordered ascending by price and an
/// empty list stands in for "no match" and for backend failure alike.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentFilter {
    pub category: Option<Category>,
    pub brand: Option<String>,
    pub model_query: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub limit: u32,
}

impl ComponentFilter {
    pub fn for_category(category: Category) -> Self {
        Self { category: Some(category), limit: 50, ..Self::default() }
    }

    pub fn with_price_range(
        mut self,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
    ) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Category;

    #[test]
    fn category_round_trips() {
        let all = [
            Category::Cpu,
            Category::Motherboard,
            Category::Ram,
            Category::Gpu,
            Category::Storage,
            Category::Psu,
            Category::Case,
            Category::Cooler,
            Category::CaseFan,
            Category::Keyboard,
            Category::Mouse,
            Category::Speakers,
            Category::Monitor,
            Category::Headphones,
        ];

        for category in all {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn essential_order_starts_with_platform_parts() {
        use super::ESSENTIAL_CATEGORIES;

        assert_eq!(ESSENTIAL_CATEGORIES[0], Category::Cpu);
        assert_eq!(ESSENTIAL_CATEGORIES[1], Category::Motherboard);
        assert!(ESSENTIAL_CATEGORIES.contains(&Category::Gpu));
        assert!(!ESSENTIAL_CATEGORIES.contains(&Category::Monitor));
    }
}
