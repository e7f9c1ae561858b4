use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::component::Category;
use crate::domain::query::{Intent, ParsedQuery, PriceConstraints};
use crate::domain::profile::{PerformanceProfile, ProfileSet};

#[derive(Debug, Error)]
pub enum QueryParserError {
    #[error("invalid query pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Which side of the price constraint a pattern feeds.
#[derive(Clone, Copy, Debug)]
enum PriceBound {
    Min,
    Max,
}

struct PricePattern {
    regex: Regex,
    bound: PriceBound,
}

const COMPONENT_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Cpu, &["processor", "cpu", "core i3", "core i5", "core i7", "core i9", "ryzen 3", "ryzen 5", "ryzen 7", "ryzen 9"]),
    (Category::Gpu, &["graphics card", "gpu", "video card", "vga", "rtx", "gtx", "geforce", "radeon"]),
    (Category::Ram, &["memory", "ram", "ddr4", "ddr5", "dimm"]),
    (Category::Storage, &["storage", "ssd", "hard drive", "nvme", "hdd", "m.2", "solid state"]),
    (Category::Motherboard, &["motherboard", "mainboard", "mobo", "chipset"]),
    (Category::Psu, &["power supply", "psu", "wattage", "watt"]),
    (Category::Case, &["chassis", "pc case", "computer case", "tower case"]),
    (Category::Cooler, &["cooler", "cooling", "aio", "liquid cooling", "heatsink"]),
    (Category::Monitor, &["monitor", "display", "screen"]),
];

const PROFILE_KEYWORDS: &[(PerformanceProfile, &[&str])] = &[
    (PerformanceProfile::Gaming, &["gaming", "fps", "esports", "competitive"]),
    (PerformanceProfile::Professional, &["rendering", "video editing", "3d modeling", "photoshop", "premiere", "blender"]),
    (PerformanceProfile::Productivity, &["office work", "multitasking", "productivity", "excel", "programming", "coding"]),
    (PerformanceProfile::Streaming, &["streaming", "twitch", "obs", "content creation"]),
];

const UPGRADE_TARGET_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Cpu, &["cpu", "processor", "chip"]),
    (Category::Gpu, &["gpu", "graphics", "video card", "vga"]),
    (Category::Ram, &["ram", "memory", "ddr"]),
    (Category::Storage, &["storage", "ssd", "hdd", "hard drive", "disk"]),
    (Category::Motherboard, &["motherboard", "mobo", "mainboard"]),
    (Category::Psu, &["psu", "power supply"]),
    (Category::Case, &["case", "chassis", "tower"]),
    (Category::Cooler, &["cooler", "cooling", "heatsink"]),
    (Category::Monitor, &["monitor", "display", "screen"]),
];

const KNOWN_BRANDS: &[&str] = &[
    "intel", "amd", "nvidia", "asus", "msi", "gigabyte", "corsair", "samsung",
    "western digital", "kingston", "seasonic",
];

/// Free-text to structured-query parser. Pattern tables are data so the
/// matching order is visible; regexes are compiled once at construction.
pub struct QueryParser {
    price_patterns: Vec<PricePattern>,
    bare_number: Regex,
    model_tokens: Regex,
}

impl QueryParser {
    pub fn new() -> Result<Self, QueryParserError> {
        let amount = r"(?:php\s*|\u{20b1}\s*)?([\d,]+)\s*(k?)";
        let price_patterns = vec![
            PricePattern {
                regex: Regex::new(&format!(
                    r"(?:under|below|less\s+than|within|around|max|maximum|budget\s+of)\s+{amount}"
                ))?,
                bound: PriceBound::Max,
            },
            PricePattern {
                regex: Regex::new(&format!(
                    r"(?:above|over|greater\s+than|at\s+least|min|minimum)\s+{amount}"
                ))?,
                bound: PriceBound::Min,
            },
            PricePattern {
                regex: Regex::new(r"([\d,]+)\s*(k)\b")?,
                bound: PriceBound::Max,
            },
            PricePattern {
                regex: Regex::new(r"([\d,]+)\s*(k?)\s*(?:pesos?|php)\b")?,
                bound: PriceBound::Max,
            },
        ];

        Ok(Self {
            price_patterns,
            bare_number: Regex::new(r"\b(\d{4,6})\b")?,
            model_tokens: Regex::new(r"\b[a-z]*\d+[a-z]*\b")?,
        })
    }

    pub fn parse(&self, query: &str) -> ParsedQuery {
        let lowered = query.to_lowercase();

        let component_type = detect_component_type(&lowered);
        let price_constraints = self.extract_price_constraints(&lowered);
        let performance_needs = detect_performance_needs(&lowered);
        let intent = detect_intent(&lowered);
        let should_generate_complete_build = should_generate_complete_build(
            &lowered,
            &price_constraints,
            &performance_needs,
            component_type,
        );
        let upgrade_targets = if intent == Intent::Upgrade {
            detect_upgrade_targets(&lowered)
        } else {
            Vec::new()
        };

        ParsedQuery {
            original_query: query.to_string(),
            performance_needs,
            price_constraints,
            component_type,
            brand: detect_brand(&lowered),
            model_keywords: self.extract_model_keywords(&lowered),
            intent,
            should_generate_complete_build,
            upgrade_targets,
        }
    }

    fn extract_price_constraints(&self, query: &str) -> PriceConstraints {
        let mut constraints = PriceConstraints::default();

        for pattern in &self.price_patterns {
            let Some(captures) = pattern.regex.captures(query) else {
                continue;
            };
            let Some(price) = parse_amount(&captures) else {
                continue;
            };
            match pattern.bound {
                PriceBound::Min => constraints.min_price = Some(price),
                PriceBound::Max => constraints.max_price = Some(price),
            }
            return constraints;
        }

        // A lone 4-6 digit number in a PC query is almost always a budget.
        if let Some(captures) = self.bare_number.captures(query) {
            if let Some(price) = parse_amount(&captures) {
                constraints.max_price = Some(price);
            }
        }
        constraints
    }

    fn extract_model_keywords(&self, query: &str) -> Vec<String> {
        let mut keywords = Vec::new();
        for token in self.model_tokens.find_iter(query) {
            let token = token.as_str().to_string();
            if !keywords.contains(&token) {
                keywords.push(token);
            }
        }
        keywords
    }
}

fn parse_amount(captures: &regex::Captures<'_>) -> Option<Decimal> {
    let digits = captures.get(1)?.as_str().replace(',', "");
    let value: i64 = digits.parse().ok()?;
    let thousands = captures.get(2).is_some_and(|group| group.as_str() == "k");
    Some(Decimal::from(if thousands { value * 1_000 } else { value }))
}

fn detect_component_type(query: &str) -> Option<Category> {
    let mut best: Option<(Category, usize)> = None;
    for (category, keywords) in COMPONENT_KEYWORDS {
        let score = keywords.iter().filter(|keyword| query.contains(*keyword)).count();
        if score > 0 && best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((*category, score));
        }
    }
    best.map(|(category, _)| category)
}

fn detect_performance_needs(query: &str) -> ProfileSet {
    PROFILE_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|keyword| query.contains(keyword)))
        .map(|(profile, _)| *profile)
        .collect()
}

fn detect_intent(query: &str) -> Intent {
    let table: &[(Intent, &[&str])] = &[
        (Intent::Search, &["find", "search", "look for", "show me", "looking for"]),
        (Intent::Compare, &["compare", "vs", "versus", "difference between"]),
        (Intent::Build, &["build", "setup", "complete build"]),
        (Intent::Upgrade, &["upgrade", "replace", "improve", "better than"]),
    ];

    for (intent, keywords) in table {
        if keywords.iter().any(|keyword| query.contains(keyword)) {
            return *intent;
        }
    }
    Intent::Search
}

fn detect_upgrade_targets(query: &str) -> Vec<Category> {
    UPGRADE_TARGET_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|keyword| query.contains(keyword)))
        .map(|(category, _)| *category)
        .collect()
}

fn detect_brand(query: &str) -> Option<String> {
    KNOWN_BRANDS
        .iter()
        .find(|brand| query.contains(*brand))
        .map(|brand| brand.to_uppercase())
}

fn should_generate_complete_build(
    query: &str,
    constraints: &PriceConstraints,
    needs: &ProfileSet,
    component_type: Option<Category>,
) -> bool {
    let has_budget = !constraints.is_empty();
    if !has_budget || component_type.is_some() {
        return false;
    }

    let general_pc_words = ["pc", "computer", "setup", "build"];
    if general_pc_words.iter().any(|word| query.contains(word)) {
        return true;
    }
    if !needs.is_empty() {
        return true;
    }

    let help_phrases = ["help me", "what should i", "recommend me", "suggest me", "need a computer"];
    help_phrases.iter().any(|phrase| query.contains(phrase))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::component::Category;
    use crate::domain::profile::PerformanceProfile;
    use crate::domain::query::Intent;

    use super::QueryParser;

    fn parser() -> QueryParser {
        QueryParser::new().expect("static patterns compile")
    }

    #[test]
    fn budget_build_query_extracts_profile_and_ceiling() {
        let parsed = parser().parse("Gaming PC build under \u{20b1}50,000");

        assert!(parsed.performance_needs.contains(&PerformanceProfile::Gaming));
        assert_eq!(parsed.price_constraints.max_price, Some(Decimal::from(50_000)));
        assert_eq!(parsed.component_type, None);
        assert!(parsed.should_generate_complete_build);
        assert_eq!(parsed.intent, Intent::Build);
    }

    #[test]
    fn shorthand_thousands_are_expanded() {
        let parsed = parser().parse("50k gaming setup");
        assert_eq!(parsed.price_constraints.max_price, Some(Decimal::from(50_000)));
        assert!(parsed.should_generate_complete_build);
    }

    #[test]
    fn bare_number_is_treated_as_a_budget_ceiling() {
        let parsed = parser().parse("gaming pc 45000");
        assert_eq!(parsed.price_constraints.max_price, Some(Decimal::from(45_000)));
    }

    #[test]
    fn minimum_bound_is_recognized() {
        let parsed = parser().parse("show me processors above 8000");
        assert_eq!(parsed.price_constraints.min_price, Some(Decimal::from(8_000)));
        assert_eq!(parsed.price_constraints.max_price, None);
        assert_eq!(parsed.component_type, Some(Category::Cpu));
        assert_eq!(parsed.intent, Intent::Search);
        assert!(!parsed.should_generate_complete_build);
    }

    #[test]
    fn specific_component_query_keeps_model_tokens() {
        let parsed = parser().parse("rtx 4060 under 20000");

        assert_eq!(parsed.component_type, Some(Category::Gpu));
        assert!(parsed.model_keywords.iter().any(|token| token == "4060"));
        assert_eq!(parsed.price_constraints.max_price, Some(Decimal::from(20_000)));
        assert!(!parsed.should_generate_complete_build);
    }

    #[test]
    fn upgrade_query_collects_target_categories() {
        let parsed = parser().parse("can i upgrade my gpu and ram?");

        assert_eq!(parsed.intent, Intent::Upgrade);
        assert_eq!(parsed.upgrade_targets, vec![Category::Gpu, Category::Ram]);
    }

    #[test]
    fn brand_mention_is_surfaced() {
        let parsed = parser().parse("looking for an msi motherboard");
        assert_eq!(parsed.brand.as_deref(), Some("MSI"));
        assert_eq!(parsed.component_type, Some(Category::Motherboard));
    }
}
