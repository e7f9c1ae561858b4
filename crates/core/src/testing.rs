//! Deterministic catalog fixtures shared by the engine's unit tests.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use crate::catalog::StaticCatalog;
use crate::domain::component::{Category, Component, ComponentId};

pub(crate) fn component(
    id: i64,
    category: Category,
    brand: &str,
    model: &str,
    price: i64,
) -> Component {
    Component {
        id: ComponentId(id),
        category,
        brand: brand.to_string(),
        model: model.to_string(),
        price: Decimal::from(price),
        currency: "PHP".to_string(),
        image_url: None,
        source_url: None,
        last_updated: Some(Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()),
    }
}

/// A small but realistic PH-market catalog. Prices are arranged so that a
/// 50k gaming build fills every essential category just under budget,
/// leaving a sub-5% surplus for the upgrade passes to consume.
pub(crate) fn fixture_catalog() -> StaticCatalog {
    let parts = vec![
        // cpus
        component(1, Category::Cpu, "Intel", "Core i3-12100F", 5_500),
        component(2, Category::Cpu, "AMD", "Ryzen 5 5600", 8_300),
        component(3, Category::Cpu, "Intel", "Core i5-12400F", 11_000),
        component(4, Category::Cpu, "AMD", "Ryzen 7 5700X", 15_500),
        component(5, Category::Cpu, "Intel", "Core i7-13700F", 23_000),
        // motherboards
        component(10, Category::Motherboard, "ASRock", "H610M-HDV Intel LGA1700", 4_500),
        component(11, Category::Motherboard, "MSI", "B550M PRO-VDH AM4 DDR4", 5_400),
        component(12, Category::Motherboard, "Asus", "Prime B660M-A Intel DDR4", 7_500),
        component(13, Category::Motherboard, "Gigabyte", "B650M DS3H AM5 DDR5", 9_800),
        component(14, Category::Motherboard, "Asus", "TUF Gaming Z790 ATX DDR5", 15_500),
        // memory
        component(20, Category::Ram, "Kingston", "Fury Beast 8GB DDR4-3200", 1_500),
        component(21, Category::Ram, "Team", "Elite 16GB DDR4-3200", 3_300),
        component(22, Category::Ram, "Kingston", "Fury Beast 16GB DDR4-3600", 3_400),
        component(23, Category::Ram, "Corsair", "Vengeance 32GB DDR5-5600", 6_500),
        component(24, Category::Ram, "G.Skill", "Trident Z5 32GB DDR5-6000", 8_900),
        // gpus
        component(30, Category::Gpu, "Asus", "GT 730 2GB", 3_500),
        component(31, Category::Gpu, "Gigabyte", "GTX 1650 OC 4GB", 8_800),
        component(32, Category::Gpu, "MSI", "RTX 3050 Ventus 8GB", 13_500),
        component(33, Category::Gpu, "Palit", "RTX 3060 Dual 12GB", 16_500),
        component(34, Category::Gpu, "Palit", "RTX 4060 StormX 8GB", 18_900),
        component(35, Category::Gpu, "Asus", "Dual RTX 4070 12GB", 35_000),
        // storage
        component(40, Category::Storage, "Kingston", "A400 480GB SATA", 1_800),
        component(41, Category::Storage, "Western Digital", "Blue 1TB HDD", 2_400),
        component(42, Category::Storage, "Kingston", "NV2 1TB NVMe", 3_400),
        component(43, Category::Storage, "Samsung", "980 1TB NVMe", 5_200),
        component(44, Category::Storage, "Western Digital", "Black SN850X 2TB", 9_500),
        // power supplies
        component(50, Category::Psu, "Generic", "500W ATX PSU", 1_600),
        component(51, Category::Psu, "Corsair", "CV550 550W Bronze", 2_900),
        component(52, Category::Psu, "Cooler Master", "MWE 650W Bronze", 3_800),
        component(53, Category::Psu, "Seasonic", "Focus GX-750 Gold", 6_200),
        // cases
        component(60, Category::Case, "Generic", "Mini Tower Black", 950),
        component(61, Category::Case, "Keytech", "Mid Tower ATX", 2_500),
        component(62, Category::Case, "NZXT", "H5 Flow ATX", 4_500),
        component(63, Category::Case, "Cooler Master", "NR200 Mini-ITX", 5_500),
        // coolers
        component(70, Category::Cooler, "Deepcool", "Gammaxx 400", 900),
        component(71, Category::Cooler, "ID-Cooling", "SE-214-XT", 1_450),
        component(72, Category::Cooler, "Deepcool", "AK400", 2_200),
        component(73, Category::Cooler, "Arctic", "Liquid Freezer II 240", 5_500),
        // case fans
        component(80, Category::CaseFan, "Generic", "120mm Fan", 350),
        component(81, Category::CaseFan, "Arctic", "P12 PWM", 700),
        component(82, Category::CaseFan, "Corsair", "LL120 RGB", 1_600),
        // keyboards
        component(90, Category::Keyboard, "Generic", "Membrane Keyboard", 700),
        component(91, Category::Keyboard, "Royal Kludge", "RK61 Mechanical", 1_450),
        component(92, Category::Keyboard, "Keychron", "K2 V2", 4_500),
        // mice
        component(100, Category::Mouse, "Generic", "Optical Mouse", 350),
        component(101, Category::Mouse, "Logitech", "G102 Lightsync", 950),
        component(102, Category::Mouse, "Razer", "Viper Mini", 1_800),
        // speakers
        component(110, Category::Speakers, "Generic", "USB Speakers", 600),
        component(111, Category::Speakers, "Creative", "Pebble 2.0", 950),
        component(112, Category::Speakers, "Edifier", "R980T", 2_500),
        // peripherals outside the essential set
        component(120, Category::Headphones, "JBL", "Quantum 100", 2_200),
        component(121, Category::Headphones, "HyperX", "Cloud II", 4_500),
        component(130, Category::Monitor, "AOC", "24G2 24\" 144Hz", 6_500),
        component(131, Category::Monitor, "Dell", "S2721DGF 27\"", 11_000),
    ];

    StaticCatalog::new(parts)
}
