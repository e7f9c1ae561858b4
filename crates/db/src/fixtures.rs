//! Deterministic PH-market seed catalog for demos and integration tests.

use chrono::Utc;
use rigforge_core::Category;

use crate::repositories::RepositoryError;
use crate::DbPool;

pub struct SeedComponent {
    pub category: Category,
    pub brand: &'static str,
    pub model: &'static str,
    pub price: i64,
}

const fn seed(category: Category, brand: &'static str, model: &'static str, price: i64) -> SeedComponent {
    SeedComponent { category, brand, model, price }
}

/// Covers every category with enough price spread that the tier ladder can
/// assemble budget through premium builds.
pub const SEED_COMPONENTS: &[SeedComponent] = &[
    seed(Category::Cpu, "Intel", "Core i3-12100F", 5_500),
    seed(Category::Cpu, "AMD", "Ryzen 5 5600", 8_300),
    seed(Category::Cpu, "Intel", "Core i5-12400F", 11_000),
    seed(Category::Cpu, "AMD", "Ryzen 7 5700X", 15_500),
    seed(Category::Cpu, "Intel", "Core i7-13700F", 23_000),
    seed(Category::Cpu, "AMD", "Ryzen 7 7800X3D", 28_500),
    seed(Category::Motherboard, "ASRock", "H610M-HDV Intel LGA1700", 4_500),
    seed(Category::Motherboard, "MSI", "B550M PRO-VDH AM4 DDR4", 5_400),
    seed(Category::Motherboard, "Asus", "Prime B660M-A Intel DDR4", 7_500),
    seed(Category::Motherboard, "Gigabyte", "B650M DS3H AM5 DDR5", 9_800),
    seed(Category::Motherboard, "Asus", "TUF Gaming Z790 ATX DDR5", 15_500),
    seed(Category::Ram, "Kingston", "Fury Beast 8GB DDR4-3200", 1_500),
    seed(Category::Ram, "Team", "Elite 16GB DDR4-3200", 3_300),
    seed(Category::Ram, "Kingston", "Fury Beast 16GB DDR4-3600", 3_400),
    seed(Category::Ram, "Corsair", "Vengeance 32GB DDR5-5600", 6_500),
    seed(Category::Ram, "G.Skill", "Trident Z5 32GB DDR5-6000", 8_900),
    seed(Category::Gpu, "Asus", "GT 730 2GB", 3_500),
    seed(Category::Gpu, "Gigabyte", "GTX 1650 OC 4GB", 8_800),
    seed(Category::Gpu, "MSI", "RTX 3050 Ventus 8GB", 13_500),
    seed(Category::Gpu, "Palit", "RTX 3060 Dual 12GB", 16_500),
    seed(Category::Gpu, "Palit", "RTX 4060 StormX 8GB", 18_900),
    seed(Category::Gpu, "Asus", "Dual RTX 4070 12GB", 35_000),
    seed(Category::Gpu, "Gigabyte", "RTX 4070 Ti Gaming OC", 48_000),
    seed(Category::Storage, "Kingston", "A400 480GB SATA", 1_800),
    seed(Category::Storage, "Western Digital", "Blue 1TB HDD", 2_400),
    seed(Category::Storage, "Kingston", "NV2 1TB NVMe", 3_400),
    seed(Category::Storage, "Samsung", "980 1TB NVMe", 5_200),
    seed(Category::Storage, "Western Digital", "Black SN850X 2TB", 9_500),
    seed(Category::Psu, "Generic", "500W ATX PSU", 1_600),
    seed(Category::Psu, "Corsair", "CV550 550W Bronze", 2_900),
    seed(Category::Psu, "Cooler Master", "MWE 650W Bronze", 3_800),
    seed(Category::Psu, "Seasonic", "Focus GX-750 Gold", 6_200),
    seed(Category::Case, "Generic", "Mini Tower Black", 950),
    seed(Category::Case, "Keytech", "Mid Tower ATX", 2_500),
    seed(Category::Case, "NZXT", "H5 Flow ATX", 4_500),
    seed(Category::Case, "Cooler Master", "NR200 Mini-ITX", 5_500),
    seed(Category::Cooler, "Deepcool", "Gammaxx 400", 900),
    seed(Category::Cooler, "ID-Cooling", "SE-214-XT", 1_450),
    seed(Category::Cooler, "Deepcool", "AK400", 2_200),
    seed(Category::Cooler, "Arctic", "Liquid Freezer II 240", 5_500),
    seed(Category::CaseFan, "Generic", "120mm Fan", 350),
    seed(Category::CaseFan, "Arctic", "P12 PWM", 700),
    seed(Category::CaseFan, "Corsair", "LL120 RGB", 1_600),
    seed(Category::Keyboard, "Generic", "Membrane Keyboard", 700),
    seed(Category::Keyboard, "Royal Kludge", "RK61 Mechanical", 1_450),
    seed(Category::Keyboard, "Keychron", "K2 V2", 4_500),
    seed(Category::Mouse, "Generic", "Optical Mouse", 350),
    seed(Category::Mouse, "Logitech", "G102 Lightsync", 950),
    seed(Category::Mouse, "Razer", "Viper Mini", 1_800),
    seed(Category::Speakers, "Generic", "USB Speakers", 600),
    seed(Category::Speakers, "Creative", "Pebble 2.0", 950),
    seed(Category::Speakers, "Edifier", "R980T", 2_500),
    seed(Category::Headphones, "JBL", "Quantum 100", 2_200),
    seed(Category::Headphones, "HyperX", "Cloud II", 4_500),
    seed(Category::Monitor, "AOC", "24G2 24\" 144Hz", 6_500),
    seed(Category::Monitor, "Dell", "S2721DGF 27\"", 11_000),
];

/// Inserts any seed rows not already present, keyed by brand and model.
/// Returns the number of rows inserted.
pub async fn seed_components(pool: &DbPool) -> Result<u64, RepositoryError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for component in SEED_COMPONENTS {
        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM components WHERE brand = ?1 AND model = ?2")
                .bind(component.brand)
                .bind(component.model)
                .fetch_one(&mut *tx)
                .await?;
        if existing > 0 {
            continue;
        }

        sqlx::query(
            "INSERT INTO components (component_type, brand, model, price, currency, last_updated) \
             VALUES (?1, ?2, ?3, ?4, 'PHP', ?5)",
        )
        .bind(component.category.as_str())
        .bind(component.brand)
        .bind(component.model)
        .bind(component.price.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;
        inserted += 1;
    }

    tx.commit().await?;
    tracing::info!(inserted, "seeded component catalog");
    Ok(inserted)
}

/// Removes exactly the rows `seed_components` inserts, leaving any other
/// catalog data untouched.
pub async fn remove_seed_components(pool: &DbPool) -> Result<u64, RepositoryError> {
    let mut tx = pool.begin().await?;
    let mut removed = 0;

    for component in SEED_COMPONENTS {
        let result = sqlx::query("DELETE FROM components WHERE brand = ?1 AND model = ?2")
            .bind(component.brand)
            .bind(component.model)
            .execute(&mut *tx)
            .await?;
        removed += result.rows_affected();
    }

    tx.commit().await?;
    Ok(removed)
}
