use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::component::{Category, Component};

/// Outcome of pairwise rule evaluation over a candidate component set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub is_compatible: bool,
    pub issues: Vec<String>,
}

impl Default for CompatibilityReport {
    fn default() -> Self {
        Self { is_compatible: true, issues: Vec::new() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CpuFamily {
    Intel,
    Amd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum FormFactor {
    MiniItx,
    MicroAtx,
    Atx,
}

/// Pairwise compatibility rules over brand/model text. The rule set is
/// intentionally permissive: every predicate passes unless an explicit
/// contradiction keyword is found, so sparsely-labelled catalog entries are
/// never rejected on missing information.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompatibilityChecker;

impl CompatibilityChecker {
    pub fn check(&self, components: &BTreeMap<Category, Component>) -> CompatibilityReport {
        let mut issues = Vec::new();

        let cpu = components.get(&Category::Cpu);
        let motherboard = components.get(&Category::Motherboard);
        let ram = components.get(&Category::Ram);
        let case = components.get(&Category::Case);

        if let (Some(cpu), Some(motherboard)) = (cpu, motherboard) {
            if !cpu_matches_motherboard(cpu, motherboard) {
                issues.push(format!(
                    "CPU {} is not compatible with motherboard {}",
                    cpu.display_name(),
                    motherboard.display_name()
                ));
            }
        }

        if let (Some(ram), Some(motherboard)) = (ram, motherboard) {
            if !ram_matches_motherboard(ram, motherboard) {
                issues.push("RAM generation is not compatible with the motherboard".to_string());
            }
        }

        if let (Some(case), Some(motherboard)) = (case, motherboard) {
            if !case_fits_motherboard(case, motherboard) {
                issues.push(
                    "Case size is not compatible with the motherboard form factor".to_string(),
                );
            }
        }

        CompatibilityReport { is_compatible: issues.is_empty(), issues }
    }

    /// Convenience for probing a single replacement against the rest of a
    /// build.
    pub fn check_with(
        &self,
        components: &BTreeMap<Category, Component>,
        replacement: &Component,
    ) -> CompatibilityReport {
        let mut probe = components.clone();
        probe.insert(replacement.category, replacement.clone());
        self.check(&probe)
    }
}

fn searchable_text(component: &Component) -> String {
    format!("{} {}", component.brand, component.model).to_ascii_lowercase()
}

fn cpu_family(text: &str) -> Option<CpuFamily> {
    if text.contains("intel") || text.contains("core i") {
        Some(CpuFamily::Intel)
    } else if text.contains("amd") || text.contains("ryzen") {
        Some(CpuFamily::Amd)
    } else {
        None
    }
}

fn board_family(text: &str) -> Option<CpuFamily> {
    let intel = text.contains("intel") || text.contains("lga");
    let amd = text.contains("amd") || text.contains("am4") || text.contains("am5");
    match (intel, amd) {
        (true, false) => Some(CpuFamily::Intel),
        (false, true) => Some(CpuFamily::Amd),
        // Ambiguous or unlabelled boards are not contradicted.
        _ => None,
    }
}

fn cpu_matches_motherboard(cpu: &Component, motherboard: &Component) -> bool {
    let cpu_text = searchable_text(cpu);
    let board_text = searchable_text(motherboard);

    match (cpu_family(&cpu_text), board_family(&board_text)) {
        (Some(cpu), Some(board)) => cpu == board,
        _ => true,
    }
}

fn ram_matches_motherboard(ram: &Component, motherboard: &Component) -> bool {
    let ram_text = searchable_text(ram);
    let board_text = searchable_text(motherboard);

    if ram_text.contains("ddr5") && board_text.contains("ddr4") && !board_text.contains("ddr5") {
        return false;
    }
    if ram_text.contains("ddr4") && board_text.contains("ddr5") && !board_text.contains("ddr4") {
        return false;
    }
    true
}

fn form_factor(text: &str) -> Option<FormFactor> {
    if text.contains("mini itx") || text.contains("mini-itx") || text.contains("miniitx") || text.contains("itx") {
        Some(FormFactor::MiniItx)
    } else if text.contains("micro atx") || text.contains("micro-atx") || text.contains("microatx") || text.contains("matx") {
        Some(FormFactor::MicroAtx)
    } else if text.contains("atx") {
        Some(FormFactor::Atx)
    } else {
        None
    }
}

fn case_fits_motherboard(case: &Component, motherboard: &Component) -> bool {
    let case_text = searchable_text(case);
    let board_text = searchable_text(motherboard);

    match (form_factor(&case_text), form_factor(&board_text)) {
        // A case accepts its own form factor and anything smaller.
        (Some(case_form), Some(board_form)) => case_form >= board_form,
        _ => true,
    }
}
