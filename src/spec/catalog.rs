//! Closed string sets the form layer offers for the dropdown fields.
//!
//! The pipeline itself never enforces membership: an out-of-set value is a
//! data-entry concern of the form layer. `check_spec` surfaces non-membership
//! as warnings so callers can log them before submitting.

use serde::Serialize;

use super::LaptopSpec;

pub const COMPANIES: &[&str] = &[
    "Apple", "HP", "Acer", "Asus", "Dell", "Lenovo", "Chuwi", "MSI", "Microsoft", "Toshiba",
    "Huawei", "Xiaomi", "Vero", "Razer", "Mediacom", "Samsung", "Google", "Fujitsu", "LG",
];

pub const LAPTOP_TYPES: &[&str] = &[
    "Notebook",
    "Ultrabook",
    "Gaming",
    "2 in 1 Convertible",
    "Workstation",
    "Netbook",
];

pub const OPERATING_SYSTEMS: &[&str] = &[
    "Windows 10",
    "macOS",
    "Linux",
    "No OS",
    "Windows 7",
    "Chrome OS",
    "Android",
];

pub const GPU_CATEGORIES: &[&str] = &[
    "Intel High-End",
    "Intel Low-End",
    "AMD High-End",
    "AMD Low-End",
    "Nvidia Mid-End",
    "Intel Mid-End",
    "Nvidia High-End",
    "AMD Mid-End",
    "Nvidia Low-End",
    "AMD Other",
    "Nvidia Quadro",
    "AMD Firepro",
    "Intel Other",
];

pub const CPU_CATEGORIES: &[&str] = &[
    "Intel Core i7",
    "Intel Core i5",
    "Intel Core i3",
    "Intel Celeron",
    "Intel Pentium",
    "Intel Atom",
    "Intel Xeon",
    "Intel Other",
    "AMD Ryzen",
    "AMD A-Series",
    "AMD E-Series",
    "AMD FX",
    "AMD Other",
    "Samsung Cortex",
];

/// A warning for a field whose value falls outside its known set.
/// Warnings are advisory: the pipeline proceeds regardless.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogWarning {
    pub field: String,
    pub message: String,
    pub value: String,
}

/// Check the string-valued dropdown fields of a spec against their known
/// sets. Returns one warning per out-of-set value.
pub fn check_spec(spec: &LaptopSpec) -> Vec<CatalogWarning> {
    let mut warnings = Vec::new();

    check_membership("company", &spec.company, COMPANIES, &mut warnings);
    check_membership("typeName", &spec.type_name, LAPTOP_TYPES, &mut warnings);
    check_membership("os", &spec.os, OPERATING_SYSTEMS, &mut warnings);
    check_membership("cpuCategory", &spec.cpu_category, CPU_CATEGORIES, &mut warnings);
    check_membership("gpuCategory", &spec.gpu_category, GPU_CATEGORIES, &mut warnings);

    warnings
}

fn check_membership(field: &str, value: &str, allowed: &[&str], warnings: &mut Vec<CatalogWarning>) {
    if !allowed.contains(&value) {
        warnings.push(CatalogWarning {
            field: field.to_string(),
            message: format!("'{}' is not a known {} value", value, field),
            value: value.to_string(),
        });
    }
}
