pub mod catalog;
pub mod metrics;

use serde::{Deserialize, Serialize};

/// A laptop specification as supplied by the form layer.
///
/// Field names serialize in the camelCase form the form layer uses.
/// Weight is in kilograms, screen size in inches, RAM and all storage
/// fields in GB. The four storage fields are independent: a laptop with
/// a 256 GB SSD and a 1 TB HDD has `ssd: 256.0, hdd: 1000.0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaptopSpec {
    pub company: String,
    pub type_name: String,
    pub os: String,
    /// Screen resolution string, e.g. "1920x1080"
    pub screen_resolution: String,
    pub ips_panel: bool,
    pub touchscreen: bool,
    pub weight: f64,
    pub inches: f64,
    pub ram: f64,
    pub cpu_category: String,
    pub cpu_speed_ghz: f64,
    pub gpu_category: String,
    pub ssd: f64,
    pub hdd: f64,
    pub flash: f64,
    pub hybrid: f64,
}

/// Split a resolution string like "1920x1080" into (width, height).
///
/// Both halves must parse as positive integers. Malformed input returns a
/// descriptive error rather than panicking.
pub fn parse_resolution(resolution: &str) -> Result<(u32, u32), String> {
    let (w, h) = resolution.split_once('x').ok_or_else(|| {
        format!(
            "Invalid screen resolution '{}': expected WIDTHxHEIGHT, e.g. 1920x1080",
            resolution
        )
    })?;

    let width: u32 = w
        .trim()
        .parse()
        .map_err(|_| format!("Invalid resolution width '{}' in '{}'", w, resolution))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|_| format!("Invalid resolution height '{}' in '{}'", h, resolution))?;

    if width == 0 || height == 0 {
        return Err(format!(
            "Resolution dimensions must be positive, got '{}'",
            resolution
        ));
    }

    Ok((width, height))
}
