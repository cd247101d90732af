//! Display metrics derived from the raw specification.
//!
//! Both helpers are pure: the prediction payload carries their output, but
//! nothing is stored between submissions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse four-bucket classification of display resolution by total pixel
/// count. Serializes exactly as `Low|Mid|High|Ultra` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionCategory {
    Low,
    Mid,
    High,
    Ultra,
}

impl fmt::Display for ResolutionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionCategory::Low => "Low",
            ResolutionCategory::Mid => "Mid",
            ResolutionCategory::High => "High",
            ResolutionCategory::Ultra => "Ultra",
        };
        write!(f, "{}", name)
    }
}

// Inclusive upper bounds; a boundary value belongs to the lower category.
const LOW_MAX_PIXELS: u64 = 1366 * 768;
const MID_MAX_PIXELS: u64 = 1920 * 1080;
const HIGH_MAX_PIXELS: u64 = 2560 * 1600;

/// Diagonal pixel density in pixels per inch, rounded to 2 decimals.
/// Returns 0 when the screen size is zero or negative (guards divide-by-zero
/// for specs the form layer failed to range-check).
pub fn derive_ppi(width: u32, height: u32, inches: f64) -> f64 {
    if inches <= 0.0 {
        return 0.0;
    }
    let diagonal_pixels = ((width as f64).powi(2) + (height as f64).powi(2)).sqrt();
    round2(diagonal_pixels / inches)
}

/// Classify a resolution by total pixel count.
pub fn derive_resolution_category(width: u32, height: u32) -> ResolutionCategory {
    let total_pixels = width as u64 * height as u64;
    if total_pixels <= LOW_MAX_PIXELS {
        ResolutionCategory::Low
    } else if total_pixels <= MID_MAX_PIXELS {
        ResolutionCategory::Mid
    } else if total_pixels <= HIGH_MAX_PIXELS {
        ResolutionCategory::High
    } else {
        ResolutionCategory::Ultra
    }
}

/// Round to 2 decimal places, half away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
