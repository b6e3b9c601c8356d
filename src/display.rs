//! Display resolution model and aspect-ratio classification.
//!
//! Native display modes are merged with a fixed table of standard
//! resolutions into one picker list: sorted by descending height and
//! deduplicated by exact dimensions. Heights are always reported even
//! because the downstream H.264 encoder rejects odd dimensions.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ASPECT_REDUCTION_CAP, ASPECT_TOLERANCE, COMMON_ASPECT_RATIOS, STANDARD_RESOLUTIONS,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: String,
    pub is_native: bool,
}

impl Resolution {
    pub fn new(width: u32, height: u32, is_native: bool) -> Self {
        let height = force_even_height(height);
        Self {
            width,
            height,
            aspect_ratio: aspect_ratio_label(width, height),
            is_native,
        }
    }

    pub fn label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Encoders require even dimensions; decrement an odd height by one.
pub fn force_even_height(height: u32) -> u32 {
    height & !1
}

/// Physical pixel dimensions of a display, from its logical size and scale.
pub fn scaled_dimensions(logical_width: f64, logical_height: f64, scale_factor: f64) -> (u32, u32) {
    let width = (logical_width * scale_factor).round() as u32;
    let height = (logical_height * scale_factor).round() as u32;
    (width, height)
}

/// Classifies an aspect ratio against the common set, falling back to a
/// GCD-reduced fraction. Reductions with a side above the cap (prime-ish
/// dimensions produce things like 683:384) get the 16:9 label instead.
pub fn aspect_ratio_label(width: u32, height: u32) -> String {
    if width == 0 || height == 0 {
        return "16:9".to_string();
    }

    let ratio = width as f64 / height as f64;
    for (label, value) in COMMON_ASPECT_RATIOS {
        if (ratio - value).abs() <= ASPECT_TOLERANCE {
            return label.to_string();
        }
    }

    let divisor = gcd(width, height);
    let (w, h) = (width / divisor, height / divisor);
    if w > ASPECT_REDUCTION_CAP || h > ASPECT_REDUCTION_CAP {
        return "16:9".to_string();
    }
    format!("{}:{}", w, h)
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Merges native display resolutions with the standard table.
/// Natives win on duplicates; the result is sorted by descending height,
/// then descending width.
pub fn merge_resolutions(native: Vec<Resolution>) -> Vec<Resolution> {
    let mut merged = native;

    for (width, height) in STANDARD_RESOLUTIONS {
        if !merged.iter().any(|r| r.width == width && r.height == height) {
            merged.push(Resolution::new(width, height, false));
        }
    }

    merged.sort_by(|a, b| b.height.cmp(&a.height).then(b.width.cmp(&a.width)));
    merged.dedup_by(|a, b| a.width == b.width && a.height == b.height);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_even_height() {
        assert_eq!(force_even_height(1080), 1080);
        assert_eq!(force_even_height(1081), 1080);
        assert_eq!(force_even_height(721), 720);
        assert_eq!(force_even_height(1), 0);
    }

    #[test]
    fn test_aspect_common_ratios() {
        assert_eq!(aspect_ratio_label(1920, 1080), "16:9");
        assert_eq!(aspect_ratio_label(1024, 768), "4:3");
        assert_eq!(aspect_ratio_label(2160, 1440), "3:2");
        assert_eq!(aspect_ratio_label(3440, 1440), "21:9");
        // Near-16:9 panel sizes match at the tolerance stage
        assert_eq!(aspect_ratio_label(1366, 768), "16:9");
    }

    #[test]
    fn test_aspect_ultrawide_band() {
        // Both common ultrawides sit 0.04-0.06 off 21:9 exactly; the
        // tolerance has to cover that slack without swallowing 5:4
        assert_eq!(aspect_ratio_label(3440, 1440), "21:9");
        assert_eq!(aspect_ratio_label(2560, 1080), "21:9");
        assert_eq!(aspect_ratio_label(1280, 1024), "5:4");
    }

    #[test]
    fn test_aspect_gcd_fallback() {
        // 1.25 is outside the 4:3 tolerance band, reduces cleanly to 5:4
        assert_eq!(aspect_ratio_label(1280, 1024), "5:4");
    }

    #[test]
    fn test_aspect_reduction_cap() {
        // 1234:567 is already reduced (coprime) and far from every common
        // ratio; sides above the cap collapse to the 16:9 label
        assert_eq!(aspect_ratio_label(1234, 567), "16:9");
    }

    #[test]
    fn test_scaled_dimensions() {
        assert_eq!(scaled_dimensions(1512.0, 982.0, 2.0), (3024, 1964));
        assert_eq!(scaled_dimensions(1536.0, 864.0, 1.25), (1920, 1080));
    }

    #[test]
    fn test_merge_dedup_and_order() {
        let native = vec![Resolution::new(1920, 1080, true)];
        let merged = merge_resolutions(native);

        // Native entry survives, standard duplicate dropped
        let fhd: Vec<_> = merged
            .iter()
            .filter(|r| r.width == 1920 && r.height == 1080)
            .collect();
        assert_eq!(fhd.len(), 1);
        assert!(fhd[0].is_native);

        // Sorted by descending height
        for pair in merged.windows(2) {
            assert!(pair[0].height >= pair[1].height);
        }
    }

    #[test]
    fn test_resolution_normalizes_height() {
        let r = Resolution::new(1920, 1081, true);
        assert_eq!(r.height, 1080);
        assert_eq!(r.label(), "1920x1080");
    }
}
