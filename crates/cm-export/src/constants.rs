//! The `constants` fragment, generated from the engine's own tunables.

use crate::fragment::Fragment;
use cm_core::{ShapeKind, anchor, fit, geometry};
use cm_render::{Shadow, arrow, hit, label, overlay, shape};
use std::fmt::Write;

/// Name of the generated fragment.
pub const CONSTANTS: &str = "constants";

fn num(v: f64) -> String {
    format!("{v}")
}

fn quoted(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// Every constant the standalone runtime reads, as `(name, JS literal)`.
pub fn constant_table() -> Vec<(&'static str, String)> {
    let shadow = Shadow::default();
    let dash: Vec<String> = overlay::PLACEHOLDER_DASH.iter().map(|d| num(*d)).collect();
    vec![
        ("BAR_MARGIN", num(anchor::BAR_MARGIN)),
        ("POINT_MARGIN", num(anchor::POINT_MARGIN)),
        ("DEFAULT_CALLOUT_OFFSET", num(anchor::DEFAULT_CALLOUT_OFFSET)),
        ("SECTOR_CENTER_FRACTION", num(anchor::SECTOR_CENTER_FRACTION)),
        ("SECTOR_INSIDE_FRACTION", num(anchor::SECTOR_INSIDE_FRACTION)),
        ("SECTOR_OUTSIDE_SIZE_FACTOR", num(anchor::SECTOR_OUTSIDE_SIZE_FACTOR)),
        ("SECTOR_BOUNDS_STEPS", geometry::SECTOR_BOUNDS_STEPS.to_string()),
        ("SECTOR_GRID_STEPS", fit::SECTOR_GRID_STEPS.to_string()),
        ("SECTOR_SEARCH_ITERATIONS", fit::SECTOR_SEARCH_ITERATIONS.to_string()),
        ("ANGLE_EPSILON", num(fit::ANGLE_EPSILON)),
        ("RADIUS_EPSILON", num(fit::RADIUS_EPSILON)),
        ("ROUNDED_RADIUS_FRACTION", num(ShapeKind::ROUNDED_RADIUS_FRACTION)),
        ("RADIAL_ELBOW_LENGTH", num(arrow::RADIAL_ELBOW_LENGTH)),
        ("MIN_SEGMENT", num(arrow::MIN_SEGMENT)),
        ("STAR_POINTS", label::STAR_POINTS.to_string()),
        ("STAR_INNER_RATIO", num(label::STAR_INNER_RATIO)),
        ("CALLOUT_HIT_DIVISOR", num(hit::CALLOUT_HIT_DIVISOR)),
        ("PLACEHOLDER_COLOR", quoted(overlay::PLACEHOLDER_COLOR)),
        ("PLACEHOLDER_DASH", format!("[{}]", dash.join(", "))),
        ("SHADOW_COLOR", quoted(&shadow.color)),
        ("SHADOW_BLUR", num(shadow.blur)),
        ("SHADOW_OFFSET_X", num(shadow.offset.x)),
        ("SHADOW_OFFSET_Y", num(shadow.offset.y)),
        ("SHADOW_BACKDROP", quoted(shape::SHADOW_BACKDROP)),
    ]
}

pub fn constants_fragment() -> Fragment {
    let mut source = String::from("const C = Object.freeze({\n");
    for (name, value) in constant_table() {
        let _ = writeln!(source, "  {name}: {value},");
    }
    source.push_str("});\n");
    Fragment::generated(CONSTANTS, &[], source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_are_plain_decimals() {
        let table = constant_table();
        let get = |name: &str| {
            table
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("SECTOR_GRID_STEPS"), Some("30"));
        assert_eq!(get("ANGLE_EPSILON"), Some("0.001"));
        assert_eq!(get("MIN_SEGMENT"), Some("0.000001"));
        assert_eq!(get("PLACEHOLDER_COLOR"), Some("\"#86868B\""));
        assert_eq!(get("PLACEHOLDER_DASH"), Some("[4, 4]"));
    }

    #[test]
    fn fragment_freezes_one_object() {
        let f = constants_fragment();
        assert!(f.source.starts_with("const C = Object.freeze({\n"));
        assert!(f.source.contains("  BAR_MARGIN: 8,\n"));
        assert!(f.deps.is_empty());
    }
}
