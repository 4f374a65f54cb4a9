//! The state literal embedded in an exported script.

use cm_core::{Annotation, ChartType, Element, FeatureToggles, OverlayObject};
use serde::Serialize;

/// One frame, frozen. Callout positions are resolved into
/// `calloutX`/`calloutY`, overlay sizes into `width`/`height`, and every
/// image URL is a `data:` URI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportState {
    pub chart_type: ChartType,
    pub width: f64,
    pub height: f64,
    pub toggles: FeatureToggles,
    pub elements: Vec<Element>,
    pub annotations: Vec<Annotation>,
    /// Visible overlays in draw order.
    pub overlays: Vec<OverlayObject>,
}

impl ExportState {
    /// JSON safe to paste inside a `<script>` element.
    pub fn to_script_literal(&self) -> serde_json::Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(json
            .replace('<', "\\u003c")
            .replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029"))
    }
}
