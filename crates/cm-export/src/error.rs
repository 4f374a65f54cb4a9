use cm_core::{ChartType, OverlayId, PointKey};
use thiserror::Error;

pub type ExportResult<T> = Result<T, ExportError>;

/// Why an export was refused. Every variant is a configuration the
/// standalone script could not reproduce faithfully.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("canvas has no area: {width}x{height}")]
    EmptyCanvas { width: f64, height: f64 },

    #[error("annotation {key}: fillBar is only supported on bar charts, not {}", chart.as_str())]
    FillBarUnsupported { key: PointKey, chart: ChartType },

    #[error("annotation {key}: fillSlice is only supported on pie, doughnut and polar area charts, not {}", chart.as_str())]
    FillSliceUnsupported { key: PointKey, chart: ChartType },

    #[error("annotation {key}: image has no URL")]
    EmptyImageUrl { key: PointKey },

    #[error("overlay {id}: natural size requested but the image has not been measured yet")]
    NaturalSizeUnknown { id: OverlayId },

    #[error("blob URL cannot be embedded: {url}")]
    UnresolvedBlob { url: String },

    #[error("asset {url} could not be inlined: {reason}")]
    Asset { url: String, reason: String },

    #[error("template fragment `{name}` depends on unknown fragment `{missing}`")]
    UnknownFragment { name: String, missing: String },

    #[error("template fragments form a dependency cycle through `{0}`")]
    FragmentCycle(String),

    #[error("state serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ExportError {
    /// Message for the export action to show the user.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
