//! Identifiers: interned overlay ids and chart element keys.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide interner behind every [`OverlayId`].
static OVERLAY_IDS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Counter behind generated ids. Never reset, so a generated id is never
/// handed out twice in one process.
static GENERATED: AtomicU64 = AtomicU64::new(1);

/// Id of a free-floating overlay, as assigned by the host. Interned, so it
/// is `Copy` and compares in O(1); crosses the JSON boundary as a plain string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct OverlayId(Spur);

impl OverlayId {
    pub fn intern(s: &str) -> Self {
        OverlayId(OVERLAY_IDS.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        OVERLAY_IDS.resolve(&self.0)
    }

    /// The host sent no id (or an empty one).
    pub fn is_unset(&self) -> bool {
        self.as_str().trim().is_empty()
    }

    /// A fresh `<kind>_<n>` id that `taken` rejects as unused.
    pub fn generate(kind: &str, taken: impl Fn(OverlayId) -> bool) -> Self {
        loop {
            let n = GENERATED.fetch_add(1, Ordering::Relaxed);
            let id = Self::intern(&format!("{kind}_{n}"));
            if !taken(id) {
                return id;
            }
        }
    }
}

impl From<String> for OverlayId {
    fn from(s: String) -> Self {
        OverlayId::intern(&s)
    }
}

impl From<OverlayId> for String {
    fn from(id: OverlayId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Debug for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OverlayId").field(&self.as_str()).finish()
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key of a chart element: `(datasetIndex, pointIndex)`.
///
/// Ordering is dataset-major, so iterating a sorted collection of keys
/// visits elements in the stable index order a redraw pass requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointKey {
    pub dataset_index: usize,
    pub point_index: usize,
}

impl PointKey {
    pub const fn new(dataset_index: usize, point_index: usize) -> Self {
        Self {
            dataset_index,
            point_index,
        }
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.dataset_index, self.point_index)
    }
}
