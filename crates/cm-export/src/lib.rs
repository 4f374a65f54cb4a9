//! Standalone export of an annotated chart frame.
//!
//! The generated script carries its own copy of the drawing runtime (as
//! dependency-ordered fragments), a frozen JSON state and inlined images,
//! so it renders without the engine and without network access.

pub mod assets;
pub mod constants;
pub mod error;
pub mod fragment;
pub mod runtime;
pub mod script;
pub mod state;

pub use assets::{AssetInliner, AssetSource, AssetUrl, NoAssets, classify};
pub use error::{ExportError, ExportResult};
pub use fragment::{Fragment, FragmentSet};
pub use script::{ExportArtifact, ExportInput, generate};
pub use state::ExportState;
