//! Standalone script generation.
//!
//! `generate` validates the current frame, freezes it into an
//! [`ExportState`], inlines every image and stitches the fragments the
//! state actually needs around it.

use crate::assets::{AssetInliner, AssetSource};
use crate::error::{ExportError, ExportResult};
use crate::fragment::Fragment;
use crate::runtime::{CALLOUT_DRAG, IMAGE_PLUGIN, LABEL_PLUGIN, MOUNT, OVERLAY_PLUGIN, runtime};
use crate::state::ExportState;
use cm_core::{
    Anchor, Annotation, AnnotationConfig, CalloutStore, ChartFamily, ChartType, Content, Element,
    FeatureToggles, OverlayKind, OverlayObject, OverlayStore, PointKey, resolve, sort_elements,
};
use cm_render::annotation::content_enabled;
use kurbo::Size;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Everything the live engine knows about the current frame.
#[derive(Debug, Clone, Copy)]
pub struct ExportInput<'a> {
    pub chart_type: ChartType,
    pub canvas: Size,
    pub toggles: FeatureToggles,
    pub elements: &'a [Element],
    pub annotations: &'a BTreeMap<PointKey, AnnotationConfig>,
    pub callouts: &'a CalloutStore,
    pub overlays: &'a OverlayStore,
}

#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// Self-contained JavaScript. Defines `window.ChartmarkExport`.
    pub script: String,
    /// Fragments included, in emission order.
    pub fragments: Vec<&'static str>,
    pub state: ExportState,
}

pub fn generate(input: &ExportInput<'_>, assets: &dyn AssetSource) -> ExportResult<ExportArtifact> {
    let result = build(input, assets);
    match &result {
        Ok(artifact) => log::debug!(
            "export ready: {} fragments, {} bytes",
            artifact.fragments.len(),
            artifact.script.len()
        ),
        Err(e) => log::warn!("export refused: {e}"),
    }
    result
}

fn build(input: &ExportInput<'_>, assets: &dyn AssetSource) -> ExportResult<ExportArtifact> {
    let Size { width, height } = input.canvas;
    if !(width > 0.0 && height > 0.0) {
        return Err(ExportError::EmptyCanvas { width, height });
    }
    for (key, config) in input.annotations {
        validate_annotation(*key, config, input)?;
    }

    let mut inliner = AssetInliner::new(assets);
    let mut elements = input.elements.to_vec();
    sort_elements(&mut elements);

    let mut annotations = Vec::new();
    for element in &elements {
        let Some(config) = input.annotations.get(&element.key) else {
            continue;
        };
        if !content_enabled(config, &input.toggles) {
            continue;
        }
        let mut config = config.clone();
        if config.anchor == Anchor::Callout {
            let resolved = resolve(&element.geometry, &config, input.callouts, element.key);
            config.persist_callout(resolved.point);
        }
        if let Content::Image { url } = &mut config.content {
            *url = inliner.inline(url)?;
        }
        annotations.push(Annotation::new(element.key, config));
    }
    elements.retain(|e| annotations.iter().any(|a| a.key == e.key));

    let mut overlays = Vec::new();
    for o in input.overlays.draw_order() {
        if o.frame.visible {
            overlays.push(freeze_overlay(o, &mut inliner)?);
        }
    }

    let state = ExportState {
        chart_type: input.chart_type,
        width,
        height,
        toggles: input.toggles,
        elements,
        annotations,
        overlays,
    };

    let fragments = runtime();
    let ordered = fragments.resolve(&roots(&state))?;
    let script = assemble(&ordered, &state.to_script_literal()?);
    Ok(ExportArtifact {
        script,
        fragments: ordered.iter().map(|f| f.name).collect(),
        state,
    })
}

/// Configurations the standalone runtime cannot reproduce.
fn validate_annotation(key: PointKey, config: &AnnotationConfig, input: &ExportInput<'_>) -> ExportResult<()> {
    if !content_enabled(config, &input.toggles) {
        return Ok(());
    }
    let family = input.chart_type.family();
    if input.toggles.fill_area && config.fill_bar && family != ChartFamily::Bar {
        return Err(ExportError::FillBarUnsupported {
            key,
            chart: input.chart_type,
        });
    }
    if input.toggles.fill_area && config.fill_slice && family != ChartFamily::Sector {
        return Err(ExportError::FillSliceUnsupported {
            key,
            chart: input.chart_type,
        });
    }
    if let Content::Image { url } = &config.content
        && url.trim().is_empty()
    {
        return Err(ExportError::EmptyImageUrl { key });
    }
    Ok(())
}

/// Resolve the drawn size and inline the image.
fn freeze_overlay(o: &OverlayObject, inliner: &mut AssetInliner<'_>) -> ExportResult<OverlayObject> {
    if o.frame.use_natural_size && o.frame.natural_size().is_none() {
        return Err(ExportError::NaturalSizeUnknown { id: o.id() });
    }
    let mut frozen = o.clone();
    let size = o.frame.size();
    frozen.frame.width = size.width;
    frozen.frame.height = size.height;
    frozen.frame.use_natural_size = false;
    if let OverlayKind::Image { url } = &mut frozen.kind {
        *url = inliner.inline(url)?;
    }
    Ok(frozen)
}

fn roots(state: &ExportState) -> Vec<&'static str> {
    let mut roots = vec![MOUNT];
    if state.annotations.iter().any(|a| a.config.content.is_image()) {
        roots.push(IMAGE_PLUGIN);
    }
    if state.annotations.iter().any(|a| !a.config.content.is_image()) {
        roots.push(LABEL_PLUGIN);
    }
    if !state.overlays.is_empty() {
        roots.push(OVERLAY_PLUGIN);
    }
    if state.annotations.iter().any(|a| a.config.anchor == Anchor::Callout) {
        roots.push(CALLOUT_DRAG);
    }
    roots
}

fn assemble(fragments: &[&Fragment], state_literal: &str) -> String {
    let mut out = String::from("// Chartmark standalone export. Generated file.\n");
    out.push_str("(function (global) {\n\"use strict\";\nconst CM = { plugins: {} };\n\n");
    for f in fragments {
        out.push_str(&f.render());
        out.push('\n');
    }
    let _ = writeln!(out, "const STATE = {state_literal};");
    out.push_str(
        "global.ChartmarkExport = {\n  state: STATE,\n  mount(canvas) {\n    return CM.mount(canvas, STATE);\n  },\n};\n",
    );
    out.push_str("})(typeof window !== \"undefined\" ? window : globalThis);\n");
    out
}
