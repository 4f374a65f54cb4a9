//! The fragments of the standalone runtime.

use crate::constants::{CONSTANTS, constants_fragment};
use crate::fragment::{Fragment, FragmentSet};

pub const GEOMETRY: &str = "geometry";
pub const ANCHOR: &str = "anchor";
pub const FIT: &str = "fit";
pub const SHAPES: &str = "shapes";
pub const ARROW: &str = "arrow";
pub const TEXT: &str = "text";
pub const IMAGE_PLUGIN: &str = "image-plugin";
pub const LABEL_PLUGIN: &str = "label-plugin";
pub const OVERLAY_PLUGIN: &str = "overlay-plugin";
pub const CALLOUT_DRAG: &str = "callout-drag";
pub const MOUNT: &str = "mount";

/// Every fragment an export can draw from.
pub fn runtime() -> FragmentSet {
    FragmentSet::new()
        .with(constants_fragment())
        .with(Fragment::embedded(GEOMETRY, &[CONSTANTS], include_str!("../js/geometry.js")))
        .with(Fragment::embedded(ANCHOR, &[GEOMETRY], include_str!("../js/anchor.js")))
        .with(Fragment::embedded(FIT, &[GEOMETRY], include_str!("../js/fit.js")))
        .with(Fragment::embedded(SHAPES, &[GEOMETRY], include_str!("../js/shapes.js")))
        .with(Fragment::embedded(ARROW, &[GEOMETRY], include_str!("../js/arrow.js")))
        .with(Fragment::embedded(TEXT, &[], include_str!("../js/text.js")))
        .with(Fragment::embedded(
            IMAGE_PLUGIN,
            &[FIT, SHAPES],
            include_str!("../js/image-plugin.js"),
        ))
        .with(Fragment::embedded(
            LABEL_PLUGIN,
            &[TEXT, SHAPES],
            include_str!("../js/label-plugin.js"),
        ))
        .with(Fragment::embedded(
            OVERLAY_PLUGIN,
            &[SHAPES, TEXT],
            include_str!("../js/overlay-plugin.js"),
        ))
        .with(Fragment::embedded(CALLOUT_DRAG, &[ANCHOR], include_str!("../js/callout-drag.js")))
        .with(Fragment::embedded(MOUNT, &[ANCHOR, ARROW], include_str!("../js/mount.js")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bare_mount_pulls_in_only_its_closure() {
        let set = runtime();
        let order: Vec<&str> = set
            .resolve(&[MOUNT])
            .expect("runtime is acyclic")
            .iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(order.first(), Some(&CONSTANTS));
        assert_eq!(order.last(), Some(&MOUNT));
        let mut names = order.clone();
        names.sort_unstable();
        assert_eq!(names, vec![ANCHOR, ARROW, CONSTANTS, GEOMETRY, MOUNT]);
    }

    #[test]
    fn every_fragment_resolves() {
        let set = runtime();
        let all = [
            MOUNT,
            IMAGE_PLUGIN,
            LABEL_PLUGIN,
            OVERLAY_PLUGIN,
            CALLOUT_DRAG,
        ];
        let order = set.resolve(&all).expect("runtime is acyclic");
        assert_eq!(order.len(), set.len());
    }
}
