//! Integration tests: annotation canvas driven by synthetic input.
//!
//! Feeds pointer and touch events through `AnnotationCanvas` and checks the
//! callout store, the emitted intents and the next frame's resolved points.

use cm_core::{
    Anchor, Annotation, AnnotationConfig, BarGeometry, ChartType, Element, ElementGeometry,
    Intent, OverlayId, OverlayObject, PointKey, Target,
};
use cm_editor::input::{InputEvent, Modifiers, TouchPhase};
use cm_editor::resize::apply_resize;
use cm_editor::{AnnotationCanvas, DragSession, InteractionMachine};
use cm_render::{Handle, HitScene, LoadedImage, RecordingSurface};
use kurbo::{Point, Rect, Size, Vec2};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const KEY: PointKey = PointKey::new(0, 0);

fn bar_at(x: f64, y: f64) -> Element {
    Element::new(
        KEY,
        ElementGeometry::Bar(BarGeometry {
            x,
            y,
            base: 300.0,
            width: 20.0,
            height: 300.0 - y,
            horizontal: false,
        }),
    )
}

fn callout_canvas() -> AnnotationCanvas<String> {
    let mut canvas = AnnotationCanvas::new(ChartType::Bar);
    canvas.set_elements(vec![bar_at(10.0, 10.0)]);
    let mut config = AnnotationConfig::text("note");
    config.anchor = Anchor::Callout;
    canvas.set_annotations([Annotation::new(KEY, config)]);
    canvas
}

fn surface() -> RecordingSurface {
    RecordingSurface::new(400.0, 400.0)
}

// ─── Callout stickiness ─────────────────────────────────────────────────

#[test]
fn dragged_callout_sticks_across_frames() {
    let mut canvas = callout_canvas();
    let mut s = surface();
    canvas.draw(&mut s);
    assert_eq!(canvas.resolved_point(KEY), Some(Point::new(50.0, -30.0)));

    canvas.handle_event(&InputEvent::pointer_down(50.0, -30.0));
    assert!(canvas.handle_event(&InputEvent::pointer_move(60.0, 20.0)));
    canvas.handle_event(&InputEvent::pointer_up(60.0, 20.0));
    assert_eq!(canvas.callouts().get(KEY), Some(Point::new(60.0, 20.0)));

    canvas.draw(&mut s);
    assert_eq!(canvas.resolved_point(KEY), Some(Point::new(60.0, 20.0)));
    // The element moving does not pull the callout along.
    canvas.set_elements(vec![bar_at(200.0, 50.0)]);
    canvas.draw(&mut s);
    assert_eq!(canvas.resolved_point(KEY), Some(Point::new(60.0, 20.0)));

    let moves: Vec<Intent> = canvas
        .take_intents()
        .into_iter()
        .filter(|i| matches!(i, Intent::Move { .. }))
        .collect();
    assert_eq!(
        moves,
        vec![Intent::Move {
            target: Target::Callout(KEY),
            x: 60.0,
            y: 20.0
        }]
    );
}

#[test]
fn touch_drag_mirrors_mouse_drag() {
    let mut canvas = callout_canvas();
    let mut s = surface();
    canvas.draw(&mut s);

    let events = [
        InputEvent::from_touch(TouchPhase::Start, 1, Point::new(50.0, -30.0)),
        InputEvent::from_touch(TouchPhase::Move, 2, Point::new(500.0, 500.0)),
        InputEvent::from_touch(TouchPhase::Move, 1, Point::new(70.0, 0.0)),
        InputEvent::from_touch(TouchPhase::End, 1, Point::new(70.0, 0.0)),
    ];
    for event in events.iter().flatten() {
        canvas.handle_event(event);
    }
    assert_eq!(canvas.callouts().get(KEY), Some(Point::new(70.0, 0.0)));
    assert!(!canvas.is_interacting());
}

#[test]
fn leaving_the_surface_ends_a_drag_like_release() {
    let run = |end: InputEvent| {
        let mut canvas = callout_canvas();
        let mut s = surface();
        canvas.draw(&mut s);
        canvas.handle_event(&InputEvent::pointer_down(50.0, -30.0));
        canvas.handle_event(&InputEvent::pointer_move(80.0, 40.0));
        canvas.handle_event(&end);
        // Later moves go nowhere.
        canvas.handle_event(&InputEvent::pointer_move(0.0, 0.0));
        (canvas.callouts().get(KEY), canvas.is_interacting())
    };
    assert_eq!(run(InputEvent::PointerLeave), run(InputEvent::pointer_up(80.0, 40.0)));
    assert_eq!(run(InputEvent::PointerLeave), (Some(Point::new(80.0, 40.0)), false));
}

// ─── Overlay resize ─────────────────────────────────────────────────────

#[test]
fn southeast_handle_grows_image_from_fixed_origin() {
    let mut canvas: AnnotationCanvas<String> = AnnotationCanvas::new(ChartType::Bar);
    canvas.set_overlays([OverlayObject::image(
        "logo",
        "logo.png",
        Rect::new(100.0, 100.0, 200.0, 200.0),
    )]);
    canvas.set_selected(Some(OverlayId::intern("logo")));
    let mut s = surface();
    canvas.draw(&mut s);

    canvas.handle_event(&InputEvent::pointer_down(200.0, 200.0));
    canvas.handle_event(&InputEvent::pointer_move(220.0, 220.0));
    canvas.handle_event(&InputEvent::pointer_up(220.0, 220.0));

    let frame = &canvas
        .overlays()
        .get(OverlayId::intern("logo"))
        .expect("overlay kept")
        .frame;
    assert_eq!((frame.x, frame.y, frame.width, frame.height), (100.0, 100.0, 120.0, 120.0));
}

#[test]
fn shift_corner_drag_keeps_the_image_aspect() {
    let mut canvas: AnnotationCanvas<String> = AnnotationCanvas::new(ChartType::Bar);
    canvas.set_overlays([OverlayObject::image(
        "banner",
        "banner.png",
        Rect::new(100.0, 100.0, 200.0, 150.0),
    )]);
    canvas.set_selected(Some(OverlayId::intern("banner")));
    canvas.draw(&mut surface());

    canvas.handle_event(&InputEvent::pointer_down(200.0, 150.0));
    canvas.handle_event(&InputEvent::PointerMove {
        x: 250.0,
        y: 160.0,
        modifiers: Modifiers::SHIFT,
    });
    canvas.handle_event(&InputEvent::pointer_up(250.0, 160.0));

    let frame = &canvas
        .overlays()
        .get(OverlayId::intern("banner"))
        .expect("overlay kept")
        .frame;
    assert_eq!((frame.x, frame.y, frame.width, frame.height), (100.0, 100.0, 150.0, 75.0));
}

#[test]
fn resize_with_stale_scene_uses_snapshot() {
    // Two moves without a redraw in between both measure from pointer-down.
    let mut machine = InteractionMachine::new();
    let mut callouts = cm_core::CalloutStore::new();
    let logo = OverlayObject::image("snap", "s.png", Rect::new(0.0, 0.0, 100.0, 100.0));
    let scene = HitScene {
        overlays: vec![logo],
        callouts: Vec::new(),
        selected: Some(OverlayId::intern("snap")),
    };
    machine.handle_event(&InputEvent::pointer_down(100.0, 100.0), &scene, &mut callouts);
    assert!(matches!(
        machine.session(),
        DragSession::Resizing {
            handle: Handle::Se,
            ..
        }
    ));
    machine.handle_event(&InputEvent::pointer_move(130.0, 130.0), &scene, &mut callouts);
    let out = machine.handle_event(&InputEvent::pointer_move(110.0, 105.0), &scene, &mut callouts);
    match out.intents.first() {
        Some(Intent::Resize { width, height, .. }) => assert_eq!((*width, *height), (110.0, 105.0)),
        other => panic!("expected a resize, got {other:?}"),
    }
}

// ─── Image cache ────────────────────────────────────────────────────────

#[test]
fn shared_url_decodes_once_and_redraws_once() {
    let mut canvas: AnnotationCanvas<String> = AnnotationCanvas::new(ChartType::Bar);
    canvas.set_elements(vec![bar_at(50.0, 100.0), {
        let mut e = bar_at(120.0, 100.0);
        e.key = PointKey::new(0, 1);
        e
    }]);
    canvas.set_annotations([
        Annotation::new(KEY, AnnotationConfig::image("shared.png")),
        Annotation::new(PointKey::new(0, 1), AnnotationConfig::image("shared.png")),
    ]);
    let mut s = surface();
    canvas.draw(&mut s);
    assert_eq!(canvas.take_fetches(), vec!["shared.png".to_string()]);

    let image = LoadedImage {
        image: "shared.png".to_string(),
        natural: Size::new(64.0, 64.0),
    };
    assert!(canvas.image_loaded("shared.png", image.clone()));
    assert!(!canvas.image_loaded("shared.png", image));

    let mut s = surface();
    canvas.draw(&mut s);
    let drawn: Vec<&str> = s.images().into_iter().map(|(url, _, _)| url).collect();
    assert_eq!(drawn, vec!["shared.png", "shared.png"]);
    assert!(canvas.take_fetches().is_empty());
}

#[test]
fn failed_image_is_not_refetched() {
    let mut canvas: AnnotationCanvas<String> = AnnotationCanvas::new(ChartType::Bar);
    canvas.set_elements(vec![bar_at(50.0, 100.0)]);
    canvas.set_annotations([Annotation::new(KEY, AnnotationConfig::image("broken.png"))]);
    let mut s = surface();
    canvas.draw(&mut s);
    assert_eq!(canvas.take_fetches().len(), 1);
    assert!(!canvas.image_failed("broken.png", "decode error"));
    canvas.draw(&mut s);
    assert!(canvas.take_fetches().is_empty());
}

#[test]
fn backfill_during_a_draw_asks_for_the_frame_that_paints_it() {
    let mut canvas: AnnotationCanvas<String> = AnnotationCanvas::new(ChartType::Bar);
    canvas.set_elements(vec![bar_at(50.0, 100.0)]);
    canvas.set_annotations([Annotation::new(KEY, AnnotationConfig::image("a.png"))]);
    assert!(!canvas.draw(&mut surface()));
    assert_eq!(canvas.take_fetches(), vec!["a.png".to_string()]);
    let image = LoadedImage {
        image: "a.png".to_string(),
        natural: Size::new(64.0, 32.0),
    };
    assert!(canvas.image_loaded("a.png", image));
    assert!(!canvas.draw(&mut surface()));

    // Added after its image decoded: no completion will ever size it.
    let mut late = OverlayObject::image("late", "a.png", Rect::new(10.0, 10.0, 20.0, 20.0));
    late.frame.use_natural_size = true;
    canvas.set_overlays([late]);
    assert!(canvas.draw(&mut surface()));

    let frame = &canvas
        .overlays()
        .get(OverlayId::intern("late"))
        .expect("overlay kept")
        .frame;
    assert_eq!(
        (frame.width, frame.height, frame.use_natural_size),
        (160.0, 80.0, false)
    );
    assert_eq!(frame.natural_size(), Some(Size::new(64.0, 32.0)));

    assert!(!canvas.draw(&mut surface()));
    assert!(canvas.request_redraw());
}

// ─── Properties ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn opposite_corners_resize_symmetrically(dx in -200.0f64..200.0, dy in -200.0f64..200.0) {
        let start = Rect::new(50.0, 50.0, 150.0, 130.0);
        let se = apply_resize(Handle::Se, start, Vec2::new(dx, dy));
        let nw = apply_resize(Handle::Nw, start, Vec2::new(-dx, -dy));
        prop_assert!((se.width() - nw.width()).abs() < 1e-9);
        prop_assert!((se.height() - nw.height()).abs() < 1e-9);
    }
}
