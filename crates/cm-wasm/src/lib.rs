//! WASM bridge for Chartmark. Exposes the annotation engine to the host
//! page's chart plugin.
//!
//! Compiled via `wasm-pack build --target web`.

mod json;
mod render2d;

use cm_core::{Annotation, ChartType, FeatureToggles, OverlayId, OverlayObject};
use cm_editor::{AnnotationCanvas, InputEvent, Modifiers, PointerButton, TouchPhase};
use cm_export::{ExportInput, generate};
use cm_render::LoadedImage;
use json::HostElement;
use kurbo::{Point, Size};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// One annotated chart surface. The host forwards chart geometry,
/// configuration and DOM events; intents come back as JSON.
#[wasm_bindgen]
pub struct ChartCanvas {
    canvas: AnnotationCanvas<HtmlImageElement>,
    width: f64,
    height: f64,
    /// Called from `requestAnimationFrame` when a frame is needed.
    redraw_callback: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl ChartCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        console_logger_setup();
        Self {
            canvas: AnnotationCanvas::new(ChartType::default()),
            width,
            height,
            redraw_callback: None,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.changed();
    }

    /// Render one frame: annotations over the chart, then overlays.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) {
        let mut surface = render2d::CanvasSurface::new(ctx, self.width, self.height);
        let needed = self.canvas.draw(&mut surface);
        self.schedule(needed);
    }

    /// `fn()` invoked on the next animation frame whenever the engine needs
    /// a redraw. Requests within one frame coalesce.
    pub fn set_redraw_callback(&mut self, callback: js_sys::Function) {
        self.redraw_callback = Some(callback);
    }

    // ─── Configuration ───────────────────────────────────────────────────

    /// Returns `false` for an unknown chart type.
    pub fn set_chart_type(&mut self, name: &str) -> bool {
        let Ok(chart_type) = serde_json::from_value::<ChartType>(serde_json::Value::from(name)) else {
            log::warn!("rejected chart type {name:?}");
            return false;
        };
        self.canvas.set_chart_type(chart_type);
        self.changed();
        true
    }

    /// Element descriptors for the current frame, as a JSON array.
    pub fn set_elements_json(&mut self, json: &str) -> bool {
        let Some(elements) = json::parse::<Vec<HostElement>>("elements", json) else {
            return false;
        };
        self.canvas
            .set_raw_elements(elements.iter().map(|e| (e.key, &e.raw)));
        self.changed();
        true
    }

    pub fn set_annotations_json(&mut self, json: &str) -> bool {
        let Some(annotations) = json::parse::<Vec<Annotation>>("annotations", json) else {
            return false;
        };
        self.canvas.set_annotations(annotations);
        self.changed();
        true
    }

    pub fn set_overlays_json(&mut self, json: &str) -> bool {
        let Some(overlays) = json::parse::<Vec<OverlayObject>>("overlays", json) else {
            return false;
        };
        self.canvas.set_overlays(overlays);
        self.changed();
        true
    }

    pub fn set_toggles_json(&mut self, json: &str) -> bool {
        let Some(toggles) = json::parse::<FeatureToggles>("toggles", json) else {
            return false;
        };
        self.canvas.set_toggles(toggles);
        self.changed();
        true
    }

    /// Select an overlay by id; empty string clears the selection.
    pub fn set_selected(&mut self, id: &str) {
        let id = (!id.is_empty()).then(|| OverlayId::intern(id));
        self.canvas.set_selected(id);
        self.changed();
    }

    pub fn get_selected_id(&self) -> String {
        self.canvas
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Handle pointer down. Returns `true` if a redraw is needed.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        self.feed(InputEvent::PointerDown {
            x,
            y,
            button: PointerButton::from_dom(button),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        self.feed(InputEvent::PointerMove {
            x,
            y,
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.feed(InputEvent::PointerUp { x, y })
    }

    pub fn handle_pointer_leave(&mut self) -> bool {
        self.feed(InputEvent::PointerLeave)
    }

    /// `phase` is `start`, `move`, `end` or `cancel`. Multi-touch is ignored.
    pub fn handle_touch(&mut self, phase: &str, touch_count: u32, x: f64, y: f64) -> bool {
        let phase = match phase {
            "start" => TouchPhase::Start,
            "move" => TouchPhase::Move,
            "end" => TouchPhase::End,
            "cancel" => TouchPhase::Cancel,
            _ => return false,
        };
        match InputEvent::from_touch(phase, touch_count as usize, Point::new(x, y)) {
            Some(event) => self.feed(event),
            None => false,
        }
    }

    /// Right click or long press. The menu itself is the host's to draw;
    /// it arrives as a `contextMenu` intent.
    pub fn handle_context_menu(&mut self, x: f64, y: f64) -> bool {
        self.feed(InputEvent::ContextMenu { x, y })
    }

    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        self.feed(InputEvent::key(
            key,
            Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        ))
    }

    /// CSS cursor for a hover position.
    pub fn cursor_at(&self, x: f64, y: f64) -> String {
        self.canvas.cursor_at(Point::new(x, y)).to_string()
    }

    /// Intents since the last call, as a JSON array.
    pub fn take_intents(&mut self) -> String {
        let intents = self.canvas.take_intents();
        serde_json::to_string(&intents).unwrap_or_else(|e| {
            log::warn!("intent serialization failed: {e}");
            "[]".to_string()
        })
    }

    // ─── Images ──────────────────────────────────────────────────────────

    /// URLs the host must start loading, as a JSON array. Each URL is
    /// returned once; report back through `image_loaded` / `image_failed`.
    pub fn pending_image_loads(&mut self) -> String {
        serde_json::to_string(&self.canvas.take_fetches()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn image_loaded(&mut self, url: &str, image: &HtmlImageElement) -> bool {
        let natural = Size::new(image.natural_width() as f64, image.natural_height() as f64);
        let loaded = LoadedImage {
            image: image.clone(),
            natural,
        };
        let needed = self.canvas.image_loaded(url, loaded);
        self.schedule(needed);
        needed
    }

    pub fn image_failed(&mut self, url: &str, reason: &str) -> bool {
        let needed = self.canvas.image_failed(url, reason);
        self.schedule(needed);
        needed
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Standalone script for the current frame. `assets_json` maps URLs the
    /// page cannot embed itself (remote, blob) to base64 bytes.
    /// Returns `{"ok":true,"script":"..."}` or `{"ok":false,"error":"..."}`.
    pub fn export_script(&self, assets_json: &str) -> String {
        let assets = match json::decode_assets(assets_json) {
            Ok(a) => a,
            Err(e) => {
                log::warn!("export refused: {e}");
                return json::error(&e);
            }
        };
        let input = ExportInput {
            chart_type: self.canvas.chart_type(),
            canvas: Size::new(self.width, self.height),
            toggles: self.canvas.toggles(),
            elements: self.canvas.elements(),
            annotations: self.canvas.annotations(),
            callouts: self.canvas.callouts(),
            overlays: self.canvas.overlays(),
        };
        match generate(&input, &assets) {
            Ok(artifact) => json::ok_with("script", &artifact.script),
            Err(e) => json::error(&e.reason()),
        }
    }

    /// Forget per-surface state when the chart is destroyed.
    pub fn teardown(&mut self) {
        self.canvas.teardown();
        self.redraw_callback = None;
    }
}

impl ChartCanvas {
    fn feed(&mut self, event: InputEvent) -> bool {
        let needed = self.canvas.handle_event(&event);
        self.schedule(needed);
        needed
    }

    /// Configuration changed: ask for a frame.
    fn changed(&mut self) {
        let needed = self.canvas.request_redraw();
        self.schedule(needed);
    }

    fn schedule(&self, needed: bool) {
        if !needed {
            return;
        }
        let (Some(callback), Some(window)) = (&self.redraw_callback, web_sys::window()) else {
            return;
        };
        if let Err(e) = window.request_animation_frame(callback) {
            log::warn!("requestAnimationFrame failed: {e:?}");
        }
    }
}

// ─── Console plumbing ────────────────────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Chartmark WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from(format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn console_logger_setup() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Warn);
    }
}

/// Raise console verbosity: `error`, `warn`, `info`, `debug` or `trace`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => {
            log::set_max_level(filter);
            true
        }
        Err(_) => false,
    }
}

// ─── Standalone validation (no canvas needed) ────────────────────────────

/// Validate an annotations JSON array.
/// Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_annotations(json: &str) -> String {
    match serde_json::from_str::<Vec<Annotation>>(json) {
        Ok(_) => r#"{"ok":true}"#.to_string(),
        Err(e) => json::error(&e.to_string()),
    }
}
