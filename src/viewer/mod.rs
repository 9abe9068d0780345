//! Main `TreeMapView` struct - the wasm-exported treemap component.
//!
//! Owns the canvas renderer, the DOM label overlay and the transition state
//! machine. Successive datasets are diffed and animated; hover and click
//! resolve through the interval-tree index while no transition is running.

pub mod animation;
pub mod hover;
pub mod labels;
pub mod pool;
pub mod rate_limit;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use js_sys::Function;
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent};

#[cfg(target_arch = "wasm32")]
use crate::error::Result;
#[cfg(target_arch = "wasm32")]
use crate::layout::TextConstants;
#[cfg(target_arch = "wasm32")]
use crate::render::webgl::WebGlCellRenderer;
#[cfg(target_arch = "wasm32")]
use crate::render::{
    have_cells_changed, search_for_hit, tier_for, PersistentBuffer, HALF_STROKE_WIDTH,
    STROKE_COLOR,
};
#[cfg(target_arch = "wasm32")]
use crate::types::{Cell, NumCellsTier};
#[cfg(target_arch = "wasm32")]
use animation::{Status, TransitionPlan, Tween};
#[cfg(target_arch = "wasm32")]
use hover::{HoverThrottle, ThrottleDecision};
#[cfg(target_arch = "wasm32")]
use labels::LabelLayer;
#[cfg(target_arch = "wasm32")]
use rate_limit::{Change, PropsChangeRateLimiter};

/// Minimum interval between hover hit tests.
#[cfg(target_arch = "wasm32")]
const HOVER_THROTTLE_MS: f64 = 50.0;

#[cfg(target_arch = "wasm32")]
pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

#[cfg(target_arch = "wasm32")]
fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

/// The dataset and highlight as supplied by the host, serialized through the
/// rate limiter as one unit.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, PartialEq)]
struct ViewProps {
    cells: Vec<Cell>,
    highlighted_id: Option<String>,
}

/// Shared state accessed by event handlers and the frame loop.
#[cfg(target_arch = "wasm32")]
pub(crate) struct SharedState {
    renderer: Option<WebGlCellRenderer>,
    label_layer: Option<LabelLayer>,
    buffer: PersistentBuffer,
    limiter: PropsChangeRateLimiter<ViewProps>,
    constants: TextConstants,
    width: f64,
    height: f64,
    /// Cells currently on screen (transition target while one is running).
    cells: Vec<Cell>,
    plan: Option<TransitionPlan>,
    status: Status,
    tween: Option<Tween>,
    /// Labels are rebuilt at the transition midpoint when the cells changed.
    labels_stale: bool,
    /// The overlay crossfade runs for the duration of the current tween.
    labels_fading: bool,
    rendered_once: bool,
    frame_closure: Option<Closure<dyn FnMut()>>,
    hovered_id: Option<String>,
    hover_throttle: HoverThrottle,
    /// Timer for the trailing hover test, cleared on mouse leave.
    hover_timeout_handle: Option<i32>,
    hover_timeout_closure: Option<Closure<dyn FnMut()>>,
    hover_callback: Option<Function>,
    click_callback: Option<Function>,
}

/// The treemap component exported to JavaScript.
#[wasm_bindgen]
pub struct TreeMapView {
    #[cfg(target_arch = "wasm32")]
    state: Rc<RefCell<SharedState>>,
    #[cfg(target_arch = "wasm32")]
    #[allow(dead_code)]
    closures: Vec<Closure<dyn FnMut(MouseEvent)>>,

    #[cfg(not(target_arch = "wasm32"))]
    _private: (),
}

// ============================================================================
// WASM32 Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl TreeMapView {
    /// Create a viewer on `canvas`, with labels layered into `container`
    /// (the canvas's positioned parent). A missing WebGL context disables
    /// rendering instead of failing construction.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        container: HtmlElement,
        large_tier: bool,
    ) -> std::result::Result<TreeMapView, JsValue> {
        console_error_panic_hook::set_once();

        let tier = if large_tier {
            NumCellsTier::Large
        } else {
            NumCellsTier::Small
        };
        let renderer = match WebGlCellRenderer::new(&canvas, tier) {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                warn(&format!("treemap renderer disabled: {e}"));
                None
            }
        };
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let label_layer = match LabelLayer::new(&document, &container) {
            Ok(layer) => Some(layer),
            Err(e) => {
                warn(&format!("treemap labels disabled: {e}"));
                None
            }
        };

        let state = Rc::new(RefCell::new(SharedState {
            renderer,
            label_layer,
            buffer: PersistentBuffer::for_tier(tier),
            limiter: PropsChangeRateLimiter::new(),
            constants: TextConstants::default(),
            width: f64::from(canvas.width()),
            height: f64::from(canvas.height()),
            cells: Vec::new(),
            plan: None,
            status: Status::Initial,
            tween: None,
            labels_stale: false,
            labels_fading: false,
            rendered_once: false,
            frame_closure: None,
            hovered_id: None,
            hover_throttle: HoverThrottle::new(HOVER_THROTTLE_MS),
            hover_timeout_handle: None,
            hover_timeout_closure: None,
            hover_callback: None,
            click_callback: None,
        }));

        // Frame loop closure, scheduled while a tween runs.
        {
            let state_for_frames = state.clone();
            let closure = Closure::wrap(Box::new(move || {
                Self::on_frame(&state_for_frames);
            }) as Box<dyn FnMut()>);
            state.borrow_mut().frame_closure = Some(closure);
        }
        // Trailing-edge hover test closure, scheduled by the throttle.
        {
            let state_for_hover = state.clone();
            let closure = Closure::wrap(Box::new(move || {
                Self::on_hover_timeout(&state_for_hover);
            }) as Box<dyn FnMut()>);
            state.borrow_mut().hover_timeout_closure = Some(closure);
        }

        let mut closures: Vec<Closure<dyn FnMut(MouseEvent)>> = Vec::new();
        {
            let state = state.clone();
            let canvas_ref = canvas.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                let rect = canvas_ref.get_bounding_client_rect();
                let x = f64::from(event.client_x()) - rect.left();
                let y = f64::from(event.client_y()) - rect.top();
                Self::internal_mouse_move(&state, x, y);
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }
        {
            let state = state.clone();
            let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
                Self::internal_mouse_leave(&state);
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }
        {
            let state = state.clone();
            let canvas_ref = canvas.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                let rect = canvas_ref.get_bounding_client_rect();
                let x = f64::from(event.client_x()) - rect.left();
                let y = f64::from(event.client_y()) - rect.top();
                Self::internal_click(&state, x, y);
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }

        Ok(TreeMapView { state, closures })
    }

    /// Replace the rendered dataset. `cells` is the serialized output of
    /// the transform ([`crate::transform::transform`]).
    #[wasm_bindgen(js_name = setCells)]
    pub fn set_cells(&self, cells: JsValue) -> std::result::Result<(), JsValue> {
        let cells: Vec<Cell> = serde_wasm_bindgen::from_value(cells)
            .map_err(|e| JsValue::from_str(&format!("bad cell data: {e}")))?;
        let highlighted_id = self.state.borrow().limiter.last_value_highlight();
        Self::request_props(&self.state, ViewProps {
            cells,
            highlighted_id,
        });
        Ok(())
    }

    /// Highlight one cell by id (all others desaturate); pass `undefined`
    /// to clear. Recolors through the normal transition path.
    #[wasm_bindgen(js_name = setHighlighted)]
    pub fn set_highlighted(&self, id: Option<String>) {
        let cells = self.state.borrow().limiter.last_value_cells();
        Self::request_props(&self.state, ViewProps {
            cells,
            highlighted_id: id,
        });
    }

    /// Called with the hovered cell id, or `null` when the pointer leaves
    /// all cells.
    #[wasm_bindgen(js_name = onHover)]
    pub fn set_on_hover(&self, callback: Option<Function>) {
        self.state.borrow_mut().hover_callback = callback;
    }

    /// Called with the clicked cell id.
    #[wasm_bindgen(js_name = onClick)]
    pub fn set_on_click(&self, callback: Option<Function>) {
        self.state.borrow_mut().click_callback = callback;
    }

    /// Update the canvas dimensions used for bounds checks and the
    /// projection uniform. The host relayouts and calls `setCells` after.
    #[wasm_bindgen(js_name = setSize)]
    pub fn set_size(&self, width: f64, height: f64) {
        let mut s = self.state.borrow_mut();
        s.width = width;
        s.height = height;
    }
}

#[cfg(target_arch = "wasm32")]
impl TreeMapView {
    fn request_props(state: &Rc<RefCell<SharedState>>, props: ViewProps) {
        let change = state.borrow_mut().limiter.request(props);
        if let Some(change) = change {
            Self::perform_props_change(state, change);
        }
    }

    fn perform_props_change(state: &Rc<RefCell<SharedState>>, change: Change<ViewProps>) {
        if let Err(e) = Self::start_transition(state, &change) {
            warn(&format!("treemap transition failed: {e}"));
            // Unwedge the limiter so later datasets still go through.
            let next = state.borrow_mut().limiter.complete();
            if let Some(next) = next {
                Self::perform_props_change(state, next);
            }
        }
    }

    fn start_transition(
        state: &Rc<RefCell<SharedState>>,
        change: &Change<ViewProps>,
    ) -> Result<()> {
        let mut s = state.borrow_mut();

        if change.next.cells.is_empty() {
            if let Some(renderer) = s.renderer.as_ref() {
                renderer.clear();
            }
            if let Some(layer) = s.label_layer.as_mut() {
                layer.clear();
                layer.set_opacity(1.0).ok();
            }
            s.cells = Vec::new();
            s.plan = None;
            s.hovered_id = None;
            s.labels_stale = false;
            s.labels_fading = false;
            s.status = Status::FinishedCompletely;
            drop(s);
            Self::on_transition_done(state);
            return Ok(());
        }

        let Some(tier) = tier_for(change.next.cells.len()) else {
            warn("treemap dataset exceeds the large-tier cell limit; skipped");
            drop(s);
            Self::on_transition_done(state);
            return Ok(());
        };
        // GPU side reallocates on the next upload when this grows.
        s.buffer.ensure_tier(tier);

        let cells_changed = have_cells_changed(&s.cells, &change.next.cells)
            || !s.rendered_once;
        let prev_cells = std::mem::take(&mut s.cells);
        let plan = {
            let SharedState { ref mut buffer, .. } = *s;
            TransitionPlan::build(
                &prev_cells,
                &change.next.cells,
                change.next.highlighted_id.as_deref(),
                HALF_STROKE_WIDTH,
                STROKE_COLOR,
                buffer,
            )?
        };

        {
            let SharedState {
                ref mut renderer,
                ref buffer,
                ..
            } = *s;
            if let Some(renderer) = renderer.as_mut() {
                renderer.upload(buffer)?;
            }
        }
        s.cells = change.next.cells.clone();
        s.plan = Some(plan);
        s.labels_stale = cells_changed;
        s.labels_fading = cells_changed;
        s.status = Status::InProgress;
        s.hovered_id = None;
        s.tween = Some(Tween::starting_at(now_ms()));
        Self::schedule_frame(&s);
        Ok(())
    }

    fn schedule_frame(s: &SharedState) {
        if let (Some(window), Some(closure)) = (web_sys::window(), s.frame_closure.as_ref()) {
            window
                .request_animation_frame(closure.as_ref().unchecked_ref())
                .ok();
        }
    }

    fn on_frame(state: &Rc<RefCell<SharedState>>) {
        let done = {
            let mut s = state.borrow_mut();
            let Some(tween) = s.tween else { return };
            let now = now_ms();
            let progress = tween.progress(now);
            let instance_count = s.plan.as_ref().map_or(0, |p| p.instance_count);
            let (width, height) = (s.width, s.height);
            if let Some(renderer) = s.renderer.as_ref() {
                renderer.draw(instance_count, progress, width, height);
            }
            Self::crossfade_labels(&mut s, f64::from(progress));
            if tween.is_done(now) {
                s.tween = None;
                s.rendered_once = true;
                s.labels_fading = false;
                s.status = Status::FinishedCompletely;
                true
            } else {
                Self::schedule_frame(&s);
                false
            }
        };
        if done {
            Self::on_transition_done(state);
        }
    }

    /// Crossfade the label overlay around the transition midpoint: the old
    /// labels fade out over the first half, the overlay is rebuilt for the
    /// final layout at the midpoint and fades back in over the second half.
    fn crossfade_labels(s: &mut SharedState, progress: f64) {
        if !s.labels_fading {
            return;
        }
        if progress < 0.5 {
            if let Some(layer) = s.label_layer.as_ref() {
                layer.set_opacity(1.0 - 2.0 * progress).ok();
            }
            return;
        }
        if s.labels_stale {
            s.labels_stale = false;
            let SharedState {
                ref plan,
                ref mut label_layer,
                ref constants,
                ..
            } = *s;
            if let (Some(plan), Some(layer)) = (plan.as_ref(), label_layer.as_mut()) {
                if let Err(e) = layer.rebuild(plan.surviving_keys(), &plan.cell_map, constants) {
                    warn(&format!("treemap label rebuild failed: {e}"));
                }
            }
        }
        if let Some(layer) = s.label_layer.as_ref() {
            layer.set_opacity((2.0 * progress - 1.0).min(1.0)).ok();
        }
    }

    fn on_transition_done(state: &Rc<RefCell<SharedState>>) {
        let next = state.borrow_mut().limiter.complete();
        if let Some(change) = next {
            Self::perform_props_change(state, change);
        }
    }

    fn internal_mouse_move(state: &Rc<RefCell<SharedState>>, x: f64, y: f64) {
        let decision = {
            let mut s = state.borrow_mut();
            if s.status != Status::FinishedCompletely {
                return;
            }
            s.hover_throttle.on_move(now_ms(), x, y)
        };
        match decision {
            ThrottleDecision::RunNow => Self::run_hover_test(state, x, y),
            ThrottleDecision::Schedule { delay_ms } => {
                Self::schedule_hover_timeout(state, delay_ms);
            }
            ThrottleDecision::Coalesced => {}
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn schedule_hover_timeout(state: &Rc<RefCell<SharedState>>, delay_ms: f64) {
        let mut s = state.borrow_mut();
        let (Some(window), Some(closure)) = (web_sys::window(), s.hover_timeout_closure.as_ref())
        else {
            return;
        };
        if let Ok(handle) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay_ms.ceil() as i32,
        ) {
            s.hover_timeout_handle = Some(handle);
        }
    }

    /// Trailing edge of the hover throttle: test the last position seen in
    /// the window, so the pointer's resting place is reported even when no
    /// further events arrive.
    fn on_hover_timeout(state: &Rc<RefCell<SharedState>>) {
        let position = {
            let mut s = state.borrow_mut();
            s.hover_timeout_handle = None;
            if s.status != Status::FinishedCompletely {
                s.hover_throttle.cancel();
                return;
            }
            s.hover_throttle.fire(now_ms())
        };
        if let Some((x, y)) = position {
            Self::run_hover_test(state, x, y);
        }
    }

    fn run_hover_test(state: &Rc<RefCell<SharedState>>, x: f64, y: f64) {
        let (hit, callback) = {
            let mut s = state.borrow_mut();
            let hit = s.plan.as_ref().and_then(|plan| {
                search_for_hit(&plan.x_tree, &plan.y_tree, s.width, s.height, x, y)
            });
            if hit == s.hovered_id {
                return;
            }
            s.hovered_id = hit.clone();
            (hit, s.hover_callback.clone())
        };
        Self::emit_id(callback.as_ref(), hit.as_deref());
    }

    fn internal_mouse_leave(state: &Rc<RefCell<SharedState>>) {
        let (callback, handle) = {
            let mut s = state.borrow_mut();
            s.hover_throttle.cancel();
            let handle = s.hover_timeout_handle.take();
            let callback = if s.hovered_id.is_some() {
                s.hovered_id = None;
                s.hover_callback.clone()
            } else {
                None
            };
            (callback, handle)
        };
        if let Some(handle) = handle {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(handle);
            }
        }
        if callback.is_some() {
            Self::emit_id(callback.as_ref(), None);
        }
    }

    fn internal_click(state: &Rc<RefCell<SharedState>>, x: f64, y: f64) {
        let (hit, callback) = {
            let s = state.borrow();
            if s.status != Status::FinishedCompletely {
                return;
            }
            let hit = s.plan.as_ref().and_then(|plan| {
                search_for_hit(&plan.x_tree, &plan.y_tree, s.width, s.height, x, y)
            });
            (hit, s.click_callback.clone())
        };
        if hit.is_some() {
            Self::emit_id(callback.as_ref(), hit.as_deref());
        }
    }

    fn emit_id(callback: Option<&Function>, id: Option<&str>) {
        if let Some(callback) = callback {
            let value = id.map_or(JsValue::NULL, JsValue::from_str);
            callback.call1(&JsValue::NULL, &value).ok();
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl PropsChangeRateLimiter<ViewProps> {
    fn last_value_cells(&self) -> Vec<Cell> {
        self.last_value().map(|p| p.cells.clone()).unwrap_or_default()
    }

    fn last_value_highlight(&self) -> Option<String> {
        self.last_value().and_then(|p| p.highlighted_id.clone())
    }
}

// ============================================================================
// Non-wasm32 stub (pipeline logic is tested natively through the pure
// modules above)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl TreeMapView {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for TreeMapView {
    fn default() -> Self {
        Self::new()
    }
}
