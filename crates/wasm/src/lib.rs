use std::collections::HashMap;
use std::time::Duration;

use js_sys::Function;
use phenomap_core::model::DetailTicket;
use phenomap_core::request::{DetailRequest, MatrixRequest};
use phenomap_core::views::{hit_test, popup_position};
use phenomap_core::{Action, Heatmap, HeatmapConfig, HeatmapOptions, LoadOutcome, VizUrl};
use phenomap_protocol::{HeaderKey, HitTarget, Point, RenderCommand};
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::prelude::*;

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn to_json(value: &impl Serialize) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(js_err)
}

/// Host timestamps are milliseconds from any fixed origin.
fn millis(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or_default()
}

fn key_to_js(key: &HeaderKey) -> JsValue {
    match key {
        HeaderKey::Int(n) => JsValue::from_f64(*n as f64),
        HeaderKey::Text(s) => JsValue::from_str(s),
    }
}

/// Visualisation URL generator supplied by the host page.
struct JsVizUrl(Function);

impl VizUrl for JsVizUrl {
    fn url(&self, gid: &HeaderKey, kind: &HeaderKey) -> String {
        self.0
            .call2(&JsValue::NULL, &key_to_js(gid), &key_to_js(kind))
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    }
}

/// One heatmap widget. Every instance owns its own state, including the
/// pointer and drag state.
#[wasm_bindgen]
pub struct HeatmapHandle {
    heatmap: Heatmap,
    tickets: HashMap<u64, DetailTicket>,
    frame: Vec<RenderCommand>,
}

#[wasm_bindgen]
impl HeatmapHandle {
    /// Validate `options` (the host's options object as JSON) and bind the
    /// `viz(gid, type)` URL generator.
    #[wasm_bindgen(constructor)]
    pub fn new(options: &str, viz: Option<Function>) -> Result<HeatmapHandle, JsError> {
        let options = HeatmapOptions::from_json(options).map_err(js_err)?;
        let viz = viz.map(|f| Box::new(JsVizUrl(f)) as Box<dyn VizUrl>);
        let config = HeatmapConfig::new(options, viz).map_err(js_err)?;
        Ok(Self {
            heatmap: Heatmap::new(config),
            tickets: HashMap::new(),
            frame: Vec::new(),
        })
    }

    /// Overview request as `{generation, key, label, url}`.
    pub fn start(&mut self) -> Result<String, JsError> {
        let request = self.heatmap.start();
        to_json(&request)
    }

    /// Feed a matrix response body back. Returns `false` for superseded
    /// responses.
    pub fn on_matrix_response(&mut self, generation: u64, body: &str) -> Result<bool, JsError> {
        let outcome = self
            .heatmap
            .on_matrix_bytes(generation, body.as_bytes())
            .map_err(js_err)?;
        Ok(outcome == LoadOutcome::Applied)
    }

    pub fn on_matrix_failed(&mut self, generation: u64, message: &str) -> Result<bool, JsError> {
        let outcome = self
            .heatmap
            .on_matrix_failed(generation, message)
            .map_err(js_err)?;
        Ok(outcome == LoadOutcome::Applied)
    }

    pub fn switch_mode(&mut self) -> Result<String, JsError> {
        self.tickets.clear();
        let request = self.heatmap.switch_mode();
        to_json(&request)
    }

    pub fn navigate_to(&mut self, index: usize) -> Result<Option<String>, JsError> {
        self.heatmap
            .navigate_to(index)
            .map(|r| to_json(&r))
            .transpose()
    }

    /// Render commands for the grid as JSON; also kept for hit testing.
    pub fn render(&mut self) -> Result<String, JsError> {
        self.frame = self.heatmap.render();
        to_json(&self.frame)
    }

    /// `[width, height]` of the rendered grid.
    pub fn grid_size(&self) -> Vec<f64> {
        let (w, h) = self.heatmap.grid_size();
        vec![w, h]
    }

    fn target_at(&self, x: f64, y: f64) -> Option<HitTarget> {
        hit_test(&self.frame, Point::new(x, y))
    }

    fn action_json(&mut self, action: Option<Action>) -> Result<Option<String>, JsError> {
        let value = match action {
            None => return Ok(None),
            Some(Action::Open(url)) => json!({"open": url}),
            Some(Action::Load(request)) => json!({"load": request_json(&request)}),
            Some(Action::Details(request)) => json!({"details": self.track(request)}),
        };
        Ok(Some(value.to_string()))
    }

    fn track(&mut self, request: DetailRequest) -> serde_json::Value {
        let session = request.ticket.session;
        self.tickets.insert(session, request.ticket);
        json!({"session": session, "url": request.url})
    }

    /// Click at grid coordinates. Returns `{open}` or `{load}`, or nothing.
    pub fn click_at(&mut self, x: f64, y: f64) -> Result<Option<String>, JsError> {
        let action = self.target_at(x, y).and_then(|t| self.heatmap.click(t));
        self.action_json(action)
    }

    /// Pointer over grid coordinates. Returns a `{session, url}` detail
    /// fetch when a new cell is entered.
    pub fn hover_at(&mut self, x: f64, y: f64) -> Option<String> {
        let Some(HitTarget::Cell { row, column }) = self.target_at(x, y) else {
            return None;
        };
        let request = self.heatmap.hover_cell(row, column)?;
        Some(self.track(request).to_string())
    }

    pub fn touch_start(&mut self, x: f64, y: f64, now_ms: f64) {
        if let Some(target) = self.target_at(x, y) {
            self.heatmap.touch_start(target, millis(now_ms));
        }
    }

    pub fn touch_end(&mut self, x: f64, y: f64, now_ms: f64) -> Result<Option<String>, JsError> {
        let action = self
            .target_at(x, y)
            .and_then(|t| self.heatmap.touch_end(t, millis(now_ms)));
        self.action_json(action)
    }

    /// Detail response for `session`. Returns `false` when it was stale.
    pub fn on_details(&mut self, session: u64, body: &str) -> bool {
        let Some(ticket) = self.tickets.remove(&session) else {
            return false;
        };
        let applied = match serde_json::from_str(body) {
            Ok(payload) => self.heatmap.on_details(&ticket, &payload),
            Err(e) => self.heatmap.on_details_failed(&ticket, &e.to_string()),
        };
        applied == phenomap_core::model::Applied::Applied
    }

    pub fn on_details_failed(&mut self, session: u64, message: &str) -> bool {
        let Some(ticket) = self.tickets.remove(&session) else {
            return false;
        };
        self.heatmap.on_details_failed(&ticket, message) == phenomap_core::model::Applied::Applied
    }

    pub fn close_popup(&mut self) {
        self.tickets.clear();
        self.heatmap.close_popup();
    }

    /// Popup body as JSON, or nothing when closed.
    pub fn popup_view(&self) -> Result<Option<String>, JsError> {
        self.heatmap.popup_view().map(|v| to_json(&v)).transpose()
    }

    pub fn set_slider_geometry(&mut self, bar_left: f64, bar_width: f64, button_width: f64) {
        self.heatmap
            .set_slider_geometry(phenomap_core::slider::SliderGeometry::new(
                bar_left,
                bar_width,
                button_width,
            ));
    }

    pub fn set_threshold_text(&mut self, text: &str, now_ms: f64) -> Result<String, JsError> {
        let change = self.heatmap.set_threshold_text(text, millis(now_ms));
        to_json(&change)
    }

    pub fn drag_start(&mut self, pointer_x: f64) {
        self.heatmap.drag_start(pointer_x);
    }

    pub fn drag_move(&mut self, pointer_x: f64, now_ms: f64) -> Result<Option<String>, JsError> {
        self.heatmap
            .drag_move(pointer_x, millis(now_ms))
            .map(|c| to_json(&c))
            .transpose()
    }

    pub fn drag_end(&mut self) {
        self.heatmap.drag_end();
    }

    pub fn reset_threshold(&mut self, now_ms: f64) -> Result<String, JsError> {
        let change = self.heatmap.reset_threshold(millis(now_ms));
        to_json(&change)
    }

    /// Commit a debounced threshold change; returns the new threshold.
    pub fn poll(&mut self, now_ms: f64) -> Option<f64> {
        self.heatmap.poll(millis(now_ms))
    }

    /// Slider state (text, value, button position, status) as JSON.
    pub fn slider_state(&self) -> Result<String, JsError> {
        to_json(self.heatmap.slider())
    }

    pub fn set_gradient(&mut self, show: bool) {
        self.heatmap.set_gradient(show);
    }

    pub fn select_colour(&mut self, legend_index: usize, palette_index: usize) -> Result<(), JsError> {
        self.heatmap
            .select_colour(legend_index, palette_index)
            .map_err(js_err)
    }

    pub fn toggle_row_peg(&mut self, row: usize) -> bool {
        self.heatmap.toggle_row_peg(row)
    }

    pub fn toggle_column_peg(&mut self, column: usize) -> bool {
        self.heatmap.toggle_column_peg(column)
    }

    pub fn breadcrumbs(&self) -> Result<String, JsError> {
        to_json(&self.heatmap.breadcrumbs())
    }

    pub fn gene_details(&self) -> Result<String, JsError> {
        to_json(&self.heatmap.gene_details())
    }

    pub fn title(&self) -> String {
        self.heatmap.title().to_string()
    }

    pub fn manual_url(&self) -> String {
        self.heatmap.manual_url()
    }

    pub fn status(&self) -> Result<String, JsError> {
        to_json(self.heatmap.status())
    }
}

fn request_json(request: &MatrixRequest) -> serde_json::Value {
    serde_json::to_value(request).unwrap_or_default()
}

/// Keep a popup of `width`x`height` at pointer `(x, y)` inside the window.
#[wasm_bindgen]
pub fn place_popup(x: f64, y: f64, width: f64, height: f64, window_width: f64, window_height: f64) -> Vec<f64> {
    let p = popup_position(Point::new(x, y), (width, height), (window_width, window_height));
    vec![p.x, p.y]
}
