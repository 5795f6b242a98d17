//! The coordinator: owns every piece of session state for one heatmap
//! instance and turns host events into fetch requests and render output.
//!
//! Nothing here performs I/O. Requests are returned to the host, which
//! performs them and feeds the responses back with the handle it was
//! given.

use std::time::Duration;

use phenomap_protocol::{DetailsResponse, HeaderKey, HitTarget, RenderCommand};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::{ColorMapper, ColorMode, Endpoint, PALETTE};
use crate::config::{HeatmapConfig, Mode};
use crate::debounce::Debouncer;
use crate::error::HeatmapError;
use crate::input::{InputController, TouchGesture};
use crate::model::{
    Applied, Breadcrumb, DetailTicket, LoadError, MatrixModel, NavigationStack, PopupSession,
    PopupToken, cell_type, drill_target,
};
use crate::request::{DetailRequest, MatrixRequest, details_url, matrix_url};
use crate::slider::{Slider, SliderChange, SliderGeometry};
use crate::views::{GridStyle, PopupView, grid_size, popup_view, render_grid};

/// Initial p-value threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.0001;

pub const INVALID_DETAILS: &str = "Server returned invalid details";

/// Slider track used until the host reports the measured one.
pub const DEFAULT_SLIDER_GEOMETRY: SliderGeometry = SliderGeometry {
    bar_left: 0.0,
    bar_width: 200.0,
    button_width: 12.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request was issued after this one.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    Idle,
    Loading,
    Failed(String),
}

/// What a click or touch turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Navigate the host page to a visualisation URL.
    Open(String),
    Load(MatrixRequest),
    Details(DetailRequest),
}

/// One line of the gene details table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneDetail {
    pub index: usize,
    pub label: String,
    pub symbol: String,
    pub strain: String,
    pub allele: String,
    pub centre: String,
}

#[derive(Debug)]
pub struct Heatmap {
    config: HeatmapConfig,
    mode: Mode,
    matrix: Option<MatrixModel>,
    navigation: NavigationStack,
    popup: PopupSession,
    slider: Slider,
    debouncer: Debouncer<f64>,
    threshold: f64,
    show_gradient: bool,
    input: InputController,
    generation: u64,
    in_flight: Option<MatrixRequest>,
    status: LoadStatus,
}

impl Heatmap {
    pub fn new(config: HeatmapConfig) -> Self {
        let slider = Slider::new(0.0, 1.0, Some(DEFAULT_THRESHOLD), DEFAULT_SLIDER_GEOMETRY);
        Self {
            mode: config.mode,
            config,
            matrix: None,
            navigation: NavigationStack::new(),
            popup: PopupSession::new(),
            slider,
            debouncer: Debouncer::new(),
            threshold: DEFAULT_THRESHOLD,
            show_gradient: false,
            input: InputController::new(),
            generation: 0,
            in_flight: None,
            status: LoadStatus::Idle,
        }
    }

    // ── matrix loading ──

    /// Request the overview of the current mode.
    pub fn start(&mut self) -> MatrixRequest {
        self.request_slice(None, None)
    }

    /// Request the slice under `key`. Any earlier in-flight request is
    /// superseded.
    pub fn request_slice(&mut self, key: Option<HeaderKey>, label: Option<String>) -> MatrixRequest {
        self.generation += 1;
        let request = MatrixRequest {
            generation: self.generation,
            url: matrix_url(
                &self.config.json_base,
                self.mode,
                &self.config.mgi_id,
                key.as_ref(),
            ),
            key,
            label,
        };
        tracing::debug!(generation = request.generation, url = %request.url, "matrix requested");
        self.in_flight = Some(request.clone());
        self.status = LoadStatus::Loading;
        request
    }

    pub fn on_matrix_bytes(&mut self, generation: u64, body: &[u8]) -> Result<LoadOutcome, HeatmapError> {
        if !self.awaits(generation) {
            return Ok(self.stale(generation));
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(payload) => self.on_matrix_response(generation, &payload),
            Err(err) => self.fail_load(LoadError::Json(err)),
        }
    }

    /// Apply a matrix response. On error the previous matrix stays on
    /// screen and the status records the failure.
    pub fn on_matrix_response(&mut self, generation: u64, payload: &Value) -> Result<LoadOutcome, HeatmapError> {
        if !self.awaits(generation) {
            return Ok(self.stale(generation));
        }
        let model = match MatrixModel::load(payload, self.config.extractors.as_ref()) {
            Ok(model) => model,
            Err(err) => return self.fail_load(err),
        };

        let request = self.in_flight.take();
        match request.and_then(|r| r.key.map(|key| (key, r.label))) {
            Some((key, label)) => {
                let label = label.unwrap_or_else(|| key.to_string());
                self.navigation.push(key, label);
            }
            None => self.navigation.pop_to_root(),
        }
        self.popup.close();
        self.matrix = Some(model);
        self.status = LoadStatus::Idle;
        Ok(LoadOutcome::Applied)
    }

    /// Transport failure for a matrix request.
    pub fn on_matrix_failed(&mut self, generation: u64, message: &str) -> Result<LoadOutcome, HeatmapError> {
        if !self.awaits(generation) {
            return Ok(self.stale(generation));
        }
        self.fail_load(LoadError::Retrieval(message.to_string()))
    }

    /// Whether `generation` is the request still waiting for its response.
    /// Superseded and already answered requests are not.
    fn awaits(&self, generation: u64) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|request| request.generation == generation)
    }

    fn stale(&self, generation: u64) -> LoadOutcome {
        tracing::debug!(generation, current = self.generation, "stale matrix response discarded");
        LoadOutcome::Stale
    }

    fn fail_load(&mut self, err: LoadError) -> Result<LoadOutcome, HeatmapError> {
        tracing::warn!(error = %err, "matrix response rejected");
        self.in_flight = None;
        self.status = LoadStatus::Failed(err.to_string());
        Err(err.into())
    }

    // ── navigation ──

    /// Toggle ontological/procedural mode and start over at the overview.
    pub fn switch_mode(&mut self) -> MatrixRequest {
        self.mode = self.mode.toggled();
        self.navigation.reset();
        self.popup.close();
        self.start()
    }

    /// Breadcrumb clicked.
    pub fn navigate_to(&mut self, index: usize) -> Option<MatrixRequest> {
        let Breadcrumb { key, label } = self.navigation.entries().get(index)?.clone();
        Some(self.request_slice(key, Some(label)))
    }

    /// Column header clicked.
    pub fn click_column(&mut self, column: usize) -> Option<MatrixRequest> {
        let annotation = self.matrix.as_ref()?.annotations().get(column)?;
        let target = drill_target(&annotation.key, self.mode)?;
        let label = annotation.label.clone();
        Some(self.request_slice(Some(target), Some(label)))
    }

    fn cell_token(&self, row: usize, column: usize) -> Option<PopupToken> {
        let matrix = self.matrix.as_ref()?;
        matrix.pvalue(row, column)?;
        let kind = cell_type(&matrix.annotations().get(column)?.key)?;
        let gid = matrix.variants().get(row)?.key.clone();
        Some(PopupToken { gid, kind })
    }

    /// Visualisation page for an interactive cell.
    pub fn click_cell(&self, row: usize, column: usize) -> Option<String> {
        let token = self.cell_token(row, column)?;
        Some(self.config.viz.url(&token.gid, &token.kind))
    }

    /// Route a click on any hit region.
    pub fn click(&mut self, target: HitTarget) -> Option<Action> {
        match target {
            HitTarget::ColumnHeader { column } => self.click_column(column).map(Action::Load),
            HitTarget::Cell { row, column } => self.click_cell(row, column).map(Action::Open),
        }
    }

    // ── detail popup ──

    /// Pointer entered a cell. Returns the detail fetch to perform, or
    /// `None` for non-interactive cells and re-hovers of the open cell.
    pub fn hover_cell(&mut self, row: usize, column: usize) -> Option<DetailRequest> {
        let token = self.cell_token(row, column)?;
        let ticket = self.popup.open(token)?;
        let url = details_url(
            &self.config.json_base,
            self.mode,
            &ticket.token.gid,
            &ticket.token.kind,
            self.threshold,
        );
        Some(DetailRequest { ticket, url })
    }

    pub fn on_details(&mut self, ticket: &DetailTicket, payload: &Value) -> Applied {
        match DetailsResponse::deserialize(payload).ok() {
            Some(DetailsResponse {
                success: true,
                details: Some(details),
            }) => self.popup.on_fetch_complete(ticket, details),
            _ => self.popup.on_fetch_failed(ticket, INVALID_DETAILS),
        }
    }

    pub fn on_details_failed(&mut self, ticket: &DetailTicket, message: &str) -> Applied {
        self.popup.on_fetch_failed(ticket, message)
    }

    pub fn close_popup(&mut self) {
        self.popup.close();
    }

    pub fn popup(&self) -> &PopupSession {
        &self.popup
    }

    pub fn popup_view(&self) -> Option<PopupView> {
        let token = self.popup.token()?;
        let content = self.popup.content()?;
        Some(popup_view(content, &token.gid, self.config.viz.as_ref()))
    }

    pub fn touch_start(&mut self, target: HitTarget, now: Duration) {
        self.input.touch_start(target, now);
    }

    /// Long presses click, short ones hover.
    pub fn touch_end(&mut self, target: HitTarget, now: Duration) -> Option<Action> {
        match (self.input.touch_end(target, now)?, target) {
            (TouchGesture::Click, _) => self.click(target),
            (TouchGesture::Hover, HitTarget::Cell { row, column }) => {
                self.hover_cell(row, column).map(Action::Details)
            }
            (TouchGesture::Hover, HitTarget::ColumnHeader { .. }) => None,
        }
    }

    // ── threshold slider ──

    pub fn slider(&self) -> &Slider {
        &self.slider
    }

    pub fn set_slider_geometry(&mut self, geometry: SliderGeometry) {
        self.slider.refit(geometry);
    }

    /// Typed threshold confirmed.
    pub fn set_threshold_text(&mut self, text: &str, now: Duration) -> SliderChange {
        let change = self.slider.set_text(text);
        self.debouncer.push(change.value, now);
        change
    }

    pub fn drag_start(&mut self, pointer_x: f64) {
        self.input.press_button(pointer_x, self.slider.button_left());
    }

    pub fn drag_move(&mut self, pointer_x: f64, now: Duration) -> Option<SliderChange> {
        let position = self.input.drag_position(pointer_x)?;
        let change = self.slider.drag_to(position)?;
        self.debouncer.push(change.value, now);
        Some(change)
    }

    pub fn drag_end(&mut self) {
        self.input.release();
    }

    pub fn reset_threshold(&mut self, now: Duration) -> SliderChange {
        let change = self.slider.reset();
        self.debouncer.push(change.value, now);
        change
    }

    /// Commit the debounced threshold once the slider has been quiet long
    /// enough. Returns the newly committed value.
    pub fn poll(&mut self, now: Duration) -> Option<f64> {
        let threshold = self.debouncer.poll(now)?;
        tracing::debug!(threshold, "threshold committed");
        self.threshold = threshold;
        Some(threshold)
    }

    /// When the host should call [`Heatmap::poll`] next.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.debouncer.deadline()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    // ── colouring ──

    /// Show the gradient instead of the threshold classes; the slider is
    /// hidden while the gradient is shown.
    pub fn set_gradient(&mut self, show: bool) {
        self.show_gradient = show;
        self.slider.set_visible(!show);
    }

    pub fn is_gradient(&self) -> bool {
        self.show_gradient
    }

    pub fn color_mode(&self) -> ColorMode {
        if self.show_gradient {
            ColorMode::Gradient
        } else {
            ColorMode::Threshold(self.threshold)
        }
    }

    /// Pick palette entry `palette_index` for legend entry `legend_index`.
    pub fn select_colour(&mut self, legend_index: usize, palette_index: usize) -> Result<(), HeatmapError> {
        let (Some(endpoint), Some(spec)) = (Endpoint::from_index(legend_index), PALETTE.get(palette_index))
        else {
            return Ok(());
        };
        self.set_colour(endpoint, spec)
    }

    pub fn set_colour(&mut self, endpoint: Endpoint, spec: &str) -> Result<(), HeatmapError> {
        self.config.endpoints.set(endpoint, spec)?;
        Ok(())
    }

    pub fn color_mapper(&self) -> ColorMapper {
        let (min, range) = self
            .matrix
            .as_ref()
            .map(|m| (m.extremes().min, m.extremes().range()))
            .unwrap_or((0.0, 0.0));
        ColorMapper::new(self.config.endpoints, min, range)
    }

    pub fn toggle_row_peg(&mut self, row: usize) -> bool {
        self.matrix.as_mut().is_some_and(|m| m.toggle_row_peg(row))
    }

    pub fn toggle_column_peg(&mut self, column: usize) -> bool {
        self.matrix.as_mut().is_some_and(|m| m.toggle_column_peg(column))
    }

    // ── read side ──

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn matrix(&self) -> Option<&MatrixModel> {
        self.matrix.as_ref()
    }

    pub fn breadcrumbs(&self) -> &[Breadcrumb] {
        self.navigation.entries()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn title(&self) -> &str {
        self.matrix.as_ref().map_or("", MatrixModel::title)
    }

    pub fn manual_url(&self) -> String {
        self.config.manual_url()
    }

    pub fn gene_details(&self) -> Vec<GeneDetail> {
        let Some(matrix) = self.matrix.as_ref() else {
            return Vec::new();
        };
        matrix
            .variants()
            .iter()
            .enumerate()
            .map(|(i, v)| GeneDetail {
                index: i + 1,
                label: v.label.clone(),
                symbol: v.header.symbol.clone(),
                strain: v.header.strain.clone(),
                allele: v.allele.clone(),
                centre: v.header.centre.clone(),
            })
            .collect()
    }

    /// Render the grid for the loaded matrix; empty before the first load.
    pub fn render(&self) -> Vec<RenderCommand> {
        let Some(matrix) = self.matrix.as_ref() else {
            return Vec::new();
        };
        let style = GridStyle {
            mode: self.mode,
            color_mode: self.color_mode(),
        };
        render_grid(matrix, self.config.page_size, &self.color_mapper(), style)
    }

    pub fn grid_size(&self) -> (f64, f64) {
        self.matrix
            .as_ref()
            .map_or((0.0, 0.0), |m| grid_size(m, self.config.page_size))
    }
}
