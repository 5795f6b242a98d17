//! Integration test: drive a heatmap through load, drill-down, popup and
//! threshold changes with canned service responses.

use std::time::Duration;

use phenomap_core::model::{Applied, PopupContent};
use phenomap_core::svg::render_svg;
use phenomap_core::views::PopupView;
use phenomap_core::{
    Action, Heatmap, HeatmapConfig, HeatmapError, HeatmapOptions, LoadOutcome, LoadStatus, Mode,
};
use phenomap_protocol::{HeaderKey, HitTarget, RenderCommand};
use serde_json::{Value, json};

fn heatmap() -> Heatmap {
    let options = HeatmapOptions::from_json(
        r#"{"container": "heatmap", "mgiid": "MGI:2443522", "url": {"json": "rest"}}"#,
    )
    .expect("options");
    let viz = |gid: &HeaderKey, kind: &HeaderKey| format!("viz.html?gid={gid}&type={kind}");
    let config = HeatmapConfig::new(options, Some(Box::new(viz))).expect("config");
    Heatmap::new(config)
}

fn sample() -> Value {
    serde_json::from_slice(include_bytes!("fixtures/heatmap-sample.json")).expect("fixture")
}

fn loaded() -> Heatmap {
    let mut heatmap = heatmap();
    let request = heatmap.start();
    assert_eq!(
        request.url,
        "rest/procedural/heatmap?mgiid=MGI:2443522"
    );
    let outcome = heatmap
        .on_matrix_bytes(request.generation, include_bytes!("fixtures/heatmap-sample.json"))
        .expect("load");
    assert_eq!(outcome, LoadOutcome::Applied);
    heatmap
}

fn groups(commands: &[RenderCommand]) -> usize {
    commands
        .iter()
        .filter(|c| matches!(c, RenderCommand::BeginGroup { .. }))
        .count()
}

#[test]
fn overview_load_builds_paged_grid() {
    let heatmap = loaded();
    let matrix = heatmap.matrix().expect("matrix");
    assert_eq!(matrix.num_columns(), 7);
    assert_eq!(matrix.num_rows(), 3);
    assert_eq!(heatmap.title(), "Cib2");
    assert_eq!(matrix.extremes().min, 0.000004);
    assert_eq!(matrix.extremes().max, 1.0);

    let labels: Vec<&str> = matrix.variants().iter().map(|v| v.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Conditional ready", "Cre-excised deletion", "Cre-excised deletion"]
    );

    // 7 columns in pages of 5: two sections.
    let commands = heatmap.render();
    assert_eq!(groups(&commands), 2);
    assert_eq!(heatmap.breadcrumbs().len(), 1);
    assert_eq!(*heatmap.status(), LoadStatus::Idle);

    let svg = render_svg(&commands, heatmap.grid_size().0, heatmap.grid_size().1);
    assert!(svg.contains("Auditory Brain Stem Response"));
    assert!(svg.contains("0.0000040000"));

    let details = heatmap.gene_details();
    assert_eq!(details.len(), 3);
    assert_eq!(details[2].allele, "tm1.1(KOMP)Vlcg");
    assert_eq!(details[0].index, 1);
}

#[test]
fn drill_down_pushes_breadcrumb_after_load() {
    let mut heatmap = loaded();
    let request = heatmap.click_column(1).expect("drillable");
    assert_eq!(
        request.url,
        "rest/procedural/heatmap?mgiid=MGI:2443522&type=107"
    );
    assert_eq!(heatmap.breadcrumbs().len(), 1, "push waits for the response");
    heatmap
        .on_matrix_response(request.generation, &sample())
        .expect("load");
    assert_eq!(heatmap.breadcrumbs().len(), 2);
    assert_eq!(heatmap.breadcrumbs()[1].label, "Auditory Brain Stem Response");

    // Procedural string keys do not drill.
    assert!(heatmap.click_column(6).is_none());

    // Back to the overview through the breadcrumb.
    let back = heatmap.navigate_to(0).expect("root");
    heatmap.on_matrix_response(back.generation, &sample()).expect("load");
    assert_eq!(heatmap.breadcrumbs().len(), 1);
}

#[test]
fn superseded_matrix_response_is_ignored() {
    let mut heatmap = loaded();
    let first = heatmap.click_column(0).expect("first");
    let second = heatmap.click_column(1).expect("second");
    let outcome = heatmap.on_matrix_response(first.generation, &sample()).expect("stale");
    assert_eq!(outcome, LoadOutcome::Stale);
    assert_eq!(heatmap.breadcrumbs().len(), 1);
    heatmap.on_matrix_response(second.generation, &sample()).expect("load");
    assert_eq!(heatmap.breadcrumbs()[1].key, Some(HeaderKey::Int(107)));
}

#[test]
fn repeated_delivery_of_a_response_is_stale() {
    let mut heatmap = loaded();
    let request = heatmap.click_column(1).expect("drillable");
    heatmap.on_matrix_response(request.generation, &sample()).expect("load");
    assert_eq!(heatmap.breadcrumbs().len(), 2);

    let outcome = heatmap
        .on_matrix_response(request.generation, &sample())
        .expect("repeat");
    assert_eq!(outcome, LoadOutcome::Stale);
    assert_eq!(heatmap.breadcrumbs().len(), 2);
    assert_eq!(
        heatmap.on_matrix_failed(request.generation, "late").ok(),
        Some(LoadOutcome::Stale)
    );
    assert_eq!(*heatmap.status(), LoadStatus::Idle);
}

#[test]
fn procedural_parameter_cells_fetch_parameter_details() {
    let mut heatmap = loaded();
    assert!(heatmap.click_column(6).is_none(), "header does not drill");

    let request = heatmap.hover_cell(0, 6).expect("parameter cell");
    assert_eq!(
        request.url,
        "rest/procedural/details/parameter?gid=4011&type=IMPC_XRY&threshold=0.0001"
    );
    assert_eq!(
        heatmap.click(HitTarget::Cell { row: 0, column: 6 }),
        Some(Action::Open("viz.html?gid=4011&type=IMPC_XRY".into()))
    );

    let commands = heatmap.render();
    assert!(commands.iter().any(|c| matches!(
        c,
        RenderCommand::DrawRect { hit: Some(HitTarget::Cell { row: 0, column: 6 }), .. }
    )));
}

#[test]
fn failed_load_keeps_previous_matrix() {
    let mut heatmap = loaded();
    let request = heatmap.click_column(0).expect("request");
    let err = heatmap
        .on_matrix_response(request.generation, &json!({"success": false}))
        .expect_err("retrieval error");
    assert!(matches!(err, HeatmapError::Load(_)));
    assert!(matches!(heatmap.status(), LoadStatus::Failed(_)));
    assert_eq!(heatmap.matrix().map(|m| m.num_columns()), Some(7));

    let request = heatmap.click_column(0).expect("retry");
    let err = heatmap
        .on_matrix_response(request.generation, &json!({"success": true, "heatmap": {"row_headers": []}}))
        .expect_err("format error");
    assert!(err.to_string().contains("column_headers"));
}

#[test]
fn mode_switch_resets_navigation() {
    let mut heatmap = loaded();
    let request = heatmap.click_column(0).expect("drill");
    heatmap.on_matrix_response(request.generation, &sample()).expect("load");
    assert_eq!(heatmap.breadcrumbs().len(), 2);

    let request = heatmap.switch_mode();
    assert_eq!(heatmap.mode(), Mode::Ontological);
    assert_eq!(heatmap.breadcrumbs().len(), 1);
    assert_eq!(request.url, "rest/ontological/heatmap?mgiid=MGI:2443522");
    assert!(request.key.is_none());
}

#[test]
fn hover_fetches_details_once_and_drops_stale_results() {
    let mut heatmap = loaded();
    let first = heatmap.hover_cell(0, 1).expect("interactive cell");
    assert_eq!(
        first.url,
        "rest/procedural/details?gid=4011&type=107&threshold=0.0001"
    );
    assert!(heatmap.hover_cell(0, 1).is_none(), "re-hover does not refetch");
    assert!(heatmap.hover_cell(0, 2).is_none(), "no-data cell");

    let second = heatmap.hover_cell(1, 1).expect("second cell");
    let details: Value =
        serde_json::from_slice(include_bytes!("fixtures/details-sample.json")).expect("details");
    assert_eq!(heatmap.on_details(&first.ticket, &details), Applied::Stale);
    assert_eq!(heatmap.popup().content(), Some(&PopupContent::Loading));

    assert_eq!(heatmap.on_details(&second.ticket, &details), Applied::Applied);
    let Some(PopupView::Table(table)) = heatmap.popup_view() else {
        panic!("expected a details table");
    };
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1].pvalue.as_deref(), Some("0.000012346"));
    assert_eq!(
        table.rows[0].link.as_deref(),
        Some("viz.html?gid=4012&type=IMPC_ABR_002_001")
    );

    heatmap.close_popup();
    assert!(heatmap.popup_view().is_none());
}

#[test]
fn invalid_details_show_a_warning() {
    let mut heatmap = loaded();
    let request = heatmap.hover_cell(0, 0).expect("cell");
    heatmap.on_details(&request.ticket, &json!({"success": true}));
    assert_eq!(
        heatmap.popup_view(),
        Some(PopupView::Warning("Server returned invalid details".into()))
    );
}

#[test]
fn slider_changes_are_debounced_into_the_threshold() {
    let mut heatmap = loaded();
    let t0 = Duration::from_millis(1_000);
    heatmap.set_threshold_text("0.05", t0);
    heatmap.set_threshold_text("0.01", t0 + Duration::from_millis(20));
    assert_eq!(heatmap.poll(t0 + Duration::from_millis(60)), None);
    assert_eq!(heatmap.poll(t0 + Duration::from_millis(70)), Some(0.01));
    assert_eq!(heatmap.threshold(), 0.01);

    let request = heatmap.hover_cell(0, 0).expect("cell");
    assert!(request.url.ends_with("threshold=0.01"));

    let change = heatmap.set_threshold_text("abc", t0 + Duration::from_secs(1));
    assert_eq!(change.value, 0.0001);
    assert_eq!(heatmap.slider().text(), "0.0001");
}

#[test]
fn dragging_the_slider_moves_the_threshold() {
    let mut heatmap = loaded();
    let start = heatmap.slider().button_left();
    heatmap.drag_start(start + 3.0);
    let change = heatmap
        .drag_move(start + 3.0 + 40.0, Duration::ZERO)
        .expect("inside the track");
    assert!(change.value > 0.0001);
    assert!(heatmap.drag_move(10_000.0, Duration::ZERO).is_none());
    heatmap.drag_end();
    assert!(heatmap.drag_move(start, Duration::ZERO).is_none());
    assert_eq!(heatmap.poll(Duration::from_millis(50)), Some(change.value));
}

#[test]
fn gradient_toggle_hides_slider() {
    let mut heatmap = loaded();
    heatmap.set_gradient(true);
    assert!(!heatmap.slider().is_visible());
    heatmap.set_gradient(false);
    assert!(heatmap.slider().is_visible());
}

#[test]
fn touch_gestures_and_clicks() {
    let mut heatmap = loaded();
    let cell = HitTarget::Cell { row: 2, column: 1 };
    heatmap.touch_start(cell, Duration::ZERO);
    let action = heatmap.touch_end(cell, Duration::from_millis(1500));
    assert_eq!(
        action,
        Some(Action::Open("viz.html?gid=4013&type=107".into()))
    );

    heatmap.touch_start(cell, Duration::ZERO);
    assert!(matches!(
        heatmap.touch_end(cell, Duration::from_millis(200)),
        Some(Action::Details(_))
    ));

    assert!(matches!(
        heatmap.click(HitTarget::ColumnHeader { column: 3 }),
        Some(Action::Load(_))
    ));
}

#[test]
fn pegs_and_colours() {
    let mut heatmap = loaded();
    assert!(heatmap.toggle_row_peg(0));
    assert!(heatmap.matrix().is_some_and(|m| m.is_highlighted(0, 4)));
    heatmap.select_colour(0, 4).expect("palette colour");
    assert_eq!(heatmap.config().endpoints.significant.to_hex(), "#1f77b4");
    assert!(heatmap.set_colour(phenomap_core::color::Endpoint::Insignificant, "nope").is_err());

    // Reload clears pegs.
    let request = heatmap.navigate_to(0).expect("root");
    heatmap.on_matrix_response(request.generation, &sample()).expect("load");
    assert!(heatmap.matrix().is_some_and(|m| !m.is_highlighted(0, 4)));
}
