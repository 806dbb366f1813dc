//! End-to-end behaviour of a map session against a recording engine

mod common;

use common::*;
use mapframe::prelude::*;
use serde_json::json;

const TRAILS_URL: &str = "https://data.example.com/trails.geojson";
const SUMMITS_URL: &str = "https://data.example.com/summits.geojson";

#[tokio::test]
async fn test_switching_background_hides_the_other_and_rezooms() {
    let (engine, _fetcher, mut session) =
        start(config(), RecordingEngine::at_zoom(10.0), CountingFetcher::default());
    assert!(session.visibility_state().is_background_active("bg1"));
    assert_eq!(
        session.zoom_range(),
        EffectiveZoomRange { min: Some(0.0), max: Some(18.0) }
    );
    engine.borrow_mut().commands.clear();

    session.set_active_background("bg2").unwrap();

    assert_eq!(
        engine.borrow().commands,
        vec![
            EngineCommand::SetLayerVisibility { layer_id: "bg1".into(), visible: false },
            EngineCommand::SetLayerVisibility { layer_id: "bg2".into(), visible: true },
            EngineCommand::SetZoomRange(EffectiveZoomRange { min: Some(5.0), max: Some(16.0) }),
        ]
    );
    assert!(session.visibility_state().is_background_active("bg2"));
}

#[tokio::test]
async fn test_out_of_range_zoom_snaps_to_new_limit() {
    let (engine, _fetcher, mut session) =
        start(config(), RecordingEngine::at_zoom(17.5), CountingFetcher::default());

    session.set_active_background("bg2").unwrap();

    assert_eq!(engine.borrow().commands.last(), Some(&EngineCommand::SetZoom(16.0)));
    assert_eq!(engine.borrow().zoom, 16.0);

    // Back to streets: the wider range no longer forces a zoom change
    engine.borrow_mut().commands.clear();
    session.set_active_background("bg1").unwrap();
    assert!(!engine
        .borrow()
        .commands
        .iter()
        .any(|command| matches!(command, EngineCommand::SetZoom(_))));
}

#[tokio::test]
async fn test_exactly_one_background_after_any_switch_sequence() {
    let (engine, _fetcher, mut session) =
        start(config(), RecordingEngine::at_zoom(8.0), CountingFetcher::default());

    for id in ["bg2", "bg2", "bg1", "bg2", "bg1"] {
        session.set_active_background(id).unwrap();
        let engine = engine.borrow();
        let visible: Vec<_> = ["bg1", "bg2"]
            .into_iter()
            .filter(|bg| engine.visibility.get(*bg) == Some(&true))
            .collect();
        assert_eq!(visible, vec![id]);
    }
}

#[tokio::test]
async fn test_toggling_trails_fans_out_to_style_layers() {
    let (engine, _fetcher, mut session) =
        start(config(), RecordingEngine::at_zoom(8.0), CountingFetcher::default());
    assert!(!session.visibility_state().is_data_layer_visible("trails"));
    engine.borrow_mut().commands.clear();

    session.set_data_layer_visible("trails", true).unwrap();

    assert_eq!(engine.borrow().visibility_calls(), vec![("trails-line".to_string(), true)]);
    assert!(session.visibility_state().is_data_layer_visible("trails"));

    assert!(matches!(
        session.set_data_layer_visible("rivers", true),
        Err(MapError::UnknownDataLayer(_))
    ));
}

#[tokio::test]
async fn test_auto_fit_frames_all_vector_sources() {
    let fetcher = CountingFetcher::default()
        .with_json(TRAILS_URL, points(&[[0.0, 0.0], [1.0, 1.0]]))
        .with_json(SUMMITS_URL, points(&[[-1.0, 2.0]]));
    let (engine, _fetcher, session) = start(config(), RecordingEngine::at_zoom(2.0), fetcher);
    engine.borrow_mut().commands.clear();

    session.on_style_loaded().await.unwrap();

    assert_eq!(
        engine.borrow().commands,
        vec![EngineCommand::FitBounds {
            envelope: GeometryEnvelope::from_edges(-1.0, 0.0, 1.0, 2.0),
            padding: 60.0,
        }]
    );
}

#[tokio::test]
async fn test_auto_fit_prefers_resident_source_data() {
    let fetcher = CountingFetcher::default().with_json(SUMMITS_URL, points(&[[7.0, 46.0]]));
    let mut engine = RecordingEngine::at_zoom(2.0);
    engine.resident.insert(
        "trails".into(),
        GeoJson::from_value(points(&[[8.0, 47.0]])).unwrap(),
    );
    let (engine, fetcher, session) = start(config(), engine, fetcher);
    engine.borrow_mut().commands.clear();

    session.on_style_loaded().await.unwrap();

    assert_eq!(fetcher.request_count(TRAILS_URL), 0);
    assert_eq!(fetcher.request_count(SUMMITS_URL), 1);
    assert_eq!(
        engine.borrow().commands,
        vec![EngineCommand::FitBounds {
            envelope: GeometryEnvelope::from_edges(7.0, 46.0, 8.0, 47.0),
            padding: 60.0,
        }]
    );
}

#[tokio::test]
async fn test_no_geometry_means_no_camera_change() {
    let (engine, _fetcher, session) =
        start(config(), RecordingEngine::at_zoom(2.0), CountingFetcher::default());
    engine.borrow_mut().commands.clear();

    session.on_style_loaded().await.unwrap();

    assert!(engine.borrow().commands.is_empty());
}

#[tokio::test]
async fn test_explicit_bounds_are_applied_on_attach() {
    let mut config = config();
    config.bounds = Some([5.9, 45.8, 10.5, 47.8]);
    config.custom_ui.fit_padding = Some(12.0);

    let (engine, fetcher, session) =
        start(config, RecordingEngine::at_zoom(2.0), CountingFetcher::default());
    assert_eq!(
        engine.borrow().commands.last(),
        Some(&EngineCommand::FitBounds {
            envelope: GeometryEnvelope::from_edges(5.9, 45.8, 10.5, 47.8),
            padding: 12.0,
        })
    );

    session.on_style_loaded().await.unwrap();
    assert!(fetcher.requests.borrow().is_empty());
}

#[tokio::test]
async fn test_click_on_nothing_keeps_panel_hidden() {
    let (_engine, _fetcher, mut session) =
        start(config(), RecordingEngine::at_zoom(8.0), CountingFetcher::default());

    assert_eq!(session.on_click(ScreenPoint::new(10.0, 10.0)), None);
    assert!(!session.ui_state().panel.is_visible());
}

#[tokio::test]
async fn test_click_shows_topmost_feature() {
    let (engine, _fetcher, mut session) =
        start(config(), RecordingEngine::at_zoom(8.0), CountingFetcher::default());
    engine.borrow_mut().hits = vec![
        feature(
            "summits-symbol",
            json!({
                "title": "Dom",
                "description": "<b>4545 m</b>",
                "imageUrl": "https://img.example.com/dom.jpg",
                "imageSize": "800,600"
            }),
        ),
        feature("summits-symbol", json!({"title": "Täschhorn"})),
        // Not interactive, never reported to the picker
        feature("trails-line", json!({"title": "Europaweg"})),
    ];

    let record = session.on_click(ScreenPoint::new(10.0, 10.0)).unwrap();

    assert_eq!(record.title.as_deref(), Some("Dom"));
    assert_eq!(record.description.as_deref(), Some("<b>4545 m</b>"));
    assert_eq!(record.image_url.as_deref(), Some("https://img.example.com/dom.jpg"));
    assert_eq!(record.image_aspect, Some(800.0 / 600.0));
    assert_eq!(session.ui_state().panel.content(), Some(&record));
}

#[tokio::test]
async fn test_pointer_cursor_follows_interactive_hits() {
    let (engine, _fetcher, mut session) =
        start(config(), RecordingEngine::at_zoom(8.0), CountingFetcher::default());

    engine.borrow_mut().hits = vec![feature("trails-line", json!({"title": "Europaweg"}))];
    assert!(!session.on_pointer_move(ScreenPoint::new(1.0, 1.0)));

    engine.borrow_mut().hits = vec![feature("summits-symbol", json!({}))];
    assert!(session.on_pointer_move(ScreenPoint::new(1.0, 1.0)));
    assert!(session.ui_state().pointer_cursor);
}

#[tokio::test]
async fn test_layer_chooser_dismissal() {
    let (_engine, _fetcher, mut session) =
        start(config(), RecordingEngine::at_zoom(8.0), CountingFetcher::default());
    let position = ScreenPoint::new(0.0, 0.0);

    for event in [
        InputEvent::Click { position },
        InputEvent::DragStart { position },
        InputEvent::DoubleClick { position },
    ] {
        session.toggle_layer_chooser();
        assert!(session.ui_state().layer_chooser.is_open());
        session.handle_input(event);
        assert!(!session.ui_state().layer_chooser.is_open(), "{event:?} should close the chooser");
    }

    session.toggle_layer_chooser();
    session.handle_input(InputEvent::MouseMove { position });
    assert!(session.ui_state().layer_chooser.is_open());
}

#[tokio::test]
async fn test_invalid_references_do_not_stop_the_session() {
    let mut config = config();
    config.custom_ui.background_layers.push(serde_json::from_value(
        json!({"id": "bg-missing", "name": "Gone"}),
    ).unwrap());

    let (_engine, _fetcher, session) =
        start(config, RecordingEngine::at_zoom(8.0), CountingFetcher::default());

    let report = session.config().report();
    assert_eq!(report.invalid_references.len(), 1);
    assert_eq!(report.invalid_references[0].layer_id, "bg-missing");
    assert_eq!(session.config().backgrounds().len(), 2);
}
