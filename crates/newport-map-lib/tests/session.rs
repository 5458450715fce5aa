//! End-to-end session scenarios: background loads, queued clicks and toggles

use newport_map_lib::{
    FeedFetcher, LayerLoader, LayerSource, LayerStatus, LoadError, LoaderConfig, MapSession,
    OverlaySurface, Presentation, Result, ToggleBinding,
};
use std::collections::HashMap;
use std::time::Duration;

const HOTELS: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","geometry":{"type":"Point","coordinates":[-71.3128,41.4862]},
     "properties":{"name":"Hotel Viking","street":"1 Bellevue Ave","city":"Newport","state":"RI"}},
    {"type":"Feature","geometry":{"type":"Point","coordinates":[-71.3190,41.4890]},
     "properties":{"name":"Newport Harbor Hotel","street":"49 America's Cup Ave","city":"Newport","state":"RI"}}
]}"#;

const HOTELS_MISSING_NAME: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","geometry":{"type":"Point","coordinates":[-71.3128,41.4862]},
     "properties":{"street":"1 Bellevue Ave","city":"Newport","state":"RI"}},
    {"type":"Feature","geometry":{"type":"Point","coordinates":[-71.3190,41.4890]},
     "properties":{"name":"Newport Harbor Hotel","street":"49 America's Cup Ave","city":"Newport","state":"RI"}}
]}"#;

const SIDEWALKS: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","geometry":{"type":"LineString","coordinates":[[-71.31,41.48],[-71.30,41.49]]},"properties":null}
]}"#;

/// In-memory feeds, each served after its own delay
struct DelayedFeeds(HashMap<&'static str, (u64, &'static str)>);

impl DelayedFeeds {
    fn new(feeds: &[(&'static str, u64, &'static str)]) -> Self {
        Self(
            feeds
                .iter()
                .map(|(locator, delay, text)| (*locator, (*delay, *text)))
                .collect(),
        )
    }
}

impl FeedFetcher for DelayedFeeds {
    async fn fetch(&self, locator: &str) -> Result<String> {
        match self.0.get(locator) {
            Some((delay_ms, text)) => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(text.to_string())
            }
            None => Err(LoadError::HttpStatus {
                locator: locator.to_string(),
                status: 404,
            }),
        }
    }
}

fn newport_session() -> MapSession<OverlaySurface> {
    MapSession::new(
        OverlaySurface::new(),
        vec![
            ToggleBinding::new("hotelsButton", "hotels"),
            ToggleBinding::new("hotels", "hotels"),
            ToggleBinding::new("crosswalksButton", "crosswalks"),
            ToggleBinding::new("sidewalksButton", "sidewalks"),
        ],
    )
}

fn loader(feeds: &[(&'static str, u64, &'static str)]) -> LayerLoader<DelayedFeeds> {
    LayerLoader::new(DelayedFeeds::new(feeds), LoaderConfig::default())
}

#[tokio::test]
async fn test_hotels_toggle_off_and_on() {
    let loader = loader(&[("hotels.geojson", 0, HOTELS)]);
    let mut session = newport_session();
    session.start_load(
        &loader,
        LayerSource::new("hotels", "hotels.geojson", Presentation::Hotels),
    );
    session.wait_for_loads().await;

    assert!(session.is_attached("hotels"));
    assert_eq!(session.surface().element_count(), 2);

    session.binder().activate("hotelsButton");
    session.process_events();
    assert!(!session.is_attached("hotels"));
    assert_eq!(session.surface().element_count(), 0);

    session.binder().activate("hotels");
    session.process_events();
    assert!(session.is_attached("hotels"));
    assert_eq!(session.surface().element_count(), 2);
}

#[tokio::test]
async fn test_click_before_load_is_absorbed() {
    let mut session = newport_session();

    assert!(session.binder().activate("crosswalksButton"));
    assert_eq!(session.process_events(), 1);
    assert!(!session.is_attached("crosswalks"));
    assert!(!session.toggle("crosswalks"));
}

#[tokio::test(start_paused = true)]
async fn test_loads_completing_in_reverse_order() {
    let loader = loader(&[
        ("hotels.geojson", 500, HOTELS),
        ("sidewalks.geojson", 10, SIDEWALKS),
    ]);
    let mut session = newport_session();
    session.start_load(
        &loader,
        LayerSource::new("hotels", "hotels.geojson", Presentation::Hotels),
    );
    session.start_load(
        &loader,
        LayerSource::new("sidewalks", "sidewalks.geojson", Presentation::Sidewalks),
    );
    assert!(session.is_loading());

    session.wait_for_loads().await;

    assert!(!session.is_loading());
    assert!(session.is_attached("hotels"));
    assert!(session.is_attached("sidewalks"));
    assert_eq!(
        session.surface().visible_layers().collect::<Vec<_>>(),
        vec!["sidewalks", "hotels"]
    );
}

#[tokio::test]
async fn test_missing_name_renders_blank_and_siblings_survive() {
    let loader = loader(&[("hotels.geojson", 0, HOTELS_MISSING_NAME)]);
    let mut session = newport_session();
    session.start_load(
        &loader,
        LayerSource::new("hotels", "hotels.geojson", Presentation::Hotels),
    );
    session.wait_for_loads().await;

    let layer = session.registry().get("hotels").unwrap();
    assert_eq!(layer.len(), 2);

    let first = layer.elements()[0].popup.as_ref().unwrap();
    assert_eq!(first.title.as_deref(), Some(""));
    assert_eq!(first.lines, vec!["1 Bellevue Ave", "Newport, RI"]);

    let second = layer.elements()[1].popup.as_ref().unwrap();
    assert_eq!(second.title.as_deref(), Some("Newport Harbor Hotel"));
}

#[tokio::test]
async fn test_failed_load_is_contained() {
    let loader = loader(&[("hotels.geojson", 0, HOTELS)]);
    let mut session = newport_session();
    session.start_load(
        &loader,
        LayerSource::new("hotels", "hotels.geojson", Presentation::Hotels),
    );
    session.start_load(
        &loader,
        LayerSource::new("crosswalks", "missing.geojson", Presentation::CrosswalkSurvey),
    );
    session.wait_for_loads().await;

    assert!(session.is_attached("hotels"));
    assert!(!session.is_attached("crosswalks"));
    assert_eq!(
        session.status("crosswalks"),
        Some(&LayerStatus::Failed(
            "HTTP 404 from missing.geojson".to_string()
        ))
    );

    // The failed layer's control stays inert
    session.binder().activate("crosswalksButton");
    session.process_events();
    assert!(!session.is_attached("crosswalks"));
    assert!(session.is_attached("hotels"));
}

#[tokio::test]
async fn test_failed_reload_keeps_layer_and_finishes() {
    let loader = loader(&[("hotels.geojson", 0, HOTELS)]);
    let mut session = newport_session();
    session.start_load(
        &loader,
        LayerSource::new("hotels", "hotels.geojson", Presentation::Hotels),
    );
    session.wait_for_loads().await;

    // Same layer, now served from a feed that is gone
    session.start_load(
        &loader,
        LayerSource::new("hotels", "gone.geojson", Presentation::Hotels),
    );
    session.wait_for_loads().await;

    assert!(!session.is_loading());
    assert_eq!(
        session.status("hotels"),
        Some(&LayerStatus::Loaded { features: 2 })
    );
    assert!(session.is_attached("hotels"));
    assert!(!session.cancel_load("hotels"));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_load_never_registers() {
    let loader = loader(&[("hotels.geojson", 1_000, HOTELS)]);
    let mut session = newport_session();
    session.start_load(
        &loader,
        LayerSource::new("hotels", "hotels.geojson", Presentation::Hotels),
    );

    assert!(session.cancel_load("hotels"));
    assert!(!session.cancel_load("hotels"));
    tokio::time::sleep(Duration::from_secs(2)).await;
    session.wait_for_loads().await;

    assert!(!session.registry().contains("hotels"));
    assert_eq!(session.status("hotels"), Some(&LayerStatus::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_load_never_registers() {
    let loader = LayerLoader::new(
        DelayedFeeds::new(&[("hotels.geojson", 60_000, HOTELS)]),
        LoaderConfig {
            timeout: Some(Duration::from_secs(5)),
        },
    );
    let mut session = newport_session();
    session.start_load(
        &loader,
        LayerSource::new("hotels", "hotels.geojson", Presentation::Hotels),
    );
    session.wait_for_loads().await;

    assert!(!session.registry().contains("hotels"));
    assert!(matches!(
        session.status("hotels"),
        Some(LayerStatus::Failed(_))
    ));
}

#[tokio::test]
async fn test_statuses_keep_start_order() {
    let loader = loader(&[
        ("sidewalks.geojson", 0, SIDEWALKS),
        ("hotels.geojson", 0, HOTELS),
    ]);
    let mut session = newport_session();
    for (name, locator, presentation) in [
        ("sidewalks", "sidewalks.geojson", Presentation::Sidewalks),
        ("hotels", "hotels.geojson", Presentation::Hotels),
    ] {
        session.start_load(&loader, LayerSource::new(name, locator, presentation));
    }
    session.wait_for_loads().await;

    let statuses: Vec<_> = session.statuses().collect();
    assert_eq!(
        statuses,
        vec![
            ("sidewalks", &LayerStatus::Loaded { features: 1 }),
            ("hotels", &LayerStatus::Loaded { features: 2 }),
        ]
    );
}
