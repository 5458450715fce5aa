//! Application state management

use crate::app::layers::{self, NEWPORT_LAYERS};
use crate::app::settings::Settings;
use newport_map_lib::{
    LayerLoader, LayerSource, LayerStatus, LocatorFetcher, MapSession, OverlaySurface,
};

/// UI-only flags
#[derive(Debug, Clone)]
pub struct UiSettings {
    pub sidebar_open: bool,
    pub show_legend: bool,
    pub show_help: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            show_legend: true,
            show_help: false,
        }
    }
}

/// How a configured layer appears in the status panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerState {
    Waiting,
    Loading,
    Attached { features: usize },
    Hidden { features: usize },
    Failed(String),
    Cancelled,
}

/// Main application state
pub struct AppState {
    pub session: MapSession<OverlaySurface>,
    /// Absent if the HTTP client could not be built
    loader: Option<LayerLoader<LocatorFetcher>>,
    /// Every layer to load, in display order
    pub sources: Vec<LayerSource>,
    pub ui_settings: UiSettings,
    pub pending_fit_bounds: bool,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let session = MapSession::new(OverlaySurface::new(), layers::default_bindings())
            .with_policy(settings.duplicate_policy());

        let loader = match LocatorFetcher::new() {
            Ok(fetcher) => Some(LayerLoader::new(fetcher, settings.loader_config())),
            Err(e) => {
                tracing::error!("Cannot load any layer: {}", e);
                None
            }
        };

        Self {
            session,
            loader,
            sources: layers::layer_sources(&settings.data_dir, &settings.layers),
            ui_settings: UiSettings::default(),
            pending_fit_bounds: false,
        }
    }

    /// Start every configured load. Requires a tokio runtime.
    pub fn start_loading(&mut self) {
        let Some(loader) = &self.loader else {
            return;
        };
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::error!("No async runtime available, layers will not load");
            return;
        }
        tracing::info!("Loading {} layers", self.sources.len());
        for source in &self.sources {
            self.session.start_load(loader, source.clone());
        }
    }

    /// Restart one layer's load
    pub fn reload(&mut self, name: &str) {
        let Some(loader) = &self.loader else {
            return;
        };
        if let Some(source) = self.sources.iter().find(|s| s.name == name) {
            self.session.start_load(loader, source.clone());
        }
    }

    pub fn cancel(&mut self, name: &str) {
        self.session.cancel_load(name);
    }

    /// Apply queued loads and clicks. Returns whether anything changed.
    pub fn process_events(&mut self) -> bool {
        self.session.process_events() > 0
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    /// Combined load status and attachment state of a layer
    pub fn layer_state(&self, name: &str) -> LayerState {
        match self.session.status(name) {
            None => LayerState::Waiting,
            Some(LayerStatus::Loading) => LayerState::Loading,
            Some(LayerStatus::Failed(error)) => LayerState::Failed(error.clone()),
            Some(LayerStatus::Cancelled) => LayerState::Cancelled,
            Some(LayerStatus::Loaded { features }) => {
                if self.session.is_attached(name) {
                    LayerState::Attached {
                        features: *features,
                    }
                } else {
                    LayerState::Hidden {
                        features: *features,
                    }
                }
            }
        }
    }

    /// Whether a catalog layer's controls do anything
    pub fn is_toggleable(&self, name: &str) -> bool {
        self.session.registry().contains(name)
    }

    /// Layers with a toolbar button and a legend row
    pub fn catalog(&self) -> &'static [layers::LayerEntry] {
        &NEWPORT_LAYERS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use newport_map_lib::{FeatureRecord, FeatureRenderer, Layer, Presentation};

    fn state() -> AppState {
        AppState::new(&Settings::try_parse_from(["newport-map-viewer"]).unwrap())
    }

    #[test]
    fn test_layer_state_follows_toggles() {
        let mut state = state();
        assert_eq!(state.layer_state("hotels"), LayerState::Waiting);

        let element = Presentation::Hotels.render(FeatureRecord::new(geo::Geometry::Point(
            geo::Point::new(-71.31, 41.48),
        )));
        state
            .session
            .handle_event(newport_map_lib::SessionEvent::LayerLoaded(Layer::new(
                "hotels",
                vec![element],
            )));
        assert_eq!(
            state.layer_state("hotels"),
            LayerState::Attached { features: 1 }
        );
        assert!(state.is_toggleable("hotels"));

        state.session.binder().activate("hotelsButton");
        assert!(state.process_events());
        assert_eq!(
            state.layer_state("hotels"),
            LayerState::Hidden { features: 1 }
        );
    }

    #[test]
    fn test_sources_cover_catalog() {
        let state = state();
        assert_eq!(state.sources.len(), NEWPORT_LAYERS.len());
        assert_eq!(state.catalog().len(), 4);
    }
}
