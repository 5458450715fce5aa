//! Newport Map Library - Layer management for a multi-dataset overlay map
//!
//! This library loads static geospatial feeds (GeoJSON or GPX), renders every
//! feature into a styled map element and keeps track of which named overlays
//! are currently attached to the map.
//!
//! # Architecture
//!
//! - **[`FeatureRecord`]**: One parsed feature (geometry + property bag)
//! - **[`Presentation`]**: Per-dataset styling and popup policy ([`FeatureRenderer`])
//! - **[`LayerLoader`]**: Async fetch + parse + render of one feed into a [`Layer`]
//! - **[`LayerRegistry`]**: The toggle controller, kept in sync with a [`MapSurface`]
//! - **[`MapSession`]**: Owns the registry, the surface and the toggle bindings, and
//!   serializes load completions and UI clicks through one event queue
//!
//! # Usage Example
//!
//! ```rust
//! use newport_map_lib::{FeatureRecord, Layer, MapSession, OverlaySurface, Presentation, FeatureRenderer, ToggleBinding};
//!
//! let feature = FeatureRecord::new(geo::Geometry::Point(geo::Point::new(-71.31, 41.48)));
//! let element = Presentation::Hotels.render(feature);
//!
//! let bindings = vec![ToggleBinding::new("hotelsButton", "hotels")];
//! let mut session = MapSession::new(OverlaySurface::new(), bindings);
//! session.registry_mut().register(Layer::new("hotels", vec![element])).unwrap();
//!
//! session.binder().activate("hotelsButton");
//! session.process_events();
//! assert!(!session.is_attached("hotels"));
//! ```

mod binding;
mod feature;
pub mod feed;
mod layer;
mod loader;
mod registry;
mod render;
mod session;
mod surface;

// Public API exports
pub use binding::{ToggleBinding, UiBinder};
pub use feature::{FeatureRecord, PropertyMap, display_value};
pub use layer::Layer;
pub use loader::{FeedFetcher, LayerLoader, LayerSource, LoadTask, LoaderConfig, LocatorFetcher};
pub use registry::{DuplicatePolicy, LayerRegistry};
pub use render::{
    ElementStyle, FeatureRenderer, LineStroke, MarkerIcon, Popup, PopupLink, Presentation,
    RenderedElement, render_all,
};
pub use session::{LayerStatus, MapSession, SessionEvent, SessionSender};
pub use surface::{MapSurface, OverlaySurface};

use std::time::Duration;

/// Errors raised while loading a single layer feed
///
/// A load error is always contained to the layer it belongs to: the session
/// logs it and the layer simply never registers.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {locator}: {source}")]
    Io {
        locator: String,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Request for {locator} failed: {source}")]
    Http {
        locator: String,
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {locator}")]
    HttpStatus { locator: String, status: u16 },

    #[error("GeoJSON parsing error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("Load of {locator} timed out after {timeout:?}")]
    TimedOut { locator: String, timeout: Duration },

    #[error("Load cancelled")]
    Cancelled,
}

/// Errors raised by the layer registry
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A layer named '{0}' is already registered")]
    DuplicateName(String),
}

pub type Result<T> = std::result::Result<T, LoadError>;
