//! Layer loading
//!
//! A load fetches one feed, parses it, renders every feature and produces a
//! complete [`Layer`]. Loads are independent: each runs as its own task and a
//! failure only affects its own layer.

use crate::feed::{FeedFormat, parse_feed};
use crate::{FeatureRenderer, Layer, LoadError, Presentation, Result, SessionEvent, SessionSender};
use crate::render::render_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default User-Agent string for feed requests
const DEFAULT_USER_AGENT: &str = concat!("newport-map/", env!("CARGO_PKG_VERSION"));

/// Source of feed text for a locator.
///
/// This abstraction allows tests to substitute in-memory or delayed feeds.
pub trait FeedFetcher: Send + Sync + 'static {
    /// Fetch the complete feed text behind `locator`
    fn fetch(&self, locator: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Fetches `http(s)://` locators with reqwest and reads everything else from disk
#[derive(Clone)]
pub struct LocatorFetcher {
    client: reqwest::Client,
}

impl LocatorFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(LoadError::HttpClient)?;
        Ok(Self { client })
    }

    fn is_remote(locator: &str) -> bool {
        locator.starts_with("http://") || locator.starts_with("https://")
    }

    async fn fetch_remote(&self, locator: &str) -> Result<String> {
        let http_error = |source| LoadError::Http {
            locator: locator.to_string(),
            source,
        };

        let response = self.client.get(locator).send().await.map_err(http_error)?;
        if !response.status().is_success() {
            return Err(LoadError::HttpStatus {
                locator: locator.to_string(),
                status: response.status().as_u16(),
            });
        }
        response.text().await.map_err(http_error)
    }
}

impl FeedFetcher for LocatorFetcher {
    async fn fetch(&self, locator: &str) -> Result<String> {
        tracing::debug!("Fetching feed {}", locator);
        if Self::is_remote(locator) {
            self.fetch_remote(locator).await
        } else {
            tokio::fs::read_to_string(locator)
                .await
                .map_err(|source| LoadError::Io {
                    locator: locator.to_string(),
                    source,
                })
        }
    }
}

/// Loader settings
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    /// Give up on a feed after this long (no limit by default)
    pub timeout: Option<Duration>,
}

/// A named feed and how to present it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSource {
    pub name: String,
    pub locator: String,
    pub presentation: Presentation,
}

impl LayerSource {
    pub fn new(
        name: impl Into<String>,
        locator: impl Into<String>,
        presentation: Presentation,
    ) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
            presentation,
        }
    }
}

/// Builds layers from feeds
pub struct LayerLoader<F> {
    fetcher: Arc<F>,
    config: LoaderConfig,
}

impl<F> Clone for LayerLoader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            config: self.config.clone(),
        }
    }
}

impl<F: FeedFetcher> LayerLoader<F> {
    pub fn new(fetcher: F, config: LoaderConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            config,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a source with its own presentation policy
    pub async fn load(&self, source: &LayerSource) -> Result<Layer> {
        self.load_with(&source.name, &source.locator, &source.presentation)
            .await
    }

    /// Load a feed with any renderer. The returned layer is attached.
    pub async fn load_with<R>(&self, name: &str, locator: &str, renderer: &R) -> Result<Layer>
    where
        R: FeatureRenderer + ?Sized,
    {
        let text = self.fetch(locator).await?;
        let features = parse_feed(FeedFormat::from_locator(locator), &text)?;
        let elements = render_all(renderer, features);
        Ok(Layer::new(name, elements))
    }

    async fn fetch(&self, locator: &str) -> Result<String> {
        let fetch = self.fetcher.fetch(locator);
        match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, fetch)
                .await
                .map_err(|_| LoadError::TimedOut {
                    locator: locator.to_string(),
                    timeout,
                })?,
            None => fetch.await,
        }
    }

    /// Run a load as a background task that reports to the session queue.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, source: LayerSource, events: SessionSender) -> LoadTask {
        let loader = self.clone();
        let name = source.name.clone();

        let handle = tokio::spawn(async move {
            let event = match loader.load(&source).await {
                Ok(layer) => {
                    tracing::info!(
                        "Loaded layer '{}' from {} ({} features)",
                        source.name,
                        source.locator,
                        layer.len()
                    );
                    SessionEvent::LayerLoaded(layer)
                }
                Err(error) => {
                    tracing::warn!("Failed to load layer '{}': {}", source.name, error);
                    SessionEvent::LoadFailed {
                        name: source.name,
                        error,
                    }
                }
            };
            events.send(event);
        });

        LoadTask { name, handle }
    }
}

/// Handle to a running load
#[derive(Debug)]
pub struct LoadTask {
    name: String,
    handle: tokio::task::JoinHandle<()>,
}

impl LoadTask {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the load; its layer will never be delivered
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Wait for the task to finish. On `Ok` its result has been queued.
    pub async fn join(self) -> Result<()> {
        match self.handle.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => Err(LoadError::Cancelled),
            Err(e) => {
                tracing::error!("Load task for '{}' panicked", self.name);
                std::panic::resume_unwind(e.into_panic())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarkerIcon;
    use std::collections::HashMap;

    const TWO_HOTELS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"Point","coordinates":[-71.31,41.49]},"properties":{"name":"A"}},
        {"type":"Feature","geometry":{"type":"Point","coordinates":[-71.32,41.48]},"properties":{"name":"B"}}
    ]}"#;

    /// In-memory feeds with an optional delay per locator
    struct FakeFetcher {
        feeds: HashMap<String, (Duration, String)>,
    }

    impl FakeFetcher {
        fn new(feeds: &[(&str, u64, &str)]) -> Self {
            Self {
                feeds: feeds
                    .iter()
                    .map(|(locator, delay_ms, text)| {
                        (
                            locator.to_string(),
                            (Duration::from_millis(*delay_ms), text.to_string()),
                        )
                    })
                    .collect(),
            }
        }
    }

    impl FeedFetcher for FakeFetcher {
        async fn fetch(&self, locator: &str) -> Result<String> {
            let Some((delay, text)) = self.feeds.get(locator) else {
                return Err(LoadError::Io {
                    locator: locator.to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            };
            tokio::time::sleep(*delay).await;
            Ok(text.clone())
        }
    }

    #[tokio::test]
    async fn test_load_renders_in_feed_order() {
        let loader = LayerLoader::new(
            FakeFetcher::new(&[("hotels.geojson", 0, TWO_HOTELS)]),
            LoaderConfig::default(),
        );
        let source = LayerSource::new("hotels", "hotels.geojson", Presentation::Hotels);
        let layer = loader.load(&source).await.unwrap();

        assert_eq!(layer.name(), "hotels");
        assert!(layer.is_attached());
        let titles: Vec<_> = layer
            .elements()
            .iter()
            .map(|e| e.popup.as_ref().unwrap().title.clone().unwrap())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert!(layer.elements().iter().all(|e| e.style.marker == MarkerIcon::Green));
    }

    #[tokio::test]
    async fn test_missing_feed_is_an_error() {
        let loader = LayerLoader::new(FakeFetcher::new(&[]), LoaderConfig::default());
        let source = LayerSource::new("hotels", "missing.geojson", Presentation::Hotels);
        assert!(matches!(
            loader.load(&source).await,
            Err(LoadError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_feed_is_an_error() {
        let loader = LayerLoader::new(
            FakeFetcher::new(&[("bad.geojson", 0, "{ nope")]),
            LoaderConfig::default(),
        );
        let source = LayerSource::new("bad", "bad.geojson", Presentation::Plain);
        assert!(matches!(
            loader.load(&source).await,
            Err(LoadError::GeoJson(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let loader = LayerLoader::new(
            FakeFetcher::new(&[("slow.geojson", 10_000, TWO_HOTELS)]),
            LoaderConfig {
                timeout: Some(Duration::from_secs(1)),
            },
        );
        let source = LayerSource::new("slow", "slow.geojson", Presentation::Plain);
        assert!(matches!(
            loader.load(&source).await,
            Err(LoadError::TimedOut { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_with_closure_renderer() {
        let loader = LayerLoader::new(
            FakeFetcher::new(&[("hotels.geojson", 0, TWO_HOTELS)]),
            LoaderConfig::default(),
        );
        let renderer = |feature: crate::FeatureRecord| {
            crate::RenderedElement::new(feature.geometry, Presentation::GpsTrace.style())
        };
        let layer = loader
            .load_with("dots", "hotels.geojson", &renderer)
            .await
            .unwrap();
        assert_eq!(layer.len(), 2);
        assert!(layer.elements().iter().all(|e| e.popup.is_none()));
    }

    #[tokio::test]
    async fn test_local_file_fetch() {
        let path = std::env::temp_dir().join(format!(
            "newport-map-lib-test-{}.geojson",
            std::process::id()
        ));
        tokio::fs::write(&path, TWO_HOTELS).await.unwrap();

        let loader = LayerLoader::new(LocatorFetcher::new().unwrap(), LoaderConfig::default());
        let source = LayerSource::new(
            "hotels",
            path.to_string_lossy().to_string(),
            Presentation::Hotels,
        );
        let layer = loader.load(&source).await;
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(layer.unwrap().len(), 2);
    }
}
