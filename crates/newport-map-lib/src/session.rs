//! Map session: the single owner of all layer state
//!
//! Background loads and UI clicks never touch the registry directly. They
//! send [`SessionEvent`]s on one queue, and the UI thread applies them in
//! arrival order with [`MapSession::process_events`]. That makes every
//! register/toggle a plain `&mut self` call with no locking.

use crate::layer::merge_rects;
use crate::{
    DuplicatePolicy, FeedFetcher, Layer, LayerLoader, LayerRegistry, LayerSource, LoadError,
    LoadTask, MapSurface, ToggleBinding, UiBinder,
};
use geo::Rect;
use tokio::sync::mpsc;

/// Messages applied to the session in arrival order
#[derive(Debug)]
pub enum SessionEvent {
    /// A load finished; register the layer
    LayerLoaded(Layer),
    /// A load failed; the layer never registers
    LoadFailed { name: String, error: LoadError },
    /// Flip the named layer
    Toggle(String),
}

/// Sending half of the session queue, cloned into loads and UI binders
#[derive(Debug, Clone)]
pub struct SessionSender(mpsc::UnboundedSender<SessionEvent>);

impl SessionSender {
    /// Queue an event. Events sent after the session is dropped are discarded.
    pub fn send(&self, event: SessionEvent) {
        if self.0.send(event).is_err() {
            tracing::debug!("Session is gone, event dropped");
        }
    }
}

/// Progress of a layer started with [`MapSession::start_load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerStatus {
    Loading,
    Loaded { features: usize },
    Failed(String),
    Cancelled,
}

pub struct MapSession<S: MapSurface> {
    registry: LayerRegistry<S>,
    binder: UiBinder,
    sender: SessionSender,
    receiver: mpsc::UnboundedReceiver<SessionEvent>,
    tasks: Vec<LoadTask>,
    // Insertion order, so the UI lists layers the way they were configured
    statuses: Vec<(String, LayerStatus)>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<S: MapSurface> MapSession<S> {
    pub fn new(surface: S, bindings: Vec<ToggleBinding>) -> Self {
        let (tx, receiver) = mpsc::unbounded_channel();
        let sender = SessionSender(tx);
        Self {
            registry: LayerRegistry::new(surface),
            binder: UiBinder::new(bindings, sender.clone()),
            sender,
            receiver,
            tasks: Vec::new(),
            statuses: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.registry = self.registry.with_policy(policy);
        self
    }

    pub fn sender(&self) -> SessionSender {
        self.sender.clone()
    }

    pub fn binder(&self) -> &UiBinder {
        &self.binder
    }

    pub fn bindings(&self) -> &[ToggleBinding] {
        self.binder.bindings()
    }

    pub fn registry(&self) -> &LayerRegistry<S> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LayerRegistry<S> {
        &mut self.registry
    }

    pub fn surface(&self) -> &S {
        self.registry.surface()
    }

    /// Start loading a layer in the background.
    ///
    /// A load already running under the same name is cancelled first.
    /// Must be called from within a tokio runtime.
    pub fn start_load<F: FeedFetcher>(&mut self, loader: &LayerLoader<F>, source: LayerSource) {
        if self.abort_tasks(&source.name) {
            tracing::debug!("Restarting load of '{}'", source.name);
        }
        tracing::info!("Loading layer '{}' from {}", source.name, source.locator);
        self.set_status(&source.name, LayerStatus::Loading);
        let task = loader.spawn(source, self.sender());
        self.tasks.push(task);
    }

    /// Cancel an in-flight load. Returns `false` if nothing was loading.
    pub fn cancel_load(&mut self, name: &str) -> bool {
        if !self.abort_tasks(name) {
            return false;
        }
        tracing::info!("Cancelled load of '{}'", name);
        self.set_status(name, LayerStatus::Cancelled);
        true
    }

    fn abort_tasks(&mut self, name: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| {
            let matches = task.name() == name && !task.is_finished();
            if matches {
                task.cancel();
            }
            !matches
        });
        self.tasks.len() != before
    }

    /// Whether any started load has not been applied yet
    pub fn is_loading(&self) -> bool {
        self.statuses
            .iter()
            .any(|(_, status)| *status == LayerStatus::Loading)
    }

    /// Wait for every running load, then apply all queued events
    pub async fn wait_for_loads(&mut self) -> usize {
        for task in std::mem::take(&mut self.tasks) {
            let name = task.name().to_string();
            if let Err(e) = task.join().await {
                tracing::debug!("Load of '{}' ended without a result: {}", name, e);
            }
        }
        self.process_events()
    }

    /// Apply every queued event. Returns the number of events applied.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.receiver.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        self.tasks.retain(|task| !task.is_finished());
        applied
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LayerLoaded(layer) => {
                let name = layer.name().to_string();
                if self.status(&name) == Some(&LayerStatus::Cancelled) {
                    tracing::debug!("Dropping result of cancelled load '{}'", name);
                    return;
                }
                let features = layer.len();
                match self.registry.register(layer) {
                    Ok(()) => self.set_status(&name, LayerStatus::Loaded { features }),
                    Err(e) => tracing::warn!("{}", e),
                }
            }
            SessionEvent::LoadFailed { name, error } => {
                if self.status(&name) == Some(&LayerStatus::Cancelled) {
                    return;
                }
                match self.registry.get(&name).map(Layer::len) {
                    Some(features) => {
                        tracing::warn!(
                            "Reload of '{}' failed, keeping previous data: {}",
                            name,
                            error
                        );
                        self.set_status(&name, LayerStatus::Loaded { features });
                    }
                    None => self.set_status(&name, LayerStatus::Failed(error.to_string())),
                }
            }
            SessionEvent::Toggle(name) => {
                self.registry.toggle(&name);
            }
        }
    }

    /// Toggle a layer immediately, bypassing the queue
    pub fn toggle(&mut self, name: &str) -> bool {
        self.registry.toggle(name)
    }

    pub fn is_attached(&self, name: &str) -> bool {
        self.registry.is_attached(name)
    }

    pub fn status(&self, name: &str) -> Option<&LayerStatus> {
        self.statuses
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, status)| status)
    }

    /// Status of every layer that was started, in start order
    pub fn statuses(&self) -> impl Iterator<Item = (&str, &LayerStatus)> {
        self.statuses
            .iter()
            .map(|(name, status)| (name.as_str(), status))
    }

    fn set_status(&mut self, name: &str, status: LayerStatus) {
        match self.statuses.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = status,
            None => self.statuses.push((name.to_string(), status)),
        }
    }

    /// Bounding box (x = lon, y = lat) of every attached layer
    pub fn attached_bounds(&self) -> Option<Rect<f64>> {
        merge_rects(
            self.registry
                .layers()
                .filter(|layer| layer.is_attached())
                .filter_map(Layer::bounding_rect),
        )
    }
}
