//! Layer registry and toggle controller
//!
//! The registry owns every loaded [`Layer`] and the [`MapSurface`] they are shown
//! on, and is the only place where a layer's `attached` flag changes. Every
//! change to the flag happens together with the matching attach/detach call, so
//! the flag and the surface never disagree.
//!
//! Toggling a name that is not registered (its feed is still loading, or it
//! failed) is a silent no-op: the UI may fire toggles before data exists.

use crate::{Layer, MapSurface, RegistryError};
use std::collections::HashMap;

/// What to do when a layer is registered under a name that already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Last write wins (logged). Independent loads finish in any order.
    #[default]
    Replace,
    /// Keep the existing layer and return [`RegistryError::DuplicateName`]
    Reject,
}

/// Name -> layer map kept in sync with a map surface
pub struct LayerRegistry<S: MapSurface> {
    layers: HashMap<String, Layer>,
    surface: S,
    policy: DuplicatePolicy,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<S: MapSurface> LayerRegistry<S> {
    pub fn new(surface: S) -> Self {
        Self {
            layers: HashMap::new(),
            surface,
            policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Insert a layer, attaching its elements if the layer is marked attached.
    ///
    /// An existing layer with the same name is detached and replaced, unless the
    /// policy is [`DuplicatePolicy::Reject`].
    pub fn register(&mut self, layer: Layer) -> Result<(), RegistryError> {
        let name = layer.name().to_string();

        if self.layers.contains_key(&name) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    tracing::warn!("Rejected duplicate layer '{}'", name);
                    return Err(RegistryError::DuplicateName(name));
                }
                DuplicatePolicy::Replace => {
                    tracing::warn!("Layer '{}' registered twice, replacing", name);
                    if let Some(old) = self.layers.remove(&name)
                        && old.is_attached()
                    {
                        self.surface.detach_elements(&name);
                    }
                }
            }
        }

        if layer.is_attached() {
            self.surface
                .attach_elements(&name, layer.elements().clone());
        }

        tracing::info!(
            "Registered layer '{}' ({} elements, {})",
            name,
            layer.len(),
            if layer.is_attached() { "attached" } else { "detached" }
        );
        self.layers.insert(name, layer);
        Ok(())
    }

    /// Flip a layer between attached and detached.
    ///
    /// Returns `true` if a layer was toggled, `false` if the name is unknown.
    pub fn toggle(&mut self, name: &str) -> bool {
        let Some(layer) = self.layers.get_mut(name) else {
            tracing::debug!("Toggle of unregistered layer '{}' ignored", name);
            return false;
        };

        if layer.is_attached() {
            self.surface.detach_elements(name);
            layer.set_attached(false);
        } else {
            self.surface.attach_elements(name, layer.elements().clone());
            layer.set_attached(true);
        }

        debug_assert_eq!(layer.is_attached(), self.surface.is_visible(name));
        tracing::debug!(
            "Layer '{}' is now {}",
            name,
            if layer.is_attached() { "attached" } else { "detached" }
        );
        true
    }

    /// Current attachment state; unknown names are not attached
    pub fn is_attached(&self, name: &str) -> bool {
        self.layers.get(name).is_some_and(Layer::is_attached)
    }

    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.layers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeatureRecord, FeatureRenderer, OverlaySurface, Presentation, RenderedElement};
    use geo::{Geometry, Point};

    fn elements(n: usize) -> Vec<RenderedElement> {
        (0..n)
            .map(|i| {
                Presentation::Hotels.render(FeatureRecord::new(Geometry::Point(Point::new(
                    -71.3 + i as f64 * 0.001,
                    41.48,
                ))))
            })
            .collect()
    }

    fn registry() -> LayerRegistry<OverlaySurface> {
        LayerRegistry::new(OverlaySurface::new())
    }

    #[test]
    fn test_register_attaches() {
        let mut registry = registry();
        let layer = Layer::new("hotels", elements(2));
        let shared = layer.elements().clone();
        registry.register(layer).unwrap();

        assert!(registry.is_attached("hotels"));
        let visible = registry.surface().elements_of("hotels").unwrap();
        assert!(std::sync::Arc::ptr_eq(visible, &shared));
        assert_eq!(registry.surface().element_count(), 2);
    }

    #[test]
    fn test_register_detached_layer_stays_off_surface() {
        let mut registry = registry();
        registry
            .register(Layer::new("hotels", elements(2)).with_attached(false))
            .unwrap();

        assert!(registry.contains("hotels"));
        assert!(!registry.is_attached("hotels"));
        assert_eq!(registry.surface().element_count(), 0);
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut registry = registry();
        registry.register(Layer::new("hotels", elements(2))).unwrap();

        assert!(registry.toggle("hotels"));
        assert!(!registry.is_attached("hotels"));
        assert_eq!(registry.surface().element_count(), 0);

        assert!(registry.toggle("hotels"));
        assert!(registry.is_attached("hotels"));
        assert_eq!(registry.surface().element_count(), 2);
    }

    #[test]
    fn test_double_toggle_restores_state_for_any_sequence() {
        let mut registry = registry();
        registry.register(Layer::new("hotels", elements(1))).unwrap();
        registry.register(Layer::new("sidewalks", elements(3))).unwrap();

        for _ in 0..5 {
            registry.toggle("sidewalks");
            let before = registry.is_attached("hotels");
            registry.toggle("hotels");
            registry.toggle("hotels");
            assert_eq!(registry.is_attached("hotels"), before);
            assert_eq!(
                registry.surface().is_visible("hotels"),
                registry.is_attached("hotels")
            );
        }
    }

    #[test]
    fn test_toggle_unknown_is_noop() {
        let mut registry = registry();
        assert!(!registry.toggle("crosswalks"));
        assert!(!registry.is_attached("crosswalks"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_replace_policy_last_write_wins() {
        let mut registry = registry();
        registry.register(Layer::new("hotels", elements(2))).unwrap();
        registry.toggle("hotels");

        registry.register(Layer::new("hotels", elements(5))).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("hotels").unwrap().len(), 5);
        assert!(registry.is_attached("hotels"));
        assert_eq!(registry.surface().element_count(), 5);
    }

    #[test]
    fn test_reject_policy_keeps_first() {
        let mut registry = registry().with_policy(DuplicatePolicy::Reject);
        registry.register(Layer::new("hotels", elements(2))).unwrap();

        let err = registry.register(Layer::new("hotels", elements(5))).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("hotels".to_string()));
        assert_eq!(registry.get("hotels").unwrap().len(), 2);
        assert_eq!(registry.surface().element_count(), 2);
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = registry();
        registry.register(Layer::new("sidewalks", elements(1))).unwrap();
        registry.register(Layer::new("crosswalks", elements(1))).unwrap();
        registry.register(Layer::new("hotels", elements(1))).unwrap();
        assert_eq!(registry.names(), vec!["crosswalks", "hotels", "sidewalks"]);
    }
}
