//! Map surface abstraction
//!
//! The surface is the set of elements currently drawn on top of the base map.
//! The registry is its only writer; the viewer reads it every frame to draw.

use crate::RenderedElement;
use std::sync::Arc;

/// Attach/detach primitives of the map the layers are shown on
pub trait MapSurface {
    /// Make a layer's elements visible. Attaching an already visible layer
    /// replaces its elements and moves it to the top.
    fn attach_elements(&mut self, layer: &str, elements: Arc<[RenderedElement]>);

    /// Remove a layer's elements from view (no-op if not visible)
    fn detach_elements(&mut self, layer: &str);

    /// Whether the layer's elements are currently visible
    fn is_visible(&self, layer: &str) -> bool;
}

/// In-memory visible set, kept in draw order (first attached is drawn first)
#[derive(Debug, Clone, Default)]
pub struct OverlaySurface {
    groups: Vec<(String, Arc<[RenderedElement]>)>,
}

impl OverlaySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the visible layers in draw order
    pub fn visible_layers(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    /// Every visible element in draw order
    pub fn visible_elements(&self) -> impl Iterator<Item = &RenderedElement> {
        self.groups.iter().flat_map(|(_, elements)| elements.iter())
    }

    /// Elements of one visible layer
    pub fn elements_of(&self, layer: &str) -> Option<&Arc<[RenderedElement]>> {
        self.groups
            .iter()
            .find(|(name, _)| name == layer)
            .map(|(_, elements)| elements)
    }

    pub fn element_count(&self) -> usize {
        self.groups.iter().map(|(_, elements)| elements.len()).sum()
    }

    /// Cheap copy of the visible groups for a render pass
    pub fn snapshot(&self) -> Vec<Arc<[RenderedElement]>> {
        self.groups.iter().map(|(_, elements)| elements.clone()).collect()
    }
}

impl MapSurface for OverlaySurface {
    fn attach_elements(&mut self, layer: &str, elements: Arc<[RenderedElement]>) {
        self.groups.retain(|(name, _)| name != layer);
        self.groups.push((layer.to_string(), elements));
    }

    fn detach_elements(&mut self, layer: &str) {
        self.groups.retain(|(name, _)| name != layer);
    }

    fn is_visible(&self, layer: &str) -> bool {
        self.groups.iter().any(|(name, _)| name == layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeatureRecord, FeatureRenderer, Presentation};
    use geo::{Geometry, Point};

    fn elements(n: usize) -> Arc<[RenderedElement]> {
        (0..n)
            .map(|i| {
                Presentation::Plain.render(FeatureRecord::new(Geometry::Point(Point::new(
                    i as f64, 0.0,
                ))))
            })
            .collect()
    }

    #[test]
    fn test_attach_detach() {
        let mut surface = OverlaySurface::new();
        surface.attach_elements("hotels", elements(2));
        surface.attach_elements("sidewalks", elements(3));
        assert!(surface.is_visible("hotels"));
        assert_eq!(surface.element_count(), 5);
        assert_eq!(
            surface.visible_layers().collect::<Vec<_>>(),
            vec!["hotels", "sidewalks"]
        );

        surface.detach_elements("hotels");
        assert!(!surface.is_visible("hotels"));
        assert_eq!(surface.element_count(), 3);

        // Detaching twice is harmless
        surface.detach_elements("hotels");
        assert_eq!(surface.element_count(), 3);
    }

    #[test]
    fn test_reattach_moves_to_top_without_duplicates() {
        let mut surface = OverlaySurface::new();
        surface.attach_elements("hotels", elements(2));
        surface.attach_elements("sidewalks", elements(1));
        surface.attach_elements("hotels", elements(2));

        assert_eq!(
            surface.visible_layers().collect::<Vec<_>>(),
            vec!["sidewalks", "hotels"]
        );
        assert_eq!(surface.element_count(), 3);
        assert_eq!(surface.snapshot().len(), 2);
    }
}
