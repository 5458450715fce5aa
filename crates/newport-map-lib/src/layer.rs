//! Named collections of rendered elements

use crate::RenderedElement;
use geo::{BoundingRect, Coord, Rect};
use std::sync::Arc;

/// A named, fully loaded overlay.
///
/// A layer is only ever built from a complete feed, so there is no partially
/// loaded state. The element list is shared (`Arc`) with the map surface while
/// the layer is attached; attaching and detaching never copy or drop the data.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    elements: Arc<[RenderedElement]>,
    attached: bool,
}

impl Layer {
    /// Create a layer that is attached as soon as it is registered
    pub fn new(name: impl Into<String>, elements: Vec<RenderedElement>) -> Self {
        Self {
            name: name.into(),
            elements: elements.into(),
            attached: true,
        }
    }

    /// Set the initial attachment state (before registration)
    pub fn with_attached(mut self, attached: bool) -> Self {
        self.attached = attached;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &Arc<[RenderedElement]> {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Only the registry flips this, in the same step as the surface update
    pub(crate) fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    /// Bounding box of all elements in WGS84 (x = lon, y = lat)
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        merge_rects(self.elements.iter().filter_map(|e| e.geometry.bounding_rect()))
    }
}

/// Smallest rectangle covering every input rectangle
pub(crate) fn merge_rects(rects: impl IntoIterator<Item = Rect<f64>>) -> Option<Rect<f64>> {
    rects.into_iter().reduce(|acc, rect| {
        Rect::new(
            Coord {
                x: acc.min().x.min(rect.min().x),
                y: acc.min().y.min(rect.min().y),
            },
            Coord {
                x: acc.max().x.max(rect.max().x),
                y: acc.max().y.max(rect.max().y),
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeatureRecord, FeatureRenderer, Presentation};
    use geo::{Geometry, Point};

    fn element(lon: f64, lat: f64) -> RenderedElement {
        Presentation::Plain.render(FeatureRecord::new(Geometry::Point(Point::new(lon, lat))))
    }

    #[test]
    fn test_new_layer_is_attached() {
        let layer = Layer::new("hotels", vec![element(0.0, 0.0)]);
        assert_eq!(layer.name(), "hotels");
        assert_eq!(layer.len(), 1);
        assert!(layer.is_attached());
        assert!(!layer.with_attached(false).is_attached());
    }

    #[test]
    fn test_bounding_rect() {
        let layer = Layer::new(
            "hotels",
            vec![element(-71.32, 41.48), element(-71.30, 41.50)],
        );
        let rect = layer.bounding_rect().unwrap();
        assert_eq!(rect.min(), Coord { x: -71.32, y: 41.48 });
        assert_eq!(rect.max(), Coord { x: -71.30, y: 41.50 });

        assert!(Layer::new("empty", Vec::new()).bounding_rect().is_none());
    }
}
