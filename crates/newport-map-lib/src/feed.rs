//! Feed parsing
//!
//! Turns the raw text of a data feed into an ordered list of [`FeatureRecord`]s.
//! GeoJSON is the primary format (feature collections, single features and bare
//! geometries are accepted); GPX files are accepted as well so a recorded trace
//! can be shown without converting it first.
//!
//! Features without a usable geometry are skipped (there is nothing to place on
//! the map); the rest of the feed still loads.

use crate::{FeatureRecord, PropertyMap, Result};
use geo::{Geometry, LineString};
use geojson::{Feature, GeoJson};
use serde_json::json;

/// Supported feed encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    GeoJson,
    Gpx,
}

impl FeedFormat {
    /// Guess the format from the locator's extension (GeoJSON unless it ends in `.gpx`)
    pub fn from_locator(locator: &str) -> Self {
        let path = locator.split(['?', '#']).next().unwrap_or(locator);
        if path.to_ascii_lowercase().ends_with(".gpx") {
            Self::Gpx
        } else {
            Self::GeoJson
        }
    }
}

/// Parse feed text into feature records, preserving feed order
pub fn parse_feed(format: FeedFormat, text: &str) -> Result<Vec<FeatureRecord>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("feed::parse_feed");

    match format {
        FeedFormat::GeoJson => parse_geojson(text),
        FeedFormat::Gpx => parse_gpx(text),
    }
}

/// Parse a GeoJSON document
pub fn parse_geojson(text: &str) -> Result<Vec<FeatureRecord>> {
    let features = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature::from(geometry)],
    };

    let total = features.len();
    let records: Vec<FeatureRecord> = features
        .into_iter()
        .enumerate()
        .filter_map(|(index, feature)| feature_to_record(index, feature))
        .collect();

    if records.len() < total {
        tracing::debug!(
            "Skipped {} of {} features without usable geometry",
            total - records.len(),
            total
        );
    }

    Ok(records)
}

fn feature_to_record(index: usize, feature: Feature) -> Option<FeatureRecord> {
    let Some(geometry) = feature.geometry else {
        tracing::trace!("Feature #{} has no geometry", index);
        return None;
    };

    match Geometry::<f64>::try_from(geometry) {
        Ok(geometry) => Some(FeatureRecord {
            geometry,
            properties: feature.properties,
        }),
        Err(e) => {
            tracing::trace!("Feature #{} has an unusable geometry: {}", index, e);
            None
        }
    }
}

/// Parse a GPX document.
///
/// Waypoints become points (with `name` and `ele` properties), every track
/// segment and route becomes a line carrying the track or route name.
pub fn parse_gpx(text: &str) -> Result<Vec<FeatureRecord>> {
    let gpx = gpx::read(text.as_bytes())?;
    let mut records = Vec::new();

    for waypoint in &gpx.waypoints {
        let mut props = PropertyMap::new();
        props.insert("name".to_string(), json!(waypoint.name));
        props.insert("ele".to_string(), json!(waypoint.elevation));
        records.push(
            FeatureRecord::new(Geometry::Point(waypoint.point())).with_properties(props),
        );
    }

    for track in &gpx.tracks {
        for segment in &track.segments {
            if segment.points.is_empty() {
                continue;
            }
            let line: LineString<f64> = segment.points.iter().map(|w| w.point().0).collect();
            records.push(
                FeatureRecord::new(Geometry::LineString(line))
                    .with_properties(name_props(track.name.as_deref())),
            );
        }
    }

    for route in &gpx.routes {
        if route.points.is_empty() {
            continue;
        }
        let line: LineString<f64> = route.points.iter().map(|w| w.point().0).collect();
        records.push(
            FeatureRecord::new(Geometry::LineString(line))
                .with_properties(name_props(route.name.as_deref())),
        );
    }

    Ok(records)
}

fn name_props(name: Option<&str>) -> PropertyMap {
    let mut props = PropertyMap::new();
    props.insert("name".to_string(), json!(name));
    props
}
