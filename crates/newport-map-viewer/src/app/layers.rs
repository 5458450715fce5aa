//! The Newport layer catalog: feeds, controls and legend rows

use newport_map_lib::{LayerSource, MarkerIcon, Presentation, ToggleBinding};
use std::path::Path;

/// One overlay as the UI knows it
#[derive(Debug, Clone)]
pub struct LayerEntry {
    /// Registry name
    pub name: &'static str,
    /// Toolbar button trigger id and caption
    pub button_id: &'static str,
    pub button_label: &'static str,
    /// Legend row trigger id and caption
    pub legend_id: &'static str,
    pub legend_label: &'static str,
    /// Legend swatch
    pub swatch: Swatch,
    /// Feed file inside the data directory
    pub file_name: &'static str,
    pub presentation: Presentation,
}

/// Icon drawn next to a legend label
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Swatch {
    Marker(MarkerIcon),
    Line([u8; 3]),
}

pub static NEWPORT_LAYERS: [LayerEntry; 4] = [
    LayerEntry {
        name: "hotels",
        button_id: "hotelsButton",
        button_label: "Hotels",
        legend_id: "hotels",
        legend_label: "Hotels",
        swatch: Swatch::Marker(MarkerIcon::Green),
        file_name: "newport_hotels.geojson",
        presentation: Presentation::Hotels,
    },
    LayerEntry {
        name: "crosswalks",
        button_id: "crosswalksButton",
        button_label: "Crosswalks",
        legend_id: "crosswalks",
        legend_label: "Crosswalks",
        swatch: Swatch::Marker(MarkerIcon::Red),
        file_name: "bpac_survey_2014.geojson",
        presentation: Presentation::CrosswalkSurvey,
    },
    LayerEntry {
        name: "sidewalks",
        button_id: "sidewalksButton",
        button_label: "Sidewalks",
        legend_id: "sidewalks",
        legend_label: "Sidewalks",
        swatch: Swatch::Line([51, 136, 255]),
        file_name: "npt-sidewalks.geojson",
        presentation: Presentation::Sidewalks,
    },
    LayerEntry {
        name: "gps_trace",
        button_id: "GPSTraceButton",
        button_label: "GPS Trace",
        legend_id: "GPSTrace",
        legend_label: "GPS Trace",
        swatch: Swatch::Marker(MarkerIcon::Dot),
        file_name: "sampleGPSTrace.geojson",
        presentation: Presentation::GpsTrace,
    },
];

/// Both the toolbar button and the legend row of every layer
pub fn default_bindings() -> Vec<ToggleBinding> {
    NEWPORT_LAYERS
        .iter()
        .flat_map(|entry| {
            [
                ToggleBinding::new(entry.button_id, entry.name),
                ToggleBinding::new(entry.legend_id, entry.name),
            ]
        })
        .collect()
}

/// Default feeds under `data_dir`, with `extra` layers replacing same-named
/// defaults in place and new names appended
pub fn layer_sources(data_dir: &Path, extra: &[LayerSource]) -> Vec<LayerSource> {
    let mut sources: Vec<LayerSource> = NEWPORT_LAYERS
        .iter()
        .map(|entry| {
            LayerSource::new(
                entry.name,
                data_dir.join(entry.file_name).to_string_lossy(),
                entry.presentation,
            )
        })
        .collect();

    for source in extra {
        match sources.iter_mut().find(|s| s.name == source.name) {
            Some(existing) => *existing = source.clone(),
            None => sources.push(source.clone()),
        }
    }
    sources
}
