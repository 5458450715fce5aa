//! Newport Map Viewer - Application Library
//!
//! Wires the layer library to an egui map: tiles from OpenStreetMap, one
//! overlay per Newport dataset, toolbar buttons and a legend to toggle them.

mod app;

pub use app::NewportMapApp;

/// Window title, also used in logs and the help window
pub const APP_NAME: &str = "Newport Map";

eframe_entrypoints::eframe_app!(APP_NAME, |cc| Box::new(NewportMapApp::new(cc)));
