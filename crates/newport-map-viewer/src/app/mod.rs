//! Application module
//!
//! Full-screen OpenStreetMap view with the Newport overlays on top:
//! - Toolbar with one toggle button per layer
//! - Legend window with the same toggles
//! - Sidebar with each layer's load status
//! - Hover popups for markers and lines

mod layers;
mod plugin;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::plugin::OverlayPlugin;
use crate::app::settings::Settings;
use crate::app::state::AppState;
use eframe::egui;
use std::time::Duration;
use walkers::{
    HttpTiles, Map, MapMemory, Position, TileId,
    sources::{Attribution, TileSource},
};

/// Poll interval for finished loads while any layer is still loading
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// OpenStreetMap tiles with a configurable zoom limit
pub struct OsmTiles {
    max_zoom: u8,
}

impl TileSource for OsmTiles {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.openstreetmap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: ui_panels::ATTRIBUTION,
            url: "https://www.openstreetmap.org/copyright",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

/// Main application structure
pub struct NewportMapApp {
    /// Layers, loads and UI flags
    state: AppState,

    /// Map tiles provider
    tiles: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Initial centre, also used when nothing is attached
    home: Position,

    max_zoom: u8,
}

impl NewportMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::from_cli();

        let mut state = AppState::new(&settings);
        state.start_loading();

        let tiles = HttpTiles::new(
            OsmTiles {
                max_zoom: settings.max_zoom,
            },
            cc.egui_ctx.clone(),
        );

        let home = walkers::lat_lon(settings.center_lat, settings.center_lon);
        let mut map_memory = MapMemory::default();
        map_memory.center_at(home);
        let zoom = settings.zoom.min(settings.max_zoom as f64);
        if let Err(e) = map_memory.set_zoom(zoom) {
            tracing::warn!("Invalid initial zoom {}: {:?}", zoom, e);
        }

        tracing::info!(
            "Map centred at ({:.6}, {:.6}), zoom {}",
            settings.center_lat,
            settings.center_lon,
            zoom
        );

        Self {
            state,
            tiles,
            map_memory,
            home,
            max_zoom: settings.max_zoom,
        }
    }

    /// Fit the map view to the bounding box of all attached layers
    fn fit_to_bounds(&mut self) {
        let Some(bounds) = self.state.session.attached_bounds() else {
            tracing::debug!("Nothing attached, returning to the initial view");
            self.map_memory.center_at(self.home);
            return;
        };

        let (min, max) = (bounds.min(), bounds.max());
        let center_lat = (min.y + max.y) / 2.0;
        let center_lon = (min.x + max.x) / 2.0;
        let max_span = (max.y - min.y).abs().max((max.x - min.x).abs());

        let zoom = if max_span > 0.0 {
            let zoom_estimate = (4.0 * 360.0 / max_span).log2();
            (zoom_estimate - 0.5).clamp(1.0, self.max_zoom as f64)
        } else {
            self.max_zoom as f64
        };

        self.map_memory
            .center_at(walkers::lat_lon(center_lat, center_lon));
        let _ = self.map_memory.set_zoom(zoom);

        tracing::trace!(
            "Fitted to bounds: ({:.4}, {:.4}) - ({:.4}, {:.4}), zoom: {:.1}",
            min.y,
            min.x,
            max.y,
            max.x,
            zoom
        );
    }

    fn clamp_zoom(&mut self) {
        if self.map_memory.zoom() > self.max_zoom as f64 {
            let _ = self.map_memory.set_zoom(self.max_zoom as f64);
        }
    }
}

#[profiling::all_functions]
impl eframe::App for NewportMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle keyboard shortcuts
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) {
                self.state.ui_settings.show_help = !self.state.ui_settings.show_help;
            }
        });

        // Apply finished loads and queued clicks before drawing
        if self.state.process_events() {
            ctx.request_repaint();
        }
        if self.state.is_loading() {
            ctx.request_repaint_after(LOAD_POLL_INTERVAL);
        }

        if self.state.pending_fit_bounds {
            self.state.pending_fit_bounds = false;
            self.fit_to_bounds();
        }

        if self.state.ui_settings.show_help {
            ui_panels::help_overlay(ctx, &mut self.state.ui_settings.show_help);
        }

        ui_panels::toolbar(ctx, &mut self.state);
        ui_panels::status_sidebar(ctx, &mut self.state);

        let overlay = OverlayPlugin::new(self.state.session.surface().snapshot());

        // Central panel: Map view
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let map = Map::new(Some(&mut self.tiles), &mut self.map_memory, self.home)
                    .with_plugin(overlay);
                ui.add(map);

                ui_panels::attribution(ui);
            });

        // Drawn last so it floats above the map
        ui_panels::legend(ctx, &self.state);

        self.clamp_zoom();
    }
}
