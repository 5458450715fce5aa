//! UI panels for the application
//!
//! Toolbar and legend both toggle layers through the session's binder, so a
//! click is queued as one toggle and applied on the next event drain.

use crate::app::layers::{LayerEntry, Swatch};
use crate::app::state::{AppState, LayerState};
use egui::{Color32, RichText, Ui};
use newport_map_lib::MarkerIcon;

const LEGEND_TITLE: &str = "Turn layers on/off";
pub const ATTRIBUTION: &str = "Map data © OpenStreetMap contributors, CC-BY-SA";

/// Top toolbar: one toggle button per layer plus view actions
pub fn toolbar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            for entry in state.catalog() {
                let attached = state.session.is_attached(entry.name);
                let button = egui::Button::new(entry.button_label).selected(attached);
                let response = ui
                    .add_enabled(state.is_toggleable(entry.name), button)
                    .on_disabled_hover_text(disabled_reason(&state.layer_state(entry.name)));
                if response.clicked() {
                    state.session.binder().activate(entry.button_id);
                }
            }

            ui.separator();

            if ui.button("🎯 Fit to layers").clicked() {
                state.pending_fit_bounds = true;
            }
            ui.toggle_value(&mut state.ui_settings.show_legend, "Legend");
            ui.toggle_value(&mut state.ui_settings.sidebar_open, "Status");
            if ui.button("❓").on_hover_text("Help (F1)").clicked() {
                state.ui_settings.show_help = !state.ui_settings.show_help;
            }

            if state.is_loading() {
                ui.spinner();
            }
        });
    });
}

fn disabled_reason(layer_state: &LayerState) -> String {
    match layer_state {
        LayerState::Waiting | LayerState::Loading => "Still loading".to_string(),
        LayerState::Failed(error) => format!("Failed to load: {error}"),
        LayerState::Cancelled => "Load cancelled".to_string(),
        LayerState::Attached { .. } | LayerState::Hidden { .. } => String::new(),
    }
}

/// Legend window anchored to the bottom-right corner of the map
pub fn legend(ctx: &egui::Context, state: &AppState) {
    if !state.ui_settings.show_legend {
        return;
    }

    egui::Window::new(LEGEND_TITLE)
        .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -24.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            for entry in state.catalog() {
                legend_row(ui, state, entry);
            }
        });
}

fn legend_row(ui: &mut Ui, state: &AppState, entry: &LayerEntry) {
    let enabled = state.is_toggleable(entry.name);
    ui.horizontal(|ui| {
        draw_swatch(ui, entry.swatch, enabled);

        let mut attached = state.session.is_attached(entry.name);
        let response = ui.add_enabled(enabled, egui::Checkbox::new(&mut attached, entry.legend_label));
        if response.changed() {
            state.session.binder().activate(entry.legend_id);
        }
    });
}

fn draw_swatch(ui: &mut Ui, swatch: Swatch, enabled: bool) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::hover());
    let painter = ui.painter();
    let tint = |c: Color32| if enabled { c } else { c.gamma_multiply(0.35) };

    match swatch {
        Swatch::Marker(MarkerIcon::Dot) => {
            painter.circle_filled(rect.center(), 4.0, tint(Color32::BLACK));
        }
        Swatch::Marker(marker) => {
            let [r, g, b] = marker.rgb();
            let fill = tint(Color32::from_rgb(r, g, b));
            let head = rect.center_top() + egui::vec2(0.0, 6.0);
            painter.add(egui::Shape::convex_polygon(
                vec![
                    head + egui::vec2(-5.0, 3.0),
                    rect.center_bottom(),
                    head + egui::vec2(5.0, 3.0),
                ],
                fill,
                egui::Stroke::NONE,
            ));
            painter.circle_filled(head, 6.0, fill);
        }
        Swatch::Line([r, g, b]) => {
            painter.line_segment(
                [rect.left_center(), rect.right_center()],
                egui::Stroke::new(3.0, tint(Color32::from_rgb(r, g, b))),
            );
        }
    }
}

/// Left sidebar listing every configured layer and its load state
pub fn status_sidebar(ctx: &egui::Context, state: &mut AppState) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    // Applied after the panel so the state is not borrowed while drawing
    let mut reload = None;
    let mut cancel = None;

    egui::SidePanel::left("layer_status")
        .default_width(240.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Layers");
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                for source in &state.sources {
                    let layer_state = state.layer_state(&source.name);
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&source.name).strong());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            match &layer_state {
                                LayerState::Waiting | LayerState::Loading => {
                                    if ui.small_button("✕").on_hover_text("Cancel").clicked() {
                                        cancel = Some(source.name.clone());
                                    }
                                }
                                _ => {
                                    if ui.small_button("⟳").on_hover_text("Reload").clicked() {
                                        reload = Some(source.name.clone());
                                    }
                                }
                            }
                        });
                    });
                    status_line(ui, &layer_state);
                    ui.label(
                        RichText::new(&source.locator)
                            .small()
                            .color(ui.visuals().weak_text_color()),
                    );
                    ui.add_space(6.0);
                }
            });
        });

    if let Some(name) = cancel {
        state.cancel(&name);
    }
    if let Some(name) = reload {
        state.reload(&name);
    }
}

fn status_line(ui: &mut Ui, layer_state: &LayerState) {
    let (text, color) = match layer_state {
        LayerState::Waiting => ("⏳ waiting".to_string(), ui.visuals().weak_text_color()),
        LayerState::Loading => ("⏳ loading".to_string(), ui.visuals().warn_fg_color),
        LayerState::Attached { features } => (
            format!("● attached ({features} features)"),
            Color32::from_rgb(42, 173, 39),
        ),
        LayerState::Hidden { features } => (
            format!("○ hidden ({features} features)"),
            ui.visuals().text_color(),
        ),
        LayerState::Failed(error) => (format!("⚠ failed: {error}"), ui.visuals().error_fg_color),
        LayerState::Cancelled => ("✕ cancelled".to_string(), ui.visuals().weak_text_color()),
    };
    ui.label(RichText::new(text).color(color));
}

/// Help window (F1)
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading(crate::APP_NAME);
            ui.label(
                RichText::new(version_line())
                    .small()
                    .color(ui.visuals().weak_text_color()),
            );
            ui.add_space(8.0);

            ui.label("Hotels, crosswalk survey results, sidewalks and a sample GPS trace of Newport, RI.");
            ui.add_space(12.0);

            ui.label(RichText::new("Layers").strong());
            ui.label("• Toolbar buttons and legend checkboxes turn layers on and off");
            ui.label("• Greyed out controls belong to layers that are loading or failed");
            ui.label("• Hover a marker or line to see its details");
            ui.add_space(8.0);

            ui.label(RichText::new("Navigation").strong());
            ui.label("• Scroll or pinch to zoom, drag to pan");
            ui.label("• 'Fit to layers' shows everything that is turned on");
            ui.add_space(8.0);

            ui.label(RichText::new("Keyboard Shortcuts").strong());
            ui.label("• F1 - Toggle this help");
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}

/// Same name and version the startup log reports
fn version_line() -> String {
    eframe_entrypoints::short_version_info(crate::APP_NAME, env!("CARGO_PKG_VERSION"))
}

/// Tile attribution at the bottom of the map
pub fn attribution(ui: &Ui) {
    let rect = ui.max_rect();
    ui.painter().text(
        rect.center_bottom() + egui::vec2(0.0, -5.0),
        egui::Align2::CENTER_BOTTOM,
        ATTRIBUTION,
        egui::FontId::proportional(10.0),
        Color32::from_black_alpha(180),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line_uses_app_name() {
        let line = version_line();
        assert!(line.starts_with(&format!("Newport Map {}", env!("CARGO_PKG_VERSION"))));
    }
}
