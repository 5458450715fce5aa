//! Walkers plugin that draws the attached overlay layers
//!
//! The plugin receives a snapshot of the visible element groups (cheap `Arc`
//! clones), paints them in draw order and shows the popup of the topmost
//! element under the pointer.

use egui::{Color32, Pos2, Rect, Stroke, Vec2};
use geo::{Coord, Geometry, LineString};
use newport_map_lib::{MarkerIcon, Popup, RenderedElement};
use std::sync::Arc;
use walkers::{Plugin, Projector};

/// Extra pixels around a line that still count as hovering it
const LINE_HIT_SLOP: f32 = 4.0;
/// Drawn radius of a GPS trace fix
const DOT_RADIUS: f32 = 5.0;

/// Plugin for rendering overlay layers on the map
pub struct OverlayPlugin {
    groups: Vec<Arc<[RenderedElement]>>,
}

/// Where to show a hovered element's popup
struct HoverHit<'a> {
    popup: &'a Popup,
    /// Screen position the popup's bottom centre is pinned to
    at: Pos2,
}

impl OverlayPlugin {
    pub fn new(groups: Vec<Arc<[RenderedElement]>>) -> Self {
        Self { groups }
    }

    /// Paint one element; returns where to show its popup if the pointer is over it
    fn render_element<'a>(
        element: &'a RenderedElement,
        projector: &Projector,
        painter: &egui::Painter,
        pointer: Option<Pos2>,
    ) -> Option<HoverHit<'a>> {
        let mut hit_at = None;
        let mut record_hit = |at: Pos2| {
            if hit_at.is_none() {
                hit_at = Some(at);
            }
        };

        for coord in marker_points(&element.geometry) {
            let pos = project(projector, coord);
            if let Some(at) = draw_marker(painter, element.style.marker, pos, pointer) {
                record_hit(at);
            }
        }

        let stroke = stroke_of(element);
        for line in line_parts(&element.geometry) {
            let screen: Vec<Pos2> = line.coords().map(|c| project(projector, *c)).collect();
            if screen.len() < 2 {
                continue;
            }
            if let Some(pointer) = pointer
                && polyline_hit(&screen, pointer, stroke.width / 2.0 + LINE_HIT_SLOP)
            {
                record_hit(pointer);
            }
            painter.add(egui::Shape::line(screen, stroke));
        }

        let popup = element.popup.as_ref().filter(|_| element.popup_on_hover)?;
        hit_at.map(|at| HoverHit { popup, at })
    }
}

impl Plugin for OverlayPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("OverlayPlugin::run");

        let painter = ui.painter();
        let pointer = response.hover_pos();

        // Later groups are drawn on top, so the last hit wins
        let mut hovered = None;
        for group in &self.groups {
            for element in group.iter() {
                if let Some(hit) = Self::render_element(element, projector, painter, pointer) {
                    hovered = Some(hit);
                }
            }
        }

        if let Some(hit) = hovered {
            show_popup(ui.ctx(), hit.popup, hit.at);
        }
    }
}

fn project(projector: &Projector, coord: Coord<f64>) -> Pos2 {
    let screen = projector.project(walkers::lat_lon(coord.y, coord.x));
    Pos2::new(screen.x, screen.y)
}

fn color(rgb: [u8; 3], opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb[0], rgb[1], rgb[2], alpha)
}

fn stroke_of(element: &RenderedElement) -> Stroke {
    let line = element.style.stroke;
    Stroke::new(line.width, color(line.rgb, line.opacity))
}

/// Every point of a geometry, including points nested in collections
fn marker_points(geometry: &Geometry<f64>) -> Vec<Coord<f64>> {
    match geometry {
        Geometry::Point(point) => vec![point.0],
        Geometry::MultiPoint(points) => points.iter().map(|point| point.0).collect(),
        Geometry::GeometryCollection(collection) => {
            collection.iter().flat_map(marker_points).collect()
        }
        _ => Vec::new(),
    }
}

/// Every line (including polygon rings) of a geometry
fn line_parts(geometry: &Geometry<f64>) -> Vec<LineString<f64>> {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Vec::new(),
        Geometry::Line(line) => vec![LineString::from(vec![line.start, line.end])],
        Geometry::LineString(line) => vec![line.clone()],
        Geometry::MultiLineString(lines) => lines.0.clone(),
        Geometry::Polygon(polygon) => std::iter::once(polygon.exterior().clone())
            .chain(polygon.interiors().iter().cloned())
            .collect(),
        Geometry::MultiPolygon(polygons) => polygons
            .iter()
            .flat_map(|polygon| {
                std::iter::once(polygon.exterior().clone())
                    .chain(polygon.interiors().iter().cloned())
            })
            .collect(),
        Geometry::Rect(rect) => vec![rect.to_polygon().exterior().clone()],
        Geometry::Triangle(triangle) => vec![triangle.to_polygon().exterior().clone()],
        Geometry::GeometryCollection(collection) => {
            collection.iter().flat_map(line_parts).collect()
        }
    }
}

/// Paint a marker anchored at `pos`. Returns the popup position if hovered.
fn draw_marker(
    painter: &egui::Painter,
    marker: MarkerIcon,
    pos: Pos2,
    pointer: Option<Pos2>,
) -> Option<Pos2> {
    let anchor = Vec2::from(marker.anchor());
    let icon_rect = Rect::from_min_size(pos - anchor, Vec2::from(marker.size()));
    if !painter.clip_rect().intersects(icon_rect) {
        return None;
    }

    let fill = color(marker.rgb(), 1.0);
    let hovered = match marker {
        MarkerIcon::Dot => {
            painter.circle_filled(pos, DOT_RADIUS, fill);
            pointer.is_some_and(|p| p.distance(pos) <= DOT_RADIUS * 2.0)
        }
        MarkerIcon::Default | MarkerIcon::Green | MarkerIcon::Red => {
            // Round head with a pointed tip at the anchor
            let radius = icon_rect.width() / 2.0;
            let head = icon_rect.center_top() + Vec2::new(0.0, radius);
            let outline = Stroke::new(1.0, Color32::from_black_alpha(120));
            painter.add(egui::Shape::convex_polygon(
                vec![
                    head + Vec2::new(-radius * 0.85, radius * 0.5),
                    pos,
                    head + Vec2::new(radius * 0.85, radius * 0.5),
                ],
                fill,
                outline,
            ));
            painter.circle(head, radius, fill, outline);
            painter.circle_filled(head, radius * 0.35, Color32::WHITE);
            pointer.is_some_and(|p| icon_rect.contains(p))
        }
    };

    hovered.then(|| pos + Vec2::from(marker.popup_anchor()))
}

/// Whether `pointer` is within `tolerance` pixels of the polyline
fn polyline_hit(points: &[Pos2], pointer: Pos2, tolerance: f32) -> bool {
    points
        .windows(2)
        .any(|w| distance_to_segment(pointer, w[0], w[1]) <= tolerance)
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Show a popup with its bottom centre at `at`
fn show_popup(ctx: &egui::Context, popup: &Popup, at: Pos2) {
    egui::Area::new(egui::Id::new("overlay_popup"))
        .order(egui::Order::Foreground)
        .pivot(egui::Align2::CENTER_BOTTOM)
        .fixed_pos(at)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| popup_contents(ui, popup));
        });
}

/// Popup body: heading, free text lines and a two-column table
pub fn popup_contents(ui: &mut egui::Ui, popup: &Popup) {
    ui.set_max_width(280.0);

    if let Some(title) = &popup.title {
        ui.label(egui::RichText::new(title).strong());
    }
    if let Some(link) = &popup.link {
        ui.hyperlink_to(egui::RichText::new(&link.text).strong(), &link.url);
    }
    for line in &popup.lines {
        ui.label(line);
    }
    if !popup.rows.is_empty() {
        egui::Grid::new("popup_rows")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for (label, value) in &popup.rows {
                    ui.label(label);
                    ui.label(value);
                    ui.end_row();
                }
            });
    }
}
