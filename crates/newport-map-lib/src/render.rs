//! Feature rendering
//!
//! A [`FeatureRenderer`] turns one [`FeatureRecord`] into a [`RenderedElement`]:
//! the geometry plus the marker/line style and an optional popup. Rendering is a
//! pure function of the record and never fails; a missing property becomes an
//! empty field and a missing property bag means no popup.

use crate::{FeatureRecord, PropertyMap, display_value};
use geo::{Geometry, Point};
use rayon::prelude::*;
use std::str::FromStr;

/// Marker icons available to point features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerIcon {
    /// Standard blue pin
    Default,
    Green,
    Red,
    /// Large black dot used for GPS trace fixes
    Dot,
}

impl MarkerIcon {
    /// Icon size in pixels (width, height)
    pub fn size(self) -> [f32; 2] {
        match self {
            Self::Dot => [72.0, 72.0],
            _ => [25.0, 41.0],
        }
    }

    /// Pixel offset of the geographic position inside the icon
    pub fn anchor(self) -> [f32; 2] {
        match self {
            Self::Dot => [36.0, 36.0],
            _ => [12.0, 41.0],
        }
    }

    /// Popup offset relative to the anchor
    pub fn popup_anchor(self) -> [f32; 2] {
        match self {
            Self::Dot => [0.0, -36.0],
            _ => [1.0, -34.0],
        }
    }

    /// Fill colour as RGB
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Default => [42, 129, 203],
            Self::Green => [42, 173, 39],
            Self::Red => [203, 43, 62],
            Self::Dot => [0, 0, 0],
        }
    }

    /// Asset name of the icon image, as referenced by the legend
    pub fn asset_path(self) -> &'static str {
        match self {
            Self::Default => "images/marker-icon-blue.png",
            Self::Green => "images/marker-icon-green.png",
            Self::Red => "images/marker-icon-red.png",
            Self::Dot => "images/dot.png",
        }
    }
}

/// Stroke used for line and polygon geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStroke {
    pub rgb: [u8; 3],
    pub width: f32,
    pub opacity: f32,
}

impl LineStroke {
    /// Blue 3px path
    pub const DEFAULT: Self = Self {
        rgb: [51, 136, 255],
        width: 3.0,
        opacity: 1.0,
    };

    pub const TRACE: Self = Self {
        rgb: [20, 20, 20],
        width: 2.0,
        opacity: 0.8,
    };
}

impl Default for LineStroke {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Visual style of a rendered element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementStyle {
    /// Icon used when the geometry is a point
    pub marker: MarkerIcon,
    /// Stroke used for everything else
    pub stroke: LineStroke,
}

/// Hyperlink shown in a popup header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupLink {
    pub text: String,
    pub url: String,
}

/// Popup payload attached to an element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Popup {
    /// Bold heading
    pub title: Option<String>,
    /// Linked heading
    pub link: Option<PopupLink>,
    /// Free text lines below the heading
    pub lines: Vec<String>,
    /// Two-column table rows (label, value)
    pub rows: Vec<(String, String)>,
}

/// A feature turned into something the map can draw
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedElement {
    pub geometry: Geometry<f64>,
    pub style: ElementStyle,
    pub popup: Option<Popup>,
    /// Show the popup while the pointer is over the element, hide it on leave
    pub popup_on_hover: bool,
}

impl RenderedElement {
    /// Create an element with no popup
    pub fn new(geometry: Geometry<f64>, style: ElementStyle) -> Self {
        Self {
            geometry,
            style,
            popup: None,
            popup_on_hover: false,
        }
    }

    /// Attach a popup that opens on hover
    pub fn with_hover_popup(mut self, popup: Popup) -> Self {
        self.popup = Some(popup);
        self.popup_on_hover = true;
        self
    }

    /// Position of the marker when the geometry is a single point
    pub fn marker_position(&self) -> Option<Point<f64>> {
        match &self.geometry {
            Geometry::Point(point) => Some(*point),
            _ => None,
        }
    }
}

/// Presentation policy applied to every feature of a feed
pub trait FeatureRenderer: Send + Sync {
    fn render(&self, feature: FeatureRecord) -> RenderedElement;
}

impl<F> FeatureRenderer for F
where
    F: Fn(FeatureRecord) -> RenderedElement + Send + Sync,
{
    fn render(&self, feature: FeatureRecord) -> RenderedElement {
        self(feature)
    }
}

/// Built-in presentation policies, one per dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presentation {
    /// Green pins, popup with name and address
    Hotels,
    /// Red pins, popup with the crosswalk survey table
    CrosswalkSurvey,
    /// Plain blue lines, no popup
    Sidewalks,
    /// Black dots, no popup
    GpsTrace,
    /// Blue pins and lines, popup listing every property
    Plain,
}

const SURVEY_TITLE: &str = "Newport Crosswalk Safety Survey (2014)";
const SURVEY_URL: &str = "https://github.com/NewportDataPortal/newport-crosswalk-survey-2014";

/// (label, property key) pairs of the crosswalk survey popup
const SURVEY_ROWS: [(&str, &str); 7] = [
    ("ID", "id"),
    ("Safe", "Safe"),
    ("Unsafe", "Unsafe"),
    ("I don't know", "Idontknow"),
    ("Score", "score"),
    ("n", "n"),
    ("Size", "size"),
];

impl Presentation {
    pub fn style(self) -> ElementStyle {
        match self {
            Self::Hotels => ElementStyle {
                marker: MarkerIcon::Green,
                stroke: LineStroke::DEFAULT,
            },
            Self::CrosswalkSurvey => ElementStyle {
                marker: MarkerIcon::Red,
                stroke: LineStroke::DEFAULT,
            },
            Self::Sidewalks | Self::Plain => ElementStyle {
                marker: MarkerIcon::Default,
                stroke: LineStroke::DEFAULT,
            },
            Self::GpsTrace => ElementStyle {
                marker: MarkerIcon::Dot,
                stroke: LineStroke::TRACE,
            },
        }
    }

    /// Build the popup for a property bag, if this presentation has one
    pub fn popup(self, props: &PropertyMap) -> Option<Popup> {
        let text = |key: &str| props.get(key).map(display_value).unwrap_or_default();

        match self {
            Self::Hotels => Some(Popup {
                title: Some(text("name")),
                lines: vec![
                    text("street"),
                    format!("{}, {}", text("city"), text("state")),
                ],
                ..Default::default()
            }),
            Self::CrosswalkSurvey => Some(Popup {
                link: Some(PopupLink {
                    text: SURVEY_TITLE.to_string(),
                    url: SURVEY_URL.to_string(),
                }),
                rows: SURVEY_ROWS
                    .iter()
                    .map(|(label, key)| (label.to_string(), text(key)))
                    .collect(),
                ..Default::default()
            }),
            Self::Plain if !props.is_empty() => {
                let mut rows: Vec<(String, String)> = props
                    .iter()
                    .map(|(key, value)| (key.clone(), display_value(value)))
                    .collect();
                rows.sort_by(|a, b| a.0.cmp(&b.0));
                Some(Popup {
                    rows,
                    ..Default::default()
                })
            }
            Self::Sidewalks | Self::GpsTrace | Self::Plain => None,
        }
    }

    /// Short name used on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hotels => "hotels",
            Self::CrosswalkSurvey => "crosswalks",
            Self::Sidewalks => "sidewalks",
            Self::GpsTrace => "trace",
            Self::Plain => "plain",
        }
    }
}

impl FromStr for Presentation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hotels" => Ok(Self::Hotels),
            "crosswalks" | "survey" => Ok(Self::CrosswalkSurvey),
            "sidewalks" => Ok(Self::Sidewalks),
            "trace" | "gps" => Ok(Self::GpsTrace),
            "plain" => Ok(Self::Plain),
            other => Err(format!(
                "unknown presentation '{other}' (expected hotels, crosswalks, sidewalks, trace or plain)"
            )),
        }
    }
}

impl FeatureRenderer for Presentation {
    fn render(&self, feature: FeatureRecord) -> RenderedElement {
        let element = RenderedElement::new(feature.geometry, self.style());
        match feature.properties.as_ref().and_then(|props| self.popup(props)) {
            Some(popup) => element.with_hover_popup(popup),
            None => element,
        }
    }
}

/// Render every feature, keeping feed order
pub fn render_all<R>(renderer: &R, features: Vec<FeatureRecord>) -> Vec<RenderedElement>
where
    R: FeatureRenderer + ?Sized,
{
    #[cfg(feature = "profiling")]
    profiling::scope!("render::render_all");

    features
        .into_par_iter()
        .map(|feature| renderer.render(feature))
        .collect()
}
