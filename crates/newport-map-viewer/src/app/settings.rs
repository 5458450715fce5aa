use clap::Parser;
use eframe_entrypoints::parse_args;
use newport_map_lib::{DuplicatePolicy, LayerSource, LoaderConfig, Presentation};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Newport Map Viewer - Interactive overlay map of Newport, RI open datasets
pub struct Settings {
    /// Directory holding the default Newport feeds
    #[clap(long, value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Extra layer as NAME=LOCATOR[:PRESENTATION] (replaces a default layer with the same name)
    #[clap(
        short,
        long = "layer",
        value_name = "NAME=LOCATOR[:PRESENTATION]",
        value_parser = parse_layer_arg
    )]
    pub layers: Vec<LayerSource>,

    /// Initial map centre latitude
    #[clap(long, default_value_t = 41.488509, allow_negative_numbers = true)]
    pub center_lat: f64,

    /// Initial map centre longitude
    #[clap(long, default_value_t = -71.315153, allow_negative_numbers = true)]
    pub center_lon: f64,

    /// Initial zoom level
    #[clap(long, default_value_t = 15.0)]
    pub zoom: f64,

    /// Maximum zoom level of the base map
    #[clap(long, default_value_t = 18)]
    pub max_zoom: u8,

    /// Give up on a feed after this many seconds
    #[clap(long, value_name = "SECS")]
    pub load_timeout_secs: Option<u64>,

    /// Keep the first layer when two loads share a name, instead of replacing it
    #[clap(long, default_value = "false")]
    pub reject_duplicates: bool,
}

impl Settings {
    /// Parse the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            timeout: self.load_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        if self.reject_duplicates {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::Replace
        }
    }
}

/// Parse `NAME=LOCATOR[:PRESENTATION]`.
///
/// The presentation suffix is only split off when it names a known
/// presentation, so `https://` locators survive intact.
fn parse_layer_arg(arg: &str) -> Result<LayerSource, String> {
    let (name, rest) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=LOCATOR[:PRESENTATION], got '{arg}'"))?;
    if name.is_empty() || rest.is_empty() {
        return Err(format!("layer name and locator must not be empty in '{arg}'"));
    }

    let (locator, presentation) = match rest.rsplit_once(':') {
        Some((locator, suffix)) if !locator.is_empty() => match suffix.parse::<Presentation>() {
            Ok(presentation) => (locator, presentation),
            Err(_) => (rest, Presentation::Plain),
        },
        _ => (rest, Presentation::Plain),
    };

    Ok(LayerSource::new(name, locator, presentation))
}
