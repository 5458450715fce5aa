//! Native entry point for egui/eframe applications
//!
//! Sets up logging, prints build metadata, starts a multi-threaded tokio
//! runtime and runs the eframe event loop inside it, so the app can
//! `tokio::spawn` background work from its constructor and `update`.
//!
//! # Usage
//!
//! In your application's `lib.rs`:
//!
//! ```ignore
//! eframe_entrypoints::eframe_app!(
//!     "My App Name",
//!     |cc| Box::new(MyApp::new(cc))
//! );
//! ```
//!
//! In your `main.rs`:
//!
//! ```ignore
//! fn main() {
//!     my_app::run_native();
//! }
//! ```

pub mod cli;
pub mod logging;

// Re-export commonly used types
pub use cli::parse_args;
pub use logging::setup_logging;

mod metadata;
pub use metadata::{log_version_info, short_version_info};

// Re-export eframe types commonly needed for app creation
pub use eframe;
pub use eframe::CreationContext;

/// Define the `run_native()` entry point of an eframe application.
///
/// # Arguments
///
/// * `$app_name` - Window title and application id
/// * `$app_creator` - A closure that takes `&CreationContext` and returns `Box<dyn eframe::App>`
#[macro_export]
macro_rules! eframe_app {
    ($app_name:expr, $app_creator:expr) => {
        /// Run the application. Call this from `main.rs`.
        pub fn run_native() {
            let creator: fn(&$crate::eframe::CreationContext<'_>) -> Box<dyn $crate::eframe::App> =
                $app_creator;
            $crate::run_native_impl($app_name, env!("CARGO_PKG_VERSION"), creator);
        }
    };
}

/// Internal implementation of the native entry point.
/// Use the `eframe_app!` macro instead of calling this directly.
#[doc(hidden)]
pub fn run_native_impl(
    app_name: &str,
    app_version: &str,
    app_creator: impl FnOnce(&eframe::CreationContext<'_>) -> Box<dyn eframe::App>,
) {
    // Must happen before anything logs
    setup_logging();
    log_version_info(app_name, app_version);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create Tokio runtime: {}", e);
            return;
        }
    };

    rt.block_on(async {
        let native_options = eframe::NativeOptions {
            viewport: eframe::egui::ViewportBuilder::default()
                .with_inner_size([1280.0, 720.0])
                .with_title(app_name),
            ..Default::default()
        };

        if let Err(e) = eframe::run_native(
            app_name,
            native_options,
            Box::new(move |cc| Ok(app_creator(cc))),
        ) {
            tracing::error!("{} exited with an error: {}", app_name, e);
        }
    });
}
