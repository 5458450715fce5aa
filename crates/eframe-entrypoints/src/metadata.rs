use shadow_rs::shadow;

shadow!(build);

/// Log version and build information at startup
#[allow(dead_code)] // Allow auto-generated code containing unused build metadata
pub fn log_version_info(app_name: &str, app_version: &str) {
    tracing::info!("{}", short_version_info(app_name, app_version));
    tracing::info!(
        "Build date: {} ({}, {})",
        build::BUILD_TIME_2822,
        build::BUILD_RUST_CHANNEL,
        build::RUST_VERSION
    );
}

/// One-line version string: `name version (branch@commit[+dirty])`
#[allow(dead_code)] // Allow auto-generated code containing unused build metadata
pub fn short_version_info(app_name: &str, app_version: &str) -> String {
    format!(
        "{} {} ({}@{}{})",
        app_name,
        app_version,
        build::BRANCH,
        build::SHORT_COMMIT,
        if build::GIT_CLEAN { "" } else { "+dirty" }
    )
}
