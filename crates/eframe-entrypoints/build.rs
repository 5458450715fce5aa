fn main() {
    // Generates the `build` module consumed by `shadow!` in src/metadata.rs
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
