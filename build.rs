#[cfg(feature = "version")]
fn main() {
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("failed to generate build information");
}

#[cfg(not(feature = "version"))]
fn main() {}
