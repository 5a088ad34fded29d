//! Build identification stamped by `build.rs`

/// Revision the binary was built from; `-dirty` when the tree had local edits
pub const GIT_HASH: &str = env!("GIT_HASH");
/// UTC build time, RFC 3339
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
/// Cargo profile (`debug` / `release`)
pub const BUILD_PROFILE: &str = env!("BUILD_PROFILE");

/// Startup banner line
pub fn banner() -> String {
    format!(
        "avr-verify v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        GIT_HASH,
        BUILD_TIMESTAMP,
        BUILD_PROFILE
    )
}
