//! Build metadata generated by `build.rs`.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

const FALLBACK_API_VERSION: u32 = 20250727;

/// Plugin API version of this host.
///
/// External plugin manifests that declare a newer `api_version` are refused.
pub fn get_api_version() -> u32 {
    PLUGIN_API_VERSION.parse().unwrap_or(FALLBACK_API_VERSION)
}

/// Build time string (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured at build time
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// Long version string shown by `--version`
pub fn long_version() -> String {
    format!(
        "{} (api {}, built {}, git {})",
        env!("CARGO_PKG_VERSION"),
        get_api_version(),
        build_time(),
        git_hash()
    )
}
