use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

fn main() {
    let out_dir = env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("version.rs");
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let cargo_toml_path = Path::new(&manifest_dir).join("Cargo.toml");

    let plugin_api_version = fs::read_to_string(&cargo_toml_path)
        .ok()
        .and_then(|contents| contents.parse::<toml::Table>().ok())
        .and_then(|manifest| {
            manifest
                .get("package")?
                .get("metadata")?
                .get("plugin_api_version")?
                .as_integer()
        })
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let generated = format!(
        "pub const PLUGIN_API_VERSION: &str = \"{}\";\n\
         pub const BUILD_TIME: &str = \"{}\";\n\
         pub const GIT_HASH: &str = \"{}\";\n",
        plugin_api_version, build_time, git_hash
    );
    fs::write(&dest_path, generated).expect("failed to write version.rs");

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
