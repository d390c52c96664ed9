//! Shared helpers for the integration tests
//!
//! Every test gets its own base directory so the queue, metadata database
//! and output directories never leak between tests. `file` is replaced by
//! `true` so classification relies on the content probes only.

#![allow(dead_code)]

use filehound::core::config::Config;
use std::path::{Path, PathBuf};

pub const PDF_SAMPLE: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n";
pub const ZIP_SAMPLE: &[u8] = b"PK\x03\x04\x14\x00\x00\x00not really deflated";

/// Configuration rooted at `base`
pub fn test_config(base: &Path) -> Config {
    let mut config = Config::defaults();
    config.set_var("Dir", "log_dir", base.display().to_string());
    config.set_var("File ID", "file_cmd", "true");
    config
}

/// Write `contents` to `dir/name`
pub fn write_sample(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

/// Extractor stand-in that drops two text files into `{out_dir}`
pub fn fake_zip_extractor(config: &mut Config) {
    config.set_var("ZIP Extract", "command", "sh");
    config.set_var(
        "ZIP Extract",
        "args",
        "-c,printf one > {out_dir}/first.txt && printf three > {out_dir}/second.txt",
    );
}
