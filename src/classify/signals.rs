//! Identification signals gathered once per file
//!
//! Two external tools describe a file: a `file -b` style magic sniffer and,
//! when installed, TrID. Both are optional; a missing or failing tool just
//! produces an empty signal.

use crate::core::config::{expand_home, Config};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use std::path::Path;
use tokio::process::Command;

static TRID_LINE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^\s*([0-9\.]+)% \([\w\.]+\) ([\S\s]+) \([0-9/]+\)$").ok()
});

/// One heuristic identification: confidence percentage and description
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicHit {
    pub percent: f64,
    pub description: String,
}

impl HeuristicHit {
    pub fn new(percent: f64, description: impl Into<String>) -> Self {
        Self {
            percent,
            description: description.into(),
        }
    }
}

// [percent, description]
impl Serialize for HeuristicHit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.percent)?;
        tuple.serialize_element(&self.description)?;
        tuple.end()
    }
}

/// Classification input for one file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IdentitySignals {
    pub magic: String,
    pub heuristics: Vec<HeuristicHit>,
}

impl IdentitySignals {
    pub fn new(magic: impl Into<String>, heuristics: Vec<HeuristicHit>) -> Self {
        Self {
            magic: magic.into(),
            heuristics,
        }
    }

    /// Run the configured identification tools against `path`
    ///
    /// Reads `[File ID] file_cmd`, `trid` and `trid_db`.
    pub async fn gather(path: &Path, config: &Config) -> Self {
        let file_cmd = config
            .get_var("File ID", "file_cmd")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "file".to_string());
        let magic = sniff_magic(path, &file_cmd).await;

        let trid = config.get_var("File ID", "trid").unwrap_or_default();
        let trid_db = config.get_var("File ID", "trid_db").unwrap_or_default();
        let heuristics = if trid.is_empty() {
            Vec::new()
        } else {
            sniff_trid(path, &expand_home(&trid), &expand_home(&trid_db)).await
        };

        Self { magic, heuristics }
    }
}

/// Describe `path` with a `file -b` compatible command
///
/// Returns an empty string if the command cannot run or fails.
pub async fn sniff_magic(path: &Path, file_cmd: &str) -> String {
    let output = match Command::new(file_cmd).arg("-b").arg(path).output().await {
        Ok(output) => output,
        Err(e) => {
            log::warn!("Could not run '{}' for magic detection: {}", file_cmd, e);
            return String::new();
        }
    };

    if !output.status.success() {
        log::warn!(
            "'{}' exited with {} while identifying {}",
            file_cmd,
            output.status,
            path.display()
        );
        return String::new();
    }

    let magic = String::from_utf8_lossy(&output.stdout).trim().to_string();
    log::debug!("Magic file type is \"{}\"", magic);
    magic
}

/// Run TrID and return its hits, best first as TrID prints them
pub async fn sniff_trid(path: &Path, trid: &Path, trid_db: &Path) -> Vec<HeuristicHit> {
    if !trid.is_file() || !trid_db.is_file() {
        log::warn!("TrID cannot be found. Skipping TrID file type detection.");
        return Vec::new();
    }

    // TrID cannot open names starting with "./"
    let target = path.strip_prefix("./").unwrap_or(path);
    let mut db_arg = std::ffi::OsString::from("-d:");
    db_arg.push(trid_db.as_os_str());

    let output = match Command::new(trid).arg(db_arg).arg(target).output().await {
        Ok(output) => output,
        Err(e) => {
            log::error!("Could not run TrID: {}", e);
            return Vec::new();
        }
    };
    if !output.stderr.is_empty() {
        log::error!(
            "Error running TrID: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Vec::new();
    }

    let hits = parse_trid_output(&String::from_utf8_lossy(&output.stdout));
    log::debug!("TrID types are: {:?}", hits);
    hits
}

/// Extract `NN.N% (.EXT) Description (a/b)` lines from TrID output
pub fn parse_trid_output(output: &str) -> Vec<HeuristicHit> {
    let Some(pattern) = TRID_LINE.as_ref() else {
        return Vec::new();
    };

    output
        .lines()
        .filter_map(|line| pattern.captures(line.trim_end_matches('\r')))
        .filter_map(|caps| {
            let percent = caps.get(1)?.as_str().parse::<f64>().ok()?;
            let description = caps.get(2)?.as_str().to_string();
            Some(HeuristicHit::new(percent, description))
        })
        .collect()
}
