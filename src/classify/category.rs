//! File categories and their matchers

use crate::classify::probe::Probe;
use crate::classify::signals::IdentitySignals;
use std::io;
use std::path::Path;

/// Name of the catch-all category
pub const GENERIC: &str = "Generic";

/// Custom matcher function
pub type MatchFn = fn(&IdentitySignals, &Path) -> io::Result<bool>;

/// How a category decides whether a file belongs to it
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Matches every file
    Always,
    /// Known type strings checked against the magic string and heuristic
    /// hits, then an optional content probe
    Signature {
        type_strings: Vec<String>,
        /// Heuristic hits must be strictly above this percentage
        threshold: f64,
        probe: Option<Probe>,
    },
    Custom(MatchFn),
}

/// A named partition of file types
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub description: String,
    pub matcher: Matcher,
}

impl Category {
    pub fn new(name: impl Into<String>, description: impl Into<String>, matcher: Matcher) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            matcher,
        }
    }

    pub fn generic() -> Self {
        Self::new(GENERIC, "Every file", Matcher::Always)
    }

    pub fn signature(
        name: &str,
        description: &str,
        type_strings: &[&str],
        threshold: f64,
        probe: Option<Probe>,
    ) -> Self {
        Self::new(
            name,
            description,
            Matcher::Signature {
                type_strings: type_strings.iter().map(|s| s.to_string()).collect(),
                threshold,
                probe,
            },
        )
    }

    /// Decide whether `path` belongs to this category
    ///
    /// Checked in order: magic string, heuristic hits above the threshold,
    /// then the probe. Only the probe touches the file, so only the probe
    /// can fail.
    pub fn matches(&self, signals: &IdentitySignals, path: &Path) -> io::Result<bool> {
        match &self.matcher {
            Matcher::Always => Ok(true),
            Matcher::Custom(check) => check(signals, path),
            Matcher::Signature {
                type_strings,
                threshold,
                probe,
            } => {
                if type_strings.iter().any(|t| signals.magic.contains(t.as_str())) {
                    return Ok(true);
                }

                let heuristic_match = signals.heuristics.iter().any(|hit| {
                    hit.percent > *threshold
                        && type_strings
                            .iter()
                            .any(|t| hit.description.contains(t.as_str()))
                });
                if heuristic_match {
                    return Ok(true);
                }

                match probe {
                    Some(probe) => probe.check(path),
                    None => Ok(false),
                }
            }
        }
    }
}

/// Categories shipped with filehound, in evaluation order
pub fn builtin_categories() -> Vec<Category> {
    vec![
        Category::generic(),
        Category::signature(
            "EXE",
            "Windows executables",
            &[
                "PE32 executable",
                "MS-DOS executable",
                "Win32 Executable",
                "Win32 EXE",
            ],
            25.0,
            Some(Probe::PeHeader),
        ),
        Category::signature(
            "Office",
            "Microsoft Office documents",
            &[
                "CDF V2 Document",
                "Composite Document File V2",
                "Microsoft Word",
                "Microsoft Office Word",
                "Microsoft Excel",
                "Microsoft PowerPoint",
                "Microsoft Office Document",
            ],
            30.0,
            Some(Probe::OleSignature),
        ),
        Category::signature(
            "PDF",
            "Adobe PDF documents",
            &["PDF document", "Adobe Portable Document Format"],
            50.0,
            Some(Probe::PdfMarker),
        ),
        Category::signature(
            "ZIP",
            "Zip archives",
            &["Zip archive", "ZIP compressed archive"],
            75.0,
            Some(Probe::ZipSignature),
        ),
    ]
}
