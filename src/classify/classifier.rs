//! Category classification with per-file caching

use crate::classify::category::{builtin_categories, Category, GENERIC};
use crate::classify::signals::IdentitySignals;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Categories selected for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Forced category first (if any), then matches in registration order
    pub categories: Vec<String>,
    /// Category requested by the user, whether or not it is registered
    pub forced: Option<String>,
}

impl Classification {
    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn is_forced(&self, name: &str) -> bool {
        self.forced.as_deref() == Some(name)
    }
}

/// A file awaiting classification
///
/// Holds the signals for the file and caches the classification so later
/// calls never re-run the matchers.
#[derive(Debug)]
pub struct ClassifiedFile {
    path: PathBuf,
    signals: IdentitySignals,
    forced: Option<String>,
    cache: OnceCell<Classification>,
}

impl ClassifiedFile {
    pub fn new(path: impl Into<PathBuf>, signals: IdentitySignals, forced: Option<String>) -> Self {
        Self {
            path: path.into(),
            signals,
            forced: forced.filter(|f| !f.is_empty()),
            cache: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn signals(&self) -> &IdentitySignals {
        &self.signals
    }

    /// Classification if [`Classifier::classify`] already ran
    pub fn cached(&self) -> Option<&Classification> {
        self.cache.get()
    }
}

/// Ordered set of registered categories
#[derive(Debug, Clone)]
pub struct Classifier {
    categories: Vec<Category>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(builtin_categories())
    }
}

impl Classifier {
    /// Build from `categories`; a `Generic` category is added first if
    /// missing and duplicate names keep their first registration
    pub fn new(categories: Vec<Category>) -> Self {
        let mut registered: Vec<Category> = Vec::with_capacity(categories.len() + 1);
        if !categories.iter().any(|c| c.name == GENERIC) {
            registered.push(Category::generic());
        }
        for category in categories {
            if registered.iter().any(|c| c.name == category.name) {
                log::warn!("Ignoring duplicate category '{}'", category.name);
                continue;
            }
            registered.push(category);
        }
        Self {
            categories: registered,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    /// Categories for `file`, computed on first call and cached in `file`
    pub fn classify<'a>(&self, file: &'a ClassifiedFile) -> &'a Classification {
        file.cache.get_or_init(|| self.evaluate(file))
    }

    fn evaluate(&self, file: &ClassifiedFile) -> Classification {
        let mut categories = Vec::new();

        if let Some(forced) = &file.forced {
            log::info!("Forcing category \"{}\" to be added.", forced);
            categories.push(forced.clone());
        }

        for category in &self.categories {
            log::debug!("Checking category {} for file type.", category.name);
            let matched = match category.matches(&file.signals, &file.path) {
                Ok(matched) => matched,
                Err(e) => {
                    log::debug!(
                        "Category {} could not inspect {}: {}",
                        category.name,
                        file.path.display(),
                        e
                    );
                    false
                }
            };
            // Generic matches regardless of what its matcher says
            if (matched || category.name == GENERIC) && !categories.contains(&category.name) {
                log::debug!("Adding {} to plugin selection list.", category.name);
                categories.push(category.name.clone());
            }
        }

        Classification {
            categories,
            forced: file.forced.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::category::Matcher;
    use crate::classify::signals::HeuristicHit;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample(contents: &[u8]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bin");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_pdf_magic_yields_pdf_and_generic() {
        let (_dir, path) = sample(b"plain bytes");
        let file = ClassifiedFile::new(&path, IdentitySignals::new("PDF document", vec![]), None);
        let result = Classifier::default().classify(&file);

        let mut names: Vec<&str> = result.names().collect();
        names.sort();
        assert_eq!(names, vec!["Generic", "PDF"]);
        assert_eq!(result.forced, None);
    }

    #[test]
    fn test_generic_always_present() {
        let (_dir, path) = sample(b"");
        let file = ClassifiedFile::new(&path, IdentitySignals::default(), None);
        let result = Classifier::default().classify(&file);
        assert_eq!(result.categories, vec!["Generic"]);
    }

    #[test]
    fn test_generic_present_even_when_registered_with_failing_matcher() {
        fn broken(_: &IdentitySignals, _: &Path) -> io::Result<bool> {
            Err(io::Error::other("boom"))
        }
        let classifier = Classifier::new(vec![Category::new(GENERIC, "", Matcher::Custom(broken))]);
        let (_dir, path) = sample(b"");
        let file = ClassifiedFile::new(&path, IdentitySignals::default(), None);
        assert!(classifier.classify(&file).contains(GENERIC));
    }

    static EVALUATIONS: AtomicUsize = AtomicUsize::new(0);

    fn counting(_: &IdentitySignals, _: &Path) -> io::Result<bool> {
        EVALUATIONS.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    #[test]
    fn test_classification_is_cached() {
        let classifier = Classifier::new(vec![
            Category::generic(),
            Category::new("Counted", "", Matcher::Custom(counting)),
        ]);
        let (_dir, path) = sample(b"x");
        let file = ClassifiedFile::new(&path, IdentitySignals::default(), None);

        assert!(file.cached().is_none());
        let first = classifier.classify(&file).clone();
        let second = classifier.classify(&file).clone();
        assert_eq!(first, second);
        assert_eq!(EVALUATIONS.load(Ordering::SeqCst), 1);
        assert!(file.cached().is_some());
    }

    #[test]
    fn test_matcher_error_does_not_stop_other_categories() {
        fn failing(_: &IdentitySignals, _: &Path) -> io::Result<bool> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
        let classifier = Classifier::new(vec![
            Category::generic(),
            Category::new("Broken", "", Matcher::Custom(failing)),
            Category::signature("ZIP", "", &["Zip archive"], 75.0, None),
        ]);
        let (_dir, path) = sample(b"x");
        let file = ClassifiedFile::new(&path, IdentitySignals::new("Zip archive data", vec![]), None);
        assert_eq!(classifier.classify(&file).categories, vec!["Generic", "ZIP"]);
    }

    #[test]
    fn test_forced_category_first_and_flagged() {
        let (_dir, path) = sample(b"x");
        let file = ClassifiedFile::new(
            &path,
            IdentitySignals::new("PDF document", vec![]),
            Some("PDF".to_string()),
        );
        let result = Classifier::default().classify(&file);
        assert_eq!(result.categories, vec!["PDF", "Generic"]);
        assert!(result.is_forced("PDF"));
    }

    #[test]
    fn test_unregistered_forced_category_is_kept() {
        let (_dir, path) = sample(b"x");
        let file = ClassifiedFile::new(&path, IdentitySignals::default(), Some("APK".to_string()));
        let classifier = Classifier::default();
        let result = classifier.classify(&file);
        assert_eq!(result.categories, vec!["APK", "Generic"]);
        assert!(!classifier.is_registered("APK"));
    }

    #[test]
    fn test_heuristics_select_exe() {
        let (_dir, path) = sample(b"x");
        let signals = IdentitySignals::new(
            "data",
            vec![HeuristicHit::new(49.1, "Win32 Executable MS Visual C++ (generic)")],
        );
        let file = ClassifiedFile::new(&path, signals, None);
        assert!(Classifier::default().classify(&file).contains("EXE"));
    }

    #[test]
    fn test_missing_generic_is_added_first() {
        let classifier = Classifier::new(vec![Category::signature("PDF", "", &["PDF"], 50.0, None)]);
        let names: Vec<&str> = classifier.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Generic", "PDF"]);
    }
}
