//! File classification
//!
//! A file is described once by [`IdentitySignals`] (magic string and TrID
//! hits). The [`Classifier`] runs every registered [`Category`] matcher over
//! those signals and returns the union of matching category names. `Generic`
//! is always part of the result, and the result is cached on the
//! [`ClassifiedFile`] so repeated calls are free and identical.

pub mod category;
pub mod classifier;
pub mod probe;
pub mod signals;

pub use category::{builtin_categories, Category, Matcher, GENERIC};
pub use classifier::{Classification, ClassifiedFile, Classifier};
pub use probe::Probe;
pub use signals::{HeuristicHit, IdentitySignals};
