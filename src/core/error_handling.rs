//! Fatal error reporting
//!
//! Startup failures (unwritable log directory, unreachable database, bad
//! configuration) end the process. This module decides how much of the error
//! the user sees before that happens.

/// Errors that can tell user-actionable problems apart from system failures
///
/// When `is_user_actionable()` is true, `user_message()` returns `Some`.
pub trait ContextualError: std::error::Error {
    /// True if the message is something the user can fix directly
    fn is_user_actionable(&self) -> bool;

    /// Short message for user-actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error with the right amount of detail
///
/// User-actionable errors show their own message; system errors show the
/// operation context. The full error is always logged at debug level.
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("FATAL: {}: {}", user_msg, error);
        }
        _ => {
            log::error!("FATAL: {}", operation_context);
        }
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct MissingInput {
        message: String,
    }

    impl fmt::Display for MissingInput {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for MissingInput {}

    impl ContextualError for MissingInput {
        fn is_user_actionable(&self) -> bool {
            true
        }

        fn user_message(&self) -> Option<&str> {
            Some(&self.message)
        }
    }

    #[derive(Debug)]
    struct DiskFailure;

    impl fmt::Display for DiskFailure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk I/O error")
        }
    }

    impl std::error::Error for DiskFailure {}

    impl ContextualError for DiskFailure {
        fn is_user_actionable(&self) -> bool {
            false
        }

        fn user_message(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn test_user_error_exposes_message() {
        let error = MissingInput {
            message: "Submission is neither file nor directory".to_string(),
        };
        log_error_with_context(&error, "Queueing input");
        assert!(error.is_user_actionable());
        assert_eq!(
            error.user_message(),
            Some("Submission is neither file nor directory")
        );
    }

    #[test]
    fn test_system_error_has_no_user_message() {
        let error = DiskFailure;
        log_error_with_context(&error, "Opening metadata store");
        assert!(!error.is_user_actionable());
        assert_eq!(error.user_message(), None);
    }
}
