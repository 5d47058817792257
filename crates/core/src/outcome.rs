use core::fmt::{Display, Formatter};

use crate::result::{QueryResult, ServerState};

/// Transaction-layer classification of a statement or a whole transaction.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Success; for a whole transaction this means the commit happened.
    Ok,
    /// A row required by the transaction profile was missing.
    ClientAbort,
    /// The target reported a transactional abort and already rolled back.
    ServerAbort,
    /// Anything else. Fatal for the worker.
    Error,
}

impl Outcome {
    /// Whether the transaction body may be attempted again.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ClientAbort | Self::ServerAbort)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Ok => "ok",
            Self::ClientAbort => "client-abort",
            Self::ServerAbort => "server-abort",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// What a transaction profile expects from a statement's result.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Any successful result is acceptable (DML, TCL, optional reads).
    Any,
    /// At least one data row must be returned.
    Row,
}

/// Classify the result of one statement.
///
/// `Down` is treated like `Error`: a lost connection cannot be retried on
/// the same worker.
#[must_use]
pub fn classify(result: &QueryResult, requirement: Requirement) -> Outcome {
    match result.state() {
        ServerState::Ok if requirement == Requirement::Row && result.rows().is_empty() => {
            Outcome::ClientAbort
        }
        ServerState::Ok => Outcome::Ok,
        ServerState::Abort => Outcome::ServerAbort,
        ServerState::Error | ServerState::Down => Outcome::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_row() -> QueryResult {
        QueryResult::ok(vec!["n".into()], vec![vec!["1".into()]], "|n|\n|1|\n")
    }

    #[test]
    fn test_classify_ok() {
        assert_eq!(classify(&one_row(), Requirement::Row), Outcome::Ok);
        assert_eq!(classify(&one_row(), Requirement::Any), Outcome::Ok);
        assert_eq!(
            classify(&QueryResult::empty(""), Requirement::Any),
            Outcome::Ok
        );
    }

    #[test]
    fn test_classify_missing_row() {
        let empty = QueryResult::ok(vec!["n".into()], vec![], "|n|\n");
        assert_eq!(classify(&empty, Requirement::Row), Outcome::ClientAbort);
        assert_eq!(classify(&empty, Requirement::Any), Outcome::Ok);
    }

    #[test]
    fn test_classify_server_states() {
        assert_eq!(
            classify(&QueryResult::abort("abort"), Requirement::Any),
            Outcome::ServerAbort
        );
        assert_eq!(
            classify(&QueryResult::abort("abort"), Requirement::Row),
            Outcome::ServerAbort
        );
        assert_eq!(
            classify(&QueryResult::error("Error"), Requirement::Row),
            Outcome::Error
        );
        assert_eq!(
            classify(&QueryResult::down(""), Requirement::Any),
            Outcome::Error
        );
    }

    #[test]
    fn test_retryable() {
        assert!(Outcome::ClientAbort.is_retryable());
        assert!(Outcome::ServerAbort.is_retryable());
        assert!(!Outcome::Ok.is_retryable());
        assert!(!Outcome::Error.is_retryable());
    }
}
