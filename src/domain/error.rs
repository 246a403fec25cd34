use thiserror::Error;

use crate::domain::json_path::JsonPathError;

/// Failures while compiling one matcher into a filter expression.
#[derive(Debug, Error)]
pub enum MatcherError {
    /// Equality matchers look their value up in the body, so a body is required.
    #[error("equality matcher `{path}` requires a body but none was supplied")]
    MissingBody { path: String },

    /// The equality path is well formed but nothing lives there.
    #[error("no value at `{path}` in body {document}")]
    UnresolvedPath { path: String, document: String },

    /// Value at the equality path cannot be written as a filter literal.
    #[error("value at `{path}` is {kind} and cannot be compared by equality")]
    UnsupportedValue { path: String, kind: &'static str },

    #[error("type matcher `{path}` needs min_occurrence or max_occurrence")]
    MissingOccurrence { path: String },

    #[error(transparent)]
    InvalidPath(#[from] JsonPathError),
}

impl MatcherError {
    /// Configuration problems are distinguished from lookup misses.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingBody { .. } | Self::MissingOccurrence { .. } | Self::InvalidPath(_)
        )
    }
}

/// Errors produced by body compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to compile matcher `{path}`: {source}")]
    Matcher {
        path: String,
        #[source]
        source: MatcherError,
    },
}
