use std::path::PathBuf;

use sniffer_signatures::BaselineError;
use thiserror::Error;

/// An ignore specification that cannot be compiled. Raised while building an
/// [`crate::IgnoreRuleSet`], never while checking.
#[derive(Debug, Error)]
pub enum IgnorePatternError {
    #[error("ignore pattern is empty")]
    Empty,

    #[error("ignore pattern `{pattern}` contains whitespace or control characters")]
    InvalidCharacter { pattern: String },

    #[error("ignore pattern `{pattern}` contains an empty name segment")]
    EmptySegment { pattern: String },

    #[error("ignore pattern `{pattern}` could not be compiled: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A class whose bytecode could not be parsed.
#[derive(Debug, Error)]
#[error("bad class file {class}: {source}")]
pub struct MalformedClassError {
    /// Display name of the class (usually its path).
    pub class: String,
    #[source]
    pub source: sniffer_classfile::Error,
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Baseline(#[from] BaselineError),

    #[error(transparent)]
    IgnorePattern(#[from] IgnorePatternError),

    #[error(transparent)]
    MalformedClass(#[from] MalformedClassError),

    #[error("no signature baseline configured")]
    MissingBaseline,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}
