use thiserror::Error;

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("failed to read signature baseline: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed signature baseline: {0}")]
    Malformed(#[source] bincode::Error),

    #[error("unrecognized signature baseline header")]
    UnrecognizedHeader,

    #[error("unsupported signature baseline version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl BaselineError {
    /// `true` for every variant that means "the stream is not a valid baseline",
    /// as opposed to the stream not being readable at all.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, BaselineError::Io(_))
    }
}
