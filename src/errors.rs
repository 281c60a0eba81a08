use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(
        "insufficient samples for heliostat {heliostat_id}: {required} required, {available} available"
    )]
    InsufficientSamples {
        heliostat_id: String,
        available: usize,
        required: usize,
    },

    #[error("unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl SplitError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SplitError::InvalidConfiguration(msg.into())
    }

    pub fn is_insufficient_samples(&self) -> bool {
        matches!(self, SplitError::InsufficientSamples { .. })
    }

    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, SplitError::InvalidConfiguration(_))
    }
}

pub type SplitResult<T> = Result<T, SplitError>;
