use alphastoch_core::EngineError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] alphastoch_core::ValidationError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            // Bad input is a usage error; upstream failures get their own code.
            Self::Engine(error) => match error {
                EngineError::InvalidParameter { .. } => 2,
                EngineError::UpstreamDataUnavailable(_) => 3,
                EngineError::NumericOverflow { .. } | EngineError::DivisionUndefined { .. } => 6,
            },
            Self::StrictModeViolation { .. } => 5,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
