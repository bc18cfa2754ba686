//! Domain error types.

/// Top-level error type for the backtester.
#[derive(Debug, thiserror::Error)]
pub enum BacktesterError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BacktesterError> for std::process::ExitCode {
    fn from(err: &BacktesterError) -> Self {
        let code: u8 = match err {
            BacktesterError::Io(_) => 1,
            BacktesterError::ConfigParse { .. } | BacktesterError::ConfigInvalid { .. } => 2,
            BacktesterError::DataSource { .. } => 3,
            BacktesterError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = BacktesterError::InsufficientData {
            bars: 10,
            minimum: 201,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: have 10 bars, need 201"
        );
    }

    #[test]
    fn config_invalid_message() {
        let err = BacktesterError::ConfigInvalid {
            section: "strategy".into(),
            key: "long_period".into(),
            reason: "must be positive".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [strategy] long_period: must be positive"
        );
    }

    #[test]
    fn io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BacktesterError = io.into();
        assert_eq!(err.to_string(), "gone");
    }
}
