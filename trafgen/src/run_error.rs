use crate::exit_codes::ExitCode;

#[derive(Debug)]
pub enum RunError {
    InvalidInput(anyhow::Error),
    RuntimeError(anyhow::Error),
}

impl RunError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::RuntimeError(_) => ExitCode::RuntimeError,
        }
    }

    #[must_use]
    pub fn anyhow(&self) -> &anyhow::Error {
        match self {
            Self::InvalidInput(e) | Self::RuntimeError(e) => e,
        }
    }
}

/// Engine errors raised before any worker starts are input problems; the rest are runtime.
impl From<trafgen_core::Error> for RunError {
    fn from(err: trafgen_core::Error) -> Self {
        match err {
            trafgen_core::Error::Configuration(_) | trafgen_core::Error::CatalogExhausted { .. } => {
                Self::InvalidInput(err.into())
            }
            other => Self::RuntimeError(other.into()),
        }
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(e) | Self::RuntimeError(e) => write!(f, "{e:#}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.anyhow().as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_invalid_input() {
        let err: RunError =
            trafgen_core::Error::Configuration(trafgen_core::ConfigError::InvalidRpm).into();
        assert_eq!(err.exit_code(), ExitCode::InvalidInput);
        assert!(err.to_string().contains("target_rpm"));
    }

    #[test]
    fn io_errors_are_runtime_errors() {
        let err: RunError = trafgen_core::Error::Io(std::io::Error::other("disk full")).into();
        assert_eq!(err.exit_code(), ExitCode::RuntimeError);
    }
}
