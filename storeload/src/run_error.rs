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

impl From<storeload_core::Error> for RunError {
    fn from(err: storeload_core::Error) -> Self {
        use storeload_core::Error;
        match err {
            Error::InvalidConfig(_) | Error::InvalidTarget(_) | Error::InvalidDate(_) => {
                Self::InvalidInput(err.into())
            }
            other => Self::RuntimeError(other.into()),
        }
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.anyhow())
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
    fn config_errors_map_to_invalid_input() {
        let err = RunError::from(storeload_core::Error::InvalidConfig("`max_store` must be at least 1"));
        assert_eq!(err.exit_code(), ExitCode::InvalidInput);

        let err = RunError::from(storeload_core::Error::WorkerPanicked {
            panicked: 1,
            elapsed: std::time::Duration::ZERO,
        });
        assert_eq!(err.exit_code(), ExitCode::RuntimeError);
    }
}
