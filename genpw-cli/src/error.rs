use std::process::ExitCode;

use genpw::GenerationError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Usage mistakes get the help text and exit status 2.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Generation(GenerationError::InvalidArguments { .. }))
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_usage() { ExitCode::from(2) } else { ExitCode::FAILURE }
    }
}
