/// Reasons a request can never (or did not) produce a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Unsatisfiable {
    #[error(
        "total length of numbers+symbols ({required}) is greater than maximum characters ({length})"
    )]
    MinimumsExceedLength { required: i64, length: i64 },

    #[error("no characters are eligible for selection")]
    EmptyUniverse,

    #[error("no candidate met the required minimums within {attempts} attempts")]
    AttemptsExhausted { attempts: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid arguments: count of output ({output_count}) and length ({length}) must be positive")]
    InvalidArguments { output_count: i64, length: i64 },

    #[error("{0}")]
    ConstraintUnsatisfiable(Unsatisfiable),

    #[error("cannot allocate a password of {length} characters: {source}")]
    Allocation {
        length: usize,
        #[source]
        source: std::collections::TryReserveError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Unsatisfiable> for GenerationError {
    fn from(reason: Unsatisfiable) -> Self {
        GenerationError::ConstraintUnsatisfiable(reason)
    }
}
