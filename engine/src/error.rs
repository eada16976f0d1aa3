use thiserror::Error;

/// Failures raised while resolving an attack batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The mob table only covers rolls of 1 through 20.
    #[error("roll needed to hit ({roll_needed}) is outside the mob attack table (1..=20)")]
    OutOfRange { roll_needed: i32 },
}
