use thiserror::Error;

/// Top-level error type for the simulator binary. Everything the
/// pipeline itself encounters (unknown opcodes, out-of-range memory,
/// phantom fetches past the end of the program) is masked, in-band
/// behavior rather than a propagating error (§7) — this type only
/// covers the two ways the *driver* can fail before a single cycle runs.
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

pub type SimulatorResult<T> = Result<T, SimulatorError>;
