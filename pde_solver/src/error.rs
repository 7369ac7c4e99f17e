//! Error taxonomy for the engine.
//!
//! Configuration and shape errors are detected at construction and prevent a
//! solver from ever reaching `Ready`. Most numeric faults are only raised
//! from an already-`Ready` solver's `advance` call; the one construction-time
//! exception is [`PdeError::SingularMatrix`], which an implicit scheme's
//! time discretizer can hit while inverting its denominator matrix for a
//! pathological `(dt, L)` pair, before the solver ever reaches `Ready`. IO
//! errors surface immediately from whichever collaborator hit them. Nothing
//! here is retried internally.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdeError {
    #[error("unknown {kind} value: `{value}`")]
    UnknownEnumValue { kind: &'static str, value: String },

    #[error("missing required argument `{flag}`")]
    MissingArgument { flag: &'static str },

    #[error("illegal value for argument `{flag}`: `{value}`")]
    IllegalArgument { flag: &'static str, value: String },

    #[error("{scheme:?} cannot be used with the wave equation; only ExplicitEuler and ImplicitEuler are supported")]
    UnsupportedWaveScheme { scheme: String },

    #[error("grid must have at least 3 strictly increasing coordinates, got {len}")]
    DegenerateGrid { len: usize },

    #[error("grid coordinates are not strictly increasing at index {index}")]
    NonMonotonicGrid { index: usize },

    #[error("initial condition has {actual} entries, expected {expected} to match the grid")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("periodic boundary condition value mismatch between opposing faces: {left} != {right}")]
    PeriodicValueMismatch { left: String, right: String },

    #[error("periodic boundary condition on one face requires periodic on the opposing face")]
    PeriodicFaceMismatch,

    #[error("non-finite value encountered during advance at step {step}")]
    NonFinite { step: usize },

    #[error("dense LU factorization reported a singular matrix")]
    SingularMatrix,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed input file: {0}")]
    Deserialize(String),
}

pub type PdeResult<T> = Result<T, PdeError>;
