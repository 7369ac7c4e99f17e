//! The floating-point domain the engine is instantiated over.
//!
//! Every entity in the crate is generic over a single [`Scalar`] type parameter,
//! mirroring the `MathDomain` compile-time selector of the original engine:
//! a solver built for `f32` and one built for `f64` never mix, and the choice
//! is made once at the call site (typically from the `-md` CLI flag via
//! [`MathDomain`]).

use nalgebra::RealField;
use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, LowerExp};
use std::str::FromStr;

use crate::error::PdeError;

/// Bound satisfied by the two concrete arithmetic domains the engine supports.
///
/// `RealField` gives us the nalgebra operator overloads (needed for `DMatrix`/
/// `DVector` arithmetic); `Float` gives `is_nan`/`is_infinite` for fault
/// detection; `FromPrimitive` lets constants like `0.5` or `1.0/6.0` be
/// written once and cast into either domain.
pub trait Scalar:
    nalgebra::Scalar + RealField + Float + FromPrimitive + Copy + Default + Display + Debug + LowerExp
{
    /// Constructs the scalar from an `f64` literal. Never fails for the two
    /// domains implemented here.
    fn from_f64_lossy(x: f64) -> Self {
        Self::from_f64(x).expect("f32/f64 can represent any f64 literal used by this crate")
    }
}

impl Scalar for f32 {}
impl Scalar for f64 {}

/// Selects which [`Scalar`] domain a solver is instantiated over.
///
/// This is the runtime-facing counterpart of the compile-time `Scalar` bound:
/// the CLI parses `-md Float|Double` into a `MathDomain` and then monomorphizes
/// the rest of the pipeline against `f32` or `f64` accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MathDomain {
    #[default]
    Float,
    Double,
}

impl FromStr for MathDomain {
    type Err = PdeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "Float" => Ok(MathDomain::Float),
            "Double" => Ok(MathDomain::Double),
            other => Err(PdeError::UnknownEnumValue {
                kind: "MathDomain",
                value: other.to_string(),
            }),
        }
    }
}
