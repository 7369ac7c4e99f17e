//! Closed sum types selected from the CLI / embedder, with a name-keyed
//! parser for each: unknown names are a `ConfigError`, never a panic.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PdeError;

/// Time-integration scheme. `k` below is the number of past states the
/// scheme's `TimeDiscretizer` needs (see [`SolverType::history_len`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolverType {
    ExplicitEuler,
    ImplicitEuler,
    CrankNicolson,
    RungeKuttaRalston,
    RungeKutta3,
    RungeKutta4,
    RungeKuttaThreeEight,
    RungeKuttaGaussLegendre4,
    RichardsonExtrapolation2,
    RichardsonExtrapolation3,
    AdamsBashforth2,
    AdamsMouldon2,
}

impl SolverType {
    /// Number of past states (`k`) the scheme's advance rule requires.
    pub fn history_len(self) -> usize {
        match self {
            SolverType::AdamsBashforth2 | SolverType::AdamsMouldon2 => 2,
            _ => 1,
        }
    }

    /// `true` for the two schemes the wave-equation specialization supports.
    pub fn supports_wave_equation(self) -> bool {
        matches!(self, SolverType::ExplicitEuler | SolverType::ImplicitEuler)
    }
}

impl FromStr for SolverType {
    type Err = PdeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        use SolverType::*;
        Ok(match text {
            "ExplicitEuler" => ExplicitEuler,
            "ImplicitEuler" => ImplicitEuler,
            "CrankNicolson" => CrankNicolson,
            "RungeKuttaRalston" => RungeKuttaRalston,
            "RungeKutta3" => RungeKutta3,
            "RungeKutta4" => RungeKutta4,
            "RungeKuttaThreeEight" => RungeKuttaThreeEight,
            "RungeKuttaGaussLegendre4" => RungeKuttaGaussLegendre4,
            "RichardsonExtrapolation2" => RichardsonExtrapolation2,
            "RichardsonExtrapolation3" => RichardsonExtrapolation3,
            "AdamsBashforth2" => AdamsBashforth2,
            "AdamsMouldon2" => AdamsMouldon2,
            other => {
                return Err(PdeError::UnknownEnumValue { kind: "SolverType", value: other.to_string() })
            }
        })
    }
}

/// Which governing equation the engine specializes the generic solver for.
/// First-order-in-time advection-diffusion needs one past state; the
/// second-order-in-time wave equation is reduced to a coupled first-order
/// system and needs two (see [`crate::equations`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PdeType {
    #[default]
    AdvectionDiffusion,
    WaveEquation,
}

impl FromStr for PdeType {
    type Err = PdeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "AdvectionDiffusion" => Ok(PdeType::AdvectionDiffusion),
            "WaveEquation" => Ok(PdeType::WaveEquation),
            other => Err(PdeError::UnknownEnumValue { kind: "PdeType", value: other.to_string() }),
        }
    }
}

/// Spatial discretization stencil applied to the interior rows of `L`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceDiscretizerType {
    Centered,
    Upwind,
    LaxWendroff,
}

impl FromStr for SpaceDiscretizerType {
    type Err = PdeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        use SpaceDiscretizerType::*;
        Ok(match text {
            "Centered" => Centered,
            "Upwind" => Upwind,
            "LaxWendroff" => LaxWendroff,
            other => {
                return Err(PdeError::UnknownEnumValue { kind: "SpaceDiscretizerType", value: other.to_string() })
            }
        })
    }
}
