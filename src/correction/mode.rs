use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix3, Vector3, Vector6};
use serde::Serialize;
use thiserror::Error;

use crate::dynamics::state::{idx, Stm, SynodicState};

/// Final-state components that must vanish at a perpendicular xz-plane
/// crossing: y, vx, vz.
pub const CONSTRAINT_ROWS: [usize; 3] = [idx::Y, idx::VX, idx::VZ];

/// Which three of {x0, z0, vy0, T/2} the corrector is free to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectionMode {
    /// Half-period held, (x0, z0, vy0) free.
    #[default]
    FixPeriod,
    /// z0 held, (x0, vy0, T/2) free.
    FixZ,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown correction mode '{0}' (expected 'fix-period' or 'fix-z')")]
pub struct ParseModeError(pub String);

impl FromStr for CorrectionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fix-period" | "fix_period" | "period" => Ok(Self::FixPeriod),
            "fix-z" | "fix_z" | "z" => Ok(Self::FixZ),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

impl fmt::Display for CorrectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixPeriod => write!(f, "fix-period"),
            Self::FixZ => write!(f, "fix-z"),
        }
    }
}

impl CorrectionMode {
    /// Free-variable vector of the current guess.
    pub fn extract(&self, state: &SynodicState, half_period: f64) -> Vector3<f64> {
        match self {
            Self::FixZ => Vector3::new(state.pos.x, state.vel.y, half_period),
            Self::FixPeriod => Vector3::new(state.pos.x, state.pos.z, state.vel.y),
        }
    }

    /// Write free variables back; the inverse of [`extract`](Self::extract).
    pub fn inject(
        &self,
        xi: &Vector3<f64>,
        state: &SynodicState,
        half_period: f64,
    ) -> (SynodicState, f64) {
        let mut next = *state;
        match self {
            Self::FixZ => {
                next.pos.x = xi[0];
                next.vel.y = xi[1];
                (next, xi[2])
            }
            Self::FixPeriod => {
                next.pos.x = xi[0];
                next.pos.z = xi[1];
                next.vel.y = xi[2];
                (next, half_period)
            }
        }
    }

    /// d(residual)/d(free variables) from the half-period STM and, for
    /// `FixZ`, the final state derivative.
    pub fn sensitivity(&self, stm: &Stm, final_derivative: &Vector6<f64>) -> Matrix3<f64> {
        let constrained = |v: Vector6<f64>| Vector3::from_fn(|r, _| v[CONSTRAINT_ROWS[r]]);
        let stm_column = |j: usize| constrained(stm.column(j).into_owned());

        match self {
            Self::FixZ => Matrix3::from_columns(&[
                stm_column(idx::X),
                stm_column(idx::VY),
                constrained(*final_derivative),
            ]),
            Self::FixPeriod => Matrix3::from_columns(&[
                stm_column(idx::X),
                stm_column(idx::Z),
                stm_column(idx::VY),
            ]),
        }
    }
}

/// Perpendicular-crossing residual (y_f, vx_f, vz_f).
pub fn crossing_residual(final_state: &SynodicState) -> Vector3<f64> {
    Vector3::new(final_state.pos.y, final_state.vel.x, final_state.vel.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> SynodicState {
        SynodicState::new(1.1, 0.0, -0.2, 0.0, -0.3, 0.0)
    }

    #[test]
    fn extract_inject_roundtrip() {
        let s = sample_state();
        for mode in [CorrectionMode::FixPeriod, CorrectionMode::FixZ] {
            let xi = mode.extract(&s, 1.6);
            let (s2, th) = mode.inject(&xi, &s, 1.6);
            assert_eq!(s2, s, "{} changed the state", mode);
            assert_eq!(th, 1.6);
        }
    }

    #[test]
    fn fix_z_never_touches_z() {
        let xi = Vector3::new(1.2, -0.25, 1.7);
        let (s, th) = CorrectionMode::FixZ.inject(&xi, &sample_state(), 1.6);
        assert_eq!(s.pos.z, -0.2);
        assert_eq!(s.pos.x, 1.2);
        assert_eq!(s.vel.y, -0.25);
        assert_eq!(th, 1.7);
    }

    #[test]
    fn fix_period_never_touches_half_period() {
        let xi = Vector3::new(1.2, -0.1, -0.25);
        let (s, th) = CorrectionMode::FixPeriod.inject(&xi, &sample_state(), 1.6);
        assert_eq!(th, 1.6);
        assert_eq!(s.pos.z, -0.1);
    }

    #[test]
    fn sensitivity_picks_rows_and_columns() {
        let stm = Stm::from_fn(|i, j| (10 * i + j) as f64);
        let dx = Vector6::new(0.0, -1.0, 0.0, -3.0, 0.0, -5.0);

        let fz = CorrectionMode::FixZ.sensitivity(&stm, &dx);
        assert_eq!(fz, Matrix3::new(10.0, 14.0, -1.0, 30.0, 34.0, -3.0, 50.0, 54.0, -5.0));

        let fp = CorrectionMode::FixPeriod.sensitivity(&stm, &dx);
        assert_eq!(fp, Matrix3::new(10.0, 12.0, 14.0, 30.0, 32.0, 34.0, 50.0, 52.0, 54.0));
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("fix-z".parse::<CorrectionMode>(), Ok(CorrectionMode::FixZ));
        assert_eq!(" Period ".parse::<CorrectionMode>(), Ok(CorrectionMode::FixPeriod));
        assert_eq!(
            "fix-amplitude".parse::<CorrectionMode>(),
            Err(ParseModeError("fix-amplitude".into()))
        );
    }

    #[test]
    fn display_matches_serde_names() {
        for mode in [CorrectionMode::FixPeriod, CorrectionMode::FixZ] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode));
        }
    }
}
