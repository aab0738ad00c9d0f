use log::debug;
use nalgebra::Vector6;

use super::integrator::{IntegrationError, Rkf78, Tolerances};
use crate::dynamics::derivatives;
use crate::dynamics::state::{Stm, SynodicState};
use crate::dynamics::variational::{pack, unpack, Cr3bpDynamics, Cr3bpVariational};
use crate::system::jacobi::jacobi_constant;

/// End point of a propagated arc.
#[derive(Debug, Clone, Copy)]
pub struct PropagationOutput {
    pub final_state: SynodicState,
    /// Present when the variational equations were integrated.
    pub stm: Option<Stm>,
    /// d(state)/dt at the final state.
    pub final_derivative: Vector6<f64>,
}

/// One sampled point of a trajectory.
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryPoint {
    pub time: f64,
    pub state: SynodicState,
    pub jacobi: f64,
}

/// Anything that can propagate a CR3BP state.
///
/// The corrector only talks to this trait, so tests and callers may plug in
/// their own oracle.
pub trait Propagate {
    fn propagate(
        &self,
        mu: f64,
        state0: &SynodicState,
        duration: f64,
        with_stm: bool,
    ) -> Result<PropagationOutput, IntegrationError>;
}

// ---------------------------------------------------------------------------
// RKF78-backed propagator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Cr3bpPropagator {
    solver: Rkf78,
    /// Initial step guess (nondimensional time).
    pub h0: f64,
}

impl Cr3bpPropagator {
    pub fn new(tol: Tolerances) -> Self {
        Self {
            solver: Rkf78::new(tol),
            h0: 0.01,
        }
    }

    /// Propagate and record `samples` evenly spaced points, including
    /// both end points.
    pub fn sample(
        &self,
        mu: f64,
        state0: &SynodicState,
        duration: f64,
        samples: usize,
    ) -> Result<Vec<TrajectoryPoint>, IntegrationError> {
        let samples = samples.max(2);
        let dt = duration / (samples - 1) as f64;
        let sys = Cr3bpDynamics { mu };

        let mut trajectory = Vec::with_capacity(samples);
        let mut y = state0.to_array();
        trajectory.push(TrajectoryPoint {
            time: 0.0,
            state: *state0,
            jacobi: jacobi_constant(mu, state0),
        });

        for i in 1..samples {
            let t0 = (i - 1) as f64 * dt;
            let (y_next, _) = self.solver.integrate(&sys, t0, &y, t0 + dt, self.h0)?;
            y = y_next;
            let state = SynodicState::from_array(y);
            trajectory.push(TrajectoryPoint {
                time: t0 + dt,
                state,
                jacobi: jacobi_constant(mu, &state),
            });
        }

        Ok(trajectory)
    }
}

impl Default for Cr3bpPropagator {
    fn default() -> Self {
        Self::new(Tolerances::default())
    }
}

impl Propagate for Cr3bpPropagator {
    fn propagate(
        &self,
        mu: f64,
        state0: &SynodicState,
        duration: f64,
        with_stm: bool,
    ) -> Result<PropagationOutput, IntegrationError> {
        let (final_state, stm) = if with_stm {
            let y0 = pack(state0, &Stm::identity());
            let (yf, stats) =
                self.solver
                    .integrate(&Cr3bpVariational { mu }, 0.0, &y0, duration, self.h0)?;
            debug!(
                "propagated {:.6} TU with STM: {} steps ({} rejected)",
                duration, stats.accepted_steps, stats.rejected_steps
            );
            let (state, phi) = unpack(&yf);
            (state, Some(phi))
        } else {
            let (yf, stats) =
                self.solver
                    .integrate(&Cr3bpDynamics { mu }, 0.0, &state0.to_array(), duration, self.h0)?;
            debug!(
                "propagated {:.6} TU: {} steps ({} rejected)",
                duration, stats.accepted_steps, stats.rejected_steps
            );
            (SynodicState::from_array(yf), None)
        };

        Ok(PropagationOutput {
            final_state,
            stm,
            final_derivative: derivatives(mu, &final_state).to_vector(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MU_EM: f64 = 1.215058560962404e-2;

    fn halo_guess() -> SynodicState {
        SynodicState::new(1.154, 0.0, -0.1384, 0.0, -0.2149, 0.0)
    }

    #[test]
    fn stm_matches_finite_differences() {
        let prop = Cr3bpPropagator::default();
        let s0 = halo_guess();
        let t = 0.8;
        let out = prop.propagate(MU_EM, &s0, t, true).unwrap();
        let stm = out.stm.unwrap();

        let h = 1e-5;
        for j in 0..6 {
            let mut xp = s0.to_vector();
            let mut xm = s0.to_vector();
            xp[j] += h;
            xm[j] -= h;
            let fp = prop
                .propagate(MU_EM, &SynodicState::from_vector(&xp), t, false)
                .unwrap();
            let fm = prop
                .propagate(MU_EM, &SynodicState::from_vector(&xm), t, false)
                .unwrap();
            let col = (fp.final_state.to_vector() - fm.final_state.to_vector()) / (2.0 * h);
            for i in 0..6 {
                assert!(
                    (stm[(i, j)] - col[i]).abs() < 1e-4 * (1.0 + col[i].abs()),
                    "STM[{},{}] = {} vs fd {}",
                    i,
                    j,
                    stm[(i, j)],
                    col[i]
                );
            }
        }
    }

    #[test]
    fn state_agrees_with_and_without_stm() {
        let prop = Cr3bpPropagator::default();
        let a = prop.propagate(MU_EM, &halo_guess(), 1.5, true).unwrap();
        let b = prop.propagate(MU_EM, &halo_guess(), 1.5, false).unwrap();
        let diff = (a.final_state.to_vector() - b.final_state.to_vector()).norm();
        assert!(diff < 1e-10, "state mismatch {:e}", diff);
        assert!(b.stm.is_none());
    }

    #[test]
    fn final_derivative_is_rhs_at_final_state() {
        let prop = Cr3bpPropagator::default();
        let out = prop.propagate(MU_EM, &halo_guess(), 0.5, false).unwrap();
        let expected = derivatives(MU_EM, &out.final_state).to_vector();
        assert_eq!(out.final_derivative, expected);
    }

    #[test]
    fn jacobi_constant_is_conserved_along_samples() {
        let prop = Cr3bpPropagator::default();
        let traj = prop.sample(MU_EM, &halo_guess(), 3.0, 31).unwrap();
        assert_eq!(traj.len(), 31);
        assert!((traj.last().unwrap().time - 3.0).abs() < 1e-12);
        let c0 = traj[0].jacobi;
        for p in &traj {
            assert!((p.jacobi - c0).abs() < 1e-10, "Jacobi drift {:e}", p.jacobi - c0);
        }
    }

    #[test]
    fn backward_propagation_returns_to_start() {
        let prop = Cr3bpPropagator::default();
        let s0 = halo_guess();
        let fwd = prop.propagate(MU_EM, &s0, 1.2, false).unwrap();
        let back = prop.propagate(MU_EM, &fwd.final_state, -1.2, false).unwrap();
        let diff = (back.final_state.to_vector() - s0.to_vector()).norm();
        assert!(diff < 1e-9, "round trip error {:e}", diff);
    }
}
