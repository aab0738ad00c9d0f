use nalgebra::Matrix6;

use super::state::{Stm, SynodicState};
use super::{derivatives, jacobian};
use crate::sim::integrator::OdeSystem;

/// State (6) plus row-major STM (36).
pub const AUGMENTED_DIM: usize = 42;

// ---------------------------------------------------------------------------
// Plain CR3BP flow
// ---------------------------------------------------------------------------

/// CR3BP equations of motion as a 6-dimensional ODE system.
#[derive(Debug, Clone, Copy)]
pub struct Cr3bpDynamics {
    pub mu: f64,
}

impl OdeSystem<6> for Cr3bpDynamics {
    fn rhs(&self, _t: f64, y: &[f64; 6], dydt: &mut [f64; 6]) {
        let d = derivatives(self.mu, &SynodicState::from_array(*y));
        dydt[..3].copy_from_slice(d.dpos.as_slice());
        dydt[3..].copy_from_slice(d.dvel.as_slice());
    }
}

// ---------------------------------------------------------------------------
// Flow augmented with the first-order variational equations
// ---------------------------------------------------------------------------

/// CR3BP equations augmented with dPhi/dt = A(t) Phi.
#[derive(Debug, Clone, Copy)]
pub struct Cr3bpVariational {
    pub mu: f64,
}

impl OdeSystem<AUGMENTED_DIM> for Cr3bpVariational {
    fn rhs(&self, _t: f64, y: &[f64; AUGMENTED_DIM], dydt: &mut [f64; AUGMENTED_DIM]) {
        let (state, phi) = unpack(y);
        let d = derivatives(self.mu, &state);
        let dphi = jacobian(self.mu, &state) * phi;

        dydt[..3].copy_from_slice(d.dpos.as_slice());
        dydt[3..6].copy_from_slice(d.dvel.as_slice());
        for i in 0..6 {
            for j in 0..6 {
                dydt[6 + 6 * i + j] = dphi[(i, j)];
            }
        }
    }
}

/// Pack a state and STM into the augmented vector.
pub fn pack(state: &SynodicState, phi: &Stm) -> [f64; AUGMENTED_DIM] {
    let mut y = [0.0; AUGMENTED_DIM];
    y[..6].copy_from_slice(&state.to_array());
    for i in 0..6 {
        for j in 0..6 {
            y[6 + 6 * i + j] = phi[(i, j)];
        }
    }
    y
}

/// Split the augmented vector back into state and STM.
pub fn unpack(y: &[f64; AUGMENTED_DIM]) -> (SynodicState, Stm) {
    let state = SynodicState::new(y[0], y[1], y[2], y[3], y[4], y[5]);
    let phi = Matrix6::from_fn(|i, j| y[6 + 6 * i + j]);
    (state, phi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_is_row_major() {
        let s = SynodicState::new(0.1, 0.2, 0.3, 0.4, 0.5, 0.6);
        let phi = Matrix6::from_fn(|i, j| (10 * i + j) as f64);
        let y = pack(&s, &phi);
        // Row 1, column 4 lives at 6 + 6 + 4
        assert_eq!(y[16], 14.0);
        let (s2, phi2) = unpack(&y);
        assert_eq!(s2, s);
        assert_eq!(phi2, phi);
    }

    #[test]
    fn identity_stm_derivative_is_jacobian() {
        let mu = 0.0121505856;
        let s = SynodicState::new(0.8, 0.0, 0.02, 0.0, 0.13, 0.0);
        let y = pack(&s, &Matrix6::identity());
        let mut dy = [0.0; AUGMENTED_DIM];
        Cr3bpVariational { mu }.rhs(0.0, &y, &mut dy);
        let (_, dphi) = unpack(&dy);
        assert_eq!(dphi, jacobian(mu, &s));
    }
}
