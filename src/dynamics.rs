pub mod state;
pub mod variational;

use nalgebra::{Matrix6, Vector3};

use self::state::{Deriv, SynodicState};

// ---------------------------------------------------------------------------
// CR3BP equations of motion (nondimensional, rotating frame)
// ---------------------------------------------------------------------------

/// Distances from the particle to the primary (at x = -mu) and the
/// secondary (at x = 1 - mu).
pub fn primary_distances(mu: f64, pos: &Vector3<f64>) -> (f64, f64) {
    let yz2 = pos.y * pos.y + pos.z * pos.z;
    let r1 = ((pos.x + mu).powi(2) + yz2).sqrt();
    let r2 = ((pos.x - 1.0 + mu).powi(2) + yz2).sqrt();
    (r1, r2)
}

/// Pseudo-potential U = (x^2 + y^2)/2 + (1 - mu)/r1 + mu/r2.
pub fn pseudo_potential(mu: f64, pos: &Vector3<f64>) -> f64 {
    let (r1, r2) = primary_distances(mu, pos);
    0.5 * (pos.x * pos.x + pos.y * pos.y) + (1.0 - mu) / r1 + mu / r2
}

/// Compute state derivatives for a given state.
///
///   ax =  x + 2 vy - (1-mu)(x+mu)/r1^3 - mu(x-1+mu)/r2^3
///   ay =  y - 2 vx - (1-mu) y/r1^3     - mu y/r2^3
///   az =           - (1-mu) z/r1^3     - mu z/r2^3
pub fn derivatives(mu: f64, state: &SynodicState) -> Deriv {
    let p = &state.pos;
    let v = &state.vel;
    let (r1, r2) = primary_distances(mu, p);
    let k1 = (1.0 - mu) / r1.powi(3);
    let k2 = mu / r2.powi(3);

    Deriv {
        dpos: *v,
        dvel: Vector3::new(
            p.x + 2.0 * v.y - k1 * (p.x + mu) - k2 * (p.x - 1.0 + mu),
            p.y - 2.0 * v.x - k1 * p.y - k2 * p.y,
            -k1 * p.z - k2 * p.z,
        ),
    }
}

/// Jacobian of the equations of motion, A = df/dx.
///
/// Block form [[0, I], [Uxx, Omega]] with Omega the Coriolis block
/// [[0, 2, 0], [-2, 0, 0], [0, 0, 0]].
pub fn jacobian(mu: f64, state: &SynodicState) -> Matrix6<f64> {
    let p = &state.pos;
    let (r1, r2) = primary_distances(mu, p);
    let r1_3 = r1.powi(3);
    let r2_3 = r2.powi(3);
    let r1_5 = r1.powi(5);
    let r2_5 = r2.powi(5);

    let dx1 = p.x + mu;
    let dx2 = p.x - 1.0 + mu;
    let c1 = 3.0 * (1.0 - mu) / r1_5;
    let c2 = 3.0 * mu / r2_5;
    let base = -(1.0 - mu) / r1_3 - mu / r2_3;

    let uxx = 1.0 + base + c1 * dx1 * dx1 + c2 * dx2 * dx2;
    let uyy = 1.0 + base + (c1 + c2) * p.y * p.y;
    let uzz = base + (c1 + c2) * p.z * p.z;
    let uxy = (c1 * dx1 + c2 * dx2) * p.y;
    let uxz = (c1 * dx1 + c2 * dx2) * p.z;
    let uyz = (c1 + c2) * p.y * p.z;

    #[rustfmt::skip]
    let a = Matrix6::new(
        0.0, 0.0, 0.0,  1.0, 0.0, 0.0,
        0.0, 0.0, 0.0,  0.0, 1.0, 0.0,
        0.0, 0.0, 0.0,  0.0, 0.0, 1.0,
        uxx, uxy, uxz,  0.0, 2.0, 0.0,
        uxy, uyy, uyz, -2.0, 0.0, 0.0,
        uxz, uyz, uzz,  0.0, 0.0, 0.0,
    );
    a
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::lagrange::lagrange_points;

    const MU_EM: f64 = 1.215058560962404e-2;

    #[test]
    fn lagrange_points_are_equilibria() {
        for l in lagrange_points(MU_EM).iter() {
            let s = SynodicState {
                pos: *l,
                vel: Vector3::zeros(),
            };
            let d = derivatives(MU_EM, &s);
            assert!(d.dvel.norm() < 1e-12, "L point not at rest: {}", d.dvel.norm());
        }
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let s = SynodicState::new(0.82, 0.01, 0.03, 0.002, 0.13, -0.004);
        let a = jacobian(MU_EM, &s);
        let h = 1e-6;
        let x0 = s.to_vector();
        for j in 0..6 {
            let mut xp = x0;
            let mut xm = x0;
            xp[j] += h;
            xm[j] -= h;
            let fp = derivatives(MU_EM, &SynodicState::from_vector(&xp)).to_vector();
            let fm = derivatives(MU_EM, &SynodicState::from_vector(&xm)).to_vector();
            let col = (fp - fm) / (2.0 * h);
            for i in 0..6 {
                assert!(
                    (a[(i, j)] - col[i]).abs() < 1e-6,
                    "A[{},{}] = {} vs fd {}",
                    i,
                    j,
                    a[(i, j)],
                    col[i]
                );
            }
        }
    }

    #[test]
    fn planar_state_has_no_out_of_plane_acceleration() {
        let s = SynodicState::new(0.9, 0.1, 0.0, 0.05, 0.2, 0.0);
        let d = derivatives(MU_EM, &s);
        assert_eq!(d.dvel.z, 0.0);
    }
}
