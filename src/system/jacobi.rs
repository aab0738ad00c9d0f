use crate::dynamics::pseudo_potential;
use crate::dynamics::state::SynodicState;

/// Jacobi integral C = 2U - |v|^2, conserved along CR3BP trajectories.
pub fn jacobi_constant(mu: f64, state: &SynodicState) -> f64 {
    2.0 * pseudo_potential(mu, &state.pos) - state.vel.norm_squared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::lagrange::lagrange_points;
    use nalgebra::Vector3;

    const MU_EM: f64 = 1.215058560962404e-2;

    #[test]
    fn libration_point_energies() {
        let expected = [3.18834111774924, 3.1721604609685277, 3.012147150680504, 2.9879970511210328];
        let l = lagrange_points(MU_EM);
        for (p, c) in l.iter().zip(expected.iter()) {
            let s = SynodicState {
                pos: *p,
                vel: Vector3::zeros(),
            };
            let cj = jacobi_constant(MU_EM, &s);
            assert!((cj - c).abs() < 1e-10, "C = {} expected {}", cj, c);
        }
    }

    #[test]
    fn speed_lowers_the_constant() {
        let rest = SynodicState::new(0.9, 0.0, 0.0, 0.0, 0.0, 0.0);
        let moving = SynodicState::new(0.9, 0.0, 0.0, 0.0, 0.1, 0.0);
        let dc = jacobi_constant(MU_EM, &rest) - jacobi_constant(MU_EM, &moving);
        assert!((dc - 0.01).abs() < 1e-15);
    }
}
