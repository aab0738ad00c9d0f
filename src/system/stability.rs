use crate::dynamics::state::{Stm, SynodicState};
use crate::sim::integrator::IntegrationError;
use crate::sim::propagator::{Cr3bpPropagator, Propagate};

/// State-transition matrix over one full period.
pub fn monodromy(mu: f64, state: &SynodicState, period: f64) -> Result<Stm, IntegrationError> {
    monodromy_with(&Cr3bpPropagator::default(), mu, state, period)
}

/// Monodromy matrix using a caller-supplied propagator.
pub fn monodromy_with<P: Propagate + ?Sized>(
    propagator: &P,
    mu: f64,
    state: &SynodicState,
    period: f64,
) -> Result<Stm, IntegrationError> {
    let out = propagator.propagate(mu, state, period, true)?;
    out.stm
        .ok_or_else(|| IntegrationError::InvalidInput("propagator returned no STM".into()))
}

/// Stability index 1/2 (|lambda|max + 1/|lambda|max) of a monodromy matrix.
///
/// Equals 1 for a linearly stable orbit and grows with the unstable
/// eigenvalue.
pub fn stability_index(monodromy: &Stm) -> f64 {
    let lambda_max = monodromy
        .complex_eigenvalues()
        .iter()
        .map(|l| l.norm())
        .fold(0.0_f64, f64::max);
    0.5 * (lambda_max + 1.0 / lambda_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MU_EM: f64 = 1.215058560962404e-2;

    #[test]
    fn identity_is_neutrally_stable() {
        assert!((stability_index(&Stm::identity()) - 1.0).abs() < 1e-14);
    }

    #[test]
    fn halo_monodromy_is_volume_preserving() {
        let halo = SynodicState::new(
            1.1540242813152086,
            0.0,
            -0.1384196144071876,
            0.0,
            -0.21493019198710392,
            0.0,
        );
        let m = monodromy(MU_EM, &halo, 3.224999999975932).unwrap();
        let det = m.determinant();
        assert!((det - 1.0).abs() < 1e-6, "det(M) = {}", det);
        let nu = stability_index(&m);
        // Earth-Moon L2 southern halo of this size is strongly unstable
        assert!(nu > 100.0 && nu < 200.0, "stability index {}", nu);
    }
}
