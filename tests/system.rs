use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use rstest::rstest;

use halo_corrector::dynamics::derivatives;
use halo_corrector::orbital::KeplerianElements;
use halo_corrector::system::{
    jacobi_constant, lagrange_points, monodromy, stability_index, Cr3bpSystem,
};
use halo_corrector::{ssdc_periodic_xzplane, CorrectionMode, CorrectorConfig, SynodicState};

fn at_rest(pos: Vector3<f64>) -> SynodicState {
    SynodicState {
        pos,
        vel: Vector3::zeros(),
    }
}

#[rstest]
#[case::earth_moon("earth-moon")]
#[case::sun_earth("sun-earth")]
#[case::sun_jupiter("sun-jupiter")]
#[case::saturn_titan("saturn-titan")]
#[case::mars_phobos("mars-phobos")]
fn libration_points_are_equilibria(#[case] name: &str) {
    let system = Cr3bpSystem::lookup(name).unwrap();
    for (i, p) in lagrange_points(system.mu).iter().enumerate() {
        let d = derivatives(system.mu, &at_rest(*p));
        assert!(
            d.dvel.norm() < 1e-9,
            "{} L{} acceleration {:e}",
            name,
            i + 1,
            d.dvel.norm()
        );
    }
}

#[rstest]
#[case(1e-7)]
#[case(0.012150585)]
#[case(0.1)]
#[case(0.5)]
fn libration_points_are_ordered(#[case] mu: f64) {
    let [l1, l2, l3, l4, l5] = lagrange_points(mu);
    assert!(-mu < l1.x && l1.x < 1.0 - mu);
    assert!(l2.x > 1.0 - mu);
    assert!(l3.x < -mu);
    assert_abs_diff_eq!(l4.y, -l5.y, epsilon = 1e-15);

    // Jacobi constants at rest: C(L1) > C(L2) >= C(L3) > C(L4) = C(L5),
    // with L2 and L3 tied for equal masses
    let c: Vec<f64> = [l1, l2, l3, l4, l5]
        .iter()
        .map(|p| jacobi_constant(mu, &at_rest(*p)))
        .collect();
    assert!(c[0] > c[1] && c[1] + 1e-12 >= c[2] && c[2] > c[3], "{:?}", c);
    assert_abs_diff_eq!(c[3], c[4], epsilon = 1e-12);
}

#[test]
fn corrected_halo_is_unstable_with_unit_determinant() {
    let mu = 1.215058560962404e-2;
    let guess = SynodicState::new(
        1.1540242813087864,
        0.0,
        -0.1384196144071876,
        0.0,
        -0.21493019200956867,
        0.0,
    );
    let res = ssdc_periodic_xzplane(
        mu,
        &guess,
        3.3731,
        &CorrectorConfig::with_mode(CorrectionMode::FixZ),
    )
    .unwrap();

    let m = monodromy(mu, &res.state, res.period).unwrap();
    assert_abs_diff_eq!(m.determinant(), 1.0, epsilon = 1e-6);
    let nu = stability_index(&m);
    assert!(nu > 100.0 && nu < 200.0, "stability index {}", nu);
}

#[rstest]
#[case::equatorial(0.0)]
#[case::polar(std::f64::consts::FRAC_PI_2)]
#[case::retrograde(2.5)]
fn circular_orbit_elements(#[case] inc: f64) {
    let mu = 398_600.435_436;
    let radius = 42_164.0;
    let (pos, vel) = KeplerianElements::circular(radius, inc).to_state_vector_mu(mu);
    let back = KeplerianElements::from_state_vector_mu(&pos, &vel, mu);

    assert_abs_diff_eq!(back.sma, radius, epsilon = 1e-6);
    assert_abs_diff_eq!(back.ecc, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(back.inc, inc, epsilon = 1e-12);
    assert_eq!(back.argp, 0.0);
    assert_eq!(back.true_anom, 0.0);
    let day = back.period_mu(mu).unwrap() / 3600.0;
    assert_abs_diff_eq!(day, 23.93, epsilon = 0.01);
}
