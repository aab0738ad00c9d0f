use nalgebra::Vector3;

use super::roots::{Brent, BrentError};

/// Offset from each primary when bracketing the collinear points.
const BRACKET_EPS: f64 = 1e-10;

/// x-axis equilibrium condition dU/dx = 0 restricted to y = z = 0.
fn collinear_condition(mu: f64, x: f64) -> f64 {
    let d1 = x + mu;
    let d2 = x - 1.0 + mu;
    x - (1.0 - mu) * d1 / d1.abs().powi(3) - mu * d2 / d2.abs().powi(3)
}

fn collinear_root(mu: f64, a: f64, b: f64) -> f64 {
    match Brent::default().find_root(|x| collinear_condition(mu, x), a, b) {
        Ok(x) => x,
        Err(BrentError::MaxIterations { best }) => best,
        Err(BrentError::NotBracketed) => f64::NAN,
    }
}

/// The five libration points L1..L5 in the rotating frame.
///
/// L1 lies between the primaries, L2 beyond the secondary and L3 beyond the
/// primary. Collinear coordinates are NaN when mu is outside (0, 0.5].
pub fn lagrange_points(mu: f64) -> [Vector3<f64>; 5] {
    let x1 = collinear_root(mu, -mu + BRACKET_EPS, 1.0 - mu - BRACKET_EPS);
    let x2 = collinear_root(mu, 1.0 - mu + BRACKET_EPS, 2.0);
    let x3 = collinear_root(mu, -2.0, -mu - BRACKET_EPS);
    let h = 3f64.sqrt() / 2.0;

    [
        Vector3::new(x1, 0.0, 0.0),
        Vector3::new(x2, 0.0, 0.0),
        Vector3::new(x3, 0.0, 0.0),
        Vector3::new(0.5 - mu, h, 0.0),
        Vector3::new(0.5 - mu, -h, 0.0),
    ]
}
