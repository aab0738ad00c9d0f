use std::f64::consts::PI;

use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Conic element formulas on an inertial two-body state (r, v)
// ---------------------------------------------------------------------------

/// Inclination, rad, from the angular momentum direction.
pub fn inclination(pos: &Vector3<f64>, vel: &Vector3<f64>) -> f64 {
    let h = pos.cross(vel);
    (h.z / h.norm()).clamp(-1.0, 1.0).acos()
}

/// Node vector n = z_hat x h.
pub fn node_vector(pos: &Vector3<f64>, vel: &Vector3<f64>) -> Vector3<f64> {
    Vector3::z().cross(&pos.cross(vel))
}

/// Right ascension of the ascending node, rad, in (-pi, pi].
pub fn raan(pos: &Vector3<f64>, vel: &Vector3<f64>) -> f64 {
    let n = node_vector(pos, vel);
    n.y.atan2(n.x)
}

/// Eccentricity vector e = (v x h)/mu - r/|r|, pointing at periapsis.
pub fn eccentricity(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> Vector3<f64> {
    let h = pos.cross(vel);
    vel.cross(&h) / mu - pos / pos.norm()
}

/// Argument of periapsis, rad, in [0, 2 pi).
///
/// Undefined (NaN) for equatorial or circular orbits.
pub fn argument_of_periapsis(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> f64 {
    let n = node_vector(pos, vel);
    let e = eccentricity(pos, vel, mu);
    let omega = (n.dot(&e) / (n.norm() * e.norm())).clamp(-1.0, 1.0).acos();
    if e.z < 0.0 {
        2.0 * PI - omega
    } else {
        omega
    }
}

/// True anomaly, rad, in (-pi, pi].
pub fn true_anomaly(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> f64 {
    let r = pos.norm();
    let h = pos.cross(vel).norm();
    let vr = vel.dot(pos) / r;
    (h * vr).atan2(h * h / r - mu)
}

/// Semi-major axis h^2 / (mu (1 - e^2)); negative for hyperbolic orbits.
pub fn semi_major_axis(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> f64 {
    let h = pos.cross(vel).norm();
    let e = eccentricity(pos, vel, mu).norm();
    h * h / (mu * (1.0 - e * e))
}

/// Keplerian period, or `None` when the orbit is unbound.
pub fn period(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> Option<f64> {
    let a = semi_major_axis(pos, vel, mu);
    if a < 0.0 {
        None
    } else {
        Some(2.0 * PI * (a.powi(3) / mu).sqrt())
    }
}

// ---------------------------------------------------------------------------
// Element set
// ---------------------------------------------------------------------------

/// Classical Keplerian orbital elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerianElements {
    pub sma: f64,       // semi-major axis, same length unit as mu
    pub ecc: f64,       // eccentricity (0 = circular)
    pub inc: f64,       // inclination, rad
    pub raan: f64,      // right ascension of ascending node, rad
    pub argp: f64,      // argument of periapsis, rad
    pub true_anom: f64, // true anomaly, rad
}

impl KeplerianElements {
    /// Convert to an inertial state vector (position, velocity).
    pub fn to_state_vector_mu(&self, mu: f64) -> (Vector3<f64>, Vector3<f64>) {
        let p = self.sma * (1.0 - self.ecc * self.ecc); // semi-latus rectum
        let (sin_nu, cos_nu) = self.true_anom.sin_cos();
        let r = p / (1.0 + self.ecc * cos_nu);

        // Perifocal frame
        let r_pqw = Vector3::new(r * cos_nu, r * sin_nu, 0.0);
        let sqrt_mu_p = (mu / p).sqrt();
        let v_pqw = Vector3::new(-sqrt_mu_p * sin_nu, sqrt_mu_p * (self.ecc + cos_nu), 0.0);

        let (sin_o, cos_o) = self.raan.sin_cos();
        let (sin_w, cos_w) = self.argp.sin_cos();
        let (sin_i, cos_i) = self.inc.sin_cos();

        let rot = |v: &Vector3<f64>| -> Vector3<f64> {
            Vector3::new(
                (cos_o * cos_w - sin_o * sin_w * cos_i) * v.x
                    + (-cos_o * sin_w - sin_o * cos_w * cos_i) * v.y,
                (sin_o * cos_w + cos_o * sin_w * cos_i) * v.x
                    + (-sin_o * sin_w + cos_o * cos_w * cos_i) * v.y,
                (sin_w * sin_i) * v.x + (cos_w * sin_i) * v.y,
            )
        };

        (rot(&r_pqw), rot(&v_pqw))
    }

    /// Elements of an inertial state vector.
    ///
    /// Angles are wrapped to [0, 2 pi). Where an angle is undefined
    /// (equatorial node line, circular apse line) it is set to zero.
    pub fn from_state_vector_mu(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> Self {
        let e_vec = eccentricity(pos, vel, mu);
        let ecc = e_vec.norm();
        let has_node = node_vector(pos, vel).norm() > 1e-10 * pos.norm() * vel.norm();
        let has_apse = ecc > 1e-10;

        KeplerianElements {
            sma: semi_major_axis(pos, vel, mu),
            ecc,
            inc: inclination(pos, vel),
            raan: if has_node { raan(pos, vel).rem_euclid(2.0 * PI) } else { 0.0 },
            argp: if has_node && has_apse {
                argument_of_periapsis(pos, vel, mu)
            } else {
                0.0
            },
            true_anom: if has_apse {
                true_anomaly(pos, vel, mu).rem_euclid(2.0 * PI)
            } else {
                0.0
            },
        }
    }

    /// Keplerian period, or `None` when unbound.
    pub fn period_mu(&self, mu: f64) -> Option<f64> {
        (self.sma >= 0.0).then(|| 2.0 * PI * (self.sma.powi(3) / mu).sqrt())
    }

    /// Circular orbit of radius `radius` and inclination `inc`.
    pub fn circular(radius: f64, inc: f64) -> Self {
        KeplerianElements {
            sma: radius,
            ecc: 0.0,
            inc,
            raan: 0.0,
            argp: 0.0,
            true_anom: 0.0,
        }
    }
}
