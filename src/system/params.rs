use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Body constants
// ---------------------------------------------------------------------------

/// A gravitating body and its mean orbit about its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub name: &'static str,
    pub gm: f64,                      // km^3/s^2
    pub sma: f64,                     // mean distance to parent, km
    pub parent: Option<&'static str>, // None for the Sun
}

const fn body(name: &'static str, gm: f64, sma: f64, parent: Option<&'static str>) -> Body {
    Body {
        name,
        gm,
        sma,
        parent,
    }
}

pub const BODIES: &[Body] = &[
    body("sun", 132_712_440_041.939_38, 0.0, None),
    body("mercury", 22_031.868_55, 57_909_050.0, Some("sun")),
    body("venus", 324_858.592, 108_208_000.0, Some("sun")),
    body("earth", 398_600.435_436, 149_598_023.0, Some("sun")),
    body("moon", 4_902.800_066, 384_400.0, Some("earth")),
    body("mars", 42_828.375_214, 227_939_200.0, Some("sun")),
    body("phobos", 7.087_546e-4, 9_376.0, Some("mars")),
    body("jupiter", 126_712_764.8, 778_570_000.0, Some("sun")),
    body("io", 5_959.91, 421_700.0, Some("jupiter")),
    body("europa", 3_202.72, 671_100.0, Some("jupiter")),
    body("ganymede", 9_887.83, 1_070_400.0, Some("jupiter")),
    body("callisto", 7_179.28, 1_882_700.0, Some("jupiter")),
    body("saturn", 37_940_584.841_8, 1_433_530_000.0, Some("sun")),
    body("enceladus", 7.211_45, 238_020.0, Some("saturn")),
    body("titan", 8_978.14, 1_221_870.0, Some("saturn")),
    body("uranus", 5_794_556.4, 2_872_460_000.0, Some("sun")),
    body("neptune", 6_836_527.100_58, 4_495_060_000.0, Some("sun")),
    body("triton", 1_428.495, 354_759.0, Some("neptune")),
];

pub fn find_body(name: &str) -> Option<&'static Body> {
    let name = name.trim().to_ascii_lowercase();
    BODIES.iter().find(|b| b.name == name)
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SystemError {
    #[error("unknown body '{0}'")]
    UnknownBody(String),

    #[error("system name '{0}' must look like 'primary-secondary'")]
    Malformed(String),

    #[error("{secondary} does not orbit {primary}")]
    NotASatellite { primary: String, secondary: String },
}

// ---------------------------------------------------------------------------
// CR3BP system
// ---------------------------------------------------------------------------

/// Mass ratio and characteristic scales of a primary/secondary pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Cr3bpSystem {
    pub name: String,
    pub mu: f64,    // GM2 / (GM1 + GM2)
    pub lstar: f64, // characteristic length, km
    pub tstar: f64, // characteristic time, s
}

impl Cr3bpSystem {
    pub fn from_bodies(primary: &Body, secondary: &Body) -> Self {
        let gm_total = primary.gm + secondary.gm;
        let lstar = secondary.sma;
        Self {
            name: format!("{}-{}", primary.name, secondary.name),
            mu: secondary.gm / gm_total,
            lstar,
            tstar: (lstar.powi(3) / gm_total).sqrt(),
        }
    }

    /// Look up a system by name, e.g. `"earth-moon"` or `"sun-jupiter"`.
    pub fn lookup(name: &str) -> Result<Self, SystemError> {
        let (p, s) = name
            .split_once('-')
            .ok_or_else(|| SystemError::Malformed(name.to_string()))?;
        let primary = find_body(p).ok_or_else(|| SystemError::UnknownBody(p.to_string()))?;
        let secondary = find_body(s).ok_or_else(|| SystemError::UnknownBody(s.to_string()))?;
        if secondary.parent != Some(primary.name) {
            return Err(SystemError::NotASatellite {
                primary: primary.name.to_string(),
                secondary: secondary.name.to_string(),
            });
        }
        Ok(Self::from_bodies(primary, secondary))
    }

    /// A system known only by its mass ratio, in nondimensional units.
    pub fn from_mu(mu: f64) -> Self {
        Self {
            name: format!("mu={}", mu),
            mu,
            lstar: 1.0,
            tstar: 1.0,
        }
    }

    /// False for systems built from a bare mass ratio.
    pub fn has_physical_scales(&self) -> bool {
        !(self.lstar == 1.0 && self.tstar == 1.0)
    }

    pub fn period_to_days(&self, period: f64) -> f64 {
        period * self.tstar / 86_400.0
    }
}

impl fmt::Display for Cr3bpSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (mu = {:.12e}, L* = {:.1} km, T* = {:.1} s)",
            self.name, self.mu, self.lstar, self.tstar
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earth_moon_parameters() {
        let sys = Cr3bpSystem::lookup("earth-moon").unwrap();
        assert!((sys.mu - 0.012150584269542242).abs() < 1e-15, "mu = {}", sys.mu);
        assert_eq!(sys.lstar, 384_400.0);
        let days = sys.tstar * 2.0 * std::f64::consts::PI / 86_400.0;
        assert!((days - 27.3).abs() < 0.1, "sidereal month {} days", days);
        assert!(sys.has_physical_scales());
        assert!(!Cr3bpSystem::from_mu(sys.mu).has_physical_scales());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let a = Cr3bpSystem::lookup("Sun-Earth").unwrap();
        let b = Cr3bpSystem::lookup("sun-earth").unwrap();
        assert_eq!(a, b);
        assert!(a.mu > 3.0e-6 && a.mu < 3.1e-6, "mu = {}", a.mu);
    }

    #[test]
    fn rejects_unknown_and_mismatched_pairs() {
        assert_eq!(
            Cr3bpSystem::lookup("earth-pluto"),
            Err(SystemError::UnknownBody("pluto".into()))
        );
        assert!(matches!(
            Cr3bpSystem::lookup("earth-europa"),
            Err(SystemError::NotASatellite { .. })
        ));
        assert!(matches!(
            Cr3bpSystem::lookup("earthmoon"),
            Err(SystemError::Malformed(_))
        ));
    }
}
