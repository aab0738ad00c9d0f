//! TOML job files describing one correction run.
//!
//! ```toml
//! name = "earth-moon L2 southern halo"
//!
//! [system]
//! name = "earth-moon"        # or: mu = 0.01215058560962404
//!
//! [guess]
//! state = [1.154, 0.0, -0.1384, 0.0, -0.2149, 0.0]
//! period = 3.3731
//!
//! [corrector]
//! mode = "fix-z"
//! tolerance = 1e-11
//! max_iterations = 10
//!
//! [output]
//! csv = "out/l2_halo.csv"
//! json = "out/l2_halo.json"
//! samples = 400
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::correction::batch::CorrectionJob;
use crate::correction::{CorrectionMode, CorrectorConfig, ParseModeError};
use crate::dynamics::state::SynodicState;
use crate::sim::integrator::Tolerances;
use crate::system::{Cr3bpSystem, SystemError};

pub const DEFAULT_SAMPLES: usize = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read job file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    InvalidMode(#[from] ParseModeError),

    #[error("unknown system: {0}")]
    UnknownSystem(#[from] SystemError),

    #[error("[system] needs exactly one of 'name' or 'mu'")]
    SystemSpec,

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// File layout
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    #[serde(default)]
    pub name: Option<String>,
    pub system: SystemSection,
    pub guess: GuessSection,
    #[serde(default)]
    pub corrector: CorrectorSection,
    #[serde(default)]
    pub integrator: IntegratorSection,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SystemSection {
    pub name: Option<String>,
    pub mu: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct GuessSection {
    pub state: [f64; 6], // x, y, z, vx, vy, vz (nondimensional)
    pub period: f64,     // full-period guess (nondimensional)
}

/// Mode is kept as text so an unknown name maps to `InvalidMode`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct CorrectorSection {
    pub mode: Option<String>,
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct IntegratorSection {
    pub atol: Option<f64>,
    pub rtol: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct OutputConfig {
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub samples: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv: None,
            json: None,
            samples: DEFAULT_SAMPLES,
        }
    }
}

// ---------------------------------------------------------------------------
// Validated job
// ---------------------------------------------------------------------------

/// A job file after lookup and validation.
#[derive(Debug, Clone)]
pub struct Job {
    pub name: String,
    pub system: Cr3bpSystem,
    pub state: SynodicState,
    pub period: f64,
    pub corrector: CorrectorConfig,
    pub tolerances: Tolerances,
    pub output: OutputConfig,
}

impl Job {
    pub fn to_correction_job(&self) -> CorrectionJob {
        CorrectionJob {
            name: self.name.clone(),
            mu: self.system.mu,
            state: self.state,
            period: self.period,
            config: self.corrector,
            tolerances: self.tolerances,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

impl SystemSection {
    pub fn resolve(&self) -> Result<Cr3bpSystem, ConfigError> {
        match (&self.name, self.mu) {
            (Some(name), None) => Ok(Cr3bpSystem::lookup(name)?),
            (None, Some(mu)) => {
                if mu.is_nan() || mu <= 0.0 || mu > 0.5 {
                    return Err(invalid("system.mu", format!("{} is outside (0, 0.5]", mu)));
                }
                Ok(Cr3bpSystem::from_mu(mu))
            }
            _ => Err(ConfigError::SystemSpec),
        }
    }
}

impl CorrectorSection {
    pub fn resolve(&self) -> Result<CorrectorConfig, ConfigError> {
        let defaults = CorrectorConfig::default();
        let mode = match &self.mode {
            Some(m) => m.parse::<CorrectionMode>()?,
            None => defaults.mode,
        };
        let tolerance = self.tolerance.unwrap_or(defaults.tolerance);
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(invalid("corrector.tolerance", "must be positive"));
        }
        Ok(CorrectorConfig {
            mode,
            tolerance,
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            verbose: self.verbose.unwrap_or(defaults.verbose),
        })
    }
}

impl IntegratorSection {
    pub fn resolve(&self) -> Result<Tolerances, ConfigError> {
        let defaults = Tolerances::default();
        let tol = Tolerances::new(
            self.atol.unwrap_or(defaults.atol),
            self.rtol.unwrap_or(defaults.rtol),
        );
        if tol.atol.is_nan() || tol.atol <= 0.0 || tol.rtol.is_nan() || tol.rtol < 0.0 {
            return Err(invalid("integrator", "atol must be positive and rtol non-negative"));
        }
        Ok(tol)
    }
}

impl JobFile {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn resolve(&self) -> Result<Job, ConfigError> {
        let system = self.system.resolve()?;
        if self.guess.state.iter().any(|v| !v.is_finite()) {
            return Err(invalid("guess.state", "components must be finite"));
        }
        if !self.guess.period.is_finite() || self.guess.period <= 0.0 {
            return Err(invalid("guess.period", "must be positive"));
        }
        if self.output.samples < 2 {
            return Err(invalid("output.samples", "need at least 2 samples"));
        }

        Ok(Job {
            name: self.name.clone().unwrap_or_else(|| system.name.clone()),
            state: SynodicState::from_array(self.guess.state),
            period: self.guess.period,
            corrector: self.corrector.resolve()?,
            tolerances: self.integrator.resolve()?,
            output: self.output.clone(),
            system,
        })
    }
}

/// Parse and validate a TOML job string.
pub fn parse_job(text: &str) -> Result<Job, ConfigError> {
    JobFile::from_toml(text)?.resolve()
}

/// Load a single job file.
pub fn load_job<P: AsRef<Path>>(path: P) -> Result<Job, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_job(&contents)
}

/// Load one job file, or every `*.toml` in a directory (sorted by name).
pub fn load_jobs<P: AsRef<Path>>(path: P) -> Result<Vec<Job>, ConfigError> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Ok(vec![load_job(path)?]);
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    entries.iter().map(load_job).collect()
}
