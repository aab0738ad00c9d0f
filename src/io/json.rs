use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::{create_file, OutputError};
use crate::correction::{CorrectionMode, CorrectionResult};
use crate::dynamics::state::SynodicState;
use crate::system::{jacobi_constant, Cr3bpSystem};

/// Outcome of one correction run, as written to JSON.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionSummary {
    pub name: String,
    pub system: String,
    pub mu: f64,
    pub mode: CorrectionMode,
    pub converged: bool,
    pub iterations: usize,
    /// None when no iteration ran.
    pub residual_norm: Option<f64>,
    pub initial_state: [f64; 6],
    pub initial_period: f64,
    pub state: [f64; 6],
    pub period: f64,
    /// Only for systems with physical scales.
    pub period_days: Option<f64>,
    pub jacobi: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability_index: Option<f64>,
}

impl CorrectionSummary {
    pub fn new(
        name: &str,
        system: &Cr3bpSystem,
        mode: CorrectionMode,
        initial_state: &SynodicState,
        initial_period: f64,
        result: &CorrectionResult,
    ) -> Self {
        Self {
            name: name.to_string(),
            system: system.name.clone(),
            mu: system.mu,
            mode,
            converged: result.converged,
            iterations: result.iterations,
            residual_norm: result.residual_norm.is_finite().then_some(result.residual_norm),
            initial_state: initial_state.to_array(),
            initial_period,
            state: result.state.to_array(),
            period: result.period,
            period_days: system
                .has_physical_scales()
                .then(|| system.period_to_days(result.period)),
            jacobi: jacobi_constant(system.mu, &result.state),
            stability_index: None,
        }
    }

    pub fn with_stability_index(mut self, nu: f64) -> Self {
        self.stability_index = Some(nu);
        self
    }
}

pub fn write_summary<W: Write, T: Serialize + ?Sized>(writer: W, summary: &T) -> Result<(), OutputError> {
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}

/// Write one summary, or a slice of them, to a JSON file.
pub fn write_summary_file<P: AsRef<Path>, T: Serialize + ?Sized>(
    path: P,
    summary: &T,
) -> Result<(), OutputError> {
    let file = create_file(path.as_ref())?;
    let mut writer = std::io::BufWriter::new(file);
    write_summary(&mut writer, summary)?;
    writer.flush()?;
    Ok(())
}
