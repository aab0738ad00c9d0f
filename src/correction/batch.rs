use log::debug;
use rayon::prelude::*;

use super::{CorrectionError, CorrectionResult, Corrector, CorrectorConfig};
use crate::dynamics::state::SynodicState;
use crate::sim::integrator::Tolerances;

/// One independent correction problem.
#[derive(Debug, Clone)]
pub struct CorrectionJob {
    pub name: String,
    pub mu: f64,
    pub state: SynodicState,
    pub period: f64,
    pub config: CorrectorConfig,
    /// Integrator tolerances for this job's propagations.
    pub tolerances: Tolerances,
}

/// Outcome of one job, tagged with its name.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub name: String,
    pub result: Result<CorrectionResult, CorrectionError>,
}

/// Correct every job in parallel on its own RKF78 corrector. Output order
/// matches input order.
///
/// Each job owns its working state, so a failure in one does not affect
/// the others.
pub fn correct_all(jobs: &[CorrectionJob]) -> Vec<JobOutcome> {
    jobs.par_iter()
        .map(|job| {
            debug!(
                "correcting {} (atol {:e}, rtol {:e})",
                job.name, job.tolerances.atol, job.tolerances.rtol
            );
            let corrector = Corrector::with_tolerances(job.tolerances);
            JobOutcome {
                name: job.name.clone(),
                result: corrector.correct(job.mu, &job.state, job.period, &job.config),
            }
        })
        .collect()
}
