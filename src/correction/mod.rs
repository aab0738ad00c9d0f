//! Single-shooting differential correction of periodic CR3BP orbits that
//! cross the xz-plane perpendicularly.
//!
//! Only half an orbit is propagated: at T/2 the trajectory must meet the
//! xz-plane with y = 0, vx = 0 and vz = 0, which by the mirror symmetry of
//! the CR3BP closes the full orbit.

pub mod batch;
pub mod mode;
pub mod observer;
pub mod solver;

use log::{info, warn};
use thiserror::Error;

use crate::dynamics::state::SynodicState;
use crate::sim::integrator::{IntegrationError, Tolerances};
use crate::sim::propagator::{Cr3bpPropagator, Propagate};

pub use self::mode::{crossing_residual, CorrectionMode, ParseModeError};
pub use self::observer::{CorrectionWarning, IterationLog, IterationObserver, NoopObserver};
pub use self::solver::{minimum_norm_update, update3, SolverError};

/// |y0| above which the initial guess is reported as off the xz-plane.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CorrectionError {
    #[error("propagation failed: {0}")]
    Propagation(#[from] IntegrationError),

    #[error("update failed: {0}")]
    Solver(#[from] SolverError),
}

// ---------------------------------------------------------------------------
// Configuration and records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectorConfig {
    pub mode: CorrectionMode,
    pub tolerance: f64,    // on |(y_f, vx_f, vz_f)|
    pub max_iterations: usize,
    pub verbose: bool,     // log every iteration at info level
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            mode: CorrectionMode::FixPeriod,
            tolerance: 1e-11,
            max_iterations: 10,
            verbose: false,
        }
    }
}

impl CorrectorConfig {
    pub fn with_mode(mode: CorrectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Snapshot after one corrector step.
///
/// `state` and `half_period` already include the step's update, while
/// `residual_norm` is the crossing residual of the arc propagated from the
/// previous guess.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationState {
    pub state: SynodicState,
    pub half_period: f64,
    pub residual_norm: f64,
    pub iteration: usize,
}

impl IterationState {
    /// Record for the untouched initial guess.
    pub fn initial(state: SynodicState, half_period: f64) -> Self {
        Self {
            state,
            half_period,
            residual_norm: f64::INFINITY,
            iteration: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionResult {
    pub period: f64,
    pub state: SynodicState,
    pub converged: bool,
    pub iterations: usize,
    /// Last pre-update residual; infinite when no iteration ran.
    pub residual_norm: f64,
}

impl CorrectionResult {
    fn from_record(record: &IterationState, converged: bool) -> Self {
        Self {
            period: 2.0 * record.half_period,
            state: record.state,
            converged,
            iterations: record.iteration,
            residual_norm: record.residual_norm,
        }
    }
}

/// True when the state is far enough off the xz-plane to warrant a warning.
pub fn off_symmetry_plane(state: &SynodicState) -> bool {
    state.pos.y.abs() > SYMMETRY_TOLERANCE
}

// ---------------------------------------------------------------------------
// Corrector
// ---------------------------------------------------------------------------

/// Differential corrector driven by any [`Propagate`] implementation.
#[derive(Debug, Clone)]
pub struct Corrector<P = Cr3bpPropagator> {
    propagator: P,
}

impl Corrector<Cr3bpPropagator> {
    /// Corrector on the RKF78 propagator with its default tolerances.
    pub fn rkf78() -> Self {
        Self::new(Cr3bpPropagator::default())
    }

    pub fn with_tolerances(tol: Tolerances) -> Self {
        Self::new(Cr3bpPropagator::new(tol))
    }
}

impl<P: Propagate> Corrector<P> {
    pub fn new(propagator: P) -> Self {
        Self { propagator }
    }

    pub fn propagator(&self) -> &P {
        &self.propagator
    }

    /// One Newton step from `record`, returning the next record.
    pub fn step(
        &self,
        mu: f64,
        mode: CorrectionMode,
        record: &IterationState,
    ) -> Result<IterationState, CorrectionError> {
        let arc = self
            .propagator
            .propagate(mu, &record.state, record.half_period, true)?;
        let stm = arc.stm.ok_or_else(|| {
            IntegrationError::InvalidInput("propagator returned no STM".into())
        })?;

        let xi = mode.extract(&record.state, record.half_period);
        let ferr = crossing_residual(&arc.final_state);
        let df = mode.sensitivity(&stm, &arc.final_derivative);
        let xi_next = update3(&xi, &ferr, &df)?;
        let (state, half_period) = mode.inject(&xi_next, &record.state, record.half_period);

        Ok(IterationState {
            state,
            half_period,
            residual_norm: ferr.norm(),
            iteration: record.iteration + 1,
        })
    }

    pub fn correct(
        &self,
        mu: f64,
        state0: &SynodicState,
        period0: f64,
        config: &CorrectorConfig,
    ) -> Result<CorrectionResult, CorrectionError> {
        self.correct_with(mu, state0, period0, config, &mut NoopObserver)
    }

    /// Iterate until the pre-update residual drops below the tolerance or
    /// the iteration budget runs out.
    ///
    /// The returned state carries the update computed in the converging
    /// iteration. Running out of iterations is not an error.
    pub fn correct_with(
        &self,
        mu: f64,
        state0: &SynodicState,
        period0: f64,
        config: &CorrectorConfig,
        observer: &mut dyn IterationObserver,
    ) -> Result<CorrectionResult, CorrectionError> {
        if off_symmetry_plane(state0) {
            warn!(
                "initial state may not lie on the xz-plane (y0 = {:e})",
                state0.pos.y
            );
            observer.on_warning(&CorrectionWarning::OffSymmetryPlane { y0: state0.pos.y });
        }

        let mut record = IterationState::initial(*state0, period0 / 2.0);
        for _ in 0..config.max_iterations {
            record = self.step(mu, config.mode, &record)?;
            observer.on_iteration(&record);

            if record.residual_norm < config.tolerance {
                if config.verbose {
                    info!(
                        "cleared tolerance at iteration {} with error {:e}",
                        record.iteration, record.residual_norm
                    );
                }
                return Ok(CorrectionResult::from_record(&record, true));
            }
            if config.verbose {
                info!(
                    "iteration {}: error {:e}",
                    record.iteration, record.residual_norm
                );
            }
        }

        if config.max_iterations > 0 {
            warn!(
                "{} did not converge in {} iterations (error {:e})",
                config.mode, config.max_iterations, record.residual_norm
            );
            observer.on_warning(&CorrectionWarning::NotConverged {
                iterations: record.iteration,
                residual_norm: record.residual_norm,
            });
        }
        Ok(CorrectionResult::from_record(&record, false))
    }
}

/// Correct an xz-plane symmetric periodic orbit with the default RKF78
/// propagator (tolerances 1e-12).
pub fn ssdc_periodic_xzplane(
    mu: f64,
    state0: &SynodicState,
    period0: f64,
    config: &CorrectorConfig,
) -> Result<CorrectionResult, CorrectionError> {
    Corrector::rkf78().correct(mu, state0, period0, config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
