use super::IterationState;

/// Non-fatal conditions met during a correction run. Each one is also
/// logged at warn level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorrectionWarning {
    /// |y0| of the initial guess exceeds `SYMMETRY_TOLERANCE`.
    OffSymmetryPlane { y0: f64 },
    /// The iteration budget ran out before the residual cleared tolerance.
    NotConverged { iterations: usize, residual_norm: f64 },
}

/// Receives one record per corrector iteration.
///
/// Implement this to collect convergence histories or drive progress
/// displays without the corrector printing anything itself.
pub trait IterationObserver {
    fn on_iteration(&mut self, record: &IterationState);

    fn on_warning(&mut self, _warning: &CorrectionWarning) {}
}

impl<F> IterationObserver for F
where
    F: FnMut(&IterationState),
{
    fn on_iteration(&mut self, record: &IterationState) {
        self(record)
    }
}

/// Observer that ignores every iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl IterationObserver for NoopObserver {
    fn on_iteration(&mut self, _record: &IterationState) {}
}

/// Observer that keeps every record and warning, in order.
#[derive(Debug, Clone, Default)]
pub struct IterationLog {
    pub records: Vec<IterationState>,
    pub warnings: Vec<CorrectionWarning>,
}

impl IterationLog {
    pub fn residuals(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.residual_norm).collect()
    }
}

impl IterationObserver for IterationLog {
    fn on_iteration(&mut self, record: &IterationState) {
        self.records.push(*record);
    }

    fn on_warning(&mut self, warning: &CorrectionWarning) {
        self.warnings.push(*warning);
    }
}
