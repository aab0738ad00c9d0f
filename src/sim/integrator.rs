use thiserror::Error;

use super::coefficients::{A, B, B_ERR, C, STAGES};

// ---------------------------------------------------------------------------
// ODE system and tolerances
// ---------------------------------------------------------------------------

/// First-order system dy/dt = f(t, y) of fixed dimension `N`.
pub trait OdeSystem<const N: usize> {
    fn rhs(&self, t: f64, y: &[f64; N], dydt: &mut [f64; N]);
}

/// Mixed error control: a component passes when
/// |err| <= atol + rtol * |y|.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub atol: f64,
    pub rtol: f64,
}

impl Tolerances {
    pub fn new(atol: f64, rtol: f64) -> Self {
        Self { atol, rtol }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::new(1e-12, 1e-12)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("invalid integration input: {0}")]
    InvalidInput(String),

    #[error("non-finite state at t = {t}")]
    NonFiniteState { t: f64 },

    #[error("step size {h:e} fell below the minimum at t = {t}")]
    StepSizeTooSmall { t: f64, h: f64 },

    #[error("exceeded the maximum of {0} integration steps")]
    MaxStepsExceeded(u64),
}

/// Counters for one integration call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub fn_evals: u64,
    pub accepted_steps: u64,
    pub rejected_steps: u64,
}

// ---------------------------------------------------------------------------
// Step-size control
// ---------------------------------------------------------------------------

/// I-controller: h_new = safety * h * err^(-1/8), clamped.
#[derive(Debug, Clone, Copy)]
struct StepController {
    safety: f64,
    min_factor: f64,
    max_factor: f64,
    exponent: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 5.0,
            exponent: 1.0 / 8.0,
        }
    }
}

impl StepController {
    fn factor(&self, error: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }
        (self.safety * error.powf(-self.exponent)).clamp(self.min_factor, self.max_factor)
    }
}

// ---------------------------------------------------------------------------
// Runge-Kutta-Fehlberg 7(8)
// ---------------------------------------------------------------------------

/// Adaptive RKF7(8) integrator. Steps advance with the 7th-order solution;
/// the embedded 8th-order one only sizes the error estimate.
#[derive(Debug, Clone)]
pub struct Rkf78 {
    pub tol: Tolerances,
    pub h_min: f64,
    pub h_max: f64,
    pub max_steps: u64,
    controller: StepController,
}

impl Rkf78 {
    pub fn new(tol: Tolerances) -> Self {
        Self {
            tol,
            h_min: 1e-14,
            h_max: f64::INFINITY,
            max_steps: 1_000_000,
            controller: StepController::default(),
        }
    }

    /// Integrate from `t0` to `tf` (either direction) with first step `h0`.
    ///
    /// Returns the final state and the call's statistics.
    pub fn integrate<S, const N: usize>(
        &self,
        sys: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<([f64; N], Stats), IntegrationError>
    where
        S: OdeSystem<N>,
    {
        let mut stats = Stats::default();
        if t0 == tf {
            return Ok((*y0, stats));
        }
        self.validate(t0, y0, tf, h0)?;

        let direction = (tf - t0).signum();
        let mut t = t0;
        let mut y = *y0;
        let mut h = h0.abs().clamp(self.h_min, self.h_max) * direction;
        let mut k = [[0.0; N]; STAGES];
        let mut steps = 0u64;

        while (tf - t) * direction > self.h_min {
            // Land exactly on tf
            if (t + h - tf) * direction > 0.0 {
                h = tf - t;
            }

            let (y_new, error) = self.attempt(sys, t, &y, h, &mut k);
            stats.fn_evals += STAGES as u64;
            let accepted = error <= 1.0;

            if accepted {
                t += h;
                y = y_new;
                stats.accepted_steps += 1;
                if !y.iter().all(|v| v.is_finite()) {
                    return Err(IntegrationError::NonFiniteState { t });
                }
            } else {
                stats.rejected_steps += 1;
            }

            let h_next = (h.abs() * self.controller.factor(error)).clamp(self.h_min, self.h_max);
            if !accepted && h_next <= self.h_min {
                return Err(IntegrationError::StepSizeTooSmall { t, h: h_next });
            }
            h = h_next * direction;

            steps += 1;
            if steps > self.max_steps {
                return Err(IntegrationError::MaxStepsExceeded(self.max_steps));
            }
        }

        Ok((y, stats))
    }

    /// One trial step: returns the 7th-order state and the scaled error.
    #[allow(clippy::needless_range_loop)]
    fn attempt<S, const N: usize>(
        &self,
        sys: &S,
        t: f64,
        y: &[f64; N],
        h: f64,
        k: &mut [[f64; N]; STAGES],
    ) -> ([f64; N], f64)
    where
        S: OdeSystem<N>,
    {
        let mut y_tmp = [0.0; N];
        sys.rhs(t, y, &mut k[0]);
        for i in 1..STAGES {
            for n in 0..N {
                let mut sum = 0.0;
                for j in 0..i {
                    sum += A[i][j] * k[j][n];
                }
                y_tmp[n] = y[n] + h * sum;
            }
            sys.rhs(t + C[i] * h, &y_tmp, &mut k[i]);
        }

        let mut y7 = [0.0; N];
        let mut max_err: f64 = 0.0;
        for n in 0..N {
            let mut sum = 0.0;
            let mut err = 0.0;
            for i in 0..STAGES {
                sum += B[i] * k[i][n];
                err += B_ERR[i] * k[i][n];
            }
            y7[n] = y[n] + h * sum;
            let scale = self.tol.atol + self.tol.rtol * y7[n].abs();
            max_err = max_err.max((h * err).abs() / scale);
        }
        (y7, max_err)
    }

    fn validate<const N: usize>(
        &self,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<(), IntegrationError> {
        if !t0.is_finite() || !tf.is_finite() || !h0.is_finite() {
            return Err(IntegrationError::InvalidInput(
                "t0, tf and h0 must be finite".into(),
            ));
        }
        if h0 == 0.0 {
            return Err(IntegrationError::InvalidInput("h0 must be non-zero".into()));
        }
        if let Some(i) = y0.iter().position(|v| !v.is_finite()) {
            return Err(IntegrationError::InvalidInput(format!(
                "y0[{}] is not finite",
                i
            )));
        }
        if self.tol.atol.is_nan() || self.tol.atol <= 0.0 || self.tol.rtol.is_nan() || self.tol.rtol < 0.0 {
            return Err(IntegrationError::InvalidInput(
                "atol must be positive and rtol non-negative".into(),
            ));
        }
        Ok(())
    }
}

impl Default for Rkf78 {
    fn default() -> Self {
        Self::new(Tolerances::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
