pub mod coefficients;
pub mod integrator;
pub mod propagator;

pub use integrator::{IntegrationError, OdeSystem, Rkf78, Stats, Tolerances};
pub use propagator::{Cr3bpPropagator, Propagate, PropagationOutput, TrajectoryPoint};
