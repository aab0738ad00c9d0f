//! Differential correction of xz-plane symmetric periodic orbits in the
//! circular restricted three-body problem, plus two-body conic elements.
//!
//! ```no_run
//! use halo_corrector::{ssdc_periodic_xzplane, CorrectionMode, CorrectorConfig, SynodicState};
//!
//! let mu = 1.215058560962404e-2;
//! let guess = SynodicState::new(1.154, 0.0, -0.1384, 0.0, -0.2149, 0.0);
//! let config = CorrectorConfig::with_mode(CorrectionMode::FixZ);
//! let result = ssdc_periodic_xzplane(mu, &guess, 3.3731, &config).unwrap();
//! assert!(result.converged);
//! ```

pub mod config;
pub mod correction;
pub mod dynamics;
pub mod io;
pub mod orbital;
pub mod sim;
pub mod system;

pub use correction::{
    ssdc_periodic_xzplane, CorrectionError, CorrectionMode, CorrectionResult, Corrector,
    CorrectorConfig, IterationObserver, IterationState,
};
pub use dynamics::state::SynodicState;
pub use sim::{Cr3bpPropagator, Propagate, Tolerances};
pub use system::Cr3bpSystem;
