pub mod jacobi;
pub mod lagrange;
pub mod params;
mod roots;
pub mod stability;

pub use jacobi::jacobi_constant;
pub use lagrange::lagrange_points;
pub use params::{Body, Cr3bpSystem, SystemError};
pub use stability::{monodromy, monodromy_with, stability_index};
