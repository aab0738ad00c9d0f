pub mod elements;

pub use elements::{
    argument_of_periapsis, eccentricity, inclination, period, raan, semi_major_axis,
    true_anomaly, KeplerianElements,
};
