//! Butcher tableau of the 13-stage Runge-Kutta-Fehlberg 7(8) pair
//! (Fehlberg 1968, NASA TR R-287, Table X).

pub const STAGES: usize = 13;

/// Nodes c_i: stage i is evaluated at t + c_i h.
pub const C: [f64; STAGES] = [
    0.0,
    2.0 / 27.0,
    1.0 / 9.0,
    1.0 / 6.0,
    5.0 / 12.0,
    0.5,
    5.0 / 6.0,
    1.0 / 6.0,
    2.0 / 3.0,
    1.0 / 3.0,
    1.0,
    0.0,
    1.0,
];

/// Stage matrix a_ij (strictly lower triangular).
#[rustfmt::skip]
pub const A: [[f64; STAGES - 1]; STAGES] = [
    [0.0; 12],
    [2.0/27.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0/36.0, 1.0/12.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0/24.0, 0.0, 1.0/8.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [5.0/12.0, 0.0, -25.0/16.0, 25.0/16.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0/20.0, 0.0, 0.0, 1.0/4.0, 1.0/5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [-25.0/108.0, 0.0, 0.0, 125.0/108.0, -65.0/27.0, 125.0/54.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [31.0/300.0, 0.0, 0.0, 0.0, 61.0/225.0, -2.0/9.0, 13.0/900.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [2.0, 0.0, 0.0, -53.0/6.0, 704.0/45.0, -107.0/9.0, 67.0/90.0, 3.0, 0.0, 0.0, 0.0, 0.0],
    [-91.0/108.0, 0.0, 0.0, 23.0/108.0, -976.0/135.0, 311.0/54.0, -19.0/60.0, 17.0/6.0, -1.0/12.0, 0.0, 0.0, 0.0],
    [2383.0/4100.0, 0.0, 0.0, -341.0/164.0, 4496.0/1025.0, -301.0/82.0, 2133.0/4100.0, 45.0/82.0, 45.0/164.0, 18.0/41.0, 0.0, 0.0],
    [3.0/205.0, 0.0, 0.0, 0.0, 0.0, -6.0/41.0, -3.0/205.0, -3.0/41.0, 3.0/41.0, 6.0/41.0, 0.0, 0.0],
    [-1777.0/4100.0, 0.0, 0.0, -341.0/164.0, 4496.0/1025.0, -289.0/82.0, 2193.0/4100.0, 51.0/82.0, 33.0/164.0, 12.0/41.0, 0.0, 1.0],
];

/// 7th-order weights. Stages 11 and 12 only feed the error estimate.
pub const B: [f64; STAGES] = [
    41.0 / 840.0,
    0.0,
    0.0,
    0.0,
    0.0,
    34.0 / 105.0,
    9.0 / 35.0,
    9.0 / 35.0,
    9.0 / 280.0,
    9.0 / 280.0,
    41.0 / 840.0,
    0.0,
    0.0,
];

/// Difference between the 7th- and 8th-order weights:
/// err = h * 41/840 * (k0 + k10 - k11 - k12).
pub const B_ERR: [f64; STAGES] = [
    41.0 / 840.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    41.0 / 840.0,
    -41.0 / 840.0,
    -41.0 / 840.0,
];

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-14;

    #[test]
    fn rows_sum_to_nodes() {
        for i in 0..STAGES {
            let row_sum: f64 = A[i].iter().sum();
            assert!(
                (row_sum - C[i]).abs() < TOL,
                "row {} sums to {}, node is {}",
                i,
                row_sum,
                C[i]
            );
        }
    }

    #[test]
    fn weights_are_consistent() {
        let b_sum: f64 = B.iter().sum();
        let err_sum: f64 = B_ERR.iter().sum();
        assert!((b_sum - 1.0).abs() < TOL);
        assert!(err_sum.abs() < TOL);
    }

    #[test]
    fn advancing_weights_skip_the_last_two_stages() {
        // The 8th-order set moves 41/840 from stages 0 and 10 onto 11 and 12
        assert_eq!(B[11], 0.0);
        assert_eq!(B[12], 0.0);
        assert_eq!(B[0], 41.0 / 840.0);
        assert_eq!(B[10], 41.0 / 840.0);
        let b8: Vec<f64> = B.iter().zip(B_ERR.iter()).map(|(b, e)| b - e).collect();
        assert_eq!(b8[0], 0.0);
        assert_eq!(b8[10], 0.0);
        assert_eq!(b8[11], 41.0 / 840.0);
        assert_eq!(b8[12], 41.0 / 840.0);
    }
}
