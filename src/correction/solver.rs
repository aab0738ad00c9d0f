use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("dimension mismatch: {rows}x{cols} sensitivity, {xi} free variables, {ferr} residuals")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        xi: usize,
        ferr: usize,
    },

    #[error("singular sensitivity matrix")]
    Singular,

    #[error("update produced non-finite free variables")]
    NonFinite,
}

/// Newton update of the free variables `xi` that zeroes the linearized
/// residual `ferr + df (xi_new - xi)`.
///
/// * square: xi - df^-1 ferr
/// * more unknowns than equations: minimum-norm step, xi - df^T (df df^T)^-1 ferr
/// * more equations than unknowns: least-squares step, xi - (df^T df)^-1 df^T ferr
pub fn minimum_norm_update(
    xi: &DVector<f64>,
    ferr: &DVector<f64>,
    df: &DMatrix<f64>,
) -> Result<DVector<f64>, SolverError> {
    let (rows, cols) = df.shape();
    if xi.len() != cols || ferr.len() != rows {
        return Err(SolverError::DimensionMismatch {
            rows,
            cols,
            xi: xi.len(),
            ferr: ferr.len(),
        });
    }

    let step = if rows == cols {
        df.clone().lu().solve(ferr).ok_or(SolverError::Singular)?
    } else if rows < cols {
        let gram = df * df.transpose();
        let y = gram.lu().solve(ferr).ok_or(SolverError::Singular)?;
        df.transpose() * y
    } else {
        let normal = df.transpose() * df;
        normal
            .lu()
            .solve(&(df.transpose() * ferr))
            .ok_or(SolverError::Singular)?
    };

    let next = xi - step;
    if next.iter().all(|x| x.is_finite()) {
        Ok(next)
    } else {
        Err(SolverError::NonFinite)
    }
}

/// Square 3x3 update used by the single-shooting corrector.
pub fn update3(
    xi: &Vector3<f64>,
    ferr: &Vector3<f64>,
    df: &Matrix3<f64>,
) -> Result<Vector3<f64>, SolverError> {
    let step = df.lu().solve(ferr).ok_or(SolverError::Singular)?;
    let next = xi - step;
    if next.iter().all(|x| x.is_finite()) {
        Ok(next)
    } else {
        Err(SolverError::NonFinite)
    }
}
