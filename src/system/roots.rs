/// Brent's bracketing root finder on a scalar function.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Brent {
    pub tol: f64,
    pub max_iter: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BrentError {
    /// f(a) and f(b) have the same sign.
    NotBracketed,
    /// Iteration budget spent; carries the best estimate so far.
    MaxIterations { best: f64 },
}

impl Default for Brent {
    fn default() -> Self {
        Self {
            tol: 1e-14,
            max_iter: 200,
        }
    }
}

impl Brent {
    pub fn find_root<F>(&self, mut f: F, mut a: f64, mut b: f64) -> Result<f64, BrentError>
    where
        F: FnMut(f64) -> f64,
    {
        let mut fa = f(a);
        let mut fb = f(b);
        if fa * fb > 0.0 {
            return Err(BrentError::NotBracketed);
        }
        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }

        let mut c = a;
        let mut fc = fa;
        let mut d = b - a;
        let mut mflag = true;

        for _ in 0..self.max_iter {
            // b is always the best estimate
            if fa.abs() < fb.abs() {
                std::mem::swap(&mut a, &mut b);
                std::mem::swap(&mut fa, &mut fb);
            }
            if fb == 0.0 || (b - a).abs() <= self.tol {
                return Ok(b);
            }

            let s = if fa != fc && fb != fc {
                a * fb * fc / ((fa - fb) * (fa - fc))
                    + b * fa * fc / ((fb - fa) * (fb - fc))
                    + c * fa * fb / ((fc - fa) * (fc - fb))
            } else if fb != fa {
                b - fb * (b - a) / (fb - fa)
            } else {
                0.5 * (a + b)
            };

            let bisect = (s - (3.0 * a + b) / 4.0) * (s - b) > 0.0
                || (mflag && (s - b).abs() >= (b - c).abs() / 2.0)
                || (!mflag && (s - b).abs() >= (c - d).abs() / 2.0)
                || (mflag && (b - c).abs() < self.tol)
                || (!mflag && (c - d).abs() < self.tol);
            let s = if bisect { 0.5 * (a + b) } else { s };
            mflag = bisect;

            let fs = f(s);
            d = c;
            c = b;
            fc = fb;
            if fa * fs < 0.0 {
                b = s;
                fb = fs;
            } else {
                a = s;
                fa = fs;
            }
        }

        Err(BrentError::MaxIterations { best: b })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_sqrt_two() {
        let root = Brent::default().find_root(|x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert!((root - 2f64.sqrt()).abs() < 1e-13, "root = {}", root);
    }

    #[test]
    fn rejects_unbracketed_interval() {
        let err = Brent::default().find_root(|x| x * x + 1.0, -1.0, 1.0).unwrap_err();
        assert_eq!(err, BrentError::NotBracketed);
    }
}
