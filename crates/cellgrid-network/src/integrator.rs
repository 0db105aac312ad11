//! Classical fourth-order Runge-Kutta with reusable stage buffers.

/// Fixed-step RK4 over a dense state vector.
///
/// Stage buffers are allocated once for a given dimension and reused
/// across steps.
#[derive(Clone, Debug)]
pub(crate) struct Rk4 {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    tmp: Vec<f64>,
}

impl Rk4 {
    pub(crate) fn new(dim: usize) -> Self {
        Self {
            k1: vec![0.0; dim],
            k2: vec![0.0; dim],
            k3: vec![0.0; dim],
            k4: vec![0.0; dim],
            tmp: vec![0.0; dim],
        }
    }

    /// Advance `y` by `h`, clamping each component at `floor`.
    ///
    /// `f(y, dydt)` writes the right-hand side. On a non-finite result
    /// returns the offending index; `y` is then partially updated and must
    /// be discarded by the caller.
    pub(crate) fn step<F>(&mut self, y: &mut [f64], h: f64, floor: f64, f: F) -> Result<(), usize>
    where
        F: Fn(&[f64], &mut [f64]),
    {
        let n = y.len();
        f(y, &mut self.k1);
        for i in 0..n {
            self.tmp[i] = y[i] + 0.5 * h * self.k1[i];
        }
        f(&self.tmp, &mut self.k2);
        for i in 0..n {
            self.tmp[i] = y[i] + 0.5 * h * self.k2[i];
        }
        f(&self.tmp, &mut self.k3);
        for i in 0..n {
            self.tmp[i] = y[i] + h * self.k3[i];
        }
        f(&self.tmp, &mut self.k4);
        for i in 0..n {
            let next = y[i]
                + h / 6.0 * (self.k1[i] + 2.0 * self.k2[i] + 2.0 * self.k3[i] + self.k4[i]);
            // Checked before clamping: NaN.max(floor) is floor.
            if !next.is_finite() {
                return Err(i);
            }
            y[i] = next.max(floor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_decay_fourth_order() {
        let mut rk = Rk4::new(1);
        let mut y = [1.0];
        for _ in 0..100 {
            rk.step(&mut y, 0.01, f64::NEG_INFINITY, |y, d| d[0] = -y[0])
                .unwrap();
        }
        assert!((y[0] - (-1.0f64).exp()).abs() < 1e-10);
    }

    #[test]
    fn clamps_at_floor() {
        let mut rk = Rk4::new(1);
        let mut y = [0.1];
        rk.step(&mut y, 1.0, 0.0, |_, d| d[0] = -5.0).unwrap();
        assert_eq!(y[0], 0.0);
    }

    #[test]
    fn non_finite_reports_index() {
        let mut rk = Rk4::new(2);
        let mut y = [1.0, 1.0];
        let err = rk
            .step(&mut y, 1.0, 0.0, |_, d| {
                d[0] = 0.0;
                d[1] = f64::NAN;
            })
            .unwrap_err();
        assert_eq!(err, 1);
    }
}
