//! Named layout for multi-step scheme coefficients, replacing the
//! macro-indexed interleaved array of `examples/original_source/steps.h`
//! (`c_i` at position `2i`, `a_i` at `2i+1`) with a typed record. The
//! flattened wire form still interleaves `c`/`a` to match the original
//! data model exactly.

#[derive(Debug, Clone)]
pub struct StepsCoef {
    pub k: usize,
    pub a: Vec<f64>,
    pub c: Vec<f64>,
}

impl StepsCoef {
    pub fn new(k: usize) -> Self {
        StepsCoef {
            k,
            a: vec![0.0; k],
            c: vec![0.0; k],
        }
    }

    /// `b_i = a_i * c_i`.
    pub fn b(&self, i: usize) -> f64 {
        self.a[i] * self.c[i]
    }

    pub fn consistency_holds(&self) -> bool {
        (self.a.iter().sum::<f64>() - 1.0).abs() < 10.0 * crate::linalg::EPSILON
    }

    /// `|Σ i^q a_i − q Σ i^{q-1} b_i − (−1)^q| < 1e-12` for `q = 1..=p`.
    pub fn moment_conditions_hold(&self, p: u32) -> bool {
        (1..=p).all(|q| {
            let sum_a: f64 = self
                .a
                .iter()
                .enumerate()
                .map(|(i, &a_i)| (i as f64).powi(q as i32) * a_i)
                .sum();
            let sum_b: f64 = self
                .a
                .iter()
                .enumerate()
                .map(|(i, &a_i)| {
                    let b_i = a_i * self.c[i];
                    (i as f64).powi(q as i32 - 1) * b_i
                })
                .sum();
            let expected = if q % 2 == 1 { -1.0 } else { 1.0 };
            (sum_a - (q as f64) * sum_b - expected).abs() < 1e-9
        })
    }

    /// Interleaved flattening: position `2i` holds `c_i`, `2i+1` holds
    /// `a_i`, per the original data model.
    pub fn flatten(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(2 * self.k);
        for i in 0..self.k {
            out.push(self.c[i]);
            out.push(self.a[i]);
        }
        out
    }

    pub fn from_flat(k: usize, flat: &[f64]) -> Self {
        let mut c = vec![0.0; k];
        let mut a = vec![0.0; k];
        for i in 0..k {
            c[i] = flat[2 * i];
            a[i] = flat[2 * i + 1];
        }
        StepsCoef { k, a, c }
    }

    pub fn coefficient_count(k: usize) -> usize {
        2 * k
    }
}
