//! Named coefficient layout for RK schemes, replacing the macro-indexed
//! flat array of `examples/original_source/rk.h` (`t4(x) = x[8]` when no
//! pair, `x[13]` when pair is enabled) with typed, self-describing fields.

/// The `t-b` block of an `s`-stage RK scheme.
#[derive(Debug, Clone)]
pub struct RkTb {
    pub s: usize,
    /// `t[i]` is `t_{i+1}` for `i = 0..s` (`t[0] = t_1 = 0`, always;
    /// `t[s-1] = t_s`, always `1.0`).
    pub t: Vec<f64>,
    /// `b[k]` is the weight row of stage `k+2`: `b[k][j] = b_{k+2, j}` for
    /// `j = 0..=k+1`. `b.len() == s - 1`.
    pub b: Vec<Vec<f64>>,
    /// Embedded pair weights `e_{s,0..s-1}` (order `p-1`), present iff the
    /// scheme variant requests a pair.
    pub e: Option<Vec<f64>>,
}

impl RkTb {
    pub fn new(s: usize) -> Self {
        RkTb {
            s,
            t: vec![0.0; s],
            b: (0..s.saturating_sub(1)).map(|k| vec![0.0; k + 2]).collect(),
            e: None,
        }
    }

    /// `t_i` for 1-indexed stage `i` (`i = 1..=s`).
    pub fn t_i(&self, i: usize) -> f64 {
        self.t[i - 1]
    }

    /// Back-substitute `b_{i,0}` from the row-sum identity
    /// `sum_j b_{i,j} = t_i`, given every other entry of the row already
    /// filled in. The analog of `rk_b_2`..`rk_b_6` in the original.
    pub fn close_row(&mut self, row_idx: usize) {
        let t_i = self.t[row_idx + 1]; // row_idx corresponds to stage row_idx+2
        let rest: f64 = self.b[row_idx][1..].iter().sum();
        self.b[row_idx][0] = crate::linalg::flush(t_i - rest);
    }

    /// `true` if every row satisfies the row-sum identity within `10*eps`
    /// (the row-sum quantified invariant).
    pub fn row_sums_consistent(&self) -> bool {
        self.b.iter().enumerate().all(|(k, row)| {
            let t_i = self.t[k + 1];
            (row.iter().sum::<f64>() - t_i).abs() < 10.0 * crate::linalg::EPSILON
        })
    }

    pub fn final_t_is_one(&self) -> bool {
        (self.t[self.s - 1] - 1.0).abs() < f64::EPSILON
    }

    /// Total coefficient count for this layout (used as `Ctx.size`).
    pub fn coefficient_count(s: usize, pair: bool) -> usize {
        let t_count = s; // t_1..t_s
        let b_count: usize = (2..=s).sum();
        let e_count = if pair { s } else { 0 };
        t_count + b_count + e_count
    }

    /// Flatten to the coefficient vector the optimizer/printer/objective
    /// work with: `t`, then each `b` row concatenated, then `e` if present.
    pub fn flatten(&self) -> Vec<f64> {
        let mut out = self.t.clone();
        for row in &self.b {
            out.extend_from_slice(row);
        }
        if let Some(e) = &self.e {
            out.extend_from_slice(e);
        }
        out
    }

    /// Reconstruct from a flat coefficient vector produced by [`flatten`].
    pub fn from_flat(s: usize, pair: bool, flat: &[f64]) -> Self {
        let mut cursor = 0usize;
        let t = flat[cursor..cursor + s].to_vec();
        cursor += s;
        let mut b = Vec::with_capacity(s.saturating_sub(1));
        for k in 0..s.saturating_sub(1) {
            let len = k + 2;
            b.push(flat[cursor..cursor + len].to_vec());
            cursor += len;
        }
        let e = if pair {
            Some(flat[cursor..cursor + s].to_vec())
        } else {
            None
        };
        RkTb { s, t, b, e }
    }
}
