//! Multi-step objective: tier 1 feasibility over the `a_i` weights (`20 -
//! S` for infeasibility sum `S < 0`), tier 2 `J = 1 / max_i c_i`, mirroring
//! the two-tier shape of the RK objective (`catalog::rk::objective`) but
//! over the multi-step layout. Every feasible draw scores below the `20`
//! floor so the search always prefers feasibility over infeasibility.

use super::layout::StepsCoef;

pub fn evaluate(coef: &StepsCoef) -> f64 {
    let infeasible: f64 = coef.a.iter().map(|&v| v.min(0.0)).sum();
    if infeasible < 0.0 {
        return 20.0 - infeasible;
    }

    let max_c = coef
        .c
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max)
        .max(0.0);
    if max_c <= 0.0 {
        return f64::INFINITY;
    }
    1.0 / max_c
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::solvers;

    #[test]
    fn feasible_scheme_scores_below_feasibility_floor() {
        let coef = solvers::solve(3, 2, &[0.1, -1.0, -2.0]).expect("feasible draw");
        if coef.a.iter().all(|&v| v >= 0.0) {
            assert!(evaluate(&coef) < 20.0);
        }
    }

    #[test]
    fn negative_weight_is_penalized_above_feasibility_floor() {
        let mut coef = StepsCoef::new(3);
        coef.a = vec![1.0, -0.5, 0.5];
        coef.c = vec![0.0, -1.0, -2.0];
        assert!(evaluate(&coef) >= 20.0);
    }
}
