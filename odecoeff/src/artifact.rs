//! Coefficient printer + order-condition/Shu-Osher identity emitter (C8,
//! replaces E2), grounded in `write.c`'s recursive bracket-building for
//! order-condition identities (`rk_print_maxima`) and
//! `optimize_print_random`'s `name:value;` assignment format.

use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use crate::ac::AcCoef;
use crate::catalog::multistep::layout::StepsCoef;
use crate::catalog::rk::layout::RkTb;
use crate::errors::{OdeError, Result};

/// Format one numeric literal the way the downstream computer-algebra
/// engine expects: `{:.19e}` with the exponent marker replaced `e -> b`
/// (the `long double` precision marker used by the downstream algebra engine), a string pass run
/// once per literal at print time rather than a separate file pass.
pub fn format_coefficient(value: f64) -> String {
    let rendered = format!("{value:.19e}");
    rendered.replace('e', "b")
}

fn push_assignment(out: &mut String, name: &str, value: f64) {
    out.push_str(name);
    out.push(':');
    out.push_str(&format_coefficient(value));
    out.push_str(";\n");
}

/// `name:value;` assignment lines plus algebraic identities, written to
/// `path`. Returns `IoOpenFail` if the file cannot be created.
pub fn write_artifact(path: &Path, assignments: &[(String, f64)], identities: &[String]) -> Result<()> {
    let mut file = File::create(path).map_err(|source| OdeError::IoOpenFail {
        path: path.to_path_buf(),
        source,
    })?;
    let mut body = String::new();
    for (name, value) in assignments {
        push_assignment(&mut body, name, *value);
    }
    for identity in identities {
        body.push_str(identity);
        if !identity.ends_with(';') {
            body.push(';');
        }
        body.push('\n');
    }
    file.write_all(body.as_bytes())
        .map_err(|source| OdeError::IoOpenFail {
            path: path.to_path_buf(),
            source,
        })
}

/// Flatten an `RkTb` into `(name, value)` assignment pairs in scheme order:
/// `t_1..t_s`, then each `b_{i,j}`, then `e_{s,j}` if a pair is present.
pub fn rk_assignments(tb: &RkTb) -> Vec<(String, f64)> {
    let mut out = Vec::new();
    for (idx, &t) in tb.t.iter().enumerate() {
        out.push((format!("t_{}", idx + 1), t));
    }
    for (row_idx, row) in tb.b.iter().enumerate() {
        let i = row_idx + 2;
        for (j, &b) in row.iter().enumerate() {
            out.push((format!("b_{i}_{j}"), b));
        }
    }
    if let Some(e) = &tb.e {
        for (j, &v) in e.iter().enumerate() {
            out.push((format!("e_{}_{j}", tb.s), v));
        }
    }
    out
}

/// Row-sum identities (`Σ_j b_{i,j} − t_i`) and the `t_s = 1` identity, each
/// an expression expected to reduce to zero under an external algebra
/// engine, mirroring `rk_print_maxima`'s per-row identity emission.
pub fn rk_identities(tb: &RkTb) -> Vec<String> {
    let mut out = Vec::new();
    for (row_idx, row) in tb.b.iter().enumerate() {
        let i = row_idx + 2;
        let terms: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(j, _)| format!("b_{i}_{j}"))
            .collect();
        out.push(format!("{}-t_{}", terms.join("+"), i));
    }
    out.push(format!("t_{}-1", tb.s));
    out
}

/// `(name, value)` assignment pairs for a Shu-Osher `a-c` decomposition.
pub fn ac_assignments(ac: &AcCoef) -> Vec<(String, f64)> {
    let mut out = Vec::new();
    for (row_idx, row) in ac.a.iter().enumerate() {
        let i = row_idx + 2;
        for (j, &v) in row.iter().enumerate() {
            out.push((format!("a_{i}_{j}"), v));
        }
    }
    for (row_idx, row) in ac.c.iter().enumerate() {
        let i = row_idx + 2;
        for (j, &v) in row.iter().enumerate() {
            out.push((format!("c_{i}_{j}"), v));
        }
    }
    out
}

/// The Shu-Osher consistency identity (`Σ_j a_{i,j} − 1`) per row.
pub fn ac_identities(ac: &AcCoef) -> Vec<String> {
    ac.a
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let i = row_idx + 2;
            let terms: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(j, _)| format!("a_{i}_{j}"))
                .collect();
            format!("{}-1", terms.join("+"))
        })
        .collect()
}

/// `(name, value)` assignment pairs for a multi-step scheme: `a_i`, `c_i`,
/// then the implied `b_i = a_i c_i`.
pub fn multistep_assignments(coef: &StepsCoef) -> Vec<(String, f64)> {
    let mut out = Vec::new();
    for i in 0..coef.k {
        out.push((format!("a_{i}"), coef.a[i]));
    }
    for i in 0..coef.k {
        out.push((format!("c_{i}"), coef.c[i]));
    }
    for i in 0..coef.k {
        out.push((format!("b_{i}"), coef.b(i)));
    }
    out
}

/// Consistency and order-`p` moment identities for a multi-step scheme.
pub fn multistep_identities(coef: &StepsCoef, p: u32) -> Vec<String> {
    let mut out = Vec::new();
    let terms: Vec<String> = (0..coef.k).map(|i| format!("a_{i}")).collect();
    out.push(format!("{}-1", terms.join("+")));

    for q in 1..=p {
        let sum_a: Vec<String> = (0..coef.k)
            .map(|i| {
                if q == 0 {
                    format!("a_{i}")
                } else {
                    format!("{i}^{q}*a_{i}")
                }
            })
            .collect();
        let sum_b: Vec<String> = (0..coef.k)
            .map(|i| {
                if q == 1 {
                    format!("b_{i}")
                } else {
                    format!("{i}^{}*b_{i}", q - 1)
                }
            })
            .collect();
        let expected = if q % 2 == 1 { -1 } else { 1 };
        out.push(format!(
            "{}-{}*({})-({})",
            sum_a.join("+"),
            q,
            sum_b.join("+"),
            expected
        ));
    }
    out
}

/// File naming convention for generated artifacts.
pub fn rk_file_name(steps: u32, order: u32, time_accuracy: bool, pair: bool, strong: bool) -> String {
    format!(
        "rk-{}-{}-{}-{}-{}.mc",
        steps, order, time_accuracy as u8, pair as u8, strong as u8
    )
}

pub fn steps_file_name(steps: u32, order: u32) -> String {
    format!("steps-{}-{}.mc", steps, order)
}
