//! Request-document model and loader (C7), replacing the XML external
//! collaborator with an in-repo TOML model. Grounded on
//! `freddiehaddad-oxidized`'s `serde` + `toml` configuration loading.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::context::VariableSpec;
use crate::errors::{OdeError, Result};

/// The `family = "runge-kutta" | "steps"` root selector (the original's root
/// tag, `Runge-Kutta` or `steps`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    RungeKutta,
    Steps,
}

/// The inner Shu-Osher search parameters for SSP RK requests (the original's
/// `ac` child).
#[derive(Debug, Clone, Deserialize)]
pub struct AcSpec {
    #[serde(default = "default_ac_n_sim")]
    pub nsimulations: u64,
    #[serde(default)]
    pub nclimbings: u32,
    #[serde(default = "default_ac_n_iter")]
    pub niterations: u32,
    #[serde(rename = "convergence-factor", default = "default_ac_convergence")]
    pub convergence_factor: f64,
    #[serde(rename = "climbing-factor", default = "default_ac_climbing")]
    pub climbing_factor: f64,
    #[serde(default)]
    pub variable: Vec<VariableSpec>,
}

fn default_ac_n_sim() -> u64 {
    4
}
fn default_ac_n_iter() -> u32 {
    4
}
fn default_ac_convergence() -> f64 {
    0.5
}
fn default_ac_climbing() -> f64 {
    0.1
}

/// The typed, `serde`-deserializable mirror of the request
/// document attribute table.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub family: Family,
    pub steps: u32,
    pub order: u32,
    #[serde(default)]
    pub strong: bool,
    #[serde(default)]
    pub pair: bool,
    #[serde(rename = "time-accuracy", default)]
    pub time_accuracy: bool,
    pub nsimulations: u64,
    #[serde(default)]
    pub nclimbings: u32,
    pub niterations: u32,
    #[serde(rename = "convergence-factor")]
    pub convergence_factor: f64,
    #[serde(rename = "climbing-factor")]
    pub climbing_factor: f64,
    #[serde(default)]
    pub variable: Vec<VariableSpec>,
    pub ac: Option<AcSpec>,
}

impl Request {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| OdeError::IoOpenFail {
            path: path.to_path_buf(),
            source,
        })?;
        let request: Request =
            toml::from_str(&text).map_err(|source| OdeError::RequestParse {
                path: path.to_path_buf(),
                source,
            })?;
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<()> {
        if self.nsimulations < 1 {
            return Err(OdeError::ConfigBadValue {
                field: "nsimulations",
                reason: "must be >= 1".into(),
            });
        }
        if self.niterations < 1 {
            return Err(OdeError::ConfigBadValue {
                field: "niterations",
                reason: "must be >= 1".into(),
            });
        }
        if self.convergence_factor <= f64::EPSILON {
            return Err(OdeError::ConfigBadValue {
                field: "convergence-factor",
                reason: "must be > epsilon".into(),
            });
        }
        if self.climbing_factor <= f64::EPSILON {
            return Err(OdeError::ConfigBadValue {
                field: "climbing-factor",
                reason: "must be > epsilon".into(),
            });
        }
        if self.family == Family::RungeKutta && self.strong && self.ac.is_none() {
            return Err(OdeError::ConfigMissing { field: "ac" });
        }
        if let Some(ac) = &self.ac {
            let expected = crate::ac::nfree_ac(self.steps as usize);
            if !ac.variable.is_empty() && ac.variable.len() != expected {
                return Err(OdeError::ConfigBadValue {
                    field: "ac.variable",
                    reason: format!("expected {expected} entries, got {}", ac.variable.len()),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_RK: &str = r#"
        family = "runge-kutta"
        steps = 2
        order = 2
        nsimulations = 5
        niterations = 10
        convergence-factor = 0.9
        climbing-factor = 0.1

        [[variable]]
        minimum = 0.0
        interval = 1.0
        type = "random"
    "#;

    #[test]
    fn parses_minimal_rk_request() {
        let request: Request = toml::from_str(MINIMAL_RK).unwrap();
        assert_eq!(request.family, Family::RungeKutta);
        assert_eq!(request.steps, 2);
        assert_eq!(request.variable.len(), 1);
        request.validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_convergence_factor() {
        let mut request: Request = toml::from_str(MINIMAL_RK).unwrap();
        request.convergence_factor = 0.0;
        assert!(matches!(
            request.validate(),
            Err(OdeError::ConfigBadValue { field: "convergence-factor", .. })
        ));
    }

    #[test]
    fn strong_rk_without_ac_table_is_config_missing() {
        let mut request: Request = toml::from_str(MINIMAL_RK).unwrap();
        request.strong = true;
        assert!(matches!(
            request.validate(),
            Err(OdeError::ConfigMissing { field: "ac" })
        ));
    }
}
