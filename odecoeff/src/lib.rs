//! Parallel stochastic search for Runge-Kutta and linear multi-step
//! coefficient schemes.

pub mod ac;
pub mod artifact;
pub mod catalog;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod driver;
pub mod errors;
pub mod linalg;
pub mod optimizer;
pub mod rng;

pub use config::Request;
pub use driver::{run, RunReport};
pub use errors::{OdeError, Result};
