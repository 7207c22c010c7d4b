use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::model::Problem;

#[cfg(feature = "gurobi")]
pub mod gurobi;
pub mod lp;

/// Result of optimizing one model.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Optimal { objective: f64, values: Vec<f64> },
    Infeasible,
}

impl Outcome {
    pub fn objective(&self) -> Option<f64> {
        match self {
            Outcome::Optimal { objective, .. } => Some(*objective),
            Outcome::Infeasible => None,
        }
    }
}

/// An external solver: turns a [`Problem`] into its own model and optimizes
/// it. Errors from inside the solver are passed on unchanged.
pub trait Backend {
    type Model;

    fn build(&self, problem: &Problem) -> Result<Self::Model>;

    /// Persist the model in the solver's own format inside `dir`.
    fn export(
        &self,
        model: &Self::Model,
        problem: &Problem,
        dir: &Path,
    ) -> Result<PathBuf>;

    /// Variable values in the returned outcome follow `problem.variables`.
    fn optimize(&self, problem: &Problem, model: Self::Model)
        -> Result<Outcome>;
}

#[cfg(test)]
mod tests;
