use anyhow::{ensure, Result};
use good_lp::{
    constraint,
    solvers::minilp::{minilp, MiniLpProblem},
    variable, Constraint, Expression, ProblemVariables, ResolutionError,
    Solution, SolverModel, Variable,
};
use itertools::Itertools;
use log::trace;
use std::{
    fs,
    path::{Path, PathBuf},
};

use super::{Backend, Outcome};
use crate::model::{Problem, Sense};

/// Simplex solver written in pure Rust.
///
/// A piecewise-linear cost `f(x)` is replaced by an epigraph variable `t`
/// with one cut `t >= f(x0) + slope * (x - x0)` per segment, which is exact
/// as long as `f` is convex.
#[derive(Debug, Default, Clone, Copy)]
pub struct LpBackend;

pub struct LpModel {
    problem: MiniLpProblem,
    variables: Vec<Variable>,
}

impl Backend for LpBackend {
    type Model = LpModel;

    fn build(&self, problem: &Problem) -> Result<LpModel> {
        let mut vars = ProblemVariables::new();
        let variables = problem
            .variables
            .iter()
            .map(|v| {
                vars.add(
                    variable().name(v.name.clone()).min(v.lower).max(v.upper),
                )
            })
            .collect_vec();
        let mut objective = Expression::default();
        for (v, &var) in problem.variables.iter().zip(&variables) {
            if v.objective != 0.0 {
                objective.add_mul(v.objective, var);
            }
        }

        let mut constraints: Vec<Constraint> = vec![];
        for cost in &problem.pwl_costs {
            ensure!(
                cost.is_convex(),
                "{}: piecewise-linear cost of {} is not convex",
                problem.name,
                problem.variables[cost.variable].name
            );
            let x = variables[cost.variable];
            let segments = cost.segments().collect_vec();
            if segments.is_empty() {
                // constant cost
                continue;
            }
            let t = vars.add(
                variable()
                    .name(format!("t_{}", problem.variables[cost.variable].name)),
            );
            objective.add_mul(1.0, t);
            for ((x0, y0), (x1, y1)) in segments {
                let slope = (y1 - y0) / (x1 - x0);
                let mut cut = Expression::default();
                cut.add_mul(1.0, t);
                cut.add_mul(-slope, x);
                constraints.push(constraint!(cut >= y0 - slope * x0));
            }
        }

        for c in &problem.constraints {
            let mut lhs = Expression::default();
            for &(i, coeff) in &c.terms {
                lhs.add_mul(coeff, variables[i]);
            }
            constraints.push(match c.sense {
                Sense::Equal => constraint!(lhs == c.rhs),
                Sense::LessEqual => constraint!(lhs <= c.rhs),
            });
        }
        trace!(
            "{}: {} variables, {} constraints",
            problem.name,
            variables.len(),
            constraints.len()
        );

        let mut lp = vars.minimise(objective).using(minilp);
        for c in constraints {
            lp.add_constraint(c);
        }
        Ok(LpModel {
            problem: lp,
            variables,
        })
    }

    fn export(
        &self,
        _model: &LpModel,
        problem: &Problem,
        dir: &Path,
    ) -> Result<PathBuf> {
        let path = dir.join(format!("{}.json", problem.name));
        serde_json::to_writer_pretty(fs::File::create(&path)?, problem)?;
        Ok(path)
    }

    fn optimize(&self, problem: &Problem, model: LpModel) -> Result<Outcome> {
        let LpModel {
            problem: lp,
            variables,
        } = model;
        match lp.solve() {
            Ok(solution) => {
                let values =
                    variables.iter().map(|&v| solution.value(v)).collect_vec();
                Ok(Outcome::Optimal {
                    objective: problem.objective_value(&values),
                    values,
                })
            }
            Err(ResolutionError::Infeasible) => Ok(Outcome::Infeasible),
            Err(err) => Err(err.into()),
        }
    }
}
