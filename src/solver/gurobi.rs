use anyhow::{bail, Context, Result};
use grb::prelude::*;
use std::path::{Path, PathBuf};

use super::{Backend, Outcome};
use crate::model::{Problem, Sense};

/// Gurobi through the `grb` bindings. Piecewise-linear costs are handed to
/// the solver as they are.
///
/// Requires a Gurobi installation (9.0 or higher) and
/// [license](http://www.gurobi.com/downloads/licenses/license-center).
#[derive(Debug, Default, Clone, Copy)]
pub struct GurobiBackend {
    pub log_to_console: bool,
    pub output_flag: bool,
}

pub struct GurobiModel {
    model: Model,
    vars: Vec<Var>,
}

impl Backend for GurobiBackend {
    type Model = GurobiModel;

    fn build(&self, problem: &Problem) -> Result<GurobiModel> {
        let mut model = Model::new(&problem.name)?;
        if !self.log_to_console {
            model.set_param(param::LogToConsole, 0)?;
        }
        if !self.output_flag {
            model.set_param(param::OutputFlag, 0)?;
        }
        let mut vars = Vec::with_capacity(problem.variables.len());
        for v in &problem.variables {
            vars.push(model.add_var(
                &v.name,
                grb::VarType::Continuous,
                v.objective,
                v.lower,
                v.upper,
                std::iter::empty(),
            )?);
        }
        for cost in &problem.pwl_costs {
            model.set_pwl_obj(
                &vars[cost.variable],
                cost.points.iter().copied(),
            )?;
        }
        for c in &problem.constraints {
            let lhs = c
                .terms
                .iter()
                .map(|&(i, coeff)| vars[i] * coeff)
                .grb_sum();
            match c.sense {
                Sense::Equal => model.add_constr(&c.name, c!(lhs == c.rhs))?,
                Sense::LessEqual => {
                    model.add_constr(&c.name, c!(lhs <= c.rhs))?
                }
            };
        }
        model.update()?;
        Ok(GurobiModel { model, vars })
    }

    fn export(
        &self,
        model: &GurobiModel,
        problem: &Problem,
        dir: &Path,
    ) -> Result<PathBuf> {
        let path = dir.join(format!("{}.lp", problem.name));
        model
            .model
            .write(path.to_str().context("model path is not valid utf-8")?)?;
        Ok(path)
    }

    fn optimize(
        &self,
        problem: &Problem,
        model: GurobiModel,
    ) -> Result<Outcome> {
        let GurobiModel { mut model, vars } = model;
        model.optimize()?;
        match model.status()? {
            Status::Optimal => {
                let values = vars
                    .iter()
                    .map(|var| model.get_obj_attr(attr::X, var))
                    .collect::<grb::Result<Vec<f64>>>()?;
                Ok(Outcome::Optimal {
                    objective: model.get_attr(attr::ObjVal)?,
                    values,
                })
            }
            // all variables are bounded
            Status::Infeasible | Status::InfOrUnbd => Ok(Outcome::Infeasible),
            status => bail!("{}: unexpected solver status {status:?}", problem.name),
        }
    }
}
