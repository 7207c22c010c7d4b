use itertools::Itertools;
use serde::Serialize;

use crate::datastructures::ModelVariant;
use crate::instance_generator::Instance;

/// A continuous decision variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionVariable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    /// Linear objective coefficient.
    pub objective: f64,
}

/// Piecewise-linear objective term of a single variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PwlCost {
    pub variable: usize,
    /// `(x, f(x))` pairs with non-decreasing `x`.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    Equal,
    LessEqual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearConstraint {
    pub name: String,
    /// `(variable index, coefficient)`
    pub terms: Vec<(usize, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

/// Solver independent description of a minimization model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    pub name: String,
    pub variables: Vec<DecisionVariable>,
    pub pwl_costs: Vec<PwlCost>,
    pub constraints: Vec<LinearConstraint>,
}

impl Problem {
    fn new(name: String) -> Self {
        Self {
            name,
            variables: vec![],
            pwl_costs: vec![],
            constraints: vec![],
        }
    }

    fn add_variable(&mut self, variable: DecisionVariable) -> usize {
        self.variables.push(variable);
        self.variables.len() - 1
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        let linear: f64 = self
            .variables
            .iter()
            .zip(values)
            .map(|(var, x)| var.objective * x)
            .sum();
        let pwl: f64 = self
            .pwl_costs
            .iter()
            .map(|cost| cost.evaluate(values[cost.variable]))
            .sum();
        linear + pwl
    }
}

impl PwlCost {
    /// Linear interpolation between the points; outside of them the first
    /// and last segment are extended.
    pub fn evaluate(&self, x: f64) -> f64 {
        let segments = self.segments().collect_vec();
        match segments
            .iter()
            .find(|&&(_, (x1, _))| x <= x1)
            .or(segments.last())
        {
            Some(&((x0, y0), (x1, y1))) => y0 + (y1 - y0) / (x1 - x0) * (x - x0),
            None => self.points.first().map_or(0.0, |&(_, y)| y),
        }
    }

    /// Segments with positive width.
    pub fn segments(
        &self,
    ) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        self.points
            .iter()
            .copied()
            .tuple_windows()
            .filter(|&((x0, _), (x1, _))| x1 > x0)
    }

    /// A function that jumps at a repeated breakpoint is not continuous.
    pub fn is_continuous(&self) -> bool {
        self.points
            .iter()
            .copied()
            .tuple_windows()
            .filter(|&((x0, _), (x1, _))| x1 <= x0)
            .all(|((_, y0), (_, y1))| {
                (y1 - y0).abs() <= 1e-9 * y0.abs().max(1.0)
            })
    }

    pub fn is_convex(&self) -> bool {
        self.is_continuous()
            && self
                .segments()
                .map(|((x0, y0), (x1, y1))| (y1 - y0) / (x1 - x0))
                .tuple_windows()
                .all(|(a, b)| a <= b + 1e-9 * a.abs().max(1.0))
    }
}

pub fn build_problem(
    variant: ModelVariant,
    instance: &Instance,
    replica: usize,
) -> Problem {
    match variant {
        ModelVariant::SeparateVariables => {
            separate_variables_problem(instance, replica)
        }
        ModelVariant::PwlCosts => pwl_cost_problem(instance, replica),
    }
}

/// One variable per partition and cost segment, priced with the segment's
/// cumulative cost.
pub fn separate_variables_problem(
    instance: &Instance,
    replica: usize,
) -> Problem {
    let mut problem = Problem::new(
        ModelVariant::SeparateVariables.model_name(replica as u32),
    );
    let partition_vars = (0..instance.num_partitions)
        .map(|partition| {
            let costs = instance.cost_curve(replica, partition);
            instance
                .breakpoints
                .segments()
                .zip(costs.iter())
                .map(|((start, end), &cost)| {
                    problem.add_variable(DecisionVariable {
                        name: format!("X_{replica},{partition},{start},{end}"),
                        lower: 0.0,
                        upper: end - start,
                        objective: cost,
                    })
                })
                .collect_vec()
        })
        .collect_vec();
    add_constraints(&mut problem, instance, &partition_vars);
    problem
}

/// One variable per partition whose cost is a piecewise-linear function of
/// the partition's load.
pub fn pwl_cost_problem(instance: &Instance, replica: usize) -> Problem {
    let mut problem =
        Problem::new(ModelVariant::PwlCosts.model_name(replica as u32));
    let breakpoints = &instance.breakpoints;
    let partition_vars = (0..instance.num_partitions)
        .map(|partition| {
            let var = problem.add_variable(DecisionVariable {
                name: format!("X_{replica},{partition}"),
                lower: breakpoints.first(),
                upper: breakpoints.last(),
                objective: 0.0,
            });
            problem.pwl_costs.push(PwlCost {
                variable: var,
                points: breakpoints
                    .values()
                    .iter()
                    .copied()
                    .zip(total_costs(
                        breakpoints.values(),
                        instance.cost_curve(replica, partition).iter().copied(),
                    ))
                    .collect(),
            });
            vec![var]
        })
        .collect_vec();
    add_constraints(&mut problem, instance, &partition_vars);
    problem
}

/// Cost of filling a partition up to each breakpoint when segment `c` is
/// priced with `unit_costs[c]`.
pub fn total_costs(
    breakpoints: &[f64],
    unit_costs: impl IntoIterator<Item = f64>,
) -> Vec<f64> {
    std::iter::once(0.0)
        .chain(
            breakpoints
                .iter()
                .tuple_windows()
                .zip(unit_costs)
                .map(|((start, end), cost)| cost * (end - start)),
        )
        .scan(0.0, |total, cost| {
            *total += cost;
            Some(*total)
        })
        .collect()
}

fn add_constraints(
    problem: &mut Problem,
    instance: &Instance,
    partition_vars: &[Vec<usize>],
) {
    problem.constraints.push(LinearConstraint {
        name: "total_load".to_string(),
        terms: partition_vars.iter().flatten().map(|&v| (v, 1.0)).collect(),
        sense: Sense::Equal,
        rhs: instance.num_partitions as f64 * instance.target,
    });
    for (i, group) in instance.groups.iter().enumerate() {
        problem.constraints.push(LinearConstraint {
            name: format!("group_capacity_{i}"),
            terms: group
                .partitions
                .iter()
                .flat_map(|&p| &partition_vars[p])
                .map(|&v| (v, 1.0))
                .collect(),
            sense: Sense::LessEqual,
            rhs: group.partitions.len() as f64 * group.capacity,
        });
    }
}
