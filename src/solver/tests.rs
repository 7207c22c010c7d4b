use ndarray::Array3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{lp::LpBackend, Backend, Outcome};
use crate::datastructures::InstanceSettings;
use crate::instance_generator::{Breakpoints, Group, Instance};
use crate::model::*;
use crate::test_utils::*;

fn solve(problem: &Problem) -> Outcome {
    let backend = LpBackend;
    let model = backend.build(problem).unwrap();
    backend.optimize(problem, model).unwrap()
}

fn fixed_instance(target: f64, capacity: f64) -> Instance {
    Instance {
        breakpoints: Breakpoints::new(vec![0.0, 1.0, 2.0, 3.0]).unwrap(),
        num_partitions: 2,
        target,
        groups: vec![Group {
            partitions: vec![0, 1],
            capacity,
        }],
        costs: Array3::from_shape_vec(
            (1, 2, 4),
            vec![1.0, 2.0, 4.0, 5.0, 0.5, 3.0, 3.5, 6.0],
        )
        .unwrap(),
    }
}

#[test]
fn test_separate_variables_optimum() {
    // load 3: cheapest segments cost 0.5, 1, 2 (or 3)
    let outcome = solve(&separate_variables_problem(&fixed_instance(1.5, 2.0), 0));
    assert_float_eq(outcome.objective().unwrap(), 3.5);
}

#[test]
fn test_pwl_optimum_matches_separate_variables() {
    let instance = fixed_instance(1.5, 2.0);
    let separate = solve(&separate_variables_problem(&instance, 0));
    let pwl = solve(&pwl_cost_problem(&instance, 0));
    assert_float_eq(pwl.objective().unwrap(), separate.objective().unwrap());
    let Outcome::Optimal { values, .. } = pwl else {
        panic!("pwl model not optimal");
    };
    assert_float_eq(values.iter().sum::<f64>(), 3.0);
}

#[test]
fn test_infeasible_capacity() {
    // total load 3 but the only group may carry 2 * 1.0
    let instance = fixed_instance(1.5, 1.0);
    assert_eq!(
        solve(&separate_variables_problem(&instance, 0)),
        Outcome::Infeasible
    );
    assert_eq!(solve(&pwl_cost_problem(&instance, 0)), Outcome::Infeasible);
}

#[test]
fn test_non_convex_pwl_is_rejected() {
    let problem = Problem {
        name: "concave".to_string(),
        variables: vec![DecisionVariable {
            name: "x".to_string(),
            lower: 0.0,
            upper: 2.0,
            objective: 0.0,
        }],
        pwl_costs: vec![PwlCost {
            variable: 0,
            points: vec![(0.0, 0.0), (1.0, 2.0), (2.0, 3.0)],
        }],
        constraints: vec![],
    };
    assert!(LpBackend.build(&problem).is_err());
}

#[test]
fn test_random_instances_agree() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let settings = InstanceSettings {
        num_replicas: 3,
        num_partitions: 4,
        group_size: 2,
        overlap_size: 1,
        cost_increase_coeff: 1.0,
    };
    let mut compared = 0;
    while compared < 3 {
        let instance = Instance::generate(
            Breakpoints::from_partition_size(10).unwrap(),
            &settings,
            &mut rng,
        )
        .unwrap();
        for replica in 0..instance.num_replicas() {
            let separate = solve(&separate_variables_problem(&instance, replica));
            let pwl = solve(&pwl_cost_problem(&instance, replica));
            match (separate.objective(), pwl.objective()) {
                (Some(a), Some(b)) => {
                    assert_float_eq(b, a);
                    compared += 1;
                }
                (None, None) => {}
                _ => panic!("only one of the models is feasible"),
            }
        }
    }
}

#[test]
fn test_export_writes_json() {
    let problem = pwl_cost_problem(&fixed_instance(1.0, 2.0), 0);
    let model = LpBackend.build(&problem).unwrap();
    let dir = std::env::temp_dir();
    let path = LpBackend.export(&model, &problem, &dir).unwrap();
    assert_eq!(path, dir.join("model_with_pwl_costs_0.json"));
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap())
            .unwrap();
    assert_eq!(written["name"], "model_with_pwl_costs_0");
    assert_eq!(written["variables"].as_array().unwrap().len(), 2);
}
