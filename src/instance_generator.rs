use anyhow::{ensure, Result};
use itertools::Itertools;
use ndarray::{Array3, ArrayView1};
use rand::Rng;

use crate::datastructures::InstanceSettings;

/// Partition boundaries shared by every cost curve of an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoints(Vec<f64>);

impl Breakpoints {
    pub fn new(values: Vec<f64>) -> Result<Self> {
        ensure!(!values.is_empty(), "partition boundaries are empty");
        ensure!(
            values.iter().tuple_windows().all(|(a, b)| a <= b),
            "partition boundaries are not a non-decreasing sequence: {values:?}"
        );
        Ok(Self(values))
    }

    /// Boundaries `0, 1, ..., size - 1`.
    pub fn from_partition_size(size: usize) -> Result<Self> {
        Self::new((0..size).map(|x| x as f64).collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.0[0]
    }

    pub fn last(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// `(start, end)` of every segment between two adjacent boundaries.
    pub fn segments(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.0.iter().copied().tuple_windows()
    }
}

/// A contiguous run of partitions whose combined load is capped.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub partitions: Vec<usize>,
    pub capacity: f64,
}

/// Randomly generated data shared by both model variants of a sweep point.
#[derive(Debug, Clone)]
pub struct Instance {
    pub breakpoints: Breakpoints,
    pub num_partitions: usize,
    /// Average load per partition the models have to place.
    pub target: f64,
    pub groups: Vec<Group>,
    /// Cumulative costs indexed by `(replica, partition, breakpoint)`.
    pub costs: Array3<f64>,
}

impl Instance {
    /// Draw the target and the group capacities, then the cost curves of
    /// every replica in order.
    pub fn generate<R: Rng>(
        breakpoints: Breakpoints,
        settings: &InstanceSettings,
        rng: &mut R,
    ) -> Result<Self> {
        let mut instance = Self::generate_shared(breakpoints, settings, rng)?;
        for replica in 0..instance.num_replicas() {
            instance.draw_costs(replica, settings.cost_increase_coeff, rng);
        }
        Ok(instance)
    }

    /// Draw the target and the group capacities only. Cost curves stay zero
    /// until [`Instance::draw_costs`] fills them replica by replica.
    pub fn generate_shared<R: Rng>(
        breakpoints: Breakpoints,
        settings: &InstanceSettings,
        rng: &mut R,
    ) -> Result<Self> {
        ensure!(
            settings.group_size > settings.overlap_size,
            "group size ({}) has to exceed the overlap size ({})",
            settings.group_size,
            settings.overlap_size
        );
        let max_boundary = breakpoints.last();
        let target = rng.gen::<f64>() * max_boundary;
        let groups = group_partitions(
            settings.num_partitions,
            settings.group_size,
            settings.overlap_size,
        )
        .into_iter()
        .map(|partitions| Group {
            partitions,
            capacity: rng.gen::<f64>() * max_boundary,
        })
        .collect_vec();

        let costs = Array3::<f64>::zeros((
            settings.num_replicas,
            settings.num_partitions,
            breakpoints.len(),
        ));
        Ok(Self {
            breakpoints,
            num_partitions: settings.num_partitions,
            target,
            groups,
            costs,
        })
    }

    /// Fill the cumulative cost curve of every partition of `replica`.
    pub fn draw_costs<R: Rng>(
        &mut self,
        replica: usize,
        cost_increase_coeff: f64,
        rng: &mut R,
    ) {
        let mut replica_costs =
            self.costs.index_axis_mut(ndarray::Axis(0), replica);
        for mut curve in replica_costs.lanes_mut(ndarray::Axis(1)) {
            let mut total = 0.0;
            for cost in curve.iter_mut() {
                total += cost_increase_coeff * rng.gen::<f64>();
                *cost = total;
            }
        }
    }

    pub fn num_replicas(&self) -> usize {
        self.costs.dim().0
    }

    pub fn cost_curve(
        &self,
        replica: usize,
        partition: usize,
    ) -> ArrayView1<'_, f64> {
        self.costs.slice(ndarray::s![replica, partition, ..])
    }
}

/// Start a group every `group_size - overlap_size` partitions; trailing
/// groups are cut off at the last partition.
pub fn group_partitions(
    num_partitions: usize,
    group_size: usize,
    overlap_size: usize,
) -> Vec<Vec<usize>> {
    (0..num_partitions)
        .step_by(group_size - overlap_size)
        .map(|start| (start..(start + group_size).min(num_partitions)).collect())
        .collect()
}
