//! Whole-graph statistics: how many shapes lie at each depth, and the diameter and center.

use crate::explore::{Graph, VertexId};
use crate::path::distances_from;
use log::debug;
use rayon::prelude::*;

/// Number of vertices at each distance from |from|; entry 0 is the vertex itself.
#[must_use]
pub fn depth_distribution(graph: &Graph, from: VertexId) -> Vec<usize> {
    let mut counts = Vec::new();
    for d in distances_from(graph, from).into_iter().flatten() {
        let d = usize::from(d);
        if counts.len() <= d {
            counts.resize(d + 1, 0);
        }
        counts[d] += 1;
    }
    counts
}

/// The vertices at the largest distance from |from|, ascending.
#[must_use]
pub fn farthest(graph: &Graph, from: VertexId) -> Vec<VertexId> {
    let distances = distances_from(graph, from);
    let max = distances.iter().flatten().max().copied();
    distances
        .iter()
        .enumerate()
        .filter(|(_, &d)| d.is_some() && d == max)
        .map(|(v, _)| v)
        .collect()
}

/// The largest distance from |v| to any vertex it can reach.
#[must_use]
pub fn eccentricity(graph: &Graph, v: VertexId) -> u16 {
    distances_from(graph, v)
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
}

/// Diameter with one antipodal pair, and radius with one center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    /// Largest eccentricity.
    pub max_dist: u16,
    /// A vertex of largest eccentricity.
    pub max_start: VertexId,
    /// A vertex at |max_dist| from |max_start|.
    pub max_end: VertexId,
    /// Smallest eccentricity.
    pub radius: u16,
    /// A vertex of smallest eccentricity.
    pub center: VertexId,
}

impl Stats {
    fn join(&self, mut sum: Self) -> Self {
        if self.max_dist > sum.max_dist
            || (self.max_dist == sum.max_dist && self.max_start < sum.max_start)
        {
            sum.max_dist = self.max_dist;
            sum.max_end = self.max_end;
            sum.max_start = self.max_start;
        }
        if self.radius < sum.radius || (self.radius == sum.radius && self.center < sum.center) {
            sum.radius = self.radius;
            sum.center = self.center;
        }
        sum
    }
}

/// Analyzes a graph and determines its diameter, antipodes and center. Every vertex is
/// searched from, in parallel. Ties go to the smallest vertex ids.
#[must_use]
pub fn analyze(graph: &Graph) -> Option<Stats> {
    debug!("computing eccentricity of {} shapes", graph.len());
    graph
        .vertices()
        .into_par_iter()
        .map(|v| {
            let distances = distances_from(graph, v);
            // first vertex at maximal distance, so results do not depend on scheduling
            let (dest, length) = distances
                .iter()
                .enumerate()
                .filter_map(|(w, d)| d.map(|d| (w, d)))
                .fold((v, 0), |best, (w, d)| if d > best.1 { (w, d) } else { best });
            Stats {
                max_dist: length,
                max_start: v,
                max_end: dest,
                radius: length,
                center: v,
            }
        })
        .reduce_with(|sum, i| i.join(sum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::{Cube, CUBIES};
    use crate::explore::explore;
    use crate::turn::Labeling;

    const BAR: Cube = Cube::new([
        1, 1, 0, 0, 0, 0, 0, 0, 0, //
        2, 2, 2, 2, 2, 2, 2, 2, 2, //
        2, 2, 2, 2, 2, 2, 2, 2, 2,
    ]);

    #[test]
    fn test_depth_distribution() {
        let graph = explore(&BAR, Labeling::Canonical);
        assert_eq!(depth_distribution(&graph, 0), vec![1, 2, 1]);
        assert_eq!(farthest(&graph, 0), vec![2]);
        assert_eq!(farthest(&graph, 1), vec![3]);
        assert_eq!(eccentricity(&graph, 3), 2);
    }

    #[test]
    fn test_analyze() {
        let graph = explore(&BAR, Labeling::Canonical);
        assert_eq!(
            analyze(&graph),
            Some(Stats {
                max_dist: 2,
                max_start: 0,
                max_end: 2,
                radius: 2,
                center: 0,
            })
        );
    }

    #[test]
    fn test_analyze_single_shape() {
        let graph = explore(&Cube::new([0; CUBIES]), Labeling::Canonical);
        let stats = analyze(&graph).unwrap();
        assert_eq!(stats.max_dist, 0);
        assert_eq!(stats.radius, 0);
        assert_eq!(stats.center, 0);
    }
}
