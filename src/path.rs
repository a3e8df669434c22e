//! Shortest move sequences between shapes, and the distance tables they are measured with.

use crate::cube::Cube;
use crate::error::{Error, Result};
use crate::explore::{Graph, VertexId};
use crate::turn::{Turn, TurnType};
use log::debug;
use rayon::prelude::*;
use std::collections::{HashMap, VecDeque};

/// Marks vertices a breadth-first search never reached.
const UNREACHED: u16 = u16::MAX;

/// Unweighted distances from |source| to every vertex. `None` for other components.
#[must_use]
pub fn distances_from(graph: &Graph, source: VertexId) -> Vec<Option<u16>> {
    bfs(graph, &[source])
        .0
        .into_iter()
        .map(|d| (d != UNREACHED).then_some(d))
        .collect()
}

/// Breadth-first search from every vertex of |sources| at once, returning the distance and
/// the predecessor of each vertex. Neighbours are expanded in ascending order.
fn bfs(graph: &Graph, sources: &[VertexId]) -> (Vec<u16>, Vec<Option<VertexId>>) {
    let mut dist = vec![UNREACHED; graph.len()];
    let mut pred = vec![None; graph.len()];
    let mut queue = VecDeque::with_capacity(graph.len());
    for &source in sources {
        if dist[source] == UNREACHED {
            dist[source] = 0;
            queue.push_back(source);
        }
    }
    while let Some(v) = queue.pop_front() {
        for &w in graph.neighbours(v) {
            if dist[w] == UNREACHED {
                dist[w] = dist[v] + 1;
                pred[w] = Some(v);
                queue.push_back(w);
            }
        }
    }
    (dist, pred)
}

/// The vertices of a shortest path from |from| to |to|, both included.
///
/// # Errors
///
/// [`Error::UnknownVertex`] for ids outside the graph, [`Error::NoPath`] if |to| cannot be
/// reached.
pub fn vertex_path(graph: &Graph, from: VertexId, to: VertexId) -> Result<Vec<VertexId>> {
    graph.check(from)?;
    graph.check(to)?;
    // Searching from |to| lets the predecessors be read off in walking order.
    let (_, pred) = bfs(graph, &[to]);
    let mut path = vec![from];
    let mut v = from;
    while v != to {
        v = pred[v].ok_or(Error::NoPath { from, to })?;
        path.push(v);
    }
    Ok(path)
}

/// The move of every step of |path|.
///
/// # Errors
///
/// [`Error::NoPath`] if two consecutive vertices are not adjacent.
pub fn path_turns(graph: &Graph, path: &[VertexId]) -> Result<Vec<Turn>> {
    path.windows(2)
        .map(|step| {
            graph.label(step[0], step[1]).ok_or(Error::NoPath {
                from: step[0],
                to: step[1],
            })
        })
        .collect()
}

/// Writes |turns| in standard notation, merging two identical quarter turns into a half turn.
///
/// # Errors
///
/// [`Error::AmbiguousNotation`] for three or more identical quarter turns in a row, which no
/// single token describes.
pub fn render_moves(turns: &[Turn]) -> Result<String> {
    let mut tokens = Vec::with_capacity(turns.len());
    for run in turns.chunk_by(|a, b| a == b) {
        match (run[0], run.len()) {
            (Turn::Turn(face, TurnType::Forward | TurnType::Backward), 2) => {
                tokens.push(Turn::Turn(face, TurnType::Double).to_string());
            }
            (Turn::Turn(face, TurnType::Forward | TurnType::Backward), repeats) if repeats > 2 => {
                return Err(Error::AmbiguousNotation { face, repeats });
            }
            (turn, _) => tokens.extend(run.iter().map(|_| turn.to_string())),
        }
    }
    Ok(tokens.join(" "))
}

/// A shortest move sequence from vertex |from| to vertex |to|. Empty if they are equal.
///
/// # Errors
///
/// [`Error::UnknownVertex`] or [`Error::NoPath`], see [`vertex_path`].
pub fn shortest_path(graph: &Graph, from: VertexId, to: VertexId) -> Result<String> {
    let path = vertex_path(graph, from, to)?;
    debug!("path from {from} to {to} has {} turns", path.len() - 1);
    render_moves(&path_turns(graph, &path)?)
}

/// A shortest move sequence between two shapes, looked up in |graph|.
///
/// # Errors
///
/// [`Error::UnknownState`] if either shape is not in the graph.
pub fn shortest_path_between(graph: &Graph, from: &Cube, to: &Cube) -> Result<String> {
    shortest_path(graph, graph.id(from)?, graph.id(to)?)
}

/// Distances from a set of source vertices, computed once and then only read.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    rows: HashMap<VertexId, Vec<u16>>,
}

impl DistanceTable {
    /// Distances between every pair of vertices. Memory grows with the square of the graph.
    #[must_use]
    pub fn all_pairs(graph: &Graph) -> Self {
        Self::from_sources(graph, graph.vertices())
    }

    /// Distances from each of |sources| to every vertex, one search per source in parallel.
    #[must_use]
    pub fn from_sources(graph: &Graph, sources: impl IntoIterator<Item = VertexId>) -> Self {
        let sources: Vec<VertexId> = sources
            .into_iter()
            .filter(|&source| source < graph.len())
            .collect();
        debug!("computing distances from {} sources", sources.len());
        let rows = sources
            .into_par_iter()
            .map(|source| (source, bfs(graph, &[source]).0))
            .collect();
        Self { rows }
    }

    /// Whether distances from |v| are stored.
    #[must_use]
    pub fn covers(&self, v: VertexId) -> bool {
        self.rows.contains_key(&v)
    }

    /// Distance between |a| and |b|, read from whichever of their rows is stored. `None` if
    /// they are not connected.
    ///
    /// # Errors
    ///
    /// [`Error::MissingDistances`] if neither vertex is a source of this table.
    pub fn distance(&self, a: VertexId, b: VertexId) -> Result<Option<u16>> {
        let (row, other) = match (self.rows.get(&a), self.rows.get(&b)) {
            (Some(row), _) => (row, b),
            (None, Some(row)) => (row, a),
            (None, None) => return Err(Error::MissingDistances(a)),
        };
        let d = *row.get(other).ok_or(Error::UnknownVertex(other))?;
        Ok((d != UNREACHED).then_some(d))
    }
}

/// Distances from every vertex to the nearest of a set of targets, found by one search started
/// from all of them together.
#[derive(Debug, Clone)]
pub struct TargetDistances {
    dist: Vec<u16>,
    pred: Vec<Option<VertexId>>,
}

impl TargetDistances {
    /// Searches from every vertex of |targets| at once. Ids outside the graph are ignored.
    #[must_use]
    pub fn new(graph: &Graph, targets: &[VertexId]) -> Self {
        let targets: Vec<VertexId> = targets
            .iter()
            .copied()
            .filter(|&t| t < graph.len())
            .collect();
        let (dist, pred) = bfs(graph, &targets);
        Self { dist, pred }
    }

    /// How many turns |v| is from the nearest target. `None` if no target is connected to it.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownVertex`] if |v| is not in the searched graph.
    pub fn distance(&self, v: VertexId) -> Result<Option<u16>> {
        let d = *self.dist.get(v).ok_or(Error::UnknownVertex(v))?;
        Ok((d != UNREACHED).then_some(d))
    }

    /// The vertices of a shortest walk from |v| to its nearest target, both included. `None` if
    /// no target is connected to |v|.
    ///
    /// # Errors
    ///
    /// As [`Self::distance`].
    pub fn walk(&self, v: VertexId) -> Result<Option<Vec<VertexId>>> {
        if self.distance(v)?.is_none() {
            return Ok(None);
        }
        let mut walk = vec![v];
        let mut w = v;
        // targets are the only reached vertices without a predecessor
        while let Some(p) = self.pred[w] {
            walk.push(p);
            w = p;
        }
        Ok(Some(walk))
    }
}
