//! Stabilizer chains: nested layers of shapes satisfying more and more structural features,
//! and how far each shape is from the next layer.
//!
//! A chain describes a solving method. Every step adds one feature (two cubies fused, a face
//! turnable, ...) and so narrows the set of shapes. If every shape of a layer is a few turns
//! away from the next layer, the method decomposes the puzzle into short, learnable steps.

use crate::cube::{Cube, Position};
use crate::error::{Error, Result};
use crate::explore::{Graph, VertexId};
use crate::path::{path_turns, render_moves, TargetDistances};
use crate::turn::{is_turnable, Face};
use log::debug;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// A structural condition on a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// The two cubies belong to the same block.
    Fused([Position; 2]),
    /// The cubie is not fused to anything.
    Free(Position),
    /// The face can turn.
    Turnable(Face),
}

impl Feature {
    /// Whether |cube| has this feature.
    #[must_use]
    pub fn holds(&self, cube: &Cube) -> bool {
        match *self {
            Feature::Fused([a, b]) => cube.fused(a, b),
            Feature::Free(pos) => cube.is_free(pos),
            Feature::Turnable(face) => is_turnable(face, cube),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Fused([a, b]) => write!(f, "{a}-{b} fused"),
            Feature::Free(pos) => write!(f, "{pos} free"),
            Feature::Turnable(face) => write!(f, "{face} turnable"),
        }
    }
}

type Predicate = Box<dyn Fn(&Cube) -> bool + Send + Sync>;

/// One step of a chain.
struct Step {
    name: String,
    predicate: Predicate,
}

/// An ordered list of predicates, each refining the layer built by the ones before it.
#[derive(Default)]
pub struct Chain {
    steps: Vec<Step>,
}

impl Chain {
    /// An empty chain, whose only layer is the whole graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arbitrary predicate.
    #[must_use]
    pub fn then(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Cube) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.steps.push(Step {
            name: name.into(),
            predicate: Box::new(predicate),
        });
        self
    }

    /// Appends a feature, named after itself.
    #[must_use]
    pub fn feature(self, feature: Feature) -> Self {
        self.then(feature.to_string(), move |cube| feature.holds(cube))
    }

    /// Number of steps. The chain produces one more layer than this.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the chain has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Layer 0 holds every vertex; layer n holds the vertices of layer n - 1 whose shape
    /// satisfies step n.
    #[must_use]
    pub fn layers(&self, graph: &Graph) -> Vec<Layer> {
        let mut layers = vec![Layer::new("all shapes", graph.vertices())];
        for step in &self.steps {
            let previous = &layers[layers.len() - 1];
            let members: HashSet<VertexId> = previous
                .members
                .iter()
                .copied()
                .filter(|&v| graph.state(v).is_some_and(|cube| (step.predicate)(cube)))
                .collect();
            debug!("layer {:?} keeps {} shapes", step.name, members.len());
            layers.push(Layer {
                name: step.name.clone(),
                members,
            });
        }
        layers
    }
}

impl FromIterator<Feature> for Chain {
    fn from_iter<I: IntoIterator<Item = Feature>>(features: I) -> Self {
        features.into_iter().fold(Self::new(), Self::feature)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|step| &step.name))
            .finish()
    }
}

/// A set of vertices sharing a prefix of a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    name: String,
    members: HashSet<VertexId>,
}

impl Layer {
    /// A layer holding |members|.
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = VertexId>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().collect(),
        }
    }

    /// Name of the step that produced the layer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether |v| is in the layer.
    #[must_use]
    pub fn contains(&self, v: VertexId) -> bool {
        self.members.contains(&v)
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the layer has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in ascending order.
    #[must_use]
    pub fn sorted(&self) -> Vec<VertexId> {
        let mut members: Vec<_> = self.members.iter().copied().collect();
        members.sort_unstable();
        members
    }
}

/// How the per-vertex distances of one layer are reduced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Summary {
    /// Only the worst case.
    Max,
    /// How many vertices lie at each distance.
    Tally,
}

/// Distances from one layer to the next, reduced by a [`Summary`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerDistances {
    /// The largest distance, `None` if the layer adds nothing to the one before it.
    Max(Option<u16>),
    /// Number of vertices at each distance.
    Tally(BTreeMap<u16, usize>),
}

/// Distances to every layer of a chain but the first. Built with one search per layer, started
/// from all of its members at once, and only read afterwards.
#[derive(Debug, Clone)]
pub struct LayerTable {
    targets: Vec<TargetDistances>,
}

impl LayerTable {
    /// Searches from each of |layers| except layer 0, in parallel.
    #[must_use]
    pub fn new(graph: &Graph, layers: &[Layer]) -> Self {
        debug!("computing distances to {} layers", layers.len().saturating_sub(1));
        let targets = layers
            .get(1..)
            .unwrap_or_default()
            .par_iter()
            .map(|layer| TargetDistances::new(graph, &layer.sorted()))
            .collect();
        Self { targets }
    }

    /// Distances to layer |n|.
    fn to(&self, n: usize) -> Result<&TargetDistances> {
        n.checked_sub(1)
            .and_then(|i| self.targets.get(i))
            .ok_or(Error::MissingLayer(n))
    }
}

/// For every consecutive pair of |layers|, the distance from each vertex of the first that is
/// missing from the second to the nearest vertex of the second, reduced by |summary|.
///
/// # Errors
///
/// [`Error::UnreachableLayer`] if some vertex cannot reach the next layer, and
/// [`Error::MissingLayer`] if |table| was built for fewer layers.
pub fn layer_distances(
    layers: &[Layer],
    table: &LayerTable,
    summary: Summary,
) -> Result<Vec<LayerDistances>> {
    layers
        .windows(2)
        .enumerate()
        .map(|(n, pair)| {
            let (current, next) = (&pair[0], &pair[1]);
            let targets = table.to(n + 1)?;
            let distances = current
                .sorted()
                .into_par_iter()
                .filter(|&v| !next.contains(v))
                .map(|v| reach(v, next, targets))
                .collect::<Result<Vec<u16>>>()?;
            debug!(
                "{} shapes of {:?} are outside {:?}",
                distances.len(),
                current.name,
                next.name
            );
            Ok(match summary {
                Summary::Max => LayerDistances::Max(distances.into_iter().max()),
                Summary::Tally => {
                    let mut tally = BTreeMap::new();
                    for d in distances {
                        *tally.entry(d).or_insert(0) += 1;
                    }
                    LayerDistances::Tally(tally)
                }
            })
        })
        .collect()
}

/// The distance from |v| to |layer|, read from the search started at its members.
fn reach(v: VertexId, layer: &Layer, targets: &TargetDistances) -> Result<u16> {
    targets
        .distance(v)?
        .ok_or_else(|| Error::UnreachableLayer {
            vertex: v,
            layer: layer.name.clone(),
        })
}

/// Index of the first layer |v| is missing from.
fn next_layer(v: VertexId, layers: &[Layer]) -> Result<usize> {
    match layers.iter().position(|layer| !layer.contains(v)) {
        None => Err(Error::FinalLayer(v)),
        // layer 0 holds every vertex of the graph
        Some(0) => Err(Error::UnknownVertex(v)),
        Some(n) => Ok(n),
    }
}

/// How many turns |v| is from the next layer it does not belong to.
///
/// # Errors
///
/// [`Error::FinalLayer`] if |v| is in every layer, otherwise as [`layer_distances`].
pub fn distance_to_next_layer(v: VertexId, layers: &[Layer], table: &LayerTable) -> Result<u16> {
    let n = next_layer(v, layers)?;
    reach(v, &layers[n], table.to(n)?)
}

/// A shortest move sequence taking |v| into the next layer it does not belong to.
///
/// # Errors
///
/// As [`distance_to_next_layer`].
pub fn path_to_next_layer(
    graph: &Graph,
    v: VertexId,
    layers: &[Layer],
    table: &LayerTable,
) -> Result<String> {
    let n = next_layer(v, layers)?;
    let walk = table.to(n)?.walk(v)?.ok_or_else(|| Error::UnreachableLayer {
        vertex: v,
        layer: layers[n].name.clone(),
    })?;
    render_moves(&path_turns(graph, &walk)?)
}

/// [`path_to_next_layer`] for a shape instead of a vertex id.
///
/// # Errors
///
/// [`Error::UnknownState`] if the shape is not in |graph|, otherwise as
/// [`path_to_next_layer`].
pub fn path_to_next_layer_from(
    graph: &Graph,
    cube: &Cube,
    layers: &[Layer],
    table: &LayerTable,
) -> Result<String> {
    path_to_next_layer(graph, graph.id(cube)?, layers, table)
}

/// The vertex of layer |n| (and not layer n + 1) farthest from layer n + 1, with its distance.
/// Ties go to the smallest vertex id. `None` if there is no such vertex.
///
/// # Errors
///
/// As [`layer_distances`].
pub fn worst_case(
    layers: &[Layer],
    table: &LayerTable,
    n: usize,
) -> Result<Option<(VertexId, u16)>> {
    let (Some(current), Some(next)) = (layers.get(n), layers.get(n + 1)) else {
        return Ok(None);
    };
    let targets = table.to(n + 1)?;
    let mut worst: Option<(VertexId, u16)> = None;
    for v in current.sorted().into_iter().filter(|&v| !next.contains(v)) {
        let d = reach(v, next, targets)?;
        if worst.map_or(true, |(_, worst_d)| d > worst_d) {
            worst = Some((v, d));
        }
    }
    Ok(worst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explore::explore;
    use crate::path::distances_from;
    use crate::turn::{apply_moves, Labeling};

    const BAR: Cube = Cube::new([
        1, 1, 0, 0, 0, 0, 0, 0, 0, //
        2, 2, 2, 2, 2, 2, 2, 2, 2, //
        2, 2, 2, 2, 2, 2, 2, 2, 2,
    ]);

    const CUBE1: Cube = Cube::new([
        1, 1, 0, 1, 1, 0, 0, 0, 0, //
        2, 2, 7, 2, 2, 6, 3, 4, 5, //
        2, 2, 7, 2, 2, 6, 3, 4, 5,
    ]);

    #[test]
    fn test_features() {
        let cube = CUBE1.canonical();
        assert!(Feature::Fused([Position::UBL, Position::U]).holds(&cube));
        assert!(Feature::Fused([Position::F, Position::DF]).holds(&cube));
        assert!(!Feature::Fused([Position::UBL, Position::UBR]).holds(&cube));
        assert!(Feature::Free(Position::UFR).holds(&cube));
        assert!(Feature::Turnable(Face::R).holds(&cube));
        assert!(!Feature::Turnable(Face::L).holds(&cube));
        assert_eq!(
            Feature::Fused([Position::F, Position::DF]).to_string(),
            "F-DF fused"
        );
    }

    #[test]
    fn test_single_layer_has_no_distances() {
        let graph = explore(&CUBE1, Labeling::Canonical);
        let layers = Chain::new().layers(&graph);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].len(), graph.len());
        let table = LayerTable::new(&graph, &layers);
        assert!(layer_distances(&layers, &table, Summary::Max)
            .unwrap()
            .is_empty());
        assert!(matches!(
            distance_to_next_layer(0, &layers, &table),
            Err(Error::FinalLayer(0))
        ));
    }

    #[test_log::test]
    fn test_bar_chain() {
        let graph = explore(&BAR, Labeling::Canonical);
        // the bar back on the left, then the bar back where it started
        let chain = Chain::new()
            .then("bar on the left", |cube| {
                cube.fused(Position::UBL, Position::UB) || cube.fused(Position::UFL, Position::UL)
            })
            .feature(Feature::Fused([Position::UBL, Position::UB]));
        let layers = chain.layers(&graph);
        assert_eq!(layers.iter().map(Layer::len).collect::<Vec<_>>(), vec![4, 2, 1]);
        assert_eq!(layers[2].sorted(), vec![0]);

        let table = LayerTable::new(&graph, &layers);
        assert_eq!(
            layer_distances(&layers, &table, Summary::Max).unwrap(),
            vec![LayerDistances::Max(Some(1)), LayerDistances::Max(Some(1))]
        );
        assert_eq!(
            layer_distances(&layers, &table, Summary::Tally).unwrap(),
            vec![
                LayerDistances::Tally(BTreeMap::from([(1, 2)])),
                LayerDistances::Tally(BTreeMap::from([(1, 1)])),
            ]
        );
        assert_eq!(distance_to_next_layer(1, &layers, &table).unwrap(), 1);
        assert_eq!(path_to_next_layer(&graph, 3, &layers, &table).unwrap(), "U");
        assert_eq!(path_to_next_layer(&graph, 2, &layers, &table).unwrap(), "U");
        assert_eq!(worst_case(&layers, &table, 0).unwrap(), Some((1, 1)));
        assert_eq!(worst_case(&layers, &table, 2).unwrap(), None);
        assert!(matches!(
            path_to_next_layer(&graph, 0, &layers, &table),
            Err(Error::FinalLayer(0))
        ));
    }

    #[test]
    fn test_unreachable_layer() {
        let graph = explore(&BAR, Labeling::Canonical);
        let layers = Chain::new().then("nothing", |_| false).layers(&graph);
        let table = LayerTable::new(&graph, &layers);
        assert!(matches!(
            layer_distances(&layers, &table, Summary::Max),
            Err(Error::UnreachableLayer { .. })
        ));
    }

    #[test]
    fn test_table_for_a_shorter_chain() {
        let graph = explore(&BAR, Labeling::Canonical);
        let chain = Chain::new()
            .feature(Feature::Fused([Position::UBL, Position::UB]))
            .feature(Feature::Turnable(Face::U));
        let layers = chain.layers(&graph);
        let table = LayerTable::new(&graph, &layers[..2]);
        assert!(matches!(
            layer_distances(&layers, &table, Summary::Max),
            Err(Error::MissingLayer(2))
        ));
        assert!(matches!(
            distance_to_next_layer(9, &layers, &table),
            Err(Error::UnknownVertex(9))
        ));
    }

    #[test_log::test]
    fn test_layer_distances_are_nearest_member_distances() {
        let graph = explore(&CUBE1, Labeling::Canonical);
        let layers = Chain::new()
            .feature(Feature::Fused([Position::F, Position::DF]))
            .feature(Feature::Fused([Position::UBL, Position::U]))
            .layers(&graph);
        let table = LayerTable::new(&graph, &layers);
        let step = (graph.len() / 32).max(1);
        for v in graph.vertices().step_by(step) {
            let Ok(d) = distance_to_next_layer(v, &layers, &table) else {
                continue;
            };
            let next = layers.iter().find(|layer| !layer.contains(v)).unwrap();
            let distances = distances_from(&graph, v);
            let nearest = next.sorted().into_iter().filter_map(|t| distances[t]).min();
            assert_eq!(Some(d), nearest);
            let moves = path_to_next_layer(&graph, v, &layers, &table).unwrap();
            let end = apply_moves(graph.state(v).unwrap(), &moves).unwrap();
            assert!(next.contains(graph.id(&end).unwrap()));
        }
    }

    #[test_log::test]
    fn test_path_to_next_layer_lands_in_it() {
        let graph = explore(&CUBE1, Labeling::Canonical);
        let layers: Vec<Layer> = [Feature::Fused([Position::F, Position::DF])]
            .into_iter()
            .collect::<Chain>()
            .layers(&graph);
        assert!(!layers[1].is_empty());
        let table = LayerTable::new(&graph, &layers);
        let (v, d) = worst_case(&layers, &table, 0).unwrap().unwrap();
        assert_eq!(distance_to_next_layer(v, &layers, &table).unwrap(), d);

        let start = *graph.state(v).unwrap();
        let moves = path_to_next_layer_from(&graph, &start, &layers, &table).unwrap();
        let end = apply_moves(&start, &moves).unwrap();
        assert!(end.fused(Position::F, Position::DF));
        assert!(layers[1].contains(graph.id(&end).unwrap()));
    }
}
