//! Breadth-first construction of the graph of every shape reachable from a root shape.

use crate::cube::Cube;
use crate::error::{Error, Result};
use crate::turn::{is_turnable, turn, Face, Labeling, Turn, TurnType};
use log::{debug, info, trace};
use std::collections::{HashMap, VecDeque};
use std::ops::Range;

/// Dense vertex id, assigned in discovery order. The root is always 0.
pub type VertexId = usize;

/// One quarter turn of |face| leading from |from| to |to|.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Vertex the face was turned on.
    pub from: VertexId,
    /// Vertex the turn produced.
    pub to: VertexId,
    /// The face that was turned clockwise.
    pub face: Face,
}

/// The state-transition graph of a bandaged cube. Read-only once explored.
#[derive(Debug, Clone)]
pub struct Graph {
    states: Vec<Cube>,
    ids: HashMap<Cube, VertexId>,
    edges: Vec<Edge>,
    labels: HashMap<(VertexId, VertexId), Turn>,
    neighbours: Vec<Vec<VertexId>>,
    labeling: Labeling,
}

impl Graph {
    fn new(
        states: Vec<Cube>,
        ids: HashMap<Cube, VertexId>,
        edges: Vec<Edge>,
        labeling: Labeling,
    ) -> Self {
        // Forward labels always win over inverses derived from the opposite direction; among
        // forward labels for the same pair the last one discovered is kept.
        let mut labels = HashMap::with_capacity(2 * edges.len());
        let mut neighbours = vec![Vec::new(); states.len()];
        for edge in &edges {
            labels.insert((edge.from, edge.to), Turn::Turn(edge.face, TurnType::Forward));
            labels
                .entry((edge.to, edge.from))
                .or_insert(Turn::Turn(edge.face, TurnType::Backward));
            if edge.from != edge.to {
                neighbours[edge.from].push(edge.to);
                neighbours[edge.to].push(edge.from);
            }
        }
        for adjacent in &mut neighbours {
            adjacent.sort_unstable();
            adjacent.dedup();
        }

        Self {
            states,
            ids,
            edges,
            labels,
            neighbours,
            labeling,
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false for an explored graph, which contains at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All vertex ids, in the order they were visited.
    #[must_use]
    pub fn vertices(&self) -> Range<VertexId> {
        0..self.states.len()
    }

    /// Every recorded turn, including repeats between the same pair of vertices.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// How the states of this graph are labelled.
    #[must_use]
    pub fn labeling(&self) -> Labeling {
        self.labeling
    }

    /// The shape of vertex |id|.
    #[must_use]
    pub fn state(&self, id: VertexId) -> Option<&Cube> {
        self.states.get(id)
    }

    /// All shapes, indexed by vertex id.
    #[must_use]
    pub fn states(&self) -> &[Cube] {
        &self.states
    }

    /// The vertex of |cube|. Canonical graphs canonicalize the query first.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownState`] if the shape is not in the graph.
    pub fn id(&self, cube: &Cube) -> Result<VertexId> {
        let key = match self.labeling {
            Labeling::Canonical => cube.canonical(),
            Labeling::Raw => *cube,
        };
        self.ids.get(&key).copied().ok_or(Error::UnknownState(key))
    }

    /// Fails with [`Error::UnknownVertex`] unless |id| is a vertex.
    pub(crate) fn check(&self, id: VertexId) -> Result<VertexId> {
        if id < self.len() {
            Ok(id)
        } else {
            Err(Error::UnknownVertex(id))
        }
    }

    /// The move leading from |from| to |to|, if they are adjacent. The reverse direction of a
    /// recorded turn reads as that face's inverse.
    #[must_use]
    pub fn label(&self, from: VertexId, to: VertexId) -> Option<Turn> {
        self.labels.get(&(from, to)).copied()
    }

    /// Distinct vertices one quarter turn away from |id|, ascending.
    #[must_use]
    pub fn neighbours(&self, id: VertexId) -> &[VertexId] {
        self.neighbours.get(id).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct shapes one quarter turn away from |id|.
    #[must_use]
    pub fn degree(&self, id: VertexId) -> usize {
        self.neighbours(id).len()
    }
}

/// A struct for holding data during BFS
#[derive(typed_builder::TypedBuilder)]
struct Node {
    /// The vertex to expand.
    id: VertexId,

    /// The depth from the start of the BFS
    #[builder(default = 0)]
    depth: u16,
}

/// Everything the BFS mutates: the queue, the state/id bijection and so the next free id.
#[derive(Default)]
struct Frontier {
    queue: VecDeque<Node>,
    states: Vec<Cube>,
    ids: HashMap<Cube, VertexId>,
}

impl Frontier {
    /// Returns the id of |cube|, queueing it at |depth| if it has not been seen before.
    fn discover(&mut self, cube: Cube, depth: u16) -> VertexId {
        if let Some(&id) = self.ids.get(&cube) {
            return id;
        }
        let id = self.states.len();
        trace!("discovered vertex {id} at depth {depth}");
        self.states.push(cube);
        self.ids.insert(cube, id);
        self.queue
            .push_back(Node::builder().id(id).depth(depth).build());
        id
    }
}

/// Settings for one exploration.
#[derive(typed_builder::TypedBuilder, Debug, Clone)]
pub struct Explorer {
    /// The shape to start from. It need not be canonical.
    root: Cube,

    /// Canonical states, or raw states that keep block ids attached to blocks.
    #[builder(default)]
    labeling: Labeling,

    /// The faces turned at every vertex.
    #[builder(default = Face::PRIMARY.to_vec())]
    faces: Vec<Face>,
}

impl Explorer {
    /// Builds the full graph of shapes reachable from the root by quarter turns.
    #[must_use]
    pub fn explore(&self) -> Graph {
        // Raw exploration starts from the canonical numbering too, so every block has its own id.
        let root = self.root.canonical();
        let mut frontier = Frontier::default();
        frontier.discover(root, 0);

        let mut edges = Vec::new();
        let mut depth = 0;
        while let Some(Node { id, depth: node_depth }) = frontier.queue.pop_front() {
            if node_depth > depth {
                depth = node_depth;
                debug!(
                    "depth {depth}: {} shapes discovered, {} queued",
                    frontier.states.len(),
                    frontier.queue.len() + 1
                );
            }
            let cube = frontier.states[id];
            for &face in self.faces.iter().filter(|&&face| is_turnable(face, &cube)) {
                let to = frontier.discover(turn(face, &cube, self.labeling), node_depth + 1);
                edges.push(Edge { from: id, to, face });
            }
        }

        info!(
            "explored {} shapes and {} turns ({:?} labels)",
            frontier.states.len(),
            edges.len(),
            self.labeling
        );
        Graph::new(frontier.states, frontier.ids, edges, self.labeling)
    }
}

/// Builds the graph reachable from |root|, see [`Explorer`].
#[must_use]
pub fn explore(root: &Cube, labeling: Labeling) -> Graph {
    Explorer::builder()
        .root(*root)
        .labeling(labeling)
        .build()
        .explore()
}
