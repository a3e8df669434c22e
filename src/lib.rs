#![warn(clippy::all, clippy::pedantic)]
// Run with `cargo clippy --all -- -D warnings`.
#![deny(missing_docs)]
//! Utils for exploring the state graphs of bandaged 3x3x3 cubes.
//!
//! A bandaged cube is a 3x3x3 cube where some cubies are glued into rigid blocks, so a face can
//! only turn when no block straddles its boundary. Starting from one shape, [`explore`] visits
//! every shape reachable by quarter turns and records which turn connects which pair. The graph
//! then answers shortest move sequences ([`shortest_path`]), whole-graph statistics
//! ([`analyze`]) and the cost of each step of a layered solving method ([`layers`]).
//!
//! ```
//! use bandaged_cube_explorer::{explore, shortest_path, Cube, Labeling};
//!
//! let bar: Cube = "1,1,0, 0,0,0, 0,0,0, \
//!                  2,2,2, 2,2,2, 2,2,2, \
//!                  2,2,2, 2,2,2, 2,2,2".parse().unwrap();
//! let graph = explore(&bar, Labeling::Canonical);
//! assert_eq!(graph.len(), 4);
//! assert_eq!(shortest_path(&graph, 0, 2).unwrap(), "U2");
//! ```

pub mod analysis;
pub mod config;
pub mod cube;
pub mod error;
pub mod explore;
pub mod layers;
pub mod path;
pub mod turn;

pub use analysis::{analyze, depth_distribution, farthest, Stats};
pub use config::PuzzleConfig;
pub use cube::{similarity, Cube, FreeCubies, Position};
pub use error::{Error, Result};
pub use explore::{explore, Edge, Explorer, Graph, VertexId};
pub use layers::{Chain, Feature, Layer, LayerDistances, LayerTable, Summary};
pub use path::{shortest_path, shortest_path_between, DistanceTable, TargetDistances};
pub use turn::{apply_moves, is_turnable, turn, Axis, Face, Labeling, Turn, TurnType};
