//! The error type shared by every part of the explorer.

use crate::cube::Cube;
use crate::explore::VertexId;
use crate::turn::Face;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while turning, exploring or querying a bandaged cube.
#[derive(Error, Debug)]
pub enum Error {
    /// A face or slice in a move sequence is blocked by the bandaging.
    #[error("Face {face} in move {token} at move number {index} cannot be turned")]
    IllegalTurn {
        /// The blocked face or slice.
        face: Face,
        /// The notation token that asked for it.
        token: String,
        /// 1-based position of the token in the sequence.
        index: usize,
        /// The cube as it was before the failing token.
        state: Cube,
    },

    /// The canonical form of a queried cube is not a vertex of the graph.
    #[error("Shape {0:?} is not a vertex of this graph")]
    UnknownState(Cube),

    /// A vertex id outside the graph.
    #[error("Vertex {0} is not in this graph")]
    UnknownVertex(VertexId),

    /// The two vertices lie in different components.
    #[error("No path from vertex {from} to vertex {to}")]
    NoPath {
        /// Start vertex.
        from: VertexId,
        /// End vertex.
        to: VertexId,
    },

    /// The vertex already satisfies every feature of the chain.
    #[error("Vertex {0} is already in the final layer")]
    FinalLayer(VertexId),

    /// No vertex of the next layer can be reached from the vertex.
    #[error("Vertex {vertex} cannot reach layer {layer:?}")]
    UnreachableLayer {
        /// The queried vertex.
        vertex: VertexId,
        /// Name of the layer it should reach.
        layer: String,
    },

    /// Three or more identical quarter turns in a row have no single-token notation.
    #[error("{repeats} consecutive {face} quarter turns cannot be written as one move")]
    AmbiguousNotation {
        /// The repeated face.
        face: Face,
        /// Length of the run.
        repeats: usize,
    },

    /// The distance table has no row covering the requested vertex.
    #[error("Distance table has no entries for vertex {0}")]
    MissingDistances(VertexId),

    /// A layer table was built for a shorter chain than the one queried.
    #[error("Layer table has no distances to layer {0}")]
    MissingLayer(usize),

    /// A move token could not be parsed.
    #[error("Invalid move {0:?}")]
    ParseMove(String),

    /// A shape could not be parsed.
    #[error("Invalid shape: {0}")]
    ParseShape(String),

    /// A position name could not be parsed.
    #[error("Invalid position name {0:?}")]
    ParsePosition(String),

    /// A puzzle file is not valid TOML for a puzzle.
    #[error("Invalid puzzle file: {0}")]
    Config(#[from] toml::de::Error),

    /// A puzzle file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
