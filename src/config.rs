//! Puzzle definition files.
//!
//! A puzzle is described in TOML:
//!
//! ```toml
//! name = "Bar"
//! shape = [1,1,0, 0,0,0, 0,0,0,  2,2,2, 2,2,2, 2,2,2,  2,2,2, 2,2,2, 2,2,2]
//! labeling = "canonical"
//!
//! [[chain]]
//! fused = ["UBL", "UB"]
//! ```

use crate::cube::Cube;
use crate::error::Result;
use crate::explore::{Explorer, Graph};
use crate::layers::{Chain, Feature};
use crate::turn::Labeling;
use serde::Deserialize;
use std::path::Path;

/// A bandaged puzzle and the solving method to analyze it with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PuzzleConfig {
    /// Display name.
    pub name: String,
    /// The shape exploration starts from.
    pub shape: Cube,
    /// The shape to solve towards, if not |shape|.
    #[serde(default)]
    pub solved: Option<Cube>,
    /// How explored states are labelled.
    #[serde(default)]
    pub labeling: Labeling,
    /// Features of the stabilizer chain, in order.
    #[serde(default)]
    pub chain: Vec<Feature>,
}

impl PuzzleConfig {
    /// Parses a puzzle from TOML text.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Config`] if the text does not describe a puzzle.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a puzzle file.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Io`] if the file cannot be read, otherwise as [`Self::from_toml`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// The target shape.
    #[must_use]
    pub fn solved(&self) -> Cube {
        self.solved.unwrap_or(self.shape)
    }

    /// The stabilizer chain of the puzzle.
    #[must_use]
    pub fn chain(&self) -> Chain {
        self.chain.iter().copied().collect()
    }

    /// Explores the puzzle from its shape.
    #[must_use]
    pub fn explore(&self) -> Graph {
        Explorer::builder()
            .root(self.shape)
            .labeling(self.labeling)
            .build()
            .explore()
    }
}
