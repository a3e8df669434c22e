//! The bandage shape of a 3x3x3 cube.
//!
//! A shape is 27 block ids, one per cubie position, listed layer by layer from
//! the top, each layer read back-to-front and left-to-right. Cubies sharing a
//! non-zero id are fused into one rigid block; a zero marks a free cubie.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Number of cubie positions on the cube.
pub const CUBIES: usize = 27;

/// Identifier of a block. Zero means "free cubie" in shape definitions.
pub type BlockId = u8;

/// What to do with zero (free) entries when canonicalizing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FreeCubies {
    /// Each zero becomes its own singleton block.
    #[default]
    Fill,
    /// Zeros stay zero and take no part in renumbering.
    Keep,
}

/// A bandage shape: one block id per cubie position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Deserialize)]
#[serde(try_from = "Vec<BlockId>")]
pub struct Cube([BlockId; CUBIES]);

impl Cube {
    /// Wraps raw block ids without renumbering them.
    #[must_use]
    pub const fn new(blocks: [BlockId; CUBIES]) -> Self {
        Self(blocks)
    }

    /// The raw block ids.
    #[must_use]
    pub const fn blocks(&self) -> &[BlockId; CUBIES] {
        &self.0
    }

    /// Block id at |pos|.
    #[must_use]
    pub const fn get(&self, pos: Position) -> BlockId {
        self.0[pos.index()]
    }

    /// The canonical form of this shape, with every free cubie made a singleton block.
    #[must_use]
    pub fn canonical(&self) -> Self {
        self.canonicalize(FreeCubies::Fill)
    }

    /// Renumbers blocks in reading order: the first id seen becomes 1, the next new one 2,
    /// and so on. Two shapes inducing the same partition of positions canonicalize equally.
    #[must_use]
    pub fn canonicalize(&self, free: FreeCubies) -> Self {
        let mut mapping = [0 as BlockId; 256];
        let mut next: BlockId = 1;
        let mut out = [0; CUBIES];
        for (slot, &id) in out.iter_mut().zip(self.0.iter()) {
            *slot = match (id, free) {
                (0, FreeCubies::Keep) => 0,
                (0, FreeCubies::Fill) => {
                    let fresh = next;
                    next += 1;
                    fresh
                }
                (id, _) => {
                    if mapping[id as usize] == 0 {
                        mapping[id as usize] = next;
                        next += 1;
                    }
                    mapping[id as usize]
                }
            };
        }
        Self(out)
    }

    /// Whether the ids are already in canonical reading order with no free cubies.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        *self == self.canonical()
    }

    /// Number of distinct blocks, counting every free cubie as its own block.
    #[must_use]
    pub fn block_count(&self) -> usize {
        let canonical = self.canonical();
        canonical.0.iter().copied().max().map_or(0, usize::from)
    }

    /// Number of cubies in each block of the canonical form, indexed by block id - 1.
    #[must_use]
    pub fn block_sizes(&self) -> Vec<usize> {
        let canonical = self.canonical();
        let mut sizes = vec![0; self.block_count()];
        for &id in &canonical.0 {
            sizes[id as usize - 1] += 1;
        }
        sizes
    }

    /// Whether the cubies at |a| and |b| belong to the same block.
    #[must_use]
    pub fn fused(&self, a: Position, b: Position) -> bool {
        let id = self.get(a);
        a == b || (id != 0 && id == self.get(b))
    }

    /// Whether the cubie at |pos| is not fused to anything.
    #[must_use]
    pub fn is_free(&self, pos: Position) -> bool {
        let id = self.get(pos);
        id == 0 || self.0.iter().filter(|&&other| other == id).count() == 1
    }

    /// For every position, whether the cubie is fused to its right, left, front, back, down
    /// and up neighbour, in that order.
    #[must_use]
    pub fn bonds(&self) -> [[bool; 6]; CUBIES] {
        let mut bonds = [[false; 6]; CUBIES];
        for (i, bond) in bonds.iter_mut().enumerate() {
            let fused = |j: usize| self.0[i] != 0 && self.0[i] == self.0[j];
            *bond = [
                i % 3 < 2 && fused(i + 1),
                i % 3 > 0 && fused(i - 1),
                i % 9 < 6 && fused(i + 3),
                i % 9 > 2 && fused(i - 3),
                i < 18 && fused(i + 9),
                i > 8 && fused(i - 9),
            ];
        }
        bonds
    }
}

/// Agreement of the bond vectors of two shapes, rescaled so that 1.0 means identical.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &Cube, b: &Cube) -> f64 {
    let agreements = a
        .bonds()
        .iter()
        .flatten()
        .zip(b.bonds().iter().flatten())
        .filter(|(x, y)| x == y)
        .count();
    (agreements as f64 - 54.0) / (162.0 - 54.0)
}

impl TryFrom<Vec<BlockId>> for Cube {
    type Error = Error;

    fn try_from(blocks: Vec<BlockId>) -> Result<Self> {
        let len = blocks.len();
        <[BlockId; CUBIES]>::try_from(blocks)
            .map(Self)
            .map_err(|_| Error::ParseShape(format!("expected {CUBIES} block ids, got {len}")))
    }
}

impl FromStr for Cube {
    type Err = Error;

    /// Accepts ids separated by commas, dots or whitespace.
    fn from_str(s: &str) -> Result<Self> {
        s.split(|c: char| c == ',' || c == '.' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<BlockId>()
                    .map_err(|_| Error::ParseShape(format!("{token:?} is not a block id")))
            })
            .collect::<Result<Vec<_>>>()
            .and_then(Self::try_from)
    }
}

impl fmt::Display for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (layer, cubies) in self.0.chunks(9).enumerate() {
            if layer > 0 {
                writeln!(f)?;
            }
            for row in cubies.chunks(3) {
                writeln!(f, "{:>3}{:>3}{:>3}", row[0], row[1], row[2])?;
            }
        }
        Ok(())
    }
}

//////////////////////
// Cubie positions //
//////////////////////

const NAMES: [&str; CUBIES] = [
    "UBL", "UB", "UBR", "UL", "U", "UR", "UFL", "UF", "UFR", //
    "BL", "B", "BR", "L", "C", "R", "FL", "F", "FR", //
    "DBL", "DB", "DBR", "DL", "D", "DR", "DFL", "DF", "DFR",
];

/// One of the 27 cubie positions, named by the faces it touches.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Deserialize)]
#[serde(try_from = "String")]
pub struct Position(u8);

#[allow(missing_docs)]
impl Position {
    pub const UBL: Self = Self(0);
    pub const UB: Self = Self(1);
    pub const UBR: Self = Self(2);
    pub const UL: Self = Self(3);
    pub const U: Self = Self(4);
    pub const UR: Self = Self(5);
    pub const UFL: Self = Self(6);
    pub const UF: Self = Self(7);
    pub const UFR: Self = Self(8);
    pub const BL: Self = Self(9);
    pub const B: Self = Self(10);
    pub const BR: Self = Self(11);
    pub const L: Self = Self(12);
    pub const C: Self = Self(13);
    pub const R: Self = Self(14);
    pub const FL: Self = Self(15);
    pub const F: Self = Self(16);
    pub const FR: Self = Self(17);
    pub const DBL: Self = Self(18);
    pub const DB: Self = Self(19);
    pub const DBR: Self = Self(20);
    pub const DL: Self = Self(21);
    pub const D: Self = Self(22);
    pub const DR: Self = Self(23);
    pub const DFL: Self = Self(24);
    pub const DF: Self = Self(25);
    pub const DFR: Self = Self(26);
}

impl Position {
    /// The position with index |index|, if it is on the cube.
    #[must_use]
    pub fn new(index: usize) -> Option<Self> {
        u8::try_from(index)
            .ok()
            .filter(|&i| (i as usize) < CUBIES)
            .map(Self)
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn at(index: usize) -> Self {
        debug_assert!(index < CUBIES);
        Self(index as u8)
    }

    /// Index into a shape.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// (layer, row, column): layer 0 is the top, row 0 the back, column 0 the left.
    #[must_use]
    pub const fn coordinates(self) -> (usize, usize, usize) {
        let i = self.index();
        (i / 9, i % 9 / 3, i % 3)
    }

    /// Conventional name of the position.
    #[must_use]
    pub const fn name(self) -> &'static str {
        NAMES[self.index()]
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NAMES
            .iter()
            .position(|name| *name == s)
            .and_then(Self::new)
            .ok_or_else(|| Error::ParsePosition(s.to_owned()))
    }
}

impl TryFrom<String> for Position {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
