//! Face turns on a bandaged cube, and the move notation used to name them.

use crate::cube::{BlockId, Cube, FreeCubies, Position, CUBIES};
use crate::error::{Error, Result};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

lazy_static! {
    /// Each bitset represents the positions moved by a face. Bitsets can be looked up by
    /// indexing with the face.
    static ref MASKS: [u32; 9] = ALL_FACES.map(|face| {
        make_bitset(&(0..CUBIES).filter(|&i| face.moves(i)).collect::<Vec<_>>())
    });

    /// The positions moved by each face, in ascending order.
    static ref POSITIONS: [[usize; 9]; 9] = ALL_FACES.map(|face| {
        let mut positions = [0; 9];
        for (slot, i) in positions.iter_mut().zip((0..CUBIES).filter(|&i| face.moves(i))) {
            *slot = i;
        }
        positions
    });
}

/// Clockwise rotation of a 3x3 window listed in reading order.
const CLOCKWISE: [usize; 9] = [6, 3, 0, 7, 4, 1, 8, 5, 2];
/// Counter-clockwise rotation of a 3x3 window listed in reading order.
const COUNTER_CLOCKWISE: [usize; 9] = [2, 5, 8, 1, 4, 7, 0, 3, 6];

const ALL_FACES: [Face; 9] = [
    Face::U,
    Face::D,
    Face::L,
    Face::R,
    Face::F,
    Face::B,
    Face::M,
    Face::E,
    Face::S,
];

//////////////////////////////////
// Helpers for bit manipulation //
//////////////////////////////////

/// Gets bit at index |idx| from a bitset.
fn get_bit(bits: u64, idx: usize) -> bool {
    bits & (1 << idx) != 0
}

/// Sets the bit at index |idx| to match the truthiness of |val|.
fn set_bit(bits: u64, idx: usize, val: bool) -> u64 {
    if val {
        bits | (1 << idx)
    } else {
        bits & !(1 << idx)
    }
}

/// Takes a slice of offsets and encodes them into a u32 bitset.
fn make_bitset(indices: &[usize]) -> u32 {
    indices.iter().fold(0, |ret, i| ret | 1 << i)
}

/// A set of block ids. Free cubies (id 0) never belong to it.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
struct BlockSet([u64; 4]);

impl BlockSet {
    fn insert(&mut self, id: BlockId) {
        if id != 0 {
            let word = &mut self.0[usize::from(id) / 64];
            *word = set_bit(*word, usize::from(id) % 64, true);
        }
    }

    fn intersects(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0.iter()).any(|(a, b)| a & b != 0)
    }
}

/////////////////////////////////////////
// Utils for turning faces on the cube //
/////////////////////////////////////////

/// The outer faces of a cube plus the three middle slices.
#[derive(Clone, Copy, PartialOrd, Ord, Eq, PartialEq, Hash, Debug, Deserialize)]
pub enum Face {
    /// Top layer.
    U,
    /// Bottom layer.
    D,
    /// Left layer.
    L,
    /// Right layer.
    R,
    /// Front layer.
    F,
    /// Back layer.
    B,
    /// Slice between L and R, turning like L.
    M,
    /// Slice between U and D, turning like D.
    E,
    /// Slice between F and B, turning like F.
    S,
}

impl Face {
    /// The six faces that are explored. Slices are excluded since they are composites of these.
    pub const PRIMARY: [Face; 6] = [Face::U, Face::D, Face::L, Face::R, Face::F, Face::B];

    /// Whether position |i| lies in this face's layer.
    fn moves(self, i: usize) -> bool {
        let (layer, row, column) = (i / 9, i % 9 / 3, i % 3);
        match self {
            Face::U => layer == 0,
            Face::E => layer == 1,
            Face::D => layer == 2,
            Face::B => row == 0,
            Face::S => row == 1,
            Face::F => row == 2,
            Face::L => column == 0,
            Face::M => column == 1,
            Face::R => column == 2,
        }
    }

    /// The nine positions turned by this face, in ascending order.
    #[must_use]
    pub fn positions(self) -> [Position; 9] {
        POSITIONS[self as usize].map(Position::at)
    }

    /// Whether |pos| is turned by this face.
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        get_bit(u64::from(MASKS[self as usize]), pos.index())
    }

    // A layer listed in reading order is seen from outside for U, L and F, and mirrored for
    // the opposite faces, so those rotate the other way to stay clockwise.
    fn rotation(self) -> &'static [usize; 9] {
        match self {
            Face::U | Face::L | Face::F | Face::M | Face::S => &CLOCKWISE,
            Face::D | Face::R | Face::B | Face::E => &COUNTER_CLOCKWISE,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for Face {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ALL_FACES
            .into_iter()
            .find(|face| face.to_string() == s)
            .ok_or_else(|| Error::ParseMove(s.to_owned()))
    }
}

/// How the states produced by turning are labelled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Labeling {
    /// Renumber blocks into canonical reading order after every turn.
    #[default]
    Canonical,
    /// Keep block ids attached to the blocks as they move, so specific blocks can be tracked.
    Raw,
}

/// Returns whether |face| can turn on |cube|: no block has cubies both inside and outside it.
#[must_use]
pub fn is_turnable(face: Face, cube: &Cube) -> bool {
    let mask = u64::from(MASKS[face as usize]);
    let mut inside = BlockSet::default();
    let mut outside = BlockSet::default();
    for (i, &id) in cube.blocks().iter().enumerate() {
        if get_bit(mask, i) {
            inside.insert(id);
        } else {
            outside.insert(id);
        }
    }
    !inside.intersects(&outside)
}

// is_turnable must be checked before calling this method.
/// Returns the cube after a clockwise quarter turn of |face|, labelled according to |labeling|.
#[must_use]
pub fn turn(face: Face, cube: &Cube, labeling: Labeling) -> Cube {
    let positions = POSITIONS[face as usize];
    let window = positions.map(|i| cube.blocks()[i]);
    let mut blocks = *cube.blocks();
    for (&i, &from) in positions.iter().zip(face.rotation().iter()) {
        blocks[i] = window[from];
    }
    let turned = Cube::new(blocks);
    match labeling {
        Labeling::Canonical => turned.canonicalize(FreeCubies::Fill),
        Labeling::Raw => turned,
    }
}

/// All the ways a face of Rubik's cube can turn.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug)]
pub enum TurnType {
    /// Clockwise quarter turn.
    Forward,
    /// Counter-clockwise quarter turn.
    Backward,
    /// Half turn.
    Double,
}

impl TurnType {
    /// Number of clockwise quarter turns this amounts to.
    #[must_use]
    pub const fn quarter_turns(self) -> usize {
        match self {
            TurnType::Forward => 1,
            TurnType::Double => 2,
            TurnType::Backward => 3,
        }
    }

    /// The turn undoing this one.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            TurnType::Forward => TurnType::Backward,
            TurnType::Backward => TurnType::Forward,
            TurnType::Double => TurnType::Double,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            TurnType::Forward => "",
            TurnType::Backward => "'",
            TurnType::Double => "2",
        }
    }
}

/// Axes of whole-cube rotation.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug)]
pub enum Axis {
    /// Rotation like R.
    X,
    /// Rotation like U.
    Y,
    /// Rotation like F.
    Z,
}

impl Axis {
    /// The three parallel slice turns making up one rotation.
    #[must_use]
    pub const fn slices(self) -> [(Face, TurnType); 3] {
        match self {
            Axis::X => [
                (Face::R, TurnType::Forward),
                (Face::M, TurnType::Backward),
                (Face::L, TurnType::Backward),
            ],
            Axis::Y => [
                (Face::U, TurnType::Forward),
                (Face::E, TurnType::Backward),
                (Face::D, TurnType::Backward),
            ],
            Axis::Z => [
                (Face::F, TurnType::Forward),
                (Face::S, TurnType::Forward),
                (Face::B, TurnType::Backward),
            ],
        }
    }
}

/// All the turns that can be written in move notation.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug)]
pub enum Turn {
    /// A face or slice turn such as `R'` or `M2`.
    Turn(Face, TurnType),
    /// A whole-cube rotation such as `x` or `z'`.
    Rotation(Axis, TurnType),
}

impl Turn {
    /// The clockwise quarter turns this move expands to, in order.
    #[must_use]
    pub fn quarter_turns(self) -> Vec<Face> {
        match self {
            Turn::Turn(face, turn_type) => vec![face; turn_type.quarter_turns()],
            Turn::Rotation(axis, turn_type) => (0..turn_type.quarter_turns())
                .flat_map(|_| axis.slices())
                .flat_map(|(face, slice_turn)| vec![face; slice_turn.quarter_turns()])
                .collect(),
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Turn::Turn(face, turn_type) => write!(f, "{face}{}", turn_type.suffix()),
            Turn::Rotation(axis, turn_type) => {
                let name = match axis {
                    Axis::X => "x",
                    Axis::Y => "y",
                    Axis::Z => "z",
                };
                write!(f, "{name}{}", turn_type.suffix())
            }
        }
    }
}

impl FromStr for Turn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::ParseMove(s.to_owned());
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let turn_type = match chars.as_str() {
            "" => TurnType::Forward,
            "'" => TurnType::Backward,
            "2" => TurnType::Double,
            _ => return Err(invalid()),
        };
        let axis = match letter {
            'x' => Some(Axis::X),
            'y' => Some(Axis::Y),
            'z' => Some(Axis::Z),
            _ => None,
        };
        match axis {
            Some(axis) => Ok(Turn::Rotation(axis, turn_type)),
            None => letter
                .to_string()
                .parse()
                .map(|face| Turn::Turn(face, turn_type))
                .map_err(|_| invalid()),
        }
    }
}

/// Parses space separated move notation.
///
/// # Errors
///
/// [`Error::ParseMove`] for the first token that is not a move.
pub fn parse_moves(moves: &str) -> Result<Vec<Turn>> {
    moves.split_whitespace().map(str::parse).collect()
}

/// Applies |moves| to |cube| and returns the canonical result.
///
/// # Errors
///
/// [`Error::ParseMove`] if the notation is invalid, and [`Error::IllegalTurn`] for the first
/// move that asks for a blocked face or slice. Nothing after that move is applied.
pub fn apply_moves(cube: &Cube, moves: &str) -> Result<Cube> {
    apply_turns(cube, &parse_moves(moves)?)
}

/// Applies already parsed |turns| to |cube|, see [`apply_moves`].
///
/// # Errors
///
/// [`Error::IllegalTurn`] for the first blocked turn.
pub fn apply_turns(cube: &Cube, turns: &[Turn]) -> Result<Cube> {
    let mut state = cube.canonical();
    for (i, move_) in turns.iter().enumerate() {
        let before = state;
        for face in move_.quarter_turns() {
            if !is_turnable(face, &state) {
                return Err(Error::IllegalTurn {
                    face,
                    token: move_.to_string(),
                    index: i + 1,
                    state: before,
                });
            }
            state = turn(face, &state, Labeling::Canonical);
        }
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CUBE1: Cube = Cube::new([
        1, 1, 0, 1, 1, 0, 0, 0, 0, //
        2, 2, 7, 2, 2, 6, 3, 4, 5, //
        2, 2, 7, 2, 2, 6, 3, 4, 5,
    ]);

    #[test]
    fn test_face_masks() {
        assert_eq!(MASKS[Face::U as usize], 0x1ff);
        assert_eq!(MASKS[Face::E as usize], 0x1ff << 9);
        assert_eq!(MASKS[Face::L as usize], make_bitset(&[0, 3, 6, 9, 12, 15, 18, 21, 24]));
        for face in ALL_FACES {
            assert_eq!(MASKS[face as usize].count_ones(), 9);
            for pos in face.positions() {
                assert!(face.contains(pos));
            }
        }
    }

    #[test]
    fn test_block_set() {
        let mut a = BlockSet::default();
        let mut b = BlockSet::default();
        // free cubies never make two sets overlap
        a.insert(0);
        b.insert(0);
        assert_eq!(a, BlockSet::default());
        assert!(!a.intersects(&b));
        a.insert(200);
        b.insert(3);
        assert!(!a.intersects(&b));
        b.insert(200);
        assert!(a.intersects(&b));
        assert_eq!(b, BlockSet([1 << 3, 0, 0, 1 << 8]));
    }

    #[test]
    fn test_face_positions() {
        assert_eq!(
            Face::R.positions().map(Position::index),
            [2, 5, 8, 11, 14, 17, 20, 23, 26]
        );
        assert_eq!(
            Face::F.positions().map(Position::index),
            [6, 7, 8, 15, 16, 17, 24, 25, 26]
        );
        assert!(Face::D.contains(Position::DFR));
        assert!(!Face::D.contains(Position::FR));
        assert!(Face::M.contains(Position::C));
    }

    #[test]
    fn test_can_turn_face() {
        let cube = CUBE1.canonical();
        let turnable: Vec<Face> = ALL_FACES
            .into_iter()
            .filter(|&face| is_turnable(face, &cube))
            .collect();
        assert_eq!(turnable, vec![Face::U, Face::R, Face::F]);
        // free cubies written as zeros never block
        assert!(is_turnable(Face::U, &CUBE1));
    }

    #[test]
    fn test_do_turn() {
        let root = CUBE1.canonical();
        let once = turn(Face::U, &root, Labeling::Canonical);
        assert_ne!(once, root);
        assert!(once.is_canonical());
        // the 2x2 block in the back left corner of U moves to the back right
        assert!(once.fused(Position::UB, Position::UR));
        assert!(once.fused(Position::UBR, Position::UB));
        let mut cube = root;
        for _ in 0..4 {
            cube = turn(Face::U, &cube, Labeling::Canonical);
        }
        assert_eq!(cube, root);
    }

    #[test]
    fn test_turn_direction() {
        let mut blocks = [0; CUBIES];
        blocks[Position::UFR.index()] = 1;
        blocks[Position::DFR.index()] = 2;
        let cube = Cube::new(blocks);
        // R brings the front right column up and back
        let r = turn(Face::R, &cube, Labeling::Raw);
        assert_eq!(r.get(Position::UBR), 1);
        assert_eq!(r.get(Position::UFR), 2);
        // U brings the front to the left
        let u = turn(Face::U, &cube, Labeling::Raw);
        assert_eq!(u.get(Position::UFL), 1);
        // F brings the top right down
        let f = turn(Face::F, &cube, Labeling::Raw);
        assert_eq!(f.get(Position::DFR), 1);
        assert_eq!(f.get(Position::DFL), 2);
        // D is clockwise seen from below: front goes right
        let d = turn(Face::D, &cube, Labeling::Raw);
        assert_eq!(d.get(Position::DBR), 2);
    }

    #[test]
    fn test_parse_moves() {
        assert_eq!(
            parse_moves("R U2 F' x2 M").unwrap(),
            vec![
                Turn::Turn(Face::R, TurnType::Forward),
                Turn::Turn(Face::U, TurnType::Double),
                Turn::Turn(Face::F, TurnType::Backward),
                Turn::Rotation(Axis::X, TurnType::Double),
                Turn::Turn(Face::M, TurnType::Forward),
            ]
        );
        assert!(matches!(parse_moves("R3"), Err(Error::ParseMove(m)) if m == "R3"));
        assert!(matches!(parse_moves("Q"), Err(Error::ParseMove(_))));
        assert_eq!(
            Turn::Rotation(Axis::X, TurnType::Forward).quarter_turns(),
            vec![Face::R, Face::M, Face::M, Face::M, Face::L, Face::L, Face::L]
        );
        assert_eq!(Turn::Turn(Face::B, TurnType::Backward).to_string(), "B'");
    }

    #[test]
    fn test_apply_moves() {
        let root = CUBE1.canonical();
        assert_eq!(apply_moves(&CUBE1, "").unwrap(), root);
        assert_eq!(apply_moves(&CUBE1, "U U'").unwrap(), root);
        assert_eq!(
            apply_moves(&CUBE1, "R2 F").unwrap(),
            apply_moves(&CUBE1, "R R F").unwrap()
        );

        let after_u = apply_moves(&CUBE1, "U").unwrap();
        match apply_moves(&CUBE1, "U L R") {
            Err(Error::IllegalTurn {
                face,
                token,
                index,
                state,
            }) => {
                assert_eq!(face, Face::L);
                assert_eq!(token, "L");
                assert_eq!(index, 2);
                assert_eq!(state, after_u);
            }
            other => panic!("expected an illegal turn, got {other:?}"),
        }
    }

    #[test]
    fn test_rotation_blocked_by_slices() {
        // R turns but the M slice is blocked by the 2x2 block in U
        assert!(matches!(
            apply_moves(&CUBE1, "x"),
            Err(Error::IllegalTurn { face: Face::M, index: 1, .. })
        ));
        // a cube with no bandaging rotates freely and looks the same afterwards
        let free = Cube::new([0; CUBIES]);
        assert_eq!(apply_moves(&free, "x y' z2").unwrap(), free.canonical());
    }

    /// Which slice along |axis| position |i| lies in.
    fn slice_of(axis: Axis, i: usize) -> usize {
        match axis {
            Axis::X => i % 3,
            Axis::Y => i / 9,
            Axis::Z => i % 9 / 3,
        }
    }

    /// Shapes whose blocks never leave their slice along one axis, so every turn about that
    /// axis is possible.
    fn sliced_shape() -> impl Strategy<Value = (Axis, Cube)> {
        (
            prop::sample::select(vec![Axis::X, Axis::Y, Axis::Z]),
            prop::array::uniform27(0u8..4),
        )
            .prop_map(|(axis, mut blocks)| {
                for (i, id) in blocks.iter_mut().enumerate() {
                    if *id != 0 {
                        *id += 4 * slice_of(axis, i) as u8;
                    }
                }
                (axis, Cube::new(blocks).canonical())
            })
    }

    /// Sliced shapes and CUBE1, scrambled by random turns. Blocked turns are skipped.
    fn scrambled_shape() -> impl Strategy<Value = Cube> {
        let start = prop_oneof![
            sliced_shape().prop_map(|(_, cube)| cube),
            Just(CUBE1.canonical()),
        ];
        let faces = prop::collection::vec(prop::sample::select(ALL_FACES.to_vec()), 0..16);
        (start, faces).prop_map(|(start, faces)| {
            faces.into_iter().fold(start, |cube, face| {
                if is_turnable(face, &cube) {
                    turn(face, &cube, Labeling::Canonical)
                } else {
                    cube
                }
            })
        })
    }

    proptest! {
        #[test]
        fn four_quarter_turns_are_identity(cube in scrambled_shape()) {
            for face in ALL_FACES.into_iter().filter(|&face| is_turnable(face, &cube)) {
                let mut turned = cube;
                for _ in 0..4 {
                    turned = turn(face, &turned, Labeling::Canonical);
                }
                prop_assert_eq!(turned, cube);
            }
        }

        #[test]
        fn turning_never_locks_the_turned_face(cube in scrambled_shape()) {
            for face in ALL_FACES.into_iter().filter(|&face| is_turnable(face, &cube)) {
                prop_assert!(is_turnable(face, &turn(face, &cube, Labeling::Canonical)));
            }
        }

        #[test]
        fn sliced_shapes_turn_about_their_axis((axis, cube) in sliced_shape()) {
            for (face, _) in axis.slices() {
                prop_assert!(is_turnable(face, &cube));
                let mut turned = cube;
                for _ in 0..4 {
                    turned = turn(face, &turned, Labeling::Canonical);
                    prop_assert!(is_turnable(face, &turned));
                }
                prop_assert_eq!(turned, cube);
            }
        }
    }
}
