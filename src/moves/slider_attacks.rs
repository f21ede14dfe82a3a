//! Occupancy-aware attack generation for bishops, rooks and queens.
//!
//! Each of the eight directions has a precomputed empty-board ray per square.
//! The first blocker on a ray is found with a single bit scan and the ray
//! beyond it is masked off with the blocker's own ray in the same direction.

use crate::game_state::chess_types::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

/// `(file_delta, rank_delta)` per direction, in `Direction` order.
const STEPS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub const ROOK_DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

pub const BISHOP_DIRECTIONS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::NorthWest,
];

/// `[direction][square]` empty-board rays, origin excluded.
pub const RAYS: [[u64; 64]; 8] = build_rays();

impl Direction {
    /// Directions whose square index grows along the ray.
    #[inline]
    const fn is_increasing(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::NorthEast | Direction::East | Direction::NorthWest
        )
    }
}

#[inline]
pub fn ray_attacks(direction: Direction, square: Square, occupancy: u64) -> u64 {
    let ray = RAYS[direction as usize][square as usize];
    let blockers = ray & occupancy;
    if blockers == 0 {
        return ray;
    }

    let first_blocker = if direction.is_increasing() {
        blockers.trailing_zeros()
    } else {
        63 - blockers.leading_zeros()
    };
    ray ^ RAYS[direction as usize][first_blocker as usize]
}

#[inline]
pub fn bishop_attacks(square: Square, occupancy: u64) -> u64 {
    BISHOP_DIRECTIONS
        .iter()
        .fold(0u64, |acc, &dir| acc | ray_attacks(dir, square, occupancy))
}

#[inline]
pub fn rook_attacks(square: Square, occupancy: u64) -> u64 {
    ROOK_DIRECTIONS
        .iter()
        .fold(0u64, |acc, &dir| acc | ray_attacks(dir, square, occupancy))
}

#[inline]
pub fn queen_attacks(square: Square, occupancy: u64) -> u64 {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}

const fn build_rays() -> [[u64; 64]; 8] {
    let mut table = [[0u64; 64]; 8];
    let mut dir = 0usize;

    while dir < 8 {
        let (df, dr) = STEPS[dir];
        let mut sq = 0usize;
        while sq < 64 {
            let mut file = (sq % 8) as i32 + df;
            let mut rank = (sq / 8) as i32 + dr;
            let mut ray = 0u64;
            while file >= 0 && file < 8 && rank >= 0 && rank < 8 {
                ray |= 1u64 << ((rank * 8 + file) as usize);
                file += df;
                rank += dr;
            }
            table[dir][sq] = ray;
            sq += 1;
        }
        dir += 1;
    }

    table
}
