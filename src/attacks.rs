// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Precomputed attack tables. Kings, knights and pawns use a per-square lookup;
//! sliding pieces use ray masks that are cut at the first blocker.
use crate::bitboard::Bitboard;
use crate::bitboard::{BB_FILE_A, BB_FILE_H, BB_RANK_1, BB_RANK_8};
use crate::types::{Color, Direction, Square, TableIndex, COLORS, SQUARES};

const KING_STEPS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const KNIGHT_STEPS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// A table of squares reachable from each square by a fixed set of
/// (file, rank) steps.
struct StepTable {
    table: [Bitboard; 64],
}

impl StepTable {
    fn new(steps: &[(i32, i32)]) -> StepTable {
        let mut st = StepTable {
            table: [Bitboard::none(); 64],
        };

        for &sq in SQUARES.iter() {
            let file = sq.file().as_index() as i32;
            let rank = sq.rank().as_index() as i32;
            for &(df, dr) in steps {
                if let Some(target) = Square::from_coords(file + df, rank + dr) {
                    st.table[sq.as_index()].set(target);
                }
            }
        }

        st
    }

    fn attacks(&self, sq: Square) -> Bitboard {
        self.table[sq.as_index()]
    }
}

struct PawnTable {
    table: [[Bitboard; 2]; 64],
}

impl PawnTable {
    fn new() -> PawnTable {
        let mut pt = PawnTable {
            table: [[Bitboard::none(); 2]; 64],
        };

        for &sq in SQUARES.iter() {
            let file = sq.file().as_index() as i32;
            let rank = sq.rank().as_index() as i32;
            for &color in COLORS.iter() {
                let forward = match color {
                    Color::White => 1,
                    Color::Black => -1,
                };

                let mut board = Bitboard::none();
                for &df in &[-1, 1] {
                    if let Some(target) = Square::from_coords(file + df, rank + forward) {
                        board.set(target);
                    }
                }

                pt.table[sq.as_index()][color.as_index()] = board;
            }
        }

        pt
    }

    fn attacks(&self, sq: Square, color: Color) -> Bitboard {
        self.table[sq.as_index()][color.as_index()]
    }
}

/// Rays from every square in every direction, not including the origin. The
/// extra 65th row is an empty ray, used when a ray has no blocker.
struct RayTable {
    table: [[Bitboard; 8]; 65],
}

impl RayTable {
    fn new() -> RayTable {
        let mut rt = RayTable {
            table: [[Bitboard::none(); 8]; 65],
        };

        let edges = [
            (Direction::North, BB_RANK_8),
            (Direction::NorthEast, BB_RANK_8.or(BB_FILE_H)),
            (Direction::East, BB_FILE_H),
            (Direction::SouthEast, BB_RANK_1.or(BB_FILE_H)),
            (Direction::South, BB_RANK_1),
            (Direction::SouthWest, BB_RANK_1.or(BB_FILE_A)),
            (Direction::West, BB_FILE_A),
            (Direction::NorthWest, BB_RANK_8.or(BB_FILE_A)),
        ];

        for &sq in SQUARES.iter() {
            for &(dir, edge) in edges.iter() {
                let mut ray = Bitboard::none();
                let mut cursor = sq;
                while !edge.test(cursor) {
                    cursor = cursor.towards(dir);
                    ray.set(cursor);
                }

                rt.table[sq.as_index()][dir.as_index()] = ray;
            }
        }

        rt
    }

    fn ray(&self, sq: usize, dir: Direction) -> Bitboard {
        self.table[sq][dir.as_index()]
    }
}

lazy_static! {
    static ref KING_TABLE: StepTable = StepTable::new(&KING_STEPS);
    static ref KNIGHT_TABLE: StepTable = StepTable::new(&KNIGHT_STEPS);
    static ref PAWN_TABLE: PawnTable = PawnTable::new();
    static ref RAY_TABLE: RayTable = RayTable::new();
}

/// Walks a ray from `sq` and stops on the first occupied square, which stays
/// in the result. Rays pointing towards higher indices find their blocker
/// with the lowest set bit, the others with the highest.
fn ray_attacks(sq: Square, occupancy: Bitboard, dir: Direction) -> Bitboard {
    let ray = RAY_TABLE.ray(sq.as_index(), dir);
    let blockers = ray.and(occupancy).bits();
    let blocker = if dir.as_vector() > 0 {
        blockers.trailing_zeros() as usize
    } else {
        (64 - blockers.leading_zeros())
            .checked_sub(1)
            .unwrap_or(64) as usize
    };

    ray.xor(RAY_TABLE.ray(blocker, dir))
}

pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_TABLE.attacks(sq, color)
}

pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_TABLE.attacks(sq)
}

pub fn king_attacks(sq: Square) -> Bitboard {
    KING_TABLE.attacks(sq)
}

pub fn bishop_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(sq, occupancy, Direction::NorthEast)
        | ray_attacks(sq, occupancy, Direction::NorthWest)
        | ray_attacks(sq, occupancy, Direction::SouthEast)
        | ray_attacks(sq, occupancy, Direction::SouthWest)
}

pub fn rook_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(sq, occupancy, Direction::North)
        | ray_attacks(sq, occupancy, Direction::South)
        | ray_attacks(sq, occupancy, Direction::East)
        | ray_attacks(sq, occupancy, Direction::West)
}

pub fn queen_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupancy) | rook_attacks(sq, occupancy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn king_in_corner() {
        assert_eq!(3, king_attacks(Square::A1).count());
        assert_eq!(8, king_attacks(Square::E4).count());
    }

    #[test]
    fn knight_counts() {
        assert_eq!(2, knight_attacks(Square::H8).count());
        assert_eq!(8, knight_attacks(Square::D4).count());
        assert!(knight_attacks(Square::G1).test(Square::F3));
    }

    #[test]
    fn pawn_edges() {
        let white = pawn_attacks(Square::A2, Color::White);
        assert_eq!(1, white.count());
        assert!(white.test(Square::B3));

        let black = pawn_attacks(Square::E7, Color::Black);
        assert!(black.test(Square::D6));
        assert!(black.test(Square::F6));
    }

    #[test]
    fn sliders_on_empty_board() {
        assert_eq!(13, bishop_attacks(Square::D4, Bitboard::none()).count());
        assert_eq!(14, rook_attacks(Square::D4, Bitboard::none()).count());
        assert_eq!(27, queen_attacks(Square::D4, Bitboard::none()).count());
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let mut occ = Bitboard::none();
        occ.set(Square::D6);
        occ.set(Square::B4);
        let rook = rook_attacks(Square::D4, occ);
        assert!(rook.test(Square::D6));
        assert!(!rook.test(Square::D7));
        assert!(rook.test(Square::B4));
        assert!(!rook.test(Square::A4));
        assert_eq!(11, rook.count());
    }
}
