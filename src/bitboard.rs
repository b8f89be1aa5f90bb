// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `Bitboard` type, a set of squares packed into a single 64-bit word.
//! Positions keep one bitboard per piece kind and color, and the attack
//! tables answer every "which squares does this piece reach" question in
//! terms of them.
use num_traits::FromPrimitive;
use std::default::Default;
use std::fmt;
use std::iter::{FromIterator, Iterator};
use std::ops;

use crate::types::{self, File, Rank, Square};

const RANK_MASKS: [u64; 8] = [
    0x0000_0000_0000_00FF,
    0x0000_0000_0000_FF00,
    0x0000_0000_00FF_0000,
    0x0000_0000_FF00_0000,
    0x0000_00FF_0000_0000,
    0x0000_FF00_0000_0000,
    0x00FF_0000_0000_0000,
    0xFF00_0000_0000_0000,
];

const FILE_MASKS: [u64; 8] = [
    0x0101_0101_0101_0101,
    0x0202_0202_0202_0202,
    0x0404_0404_0404_0404,
    0x0808_0808_0808_0808,
    0x1010_1010_1010_1010,
    0x2020_2020_2020_2020,
    0x4040_4040_4040_4040,
    0x8080_8080_8080_8080,
];

/// A set of squares, one bit per square with a1 as the least significant bit.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Bitboard {
    bits: u64,
}

impl Default for Bitboard {
    fn default() -> Bitboard {
        Bitboard::none()
    }
}

impl Bitboard {
    pub const fn from_bits(bits: u64) -> Bitboard {
        Bitboard { bits }
    }

    /// The set containing only the given square.
    pub const fn from_square(square: Square) -> Bitboard {
        Bitboard::from_bits(1u64 << (square as u8))
    }

    pub const fn none() -> Bitboard {
        Bitboard::from_bits(0)
    }

    pub const fn test(self, square: Square) -> bool {
        (self.bits & (1u64 << (square as u8))) != 0
    }

    pub fn set(&mut self, square: Square) {
        self.bits |= 1u64 << (square as u8);
    }

    pub fn unset(&mut self, square: Square) {
        self.bits &= !(1u64 << square as u8);
    }

    pub const fn and(self, other: Bitboard) -> Bitboard {
        Bitboard::from_bits(self.bits & other.bits)
    }

    pub const fn or(self, other: Bitboard) -> Bitboard {
        Bitboard::from_bits(self.bits | other.bits)
    }

    pub const fn xor(self, other: Bitboard) -> Bitboard {
        Bitboard::from_bits(self.bits ^ other.bits)
    }

    /// Set difference: the squares of this set that are not in `other`.
    pub const fn without(self, other: Bitboard) -> Bitboard {
        Bitboard::from_bits(self.bits & !other.bits)
    }

    pub fn iter(self) -> BitboardIterator {
        BitboardIterator::new(self.bits)
    }

    /// The members of this set that lie on the given rank.
    pub const fn rank(self, rank: Rank) -> Bitboard {
        self.and(Bitboard::from_bits(RANK_MASKS[rank as usize]))
    }

    /// The members of this set that lie on the given file.
    pub const fn file(self, file: File) -> Bitboard {
        self.and(Bitboard::from_bits(FILE_MASKS[file as usize]))
    }

    pub const fn bits(self) -> u64 {
        self.bits
    }

    pub const fn count(self) -> u32 {
        self.bits.count_ones()
    }

    pub const fn empty(self) -> bool {
        self.bits == 0
    }

    /// The lowest-indexed member of the set, if any.
    pub fn first(self) -> Option<Square> {
        self.into_iter().next()
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Bitboard").field(&self.bits).finish()
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &rank in types::RANKS.iter().rev() {
            for &file in &types::FILES {
                let mark = if self.test(Square::of(rank, file)) {
                    '1'
                } else {
                    '.'
                };
                write!(f, " {} ", mark)?;
            }

            writeln!(f, "| {}", rank)?;
        }

        for _ in &types::FILES {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for file in &types::FILES {
            write!(f, " {} ", file)?;
        }

        writeln!(f)
    }
}

impl ops::BitAnd for Bitboard {
    type Output = Bitboard;

    fn bitand(self, rhs: Bitboard) -> Bitboard {
        self.and(rhs)
    }
}

impl ops::BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Bitboard) {
        *self = self.and(rhs);
    }
}

impl ops::BitOr for Bitboard {
    type Output = Bitboard;

    fn bitor(self, rhs: Bitboard) -> Bitboard {
        self.or(rhs)
    }
}

impl ops::BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Bitboard) {
        *self = self.or(rhs);
    }
}

impl ops::BitXor for Bitboard {
    type Output = Bitboard;

    fn bitxor(self, rhs: Bitboard) -> Bitboard {
        self.xor(rhs)
    }
}

impl ops::Not for Bitboard {
    type Output = Bitboard;

    fn not(self) -> Bitboard {
        Bitboard::from_bits(!self.bits)
    }
}

/// Iterates the members of a bitboard from a1 towards h8.
pub struct BitboardIterator {
    bits: u64,
}

impl BitboardIterator {
    fn new(bits: u64) -> BitboardIterator {
        BitboardIterator { bits }
    }
}

impl Iterator for BitboardIterator {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.bits == 0 {
            return None;
        }

        let next = self.bits.trailing_zeros();
        self.bits &= self.bits - 1;
        Some(FromPrimitive::from_u32(next).unwrap())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bits.count_ones() as usize;
        (remaining, Some(remaining))
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIterator;

    fn into_iter(self) -> BitboardIterator {
        self.iter()
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Bitboard {
        let mut board = Bitboard::none();
        for sq in iter {
            board.set(sq);
        }

        board
    }
}

pub const BB_RANK_1: Bitboard = Bitboard::from_bits(RANK_MASKS[0]);
pub const BB_RANK_8: Bitboard = Bitboard::from_bits(RANK_MASKS[7]);

pub const BB_FILE_A: Bitboard = Bitboard::from_bits(FILE_MASKS[0]);
pub const BB_FILE_H: Bitboard = Bitboard::from_bits(FILE_MASKS[7]);

/// d4, e4, d5 and e5, the goal squares of King of the Hill.
pub const BB_CENTER: Bitboard = Bitboard::from_bits(0x0000_0018_1800_0000);

/// Every light square (h1, g2, a2, ...).
pub const BB_LIGHT_SQUARES: Bitboard = Bitboard::from_bits(0x55AA_55AA_55AA_55AA);
