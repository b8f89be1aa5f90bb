// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The 960 Chess960 starting positions in their standard numbering.
//!
//! Position `n` is decoded by peeling off digits: `n % 4` places the light
//! squared bishop on b, d, f or h; the next `% 4` places the dark squared
//! bishop on a, c, e or g; the next `% 6` puts the queen on one of the six
//! free squares; the remaining quotient selects one of ten knight
//! placements, and rook, king, rook fill what is left from left to right.
//! Position 518 is the orthodox setup.
use rand::Rng;

pub const POSITION_COUNT: usize = 960;

/// Knight placements over the five squares left after bishops and queen.
const KNIGHT_PLACEMENTS: [(usize, usize); 10] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (1, 2),
    (1, 3),
    (1, 4),
    (2, 3),
    (2, 4),
    (3, 4),
];

fn decode(id: usize) -> String {
    let mut rank = [None; 8];
    let mut n = id;

    rank[(n % 4) * 2 + 1] = Some('b');
    n /= 4;
    rank[(n % 4) * 2] = Some('b');
    n /= 4;

    let free: Vec<usize> = (0..8).filter(|&f| rank[f].is_none()).collect();
    rank[free[n % 6]] = Some('q');
    n /= 6;

    let free: Vec<usize> = (0..8).filter(|&f| rank[f].is_none()).collect();
    let (first, second) = KNIGHT_PLACEMENTS[n];
    rank[free[first]] = Some('n');
    rank[free[second]] = Some('n');

    let free: Vec<usize> = (0..8).filter(|&f| rank[f].is_none()).collect();
    for (&file, &piece) in free.iter().zip(['r', 'k', 'r'].iter()) {
        rank[file] = Some(piece);
    }

    rank.iter().map(|c| c.unwrap_or('?')).collect()
}

lazy_static! {
    static ref POSITIONS: Vec<String> = (0..POSITION_COUNT).map(decode).collect();
}

/// The black back rank, in lower-case FEN letters from a to h, of the given
/// position.
pub fn back_rank(id: usize) -> Option<&'static str> {
    POSITIONS.get(id).map(|s| s.as_str())
}

/// The full FEN of the given position, with both sides able to castle.
pub fn position(id: usize) -> Option<String> {
    back_rank(id).map(|rank| {
        format!(
            "{}/pppppppp/8/8/8/8/PPPPPPPP/{} w KQkq - 0 1",
            rank,
            rank.to_ascii_uppercase()
        )
    })
}

/// Finds the number of a back rank, given in FEN letters of either case.
pub fn id_of(back_rank: &str) -> Option<usize> {
    let wanted = back_rank.to_ascii_lowercase();
    POSITIONS.iter().position(|rank| *rank == wanted)
}

/// Picks a uniformly random position number. The draw is over 1..=960 and
/// 960 wraps around to position 0.
pub fn random_id() -> usize {
    rand::thread_rng().gen_range(1, POSITION_COUNT + 1) % POSITION_COUNT
}

pub fn random() -> String {
    let id = random_id();
    debug!("picked chess960 position {}", id);
    position(id).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_positions() {
        assert_eq!(Some("bbqnnrkr"), back_rank(0));
        assert_eq!(Some("rnbqkbnr"), back_rank(518));
        assert_eq!(Some("rkrnnqbb"), back_rank(959));
        assert_eq!(None, back_rank(960));
    }

    #[test]
    fn orthodox_fen() {
        assert_eq!(
            Some(crate::variant::STANDARD_FEN.to_owned()),
            position(518)
        );
    }

    #[test]
    fn all_positions_are_distinct_and_legal() {
        for id in 0..POSITION_COUNT {
            let rank = back_rank(id).unwrap();
            assert_eq!(Some(id), id_of(rank));

            let king = rank.find('k').unwrap();
            let first_rook = rank.find('r').unwrap();
            let last_rook = rank.rfind('r').unwrap();
            assert!(first_rook < king && king < last_rook, "{}", rank);

            let bishops: Vec<_> = rank.match_indices('b').map(|(i, _)| i % 2).collect();
            assert_eq!(2, bishops.len());
            assert_ne!(bishops[0], bishops[1], "{}", rank);
        }
    }

    #[test]
    fn id_of_accepts_white_rank() {
        assert_eq!(Some(518), id_of("RNBQKBNR"));
        assert_eq!(None, id_of("rnbqkbnn"));
    }

    #[test]
    fn random_ids_are_in_range() {
        for _ in 0..100 {
            assert!(random_id() < POSITION_COUNT);
        }
    }
}
