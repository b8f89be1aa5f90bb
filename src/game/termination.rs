// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::bitboard::{BB_CENTER, BB_LIGHT_SQUARES, BB_RANK_8};
use crate::position::Position;
use crate::types::{Color, COLORS};
use crate::variant::Variant;

use super::legality::has_legal_move;
use super::{EndReason, Game};

/// Positions whose halfmove clock passes this can be claimed drawn.
const FIFTY_MOVE_PLIES: u32 = 100;

/// Positions whose halfmove clock passes this are drawn outright.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Whether the side that just moved has won outright. `has_move` says whether
/// the side to move has a legal move left.
pub fn is_checkmate(pos: &Position, has_move: bool) -> bool {
    let to_move = pos.side_to_move();
    let mover = to_move.toggle();
    match pos.variant() {
        Variant::ThreeCheck if pos.checks(mover) >= 3 => true,
        Variant::KingOfTheHill if !(pos.kings(mover) & BB_CENTER).empty() => true,
        Variant::RacingKings => !(pos.kings(mover) & BB_RANK_8).empty(),
        Variant::Horde if to_move == Color::White && pos.pieces(Color::White).empty() => true,
        Variant::Antichess => !has_move,
        _ => pos.is_check(to_move) && !has_move,
    }
}

/// Whether neither side can possibly win.
pub fn is_insufficient_material(pos: &Position) -> bool {
    match pos.variant() {
        Variant::Standard | Variant::Chess960 => {}
        Variant::ThreeCheck => {
            let kings = pos.kings(Color::White) | pos.kings(Color::Black);
            return pos.occupancy() == kings;
        }
        _ => return false,
    }

    let heavy = COLORS
        .iter()
        .any(|&c| !(pos.pawns(c) | pos.rooks(c) | pos.queens(c)).empty());
    if heavy {
        return false;
    }

    COLORS.iter().all(|&color| {
        let knights = pos.knights(color).count();
        let bishops = pos.bishops(color);
        let on_light = !(bishops & BB_LIGHT_SQUARES).empty();
        let on_dark = !bishops.without(BB_LIGHT_SQUARES).empty();
        match knights {
            0 => !(on_light && on_dark),
            1 => bishops.empty(),
            _ => false,
        }
    })
}

/// Looks at the game's current position and ends the game if the rules say
/// it is over. Draws that must be claimed are recorded instead.
pub(crate) fn classify(game: &mut Game) {
    game.set_claimable_draw(None);

    let pos = game.position();
    let to_move = pos.side_to_move();
    let has_move = has_legal_move(pos);
    if is_checkmate(pos, has_move) {
        game.end_by_rule(EndReason::Checkmate);
        return;
    }

    if !has_move {
        game.end_by_rule(EndReason::Stalemate);
        return;
    }

    if game.clock().is_timed() && game.clock().remaining(to_move.toggle()) < 0 {
        game.end_by_rule(EndReason::Timeout);
        return;
    }

    let draw_timer = pos.draw_timer();
    if draw_timer > SEVENTY_FIVE_MOVE_PLIES {
        game.end_by_rule(EndReason::SeventyFiveMoveRule);
        return;
    }

    if draw_timer > FIFTY_MOVE_PLIES {
        game.set_claimable_draw(Some(EndReason::FiftyMoveRule));
        return;
    }

    if is_insufficient_material(pos) {
        game.end_by_rule(EndReason::InsufficientMaterial);
        return;
    }

    let repetitions = game.repetition_count();
    if repetitions >= 5 {
        game.end_by_rule(EndReason::FivefoldRepetition);
    } else if repetitions >= 3 {
        debug!("position repeated {} times, draw is claimable", repetitions);
        game.set_claimable_draw(Some(EndReason::ThreefoldRepetition));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(variant: Variant, fen: &str) -> Position {
        Position::from_fen(variant, fen).unwrap()
    }

    #[test]
    fn mate_and_stalemate() {
        let mate = position(Variant::Standard, "R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert!(is_checkmate(&mate, has_legal_move(&mate)));

        let stalemate = position(Variant::Standard, "7k/5Q2/8/8/8/8/8/6K1 b - - 0 1");
        assert!(!has_legal_move(&stalemate));
        assert!(!is_checkmate(&stalemate, false));
    }

    #[test]
    fn variant_wins() {
        let hill = position(Variant::KingOfTheHill, "4k3/8/8/3K4/8/8/8/8 b - - 0 1");
        assert!(is_checkmate(&hill, true));

        let race = position(Variant::RacingKings, "1K6/8/8/8/8/8/8/k7 b - - 0 1");
        assert!(is_checkmate(&race, true));

        let horde = position(Variant::Horde, "4k3/8/8/8/8/8/8/8 w - - 0 1");
        assert!(is_checkmate(&horde, false));

        let anti = position(Variant::Antichess, "8/8/8/8/8/8/8/k7 w - - 0 1");
        assert!(is_checkmate(&anti, has_legal_move(&anti)));
    }

    #[test]
    fn insufficient_material() {
        let cases = [
            ("8/8/4k3/8/8/4K3/8/8 w - - 0 1", true),
            ("8/8/4k3/8/8/4K3/3N4/8 w - - 0 1", true),
            ("8/8/4k3/3b4/8/4K3/3B4/8 w - - 0 1", true),
            ("8/8/4k3/8/8/4K3/2BB4/8 w - - 0 1", false),
            ("8/8/4k3/8/8/4K3/2NB4/8 w - - 0 1", false),
            ("8/8/4k3/8/8/4K3/3P4/8 w - - 0 1", false),
        ];

        for &(fen, expected) in cases.iter() {
            assert_eq!(expected, is_insufficient_material(&position(Variant::Standard, fen)), "{}", fen);
        }

        let three_check = position(Variant::ThreeCheck, "8/8/4k3/8/8/4K3/3N4/8 w - - 0 1");
        assert!(!is_insufficient_material(&three_check));
        let koth = position(Variant::KingOfTheHill, "8/8/4k3/8/8/4K3/8/8 w - - 0 1");
        assert!(!is_insufficient_material(&koth));
    }
}
