// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Move construction and the rules that decide whether a move may be played.
//!
//! Legality is decided by playing the move on a copy of the board and looking
//! at the result. This is slower than tracking pins but keeps every variant's
//! rules in one place.
use crate::bitboard::Bitboard;
use crate::error::{ChessError, ChessResult};
use crate::moves::{CastlingType, Move};
use crate::position::{castle_landing, Position};
use crate::types::TableIndex;
use crate::types::{Color, File, Piece, PieceKind, Rank, Square};
use crate::variant::Variant;

fn invalid<T>(reason: String) -> ChessResult<T> {
    Err(ChessError::InvalidMove(reason))
}

/// Builds a move of the piece on `from` to `to`, recognizing castling and en
/// passant. With `validate` the piece must control `to`; legality is not
/// checked here.
pub(crate) fn build_move(
    pos: &Position,
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
    validate: bool,
) -> ChessResult<Move> {
    let piece = match pos.piece_at(from) {
        Some(piece) => piece,
        None => return invalid(format!("There's no piece on {}", from)),
    };

    if from == to {
        return invalid("Can't move to the same square".to_owned());
    }

    if let Some(kind) = promotion {
        if piece.kind != PieceKind::Pawn {
            return invalid("Only pawns can promote".to_owned());
        }

        if kind == PieceKind::Pawn {
            return invalid("Promoting to a pawn makes no sense".to_owned());
        }

        if kind == PieceKind::King && !pos.variant().can_promote_to(PieceKind::King) {
            return invalid(format!("You can't promote to king in {}", pos.variant()));
        }
    }

    let castling = detect_castling(pos, piece, from, to);
    let en_passant = piece.kind == PieceKind::Pawn && pos.en_passant_square() == Some(to);
    if validate && castling == CastlingType::None && !pos.controlled_squares(from).test(to) {
        return invalid(format!("That piece can't move to {}", to));
    }

    Ok(Move::new(from, to, promotion, castling, en_passant))
}

/// Which side, if any, a king move from `from` to `to` castles. In Chess960
/// the king moves onto its own rook; elsewhere it makes the orthodox two-step
/// from the e-file.
pub(crate) fn detect_castling(pos: &Position, piece: Piece, from: Square, to: Square) -> CastlingType {
    if piece.kind != PieceKind::King {
        return CastlingType::None;
    }

    let back_rank = Rank::back_rank(piece.color);
    if from.rank() != back_rank || to.rank() != back_rank {
        return CastlingType::None;
    }

    match pos.variant() {
        Variant::Antichess => CastlingType::None,
        Variant::Chess960 => {
            if pos.piece_at(to) != Some(Piece::new(PieceKind::Rook, piece.color)) {
                CastlingType::None
            } else if to.file() > from.file() {
                CastlingType::Kingside
            } else {
                CastlingType::Queenside
            }
        }
        _ => {
            if from.file() != File::E {
                return CastlingType::None;
            }

            match to.file() {
                File::G => CastlingType::Kingside,
                File::C => CastlingType::Queenside,
                _ => CastlingType::None,
            }
        }
    }
}

/// The squares along `rank` walking from `start` towards `end`, not
/// including `start` and including `end`.
fn walk(rank: Rank, start: File, end: File) -> Vec<Square> {
    let (start, end) = (start.as_index() as i32, end.as_index() as i32);
    let step = if end >= start { 1 } else { -1 };
    let mut squares = Vec::new();
    let mut file = start;
    while file != end {
        file += step;
        squares.push(Square::of(rank, File::from_index(file as usize)));
    }

    squares
}

fn is_capture(pos: &Position, mov: &Move, mover: Color) -> bool {
    if mov.is_en_passant() {
        return true;
    }

    match pos.piece_at(mov.destination()) {
        Some(piece) => piece.color != mover,
        None => false,
    }
}

/// Whether any piece of `color` can capture something.
fn can_capture(pos: &Position, color: Color) -> bool {
    let theirs = pos.pieces(color.toggle());
    pos.pieces(color).into_iter().any(|sq| {
        let mut targets = theirs;
        if let (Some(PieceKind::Pawn), Some(ep)) =
            (pos.piece_at(sq).map(|p| p.kind), pos.en_passant_square())
        {
            targets.set(ep);
        }

        !(pos.controlled_squares(sq) & targets).empty()
    })
}

/// Plays a move on a copy of the board the way a committed move is played:
/// castling rights are revisited and a check given is counted.
pub fn play(pos: &Position, mov: &Move) -> Position {
    let mover = pos
        .piece_at(mov.source())
        .map(|p| p.color)
        .unwrap_or_else(|| pos.side_to_move());
    let mut after = pos.clone();
    after.apply(mov);
    after.determine_castling_rights();
    if after.is_check(after.side_to_move()) {
        after.add_check(mover);
    }

    after
}

/// Why the given move can't be played on this board, or None if it can.
pub fn illegal_reason(pos: &Position, mov: &Move) -> Option<String> {
    let piece = match pos.piece_at(mov.source()) {
        Some(piece) => piece,
        None => return Some(format!("There's no piece on {}", mov.source())),
    };

    let mover = pos.side_to_move();
    if piece.color != mover {
        return Some("It's not your turn".to_owned());
    }

    let variant = pos.variant();
    if variant == Variant::Antichess {
        if !is_capture(pos, mov, mover) && can_capture(pos, mover) {
            return Some("You have to capture when you can".to_owned());
        }
    } else {
        let mut after = pos.clone();
        after.apply(mov);
        if variant == Variant::RacingKings && after.is_check(mover.toggle()) {
            return Some("You can't put your opponent in check".to_owned());
        }

        if after.is_check(mover) {
            return if pos.is_check(mover) {
                Some("You need to get out of check".to_owned())
            } else {
                Some("This would put you in check".to_owned())
            };
        }

        if mov.is_castle() {
            if let Some(reason) = castling_reason(pos, mov, mover) {
                return Some(reason);
            }
        }
    }

    promotion_reason(pos, mov, piece)
}

fn castling_reason(pos: &Position, mov: &Move, mover: Color) -> Option<String> {
    let side = mov.castling();
    let side_name = if side == CastlingType::Kingside {
        "kingside"
    } else {
        "queenside"
    };

    let has_right = match side {
        CastlingType::Kingside => pos.can_castle_kingside(mover),
        _ => pos.can_castle_queenside(mover),
    };

    let rook = match pos.castling_rook(mover, side) {
        Some(rook) if has_right => rook,
        _ => return Some(format!("You can't castle {}", side_name)),
    };

    if pos.variant() == Variant::Chess960 && rook != mov.destination() {
        return Some(format!("You can't castle {}", side_name));
    }

    if pos.is_check(mover) {
        return Some("You can't castle while in check".to_owned());
    }

    let king = mov.source();
    let back_rank = king.rank();
    let (king_target, rook_target) = castle_landing(back_rank, side);
    for sq in walk(back_rank, king.file(), king_target.file()) {
        if sq == rook {
            continue;
        }

        if pos.piece_at(sq).is_some() {
            return Some(format!("You can't castle because {} is occupied", sq));
        }

        if pos.is_attacked(mover.toggle(), sq) {
            return Some(format!("You can't castle because {} is under attack", sq));
        }
    }

    for sq in walk(back_rank, rook.file(), rook_target.file()) {
        if sq != king && pos.piece_at(sq).is_some() {
            return Some(format!("You can't castle because {} is occupied", sq));
        }
    }

    None
}

fn promotion_reason(pos: &Position, mov: &Move, piece: Piece) -> Option<String> {
    if piece.kind != PieceKind::Pawn {
        return None;
    }

    let reaches_end = mov.destination().rank() == Rank::promotion_rank(piece.color);
    match mov.promotion_piece() {
        None if reaches_end => Some("You have to promote".to_owned()),
        Some(_) if !reaches_end => Some("You can only promote on the last rank".to_owned()),
        Some(kind) if !pos.variant().can_promote_to(kind) => Some(format!(
            "You can't promote to {} in {}",
            kind.name(),
            pos.variant()
        )),
        _ => None,
    }
}

/// Every move the pieces of the side to move could make, before legality is
/// considered. Promotions are expanded to every piece of the variant and
/// castling moves are included when the right is held.
fn candidate_moves(pos: &Position) -> Vec<Move> {
    let side = pos.side_to_move();
    let variant = pos.variant();
    let promotion_rank = Rank::promotion_rank(side);
    let mut moves = Vec::new();
    for from in pos.pieces(side) {
        let is_pawn = pos.piece_at(from).map(|p| p.kind) == Some(PieceKind::Pawn);
        for to in pos.controlled_squares(from) {
            if is_pawn && to.rank() == promotion_rank {
                for &kind in variant.promotions() {
                    if let Ok(mov) = build_move(pos, from, to, Some(kind), false) {
                        moves.push(mov);
                    }
                }
            } else if let Ok(mov) = build_move(pos, from, to, None, false) {
                moves.push(mov);
            }
        }
    }

    let king = match pos.king_square(side) {
        Some(king) => king,
        None => return moves,
    };

    for &castling in &[CastlingType::Kingside, CastlingType::Queenside] {
        let rook = match pos.castling_rook(side, castling) {
            Some(rook) => rook,
            None => continue,
        };

        let to = if variant == Variant::Chess960 {
            rook
        } else {
            castle_landing(king.rank(), castling).0
        };

        if let Ok(mov) = build_move(pos, king, to, None, false) {
            if mov.castling() == castling && !moves.contains(&mov) {
                moves.push(mov);
            }
        }
    }

    moves
}

/// Every legal move of the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    candidate_moves(pos)
        .into_iter()
        .filter(|mov| illegal_reason(pos, mov).is_none())
        .collect()
}

pub fn has_legal_move(pos: &Position) -> bool {
    candidate_moves(pos)
        .iter()
        .any(|mov| illegal_reason(pos, mov).is_none())
}

/// Squares of the pieces of `color` and `kind` that could legally move to
/// `target`, for disambiguating algebraic notation.
pub(crate) fn legal_sources(pos: &Position, color: Color, kind: PieceKind, target: Square) -> Bitboard {
    let mut sources = Bitboard::none();
    for from in pos.pieces_of_kind(color, kind) {
        if !pos.controlled_squares(from).test(target) {
            continue;
        }

        let promotion = if kind == PieceKind::Pawn && target.rank() == Rank::promotion_rank(color) {
            Some(PieceKind::Queen)
        } else {
            None
        };

        let legal = build_move(pos, from, target, promotion, false)
            .map(|mov| illegal_reason(pos, &mov).is_none())
            .unwrap_or(false);
        if legal {
            sources.set(from);
        }
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(variant: Variant, fen: &str) -> Position {
        Position::from_fen(variant, fen).unwrap()
    }

    fn mov(pos: &Position, uci: &str) -> Move {
        let from = Square::from_algebraic(&uci[0..2]).unwrap();
        let to = Square::from_algebraic(&uci[2..4]).unwrap();
        let promotion = uci[4..].chars().next().map(|c| match c {
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'k' => PieceKind::King,
            _ => PieceKind::Pawn,
        });
        build_move(pos, from, to, promotion, false).unwrap()
    }

    #[test]
    fn twenty_moves_from_start() {
        let pos = Position::from_fen(Variant::Standard, "startpos").unwrap();
        assert_eq!(20, legal_moves(&pos).len());
    }

    #[test]
    fn build_move_errors() {
        let pos = Position::from_fen(Variant::Standard, "startpos").unwrap();
        let err = |from: Square, to: Square, promo: Option<PieceKind>| {
            match build_move(&pos, from, to, promo, true) {
                Err(ChessError::InvalidMove(reason)) => reason,
                other => panic!("unexpected {:?}", other),
            }
        };

        assert_eq!("There's no piece on e4", err(Square::E4, Square::E5, None));
        assert_eq!("Can't move to the same square", err(Square::E2, Square::E2, None));
        assert_eq!("Only pawns can promote", err(Square::G1, Square::F3, Some(PieceKind::Queen)));
        assert_eq!(
            "Promoting to a pawn makes no sense",
            err(Square::E2, Square::E4, Some(PieceKind::Pawn))
        );
        assert_eq!(
            "You can't promote to king in Standard",
            err(Square::E2, Square::E4, Some(PieceKind::King))
        );
        assert_eq!("That piece can't move to e5", err(Square::E2, Square::E5, None));
    }

    #[test]
    fn castling_detection() {
        let pos = position(Variant::Standard, "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(CastlingType::Kingside, mov(&pos, "e1g1").castling());
        assert_eq!(CastlingType::Queenside, mov(&pos, "e1c1").castling());
        assert_eq!(CastlingType::None, mov(&pos, "e1f1").castling());

        let pos = position(Variant::Chess960, "1r2k1r1/8/8/8/8/8/8/1R2K1R1 w KQkq - 0 1");
        assert_eq!(CastlingType::Kingside, mov(&pos, "e1g1").castling());
        assert_eq!(CastlingType::Queenside, mov(&pos, "e1b1").castling());
    }

    #[test]
    fn castling_reasons() {
        let pos = position(Variant::Standard, "r3k2r/8/8/8/8/8/8/R3K2R w Qkq - 0 1");
        assert_eq!(
            Some("You can't castle kingside".to_owned()),
            illegal_reason(&pos, &mov(&pos, "e1g1"))
        );

        let pos = position(Variant::Standard, "r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1");
        assert_eq!(
            Some("You can't castle because b1 is occupied".to_owned()),
            illegal_reason(&pos, &mov(&pos, "e1c1"))
        );

        let pos = position(Variant::Standard, "r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1");
        assert_eq!(
            Some("You can't castle because f1 is under attack".to_owned()),
            illegal_reason(&pos, &mov(&pos, "e1g1"))
        );
        assert_eq!(None, illegal_reason(&pos, &mov(&pos, "e1c1")));

        let pos = position(Variant::Standard, "r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1");
        assert_eq!(
            Some("You can't castle while in check".to_owned()),
            illegal_reason(&pos, &mov(&pos, "e1c1"))
        );
    }

    #[test]
    fn check_reasons() {
        let pos = position(Variant::Standard, "4k3/8/8/8/8/8/4r3/4K3 w - - 0 1");
        assert_eq!(
            Some("You need to get out of check".to_owned()),
            illegal_reason(&pos, &mov(&pos, "e1f2"))
        );
        assert_eq!(None, illegal_reason(&pos, &mov(&pos, "e1e2")));

        let pos = position(Variant::Standard, "4k3/8/8/8/8/8/3r4/4K3 w - - 0 1");
        assert_eq!(
            Some("This would put you in check".to_owned()),
            illegal_reason(&pos, &mov(&pos, "e1e2"))
        );
        assert_eq!(
            Some("It's not your turn".to_owned()),
            illegal_reason(&pos, &mov(&pos, "e8e7"))
        );
    }

    #[test]
    fn promotion_reasons() {
        let pos = position(Variant::Standard, "4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(
            Some("You have to promote".to_owned()),
            illegal_reason(&pos, &mov(&pos, "a7a8"))
        );
        assert_eq!(None, illegal_reason(&pos, &mov(&pos, "a7a8n")));
        assert_eq!(4 + 5, legal_moves(&pos).len());

        let pos = position(Variant::Antichess, "8/P7/8/8/8/8/8/k7 w - - 0 1");
        assert_eq!(None, illegal_reason(&pos, &mov(&pos, "a7a8k")));
        assert_eq!(5, legal_moves(&pos).len());
    }

    #[test]
    fn antichess_forces_captures() {
        let pos = position(Variant::Antichess, "8/8/8/3p4/4P3/8/8/8 w - - 0 1");
        assert_eq!(
            Some("You have to capture when you can".to_owned()),
            illegal_reason(&pos, &mov(&pos, "e4e5"))
        );
        assert_eq!(1, legal_moves(&pos).len());
    }

    #[test]
    fn racing_kings_forbids_checks() {
        let pos = position(Variant::RacingKings, "8/8/8/8/8/8/k7/1R4K1 w - - 0 1");
        assert_eq!(
            Some("You can't put your opponent in check".to_owned()),
            illegal_reason(&pos, &mov(&pos, "b1a1"))
        );
    }

    #[test]
    fn play_counts_checks() {
        let pos = position(Variant::ThreeCheck, "4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let after = play(&pos, &mov(&pos, "a1a8"));
        assert_eq!(1, after.checks(Color::White));
        assert_eq!(0, after.checks(Color::Black));
    }

    #[test]
    fn legal_sources_skip_pinned_pieces() {
        let pos = position(Variant::Standard, "4k3/4r3/8/8/8/2N3N1/8/4K3 w - - 0 1");
        assert_eq!(2, legal_sources(&pos, Color::White, PieceKind::Knight, Square::E4).count());

        let pos = position(Variant::Standard, "4k3/4r3/8/8/8/2N1N3/8/4K3 w - - 0 1");
        let sources = legal_sources(&pos, Color::White, PieceKind::Knight, Square::D5);
        assert!(sources.test(Square::C3));
        assert!(!sources.test(Square::E3));
    }
}
