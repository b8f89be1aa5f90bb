// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! UCI move strings: the source square, the destination square and an
//! optional lower-case promotion letter (`e2e4`, `a7a8q`).
use std::convert::TryFrom;

use crate::error::{ChessError, ChessResult};
use crate::game::{build_move, Game, GameStatus};
use crate::moves::{CastlingType, Move};
use crate::position::Position;
use crate::types::{File, Piece, PieceKind, Rank, Square};
use crate::variant::Variant;

/// Parses a UCI move against the given board. `(none)` and `empty`, which
/// engines send when they have no move, parse as None.
pub fn parse_uci(pos: &Position, uci: &str) -> ChessResult<Option<Move>> {
    let uci = uci.trim();
    if uci == "(none)" || uci == "empty" {
        return Ok(None);
    }

    let invalid = || ChessError::InvalidMove(format!("Invalid UCI notation: {}", uci));
    if !uci.is_ascii() || (uci.len() != 4 && uci.len() != 5) {
        return Err(invalid());
    }

    let mut from = Square::from_algebraic(&uci[0..2]).ok_or_else(invalid)?;
    let mut to = Square::from_algebraic(&uci[2..4]).ok_or_else(invalid)?;
    let promotion = match uci[4..].chars().next() {
        Some(c) => Some(PieceKind::try_from(c).map_err(|_| invalid())?),
        None => None,
    };

    if pos.variant() == Variant::Chess960 {
        if let Some((king, rook)) = chess960_castle(pos, from, to) {
            from = king;
            to = rook;
        }
    }

    build_move(pos, from, to, promotion, true).map(Some)
}

/// Engines and older files write Chess960 castling the orthodox way, as
/// `e1g1`/`e1c1`. With the matching right and the king on e1 that means the
/// king takes the outermost rook on that side.
fn chess960_castle(pos: &Position, from: Square, to: Square) -> Option<(Square, Square)> {
    let side = pos.side_to_move();
    let back_rank = Rank::back_rank(side);
    if from != Square::of(back_rank, File::E) || to.rank() != back_rank {
        return None;
    }

    if pos.piece_at(from) != Some(Piece::new(PieceKind::King, side)) {
        return None;
    }

    let castling = match to.file() {
        File::G if pos.can_castle_kingside(side) => CastlingType::Kingside,
        File::C if pos.can_castle_queenside(side) => CastlingType::Queenside,
        _ => return None,
    };

    let rook = pos.castling_rook(side, castling)?;
    Some((from, rook))
}

impl Game {
    /// Parses a UCI move on the current board.
    pub fn uci_move(&self, uci: &str) -> ChessResult<Option<Move>> {
        if self.status() == GameStatus::Building {
            return Err(ChessError::GameNotStarted);
        }

        parse_uci(self.position(), uci)
    }

    /// Parses and commits a UCI move.
    pub fn play_uci(&mut self, uci: &str) -> ChessResult<()> {
        match self.uci_move(uci)? {
            Some(mov) => self.commit(mov),
            None => Err(ChessError::InvalidMove(format!("Invalid UCI notation: {}", uci))),
        }
    }

    /// The moves played so far in UCI notation, separated by spaces.
    pub fn uci_moves(&self) -> String {
        self.moves()
            .iter()
            .map(|m| m.as_uci())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves() {
        let pos = Position::from_fen(Variant::Standard, "startpos").unwrap();
        let mov = parse_uci(&pos, "e2e4").unwrap().unwrap();
        assert_eq!(Square::E2, mov.source());
        assert_eq!(Square::E4, mov.destination());
        assert!(parse_uci(&pos, "(none)").unwrap().is_none());
        assert!(parse_uci(&pos, "e2").is_err());
        assert!(parse_uci(&pos, "e2e4x").is_err());
        assert!(parse_uci(&pos, "z2e4").is_err());
    }

    #[test]
    fn parses_promotions() {
        let pos = Position::from_fen(Variant::Standard, "4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mov = parse_uci(&pos, "a7a8N").unwrap().unwrap();
        assert_eq!(Some(PieceKind::Knight), mov.promotion_piece());
        assert_eq!("a7a8n", mov.as_uci());
    }

    #[test]
    fn chess960_orthodox_castling() {
        let pos = Position::from_fen(Variant::Chess960, "rk2r3/8/8/8/8/8/8/RK2R3 w KQkq - 0 1").unwrap();
        let mov = parse_uci(&pos, "e1g1").unwrap().unwrap();
        assert!(!mov.is_castle());

        let pos = Position::from_fen(Variant::Chess960, "1r2k1r1/8/8/8/8/8/8/1R2K1R1 w KQkq - 0 1").unwrap();
        let mov = parse_uci(&pos, "e1g1").unwrap().unwrap();
        assert_eq!(Square::G1, mov.destination());
        assert!(mov.is_kingside_castle());

        let mov = parse_uci(&pos, "e1c1").unwrap().unwrap();
        assert_eq!(Square::B1, mov.destination());
        assert!(mov.is_queenside_castle());
    }
}
