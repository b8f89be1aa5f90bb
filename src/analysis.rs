// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::bitboard::Bitboard;
use crate::position::Position;
use crate::types::{Color, PieceKind, Square, COLORS, PIECE_KINDS};

/// Provider of common board analyses upon a static position: who controls,
/// attacks and defends a square, and how the material stands.
pub struct Analysis<'a> {
    pos: &'a Position,
}

impl<'a> Analysis<'a> {
    pub fn new(pos: &'a Position) -> Analysis<'a> {
        Analysis { pos }
    }

    /// Squares of every piece that could move to `square`.
    pub fn controllers(&self, square: Square) -> Bitboard {
        COLORS
            .iter()
            .fold(Bitboard::none(), |acc, &c| acc | self.controllers_by(square, c))
    }

    /// Squares of the pieces of color `by` that could move to `square`.
    pub fn controllers_by(&self, square: Square, by: Color) -> Bitboard {
        self.pos
            .pieces(by)
            .into_iter()
            .filter(|&sq| self.pos.controlled_squares(sq).test(square))
            .collect()
    }

    /// Opposing pieces that attack the piece on `square`. Empty squares have
    /// no attackers.
    pub fn attackers(&self, square: Square) -> Bitboard {
        match self.pos.piece_at(square) {
            Some(piece) => self.pos.squares_attacking(piece.color.toggle(), square),
            None => Bitboard::none(),
        }
    }

    /// Pieces of the same color that protect the piece on `square`.
    pub fn defenders(&self, square: Square) -> Bitboard {
        match self.pos.piece_at(square) {
            Some(piece) => self.pos.squares_attacking(piece.color, square),
            None => Bitboard::none(),
        }
    }

    /// A piece hangs when it is attacked and nothing defends it.
    pub fn is_hanging(&self, square: Square) -> bool {
        !self.attackers(square).empty() && self.defenders(square).empty()
    }

    /// The total material value of the pieces of one color.
    pub fn material_score_of(&self, color: Color) -> i32 {
        PIECE_KINDS
            .iter()
            .map(|&kind| self.pos.pieces_of_kind(color, kind).count() as i32 * kind.material_value())
            .sum()
    }

    /// Material balance as seen by `perspective`; positive when it is ahead.
    pub fn material_score(&self, perspective: Color) -> i32 {
        self.material_score_of(perspective) - self.material_score_of(perspective.toggle())
    }

    /// Number of pieces of the given kind and color, for quick material
    /// signatures.
    pub fn count(&self, color: Color, kind: PieceKind) -> u32 {
        self.pos.pieces_of_kind(color, kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Variant;

    #[test]
    fn hanging_pawn() {
        let pos = Position::from_fen(
            Variant::Standard,
            "rnbqkb1r/pppppppp/5n2/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq -",
        )
        .unwrap();
        let analysis = Analysis::new(&pos);
        assert_eq!(1, analysis.controllers(Square::E4).count());
        assert_eq!(1, analysis.attackers(Square::E4).count());
        assert_eq!(0, analysis.defenders(Square::E4).count());
        assert!(analysis.is_hanging(Square::E4));
        assert!(!analysis.is_hanging(Square::F6));
    }

    #[test]
    fn defended_piece_is_not_hanging() {
        let pos = Position::from_fen(Variant::Standard, "4k3/8/3p4/4N3/8/8/8/4K2R w - - 0 1").unwrap();
        let analysis = Analysis::new(&pos);
        assert_eq!(1, analysis.attackers(Square::E5).count());
        assert!(analysis.is_hanging(Square::E5));

        let pos = Position::from_fen(Variant::Standard, "4k3/8/3p4/4N3/8/8/8/4R1K1 w - - 0 1").unwrap();
        assert!(!Analysis::new(&pos).is_hanging(Square::E5));
    }

    #[test]
    fn material() {
        let pos = Position::from_fen(Variant::Standard, "startpos").unwrap();
        let analysis = Analysis::new(&pos);
        assert_eq!(39, analysis.material_score_of(Color::White));
        assert_eq!(0, analysis.material_score(Color::Black));

        let pos = Position::from_fen(Variant::Standard, "4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let analysis = Analysis::new(&pos);
        assert_eq!(9, analysis.material_score(Color::White));
        assert_eq!(-9, analysis.material_score(Color::Black));
        assert_eq!(1, analysis.count(Color::White, PieceKind::Queen));
    }
}
