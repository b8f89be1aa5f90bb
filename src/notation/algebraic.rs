// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Algebraic notation in its six common variations and seventeen languages.
//!
//! Emission is exact; parsing is tolerant. The parser ignores capture marks,
//! check and mate signs, annotation glyphs and parentheses, accepts figurines
//! in place of letters, and finds the moving piece from whatever
//! disambiguation the text carries.
use std::fmt;

use crate::bitboard::Bitboard;
use crate::error::{ChessError, ChessResult};
use crate::game::{build_move, has_legal_move, illegal_reason, is_checkmate, legal_sources, play};
use crate::game::{Game, GameStatus};
use crate::language::Language;
use crate::moves::{CastlingType, Move};
use crate::position::Position;
use crate::types::TableIndex;
use crate::types::{Color, File, PieceKind, Rank, Square, PIECE_KINDS};
use crate::variant::Variant;

use super::uci::parse_uci;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AlgebraicVariation {
    /// Standard Algebraic Notation, as written in PGN: `Nf3`, `exd5`, `O-O`.
    San,
    /// SAN with zeros for castling: `0-0`.
    FideSan,
    /// Figurine Algebraic Notation: `♘f3`.
    Fan,
    /// Minimal Algebraic Notation, with no capture or check marks.
    Man,
    /// Long Algebraic Notation, which always names the source square:
    /// `Ng1-f3`.
    Lan,
    /// Reversible Algebraic Notation, LAN that also names the captured
    /// piece: `Bb5xNc6`.
    Ran,
}

pub static ALGEBRAIC_VARIATIONS: [AlgebraicVariation; 6] = [
    AlgebraicVariation::San,
    AlgebraicVariation::FideSan,
    AlgebraicVariation::Fan,
    AlgebraicVariation::Man,
    AlgebraicVariation::Lan,
    AlgebraicVariation::Ran,
];

impl AlgebraicVariation {
    pub fn name(self) -> &'static str {
        match self {
            AlgebraicVariation::San => "SAN",
            AlgebraicVariation::FideSan => "FIDE-SAN",
            AlgebraicVariation::Fan => "FAN",
            AlgebraicVariation::Man => "MAN",
            AlgebraicVariation::Lan => "LAN",
            AlgebraicVariation::Ran => "RAN",
        }
    }

    pub fn from_name(name: &str) -> Option<AlgebraicVariation> {
        let name = name.replace('_', "-");
        ALGEBRAIC_VARIATIONS
            .iter()
            .cloned()
            .find(|v| v.name().eq_ignore_ascii_case(&name))
    }

    fn names_source(self) -> bool {
        match self {
            AlgebraicVariation::Lan | AlgebraicVariation::Ran => true,
            _ => false,
        }
    }
}

impl Default for AlgebraicVariation {
    fn default() -> AlgebraicVariation {
        AlgebraicVariation::San
    }
}

impl fmt::Display for AlgebraicVariation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

//
// Emission
//

fn piece_char(kind: PieceKind, color: Color, variation: AlgebraicVariation, language: Language) -> char {
    if variation == AlgebraicVariation::Fan {
        kind.figurine(color)
    } else {
        language.letter(kind)
    }
}

/// Writes a move, which must be playable on `pos`, in algebraic notation.
pub fn to_algebraic(
    pos: &Position,
    mov: &Move,
    variation: AlgebraicVariation,
    language: Language,
) -> String {
    let mut an = String::new();
    let zero = variation == AlgebraicVariation::FideSan;
    match mov.castling() {
        CastlingType::Queenside => an.push_str(if zero { "0-0-0" } else { "O-O-O" }),
        CastlingType::Kingside => an.push_str(if zero { "0-0" } else { "O-O" }),
        CastlingType::None => {
            let from = mov.source();
            let to = mov.destination();
            let piece = pos
                .piece_at(from)
                .expect("invalid move: no piece at source square");
            let captured = pos.piece_at(to);
            let capture = captured.is_some() || mov.is_en_passant();
            if piece.kind != PieceKind::Pawn {
                an.push(piece_char(piece.kind, piece.color, variation, language));
            }

            if variation.names_source() {
                an.push_str(&from.to_string());
            } else {
                let others = legal_sources(pos, piece.color, piece.kind, to)
                    .without(Bitboard::from_square(from));
                if !others.empty() || (capture && piece.kind == PieceKind::Pawn) {
                    if others.file(from.file()).empty() {
                        an.push_str(&from.file().to_string());
                    } else if others.rank(from.rank()).empty() {
                        an.push_str(&from.rank().to_string());
                    } else {
                        an.push_str(&from.to_string());
                    }
                }
            }

            if variation != AlgebraicVariation::Man {
                if capture {
                    an.push('x');
                    if variation == AlgebraicVariation::Ran {
                        if let Some(victim) = captured.filter(|p| p.kind != PieceKind::Pawn) {
                            an.push(piece_char(victim.kind, victim.color, variation, language));
                        }
                    }
                } else if variation.names_source() {
                    an.push('-');
                }
            }

            an.push_str(&to.to_string());
            if let Some(kind) = mov.promotion_piece() {
                an.push('=');
                an.push(piece_char(kind, piece.color, variation, language));
            }
        }
    }

    let after = play(pos, mov);
    if is_checkmate(&after, has_legal_move(&after)) {
        an.push('#');
    } else if variation != AlgebraicVariation::Man && after.is_check(after.side_to_move()) {
        an.push('+');
    }

    an
}

//
// Parsing
//

fn invalid<T>(reason: String) -> ChessResult<T> {
    Err(ChessError::InvalidMove(reason))
}

/// Reads a piece letter of the given language or a figurine. Promotions never
/// name pawns, which matters where the pawn shares a letter with another
/// piece's letter elsewhere.
fn kind_from_char(c: char, language: Language, allow_pawn: bool) -> Option<PieceKind> {
    if let Some(kind) = PieceKind::from_figurine(c) {
        return Some(kind);
    }

    let upper = c.to_uppercase().next().unwrap_or(c);
    PIECE_KINDS
        .iter()
        .cloned()
        .filter(|&k| allow_pawn || k != PieceKind::Pawn)
        .find(|&k| language.letter(k) == upper)
}

fn square_of(chars: &[char]) -> Option<Square> {
    let name: String = chars.iter().collect();
    Square::from_algebraic(&name)
}

/// Parses a move in any of the algebraic variations, with piece letters of
/// the given language or figurines.
pub fn parse_algebraic(pos: &Position, text: &str, language: Language) -> ChessResult<Move> {
    let side = pos.side_to_move();
    let an: String = text
        .trim()
        .chars()
        .filter(|c| !"x+?!#=()".contains(*c))
        .collect();

    let castling = match an.as_str() {
        "O-O-O" | "o-o-o" | "0-0-0" => CastlingType::Queenside,
        "O-O" | "o-o" | "0-0" => CastlingType::Kingside,
        _ => CastlingType::None,
    };

    if castling != CastlingType::None {
        return parse_castle(pos, castling);
    }

    if an.len() == 4 && an.is_ascii() {
        if let Some(from) = Square::from_algebraic(&an[0..2]) {
            let is_king = pos.piece_at(from).map(|p| p.kind) == Some(PieceKind::King);
            if is_king && Square::from_algebraic(&an[2..4]).is_some() {
                return parse_uci(pos, &an)?
                    .ok_or_else(|| ChessError::InvalidMove(format!("Invalid move: {}", text)));
            }
        }
    }

    let chars: Vec<char> = an.chars().filter(|&c| c != '-').collect();
    if chars.len() < 2 {
        return invalid(format!("Invalid move: {}", text));
    }

    let mut end = chars.len();
    let mut promotion = None;
    if !chars[end - 1].is_ascii_digit() {
        let kind = kind_from_char(chars[end - 1], language, false)
            .ok_or_else(|| ChessError::InvalidMove(format!("Invalid promotion in {}", text)))?;
        promotion = Some(kind);
        end -= 1;
    }

    if end < 2 {
        return invalid(format!("Invalid move: {}", text));
    }

    let to = square_of(&chars[end - 2..end])
        .ok_or_else(|| ChessError::InvalidMove(format!("Invalid square in {}", text)))?;
    let mut rest = &chars[..end - 2];

    let mut kind = PieceKind::Pawn;
    if let Some(&first) = rest.first() {
        let is_letter = first.is_uppercase() || PieceKind::from_figurine(first).is_some();
        if let Some(k) = kind_from_char(first, language, true).filter(|_| is_letter) {
            kind = k;
            rest = &rest[1..];
        }
    }

    if rest.len() >= 2 {
        let from = square_of(&rest[0..2])
            .ok_or_else(|| ChessError::InvalidMove(format!("Invalid square in {}", text)))?;
        return build_move(pos, from, to, promotion, true);
    }

    let mut candidates = pos.pieces_of_kind(side, kind);
    if let Some(&c) = rest.first() {
        if let Some(digit) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
            candidates = candidates.rank(Rank::from_index(digit as usize - 1));
        } else if ('a'..='h').contains(&c) {
            candidates = candidates.file(File::from_index(c as usize - 'a' as usize));
        } else {
            return invalid(format!("Invalid disambiguation in {}", text));
        }
    }

    let moves: Vec<Move> = candidates
        .into_iter()
        .filter(|&from| pos.controlled_squares(from).test(to))
        .filter_map(|from| build_move(pos, from, to, promotion, true).ok())
        .filter(|m| illegal_reason(pos, m).is_none())
        .collect();

    match moves.len() {
        0 => invalid(format!("No such piece for {}", text)),
        1 => Ok(moves.into_iter().next().expect("invalid move: candidate vanished")),
        _ => invalid(format!("Ambiguous piece for {}", text)),
    }
}

fn parse_castle(pos: &Position, castling: CastlingType) -> ChessResult<Move> {
    let side = pos.side_to_move();
    let back_rank = Rank::back_rank(side);
    if pos.variant() == Variant::Chess960 {
        let king = pos
            .king_square(side)
            .ok_or_else(|| ChessError::InvalidMove("No such piece for castling".to_owned()))?;
        let rook = pos
            .castling_rook(side, castling)
            .ok_or_else(|| ChessError::InvalidMove("No such piece for castling".to_owned()))?;
        return build_move(pos, king, rook, None, false);
    }

    let to_file = if castling == CastlingType::Kingside {
        File::G
    } else {
        File::C
    };

    let uci = format!("{}{}", Square::of(back_rank, File::E), Square::of(back_rank, to_file));
    parse_uci(pos, &uci)?.ok_or_else(|| ChessError::InvalidMove("Invalid castle".to_owned()))
}

impl Game {
    /// Parses an English algebraic move on the current board.
    pub fn san_move(&self, text: &str) -> ChessResult<Move> {
        self.algebraic_move(text, Language::English)
    }

    /// Parses an algebraic move written in the given language.
    pub fn algebraic_move(&self, text: &str, language: Language) -> ChessResult<Move> {
        if self.status() == GameStatus::Building {
            return Err(ChessError::GameNotStarted);
        }

        parse_algebraic(self.position(), text, language)
    }

    /// Parses and commits an English algebraic move.
    pub fn play_san(&mut self, text: &str) -> ChessResult<()> {
        let mov = self.san_move(text)?;
        self.commit(mov)
    }

    /// Writes a move that is about to be played in algebraic notation.
    pub fn to_algebraic(&self, mov: &Move, variation: AlgebraicVariation, language: Language) -> String {
        to_algebraic(self.position(), mov, variation, language)
    }

    /// The moves played so far, in algebraic notation.
    pub fn algebraic_history(&self, variation: AlgebraicVariation, language: Language) -> Vec<String> {
        let mut pos = match self.start_position() {
            Some(start) => start.clone(),
            None => return Vec::new(),
        };

        let mut history = Vec::with_capacity(self.moves().len());
        for mov in self.moves() {
            history.push(to_algebraic(&pos, mov, variation, language));
            pos = play(&pos, mov);
        }

        history
    }
}
