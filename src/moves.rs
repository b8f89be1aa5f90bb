// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `moves` module contains the definition of a `Move`.
//!
//! A move is a plain value: the squares it connects, an optional promotion
//! and two classifications derived when the move is constructed against a
//! game (castling side and en passant). Moves never refer back to the game
//! that produced them; anything that needs the board takes the game as an
//! argument.
//!
//! ## Castling
//! Orthodox castling is encoded with the king's start and stop squares
//! (`e1g1`). In Chess960 the king "captures" its own rook, so the
//! destination is the square of the castling rook (`e1h1`, `b1a1`, ...).
//! Either way `castling()` tells which side is being castled.
use std::fmt;

use crate::types::{PieceKind, Square};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CastlingType {
    None,
    Kingside,
    Queenside,
}

impl Default for CastlingType {
    fn default() -> CastlingType {
        CastlingType::None
    }
}

#[derive(Clone, Debug)]
pub struct Move {
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
    castling: CastlingType,
    en_passant: bool,
    annotation: String,
    annotation_tags: Vec<String>,
}

impl Move {
    /// Builds a move with explicit classifications. Most callers want
    /// `Game::new_move`, which derives them from the board.
    pub fn new(
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
        castling: CastlingType,
        en_passant: bool,
    ) -> Move {
        Move {
            from,
            to,
            promotion,
            castling,
            en_passant,
            annotation: String::new(),
            annotation_tags: Vec::new(),
        }
    }

    pub fn source(&self) -> Square {
        self.from
    }

    pub fn destination(&self) -> Square {
        self.to
    }

    pub fn promotion_piece(&self) -> Option<PieceKind> {
        self.promotion
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    pub fn castling(&self) -> CastlingType {
        self.castling
    }

    pub fn is_castle(&self) -> bool {
        self.castling != CastlingType::None
    }

    pub fn is_kingside_castle(&self) -> bool {
        self.castling == CastlingType::Kingside
    }

    pub fn is_queenside_castle(&self) -> bool {
        self.castling == CastlingType::Queenside
    }

    pub fn is_en_passant(&self) -> bool {
        self.en_passant
    }

    //
    // Annotations
    //

    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    pub fn annotate<S: Into<String>>(&mut self, text: S) {
        self.annotation = text.into();
    }

    /// Machine-readable annotation fragments such as `[%clk 0:03:00]`.
    pub fn annotation_tags(&self) -> &[String] {
        &self.annotation_tags
    }

    pub fn add_annotation_tag<S: Into<String>>(&mut self, tag: S) {
        self.annotation_tags.push(tag.into());
    }

    pub fn clear_annotations(&mut self) {
        self.annotation.clear();
        self.annotation_tags.clear();
    }

    pub fn has_annotation(&self, with_tags: bool) -> bool {
        !self.annotation.is_empty() || (with_tags && !self.annotation_tags.is_empty())
    }

    /// The text written between braces in PGN and after an annotation
    /// record in CGN: the annotation tags, then the free text.
    pub fn annotation_text(&self, with_tags: bool) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if with_tags {
            parts.extend(self.annotation_tags.iter().map(|t| t.as_str()));
        }

        if !self.annotation.is_empty() {
            parts.push(&self.annotation);
        }

        parts.join(" ")
    }

    /// The UCI form of this move. Promotions are suffixed with the lower-case
    /// English letter of the new piece.
    pub fn as_uci(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

// Annotations are commentary and don't take part in identity.
impl PartialEq for Move {
    fn eq(&self, other: &Move) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.promotion == other.promotion
            && self.castling == other.castling
            && self.en_passant == other.en_passant
    }
}

impl Eq for Move {}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_uci())
    }
}
