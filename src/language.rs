// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Piece letters used by algebraic notation in the supported natural languages.
use crate::types::{PieceKind, TableIndex, PIECE_KINDS};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum Language {
    English,
    Czech,
    Danish,
    Dutch,
    Estonian,
    Finnish,
    French,
    German,
    Hungarian,
    Icelandic,
    Italian,
    Norwegian,
    Polish,
    Portuguese,
    Romanian,
    Spanish,
    Swedish,
}

pub static LANGUAGES: [Language; 17] = [
    Language::English,
    Language::Czech,
    Language::Danish,
    Language::Dutch,
    Language::Estonian,
    Language::Finnish,
    Language::French,
    Language::German,
    Language::Hungarian,
    Language::Icelandic,
    Language::Italian,
    Language::Norwegian,
    Language::Polish,
    Language::Portuguese,
    Language::Romanian,
    Language::Spanish,
    Language::Swedish,
];

// Letters for pawn, knight, bishop, rook, queen and king, in that order,
// indexed by `Language`.
static LETTERS: [[char; 6]; 17] = [
    ['P', 'N', 'B', 'R', 'Q', 'K'],
    ['P', 'J', 'S', 'V', 'D', 'K'],
    ['B', 'S', 'L', 'T', 'D', 'K'],
    ['O', 'P', 'L', 'T', 'D', 'K'],
    ['P', 'R', 'O', 'V', 'L', 'K'],
    ['P', 'R', 'L', 'T', 'D', 'K'],
    ['P', 'C', 'F', 'T', 'D', 'R'],
    ['B', 'S', 'L', 'T', 'D', 'K'],
    ['G', 'H', 'F', 'B', 'V', 'K'],
    ['P', 'R', 'B', 'H', 'D', 'K'],
    ['P', 'C', 'A', 'T', 'D', 'R'],
    ['B', 'S', 'L', 'T', 'D', 'K'],
    ['P', 'S', 'G', 'W', 'H', 'K'],
    ['P', 'C', 'B', 'T', 'D', 'R'],
    ['P', 'C', 'N', 'T', 'D', 'R'],
    ['P', 'C', 'A', 'T', 'D', 'R'],
    ['B', 'S', 'L', 'T', 'D', 'K'],
];

impl Language {
    /// The upper-case letter for the given piece kind.
    pub fn letter(self, kind: PieceKind) -> char {
        LETTERS[self.as_index()][kind.as_index()]
    }

    /// Finds the piece kind written with the given letter, ignoring case.
    pub fn piece_from_letter(self, letter: char) -> Option<PieceKind> {
        let upper = letter.to_ascii_uppercase();
        PIECE_KINDS
            .iter()
            .cloned()
            .find(|&kind| self.letter(kind) == upper)
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Czech => "Czech",
            Language::Danish => "Danish",
            Language::Dutch => "Dutch",
            Language::Estonian => "Estonian",
            Language::Finnish => "Finnish",
            Language::French => "French",
            Language::German => "German",
            Language::Hungarian => "Hungarian",
            Language::Icelandic => "Icelandic",
            Language::Italian => "Italian",
            Language::Norwegian => "Norwegian",
            Language::Polish => "Polish",
            Language::Portuguese => "Portuguese",
            Language::Romanian => "Romanian",
            Language::Spanish => "Spanish",
            Language::Swedish => "Swedish",
        }
    }

    pub fn from_name(name: &str) -> Option<Language> {
        LANGUAGES
            .iter()
            .cloned()
            .find(|lang| lang.name().eq_ignore_ascii_case(name))
    }
}

impl Default for Language {
    fn default() -> Language {
        Language::English
    }
}
