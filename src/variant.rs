// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;

use crate::types::PieceKind;

pub const STANDARD_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const ANTICHESS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1";
const RACING_KINGS_FEN: &str = "8/8/8/8/8/8/krbnNBRK/qrbnNBRQ w - - 0 1";
const HORDE_FEN: &str =
    "rnbqkbnr/pppppppp/8/1PP2PP1/PPPPPPPP/PPPPPPPP/PPPPPPPP/PPPPPPPP w kq - 0 1";

/// Sentinel FEN that loads the variant's own start position.
pub const STARTPOS: &str = "startpos";

/// Sentinel FEN that loads a uniformly random Chess960 position.
pub const RANDOM_960: &str = "random960";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Standard,
    Antichess,
    ThreeCheck,
    KingOfTheHill,
    RacingKings,
    Horde,
    Chess960,
}

pub static VARIANTS: [Variant; 7] = [
    Variant::Standard,
    Variant::Antichess,
    Variant::ThreeCheck,
    Variant::KingOfTheHill,
    Variant::RacingKings,
    Variant::Horde,
    Variant::Chess960,
];

static STANDARD_PROMOTIONS: [PieceKind; 4] = [
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
];

static ANTICHESS_PROMOTIONS: [PieceKind; 5] = [
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

impl Variant {
    /// The human-readable name, as written in a PGN Variant tag.
    pub fn name(self) -> &'static str {
        match self {
            Variant::Standard => "Standard",
            Variant::Antichess => "Antichess",
            Variant::ThreeCheck => "Three-check",
            Variant::KingOfTheHill => "King of the Hill",
            Variant::RacingKings => "Racing Kings",
            Variant::Horde => "Horde",
            Variant::Chess960 => "Chess960",
        }
    }

    /// The value of the UCI_Variant option engines use for this variant.
    pub fn uci_key(self) -> &'static str {
        match self {
            Variant::Standard => "chess",
            Variant::Antichess => "giveaway",
            Variant::ThreeCheck => "3check",
            Variant::KingOfTheHill => "kingofthehill",
            Variant::RacingKings => "racingkings",
            Variant::Horde => "horde",
            Variant::Chess960 => "chess960",
        }
    }

    /// The FEN a game of this variant starts from. Chess960 answers with
    /// the `random960` sentinel.
    pub fn start_fen(self) -> &'static str {
        match self {
            Variant::Standard | Variant::ThreeCheck | Variant::KingOfTheHill => STANDARD_FEN,
            Variant::Antichess => ANTICHESS_FEN,
            Variant::RacingKings => RACING_KINGS_FEN,
            Variant::Horde => HORDE_FEN,
            Variant::Chess960 => RANDOM_960,
        }
    }

    pub fn promotions(self) -> &'static [PieceKind] {
        match self {
            Variant::Antichess => &ANTICHESS_PROMOTIONS,
            _ => &STANDARD_PROMOTIONS,
        }
    }

    pub fn can_promote_to(self, kind: PieceKind) -> bool {
        self.promotions().contains(&kind)
    }

    /// Whether castling rights can be guessed from where the kings and rooks
    /// stand when a FEN omits them.
    pub fn infers_castling(self) -> bool {
        match self {
            Variant::Chess960 | Variant::Antichess | Variant::RacingKings => false,
            _ => true,
        }
    }

    /// Case-insensitive lookup by display name. "Fischerandom" is accepted as
    /// an alias of Chess960.
    pub fn from_name(name: &str) -> Option<Variant> {
        if name.eq_ignore_ascii_case("Fischerandom") {
            return Some(Variant::Chess960);
        }

        VARIANTS
            .iter()
            .cloned()
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }

    /// Case-insensitive lookup by UCI key.
    pub fn from_key(key: &str) -> Option<Variant> {
        let variant = match key.to_ascii_lowercase().as_str() {
            "chess" | "standard" | "fromposition" => Variant::Standard,
            "antichess" | "giveaway" => Variant::Antichess,
            "3check" | "threecheck" => Variant::ThreeCheck,
            "kingofthehill" => Variant::KingOfTheHill,
            "racingkings" => Variant::RacingKings,
            "horde" => Variant::Horde,
            "chess960" => Variant::Chess960,
            _ => return None,
        };
        Some(variant)
    }

    /// Accepts either a display name or a UCI key.
    pub fn lookup(text: &str) -> Option<Variant> {
        Variant::from_name(text).or_else(|| Variant::from_key(text))
    }
}

impl Default for Variant {
    fn default() -> Variant {
        Variant::Standard
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_lookup() {
        assert_eq!(Some(Variant::KingOfTheHill), Variant::from_name("king of the hill"));
        assert_eq!(Some(Variant::Chess960), Variant::from_name("Fischerandom"));
        assert_eq!(None, Variant::from_name("Crazyhouse"));
    }

    #[test]
    fn key_lookup() {
        assert_eq!(Some(Variant::Standard), Variant::from_key("fromposition"));
        assert_eq!(Some(Variant::ThreeCheck), Variant::from_key("threecheck"));
        assert_eq!(Some(Variant::Antichess), Variant::from_key("giveaway"));
        assert_eq!(Some(Variant::Chess960), Variant::lookup("chess960"));
    }

    #[test]
    fn antichess_promotes_to_king() {
        assert!(Variant::Antichess.can_promote_to(PieceKind::King));
        assert!(!Variant::Standard.can_promote_to(PieceKind::King));
        assert!(!Variant::Horde.can_promote_to(PieceKind::Pawn));
    }
}
