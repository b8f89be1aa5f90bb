// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reading and writing moves and games: UCI and algebraic move notation,
//! PGN text and the compact binary CGN format.
use regex::Regex;

use crate::error::{ChessError, ChessResult};
use crate::game::{Clock, EndReason, Game, GameStatus};
use crate::variant::Variant;

mod algebraic;
mod cgn;
mod pgn;
mod uci;

pub use self::algebraic::{parse_algebraic, to_algebraic, AlgebraicVariation, ALGEBRAIC_VARIATIONS};
pub use self::cgn::{parse_cgn, to_cgn, write_cgn, CgnVersion};
pub use self::pgn::{parse_pgn, parse_pgn_game, to_pgn};
pub use self::uci::parse_uci;

lazy_static! {
    static ref ANNOTATION_TAG: Regex = Regex::new(r"\[%[^\]]*\]").unwrap();
}

/// Tag values that mean "unknown" and aren't worth keeping.
const PLACEHOLDERS: [&str; 3] = ["-", "?", "????.??.??"];

/// What an imported game's tags say about how it ended and how it was timed.
/// These take effect once the moves have been replayed.
#[derive(Debug, Default)]
struct Imported {
    termination: Option<EndReason>,
    clock: Option<Clock>,
    result: Option<GameStatus>,
}

/// Configures a new game from imported tags. The variant is applied before
/// anything else since it decides how the FEN is read.
fn configure(game: &mut Game, tags: Vec<(String, String)>) -> ChessResult<Imported> {
    let mut imported = Imported::default();
    if let Some((_, name)) = tags.iter().find(|(k, _)| k.eq_ignore_ascii_case("Variant")) {
        let variant = Variant::lookup(name).ok_or_else(|| ChessError::UnknownVariant(name.clone()))?;
        game.set_variant(variant);
    }

    for (key, value) in tags {
        match key.to_ascii_lowercase().as_str() {
            "variant" | "setup" | "plycount" => {}
            "fen" => game.load_fen(&value)?,
            "result" => imported.result = GameStatus::from_result(&value),
            "termination" => imported.termination = EndReason::from_pgn_name(&value),
            "timecontrol" => imported.clock = Some(Clock::from_pgn(&value)?),
            _ if PLACEHOLDERS.contains(&value.as_str()) => {}
            _ => game.set_tag(key, value),
        }
    }

    Ok(imported)
}

/// Records the outcome written in the file. A game the rules haven't already
/// ended was decided off the board: by agreement if drawn, by resignation
/// otherwise, unless a Termination tag says why.
fn finish(game: &mut Game, imported: Imported, status: Option<GameStatus>) {
    if let Some(status) = status.filter(|s| s.is_over()) {
        if game.status() == GameStatus::Ongoing {
            let reason = match imported.termination {
                Some(reason) if reason != EndReason::Unterminated => reason,
                _ if status == GameStatus::Draw => EndReason::DrawAgreement,
                _ => EndReason::Resignation,
            };

            game.end_with(reason, status);
        }
    }

    if let Some(clock) = imported.clock {
        game.set_clock(clock);
    }
}

/// Attaches a comment to the last move played. `[%...]` fragments become
/// annotation tags and the rest is the annotation text.
fn attach_comment(game: &mut Game, text: &str) {
    let mov = match game.moves_mut().last_mut() {
        Some(mov) => mov,
        None => return,
    };

    for tag in ANNOTATION_TAG.find_iter(text) {
        mov.add_annotation_tag(tag.as_str());
    }

    let rest = ANNOTATION_TAG.replace_all(text, "");
    let rest = rest.trim();
    if !rest.is_empty() {
        mov.annotate(rest);
    }
}
