// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Portable Game Notation.
//!
//! Export writes the Seven Tag Roster and the tags describing the game's
//! setup, then the movetext with annotations in braces. Import reads any
//! number of games, skipping variations, numeric annotation glyphs and line
//! comments.
use std::fmt::Write;

use pest::iterators::Pair;
use pest::Parser;

use crate::error::{ChessError, ChessResult};
use crate::game::{play, Game, GameStatus, TagKey};
use crate::language::Language;
use crate::types::Color;
use crate::variant::Variant;

use super::algebraic::{to_algebraic, AlgebraicVariation};
use super::{attach_comment, configure, finish};

#[derive(Parser)]
#[grammar = "notation/pgn.pest"]
struct PgnParser;

//
// Export
//

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Writes a game as PGN with moves in the given notation.
pub fn to_pgn(game: &Game, variation: AlgebraicVariation, language: Language) -> ChessResult<String> {
    if !game.is_exportable() {
        return Err(ChessError::NotExportable);
    }

    let start = game.start_position().ok_or(ChessError::GameNotStarted)?;
    let mut tags = game.tags().clone();
    let mut default = |key: &str, value: String| {
        tags.entry(TagKey::from(key)).or_insert(value);
    };

    default("Event", "-".to_owned());
    default("Site", "-".to_owned());
    let date = game
        .tag("UTCDate")
        .map(|d| d.to_owned())
        .unwrap_or_else(|| "????.??.??".to_owned());
    default("Date", date);
    default("Round", "?".to_owned());
    default("White", "?".to_owned());
    default("Black", "?".to_owned());

    let mut set = |key: &str, value: String| {
        tags.insert(TagKey::from(key), value);
    };

    set("Result", game.status().result().to_owned());
    set("TimeControl", game.clock().pgn_time_control());
    set("Termination", game.end_reason().pgn_name().to_owned());
    if game.variant() != Variant::Standard {
        set("Variant", game.variant().name().to_owned());
    }

    if !game.has_default_start() {
        set("SetUp", "1".to_owned());
        set("FEN", start.fen(false));
    }

    set(
        "PlyCount",
        (game.position().ply() - start.ply()).to_string(),
    );

    let mut pgn = String::new();
    for (key, value) in &tags {
        writeln!(pgn, "[{} \"{}\"]", key, escape(value)).unwrap();
    }

    pgn.push('\n');
    let mut pos = start.clone();
    for (i, mov) in game.moves().iter().enumerate() {
        if pos.side_to_move() == Color::White {
            write!(pgn, "{}. ", pos.fullmove_number()).unwrap();
        } else if i == 0 {
            write!(pgn, "{}... ", pos.fullmove_number()).unwrap();
        }

        pgn.push_str(&to_algebraic(&pos, mov, variation, language));
        pgn.push(' ');
        if mov.has_annotation(true) {
            write!(pgn, "{{ {} }} ", mov.annotation_text(true)).unwrap();
        }

        pos = play(&pos, mov);
    }

    pgn.push_str(game.status().result());
    pgn.push('\n');
    Ok(pgn)
}

//
// Import
//

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }

    out
}

/// Reads every game in a PGN text, with moves in the given language.
pub fn parse_pgn(text: &str, language: Language) -> ChessResult<Vec<Game>> {
    let file = PgnParser::parse(Rule::file, text)
        .map_err(|e| ChessError::InvalidPgn(e.to_string()))?
        .next()
        .ok_or_else(|| ChessError::InvalidPgn("empty input".to_owned()))?;

    let mut games = Vec::new();
    for pair in file.into_inner() {
        if pair.as_rule() == Rule::game {
            games.push(read_game(pair, language)?);
        }
    }

    info!("read {} games from PGN", games.len());
    Ok(games)
}

/// Reads the first game in a PGN text.
pub fn parse_pgn_game(text: &str, language: Language) -> ChessResult<Game> {
    parse_pgn(text, language)?
        .into_iter()
        .next()
        .ok_or_else(|| ChessError::InvalidPgn("no game found".to_owned()))
}

fn read_game(pair: Pair<Rule>, language: Language) -> ChessResult<Game> {
    let mut tags = Vec::new();
    let mut movetext = None;
    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::tag_pair => {
                let mut inner = item.into_inner();
                let key = inner.next().map(|p| p.as_str().to_owned()).unwrap_or_default();
                let value = inner
                    .next()
                    .and_then(|s| s.into_inner().next())
                    .map(|p| unescape(p.as_str()))
                    .unwrap_or_default();
                tags.push((key, value));
            }
            Rule::movetext => movetext = Some(item),
            _ => unreachable!(),
        }
    }

    let mut game = Game::new(Variant::Standard);
    let imported = configure(&mut game, tags)?;
    game.start()?;
    let mut result = None;
    if let Some(movetext) = movetext {
        for token in movetext.into_inner() {
            match token.as_rule() {
                Rule::san | Rule::castle => {
                    let text = token.as_str();
                    let mov = game
                        .algebraic_move(text, language)
                        .map_err(|e| ChessError::InvalidPgn(format!("{}: {}", text, e)))?;
                    game.commit(mov)
                        .map_err(|e| ChessError::InvalidPgn(format!("{}: {}", text, e)))?;
                }
                Rule::comment => {
                    let text = token.into_inner().next().map(|p| p.as_str()).unwrap_or("");
                    attach_comment(&mut game, text);
                }
                Rule::result => result = GameStatus::from_result(token.as_str()),
                _ => {}
            }
        }
    }

    finish(&mut game, imported, result);
    debug!("read game with {} moves", game.moves().len());
    Ok(game)
}

impl Game {
    /// The game as PGN in Standard Algebraic Notation.
    pub fn to_pgn(&self) -> ChessResult<String> {
        to_pgn(self, AlgebraicVariation::San, Language::English)
    }

    pub fn from_pgn(text: &str) -> ChessResult<Game> {
        parse_pgn_game(text, Language::English)
    }
}
