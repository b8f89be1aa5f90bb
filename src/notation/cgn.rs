// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compact Game Notation, a binary game format.
//!
//! A game is a header of tags followed by one record per move. A move packs
//! into two bytes: the first holds the source file and rank and the high bit
//! of the destination file, the second the rest of the destination and the
//! promotion piece. A first byte with its top bit set is a control record
//! instead: an annotation string or the end of the game.
//!
//! Version 1 prefixes the header with a tag count and writes every tag name
//! out. Version 2 replaces well-known tag names with a single byte and ends
//! the header with a zero; it also records the result in the final control
//! byte instead of a Result tag.
use std::io::Write;

use num_traits::FromPrimitive;

use crate::error::{ChessError, ChessResult};
use crate::game::{EndReason, Game, GameStatus, TagKey};
use crate::types::{File, PieceKind, Rank, Square};
use crate::variant::Variant;

use super::{attach_comment, configure, finish};

/// The two revisions of the format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CgnVersion {
    V1,
    V2,
}

/// Tags that version 2 writes as a single byte. The index is the byte.
/// Ordinal 0 ends the header and ordinal 1 introduces a tag written by name.
const CGN_TAGS: [&str; 37] = [
    "_ENDOFTAGS",
    "_FROMSTRING",
    "Event",
    "EventDate",
    "EventSponsor",
    "Section",
    "Stage",
    "Board",
    "Site",
    "Date",
    "Time",
    "UTCDate",
    "UTCTime",
    "Round",
    "White",
    "Black",
    "WhiteElo",
    "BlackElo",
    "WhiteTitle",
    "BlackTitle",
    "WhiteUSCF",
    "BlackUSCF",
    "WhiteNA",
    "BlackNA",
    "WhiteType",
    "BlackType",
    "Variant",
    "TimeControl",
    "ECO",
    "NIC",
    "Opening",
    "Variation",
    "SubVariation",
    "Termination",
    "Annotator",
    "Mode",
    "FEN",
];

const END_OF_TAGS: u8 = 0;
const TAG_FROM_STRING: u8 = 1;

const CONTROL_BIT: u8 = 0x80;

const V1_END: u8 = 0x80;
const V1_ANNOTATION: u8 = 0x81;

const V2_ANNOTATION: u8 = 0x80;
const V2_ONGOING: u8 = 0x81;
const V2_WHITE_WINS: u8 = 0x82;
const V2_BLACK_WINS: u8 = 0x83;
const V2_DRAW: u8 = 0x84;

fn tag_ordinal(name: &str) -> Option<u8> {
    CGN_TAGS
        .iter()
        .skip(2)
        .position(|tag| tag.eq_ignore_ascii_case(name))
        .map(|i| i as u8 + 2)
}

//
// Export
//

/// The tags a CGN header carries for a game.
fn header_tags(game: &Game, version: CgnVersion) -> Vec<(String, String)> {
    let mut tags = game.tags().clone();
    tags.entry(TagKey::from("Event")).or_insert_with(|| "-".to_owned());
    tags.entry(TagKey::from("Site")).or_insert_with(|| "-".to_owned());
    let placeholder_round = tags
        .get(&TagKey::from("Round"))
        .map(|round| round == "?" || round == "-")
        .unwrap_or(false);
    if placeholder_round {
        tags.remove(&TagKey::from("Round"));
    }

    let mut set = |key: &str, value: String| {
        tags.insert(TagKey::from(key), value);
    };

    if version == CgnVersion::V1 {
        set("Result", game.status().result().to_owned());
    }

    if game.clock().is_timed() {
        set("TimeControl", game.clock().pgn_time_control());
    }

    // Only endings off the board are worth a Termination tag.
    let reason = game.end_reason();
    if reason != EndReason::Unterminated && reason.pgn_name() != "Normal" {
        set("Termination", reason.pgn_name().to_owned());
    }

    if game.variant() != Variant::Standard {
        set("Variant", game.variant().name().to_owned());
    }

    if !game.has_default_start() {
        if let Some(start) = game.start_position() {
            set("FEN", start.fen(true));
        }
    }

    tags.into_iter()
        .filter(|(key, _)| {
            !["PlyCount", "SetUp"]
                .iter()
                .any(|skip| key.as_str().eq_ignore_ascii_case(skip))
        })
        .filter(|(key, _)| version == CgnVersion::V1 || !key.as_str().eq_ignore_ascii_case("Result"))
        .map(|(key, value)| (key.as_str().to_owned(), value))
        .collect()
}

fn write_string<W: Write>(out: &mut W, value: &str) -> ChessResult<()> {
    out.write_all(value.as_bytes())?;
    out.write_all(&[0])?;
    Ok(())
}

/// Packs a move into its two-byte record.
fn pack_move(from: Square, to: Square, promotion: Option<PieceKind>) -> [u8; 2] {
    let from_file = from.file() as u8;
    let from_rank = from.rank() as u8;
    let to_file = to.file() as u8;
    let to_rank = to.rank() as u8;
    let promo = promotion.map(|kind| kind as u8).unwrap_or(0);
    [
        from_file << 4 | from_rank << 1 | (to_file & 4) >> 2,
        (to_file & 3) << 6 | to_rank << 3 | promo,
    ]
}

/// Writes a game as CGN.
pub fn write_cgn<W: Write>(game: &Game, version: CgnVersion, out: &mut W) -> ChessResult<()> {
    if !game.is_exportable() {
        return Err(ChessError::NotExportable);
    }

    if game.start_position().is_none() {
        return Err(ChessError::GameNotStarted);
    }

    let tags = header_tags(game, version);
    match version {
        CgnVersion::V1 => {
            out.write_all(&[tags.len() as u8])?;
            for (key, value) in &tags {
                write_string(out, key)?;
                write_string(out, value)?;
            }
        }
        CgnVersion::V2 => {
            for (key, value) in &tags {
                match tag_ordinal(key) {
                    Some(ordinal) => out.write_all(&[ordinal])?,
                    None => {
                        out.write_all(&[TAG_FROM_STRING])?;
                        write_string(out, key)?;
                    }
                }

                write_string(out, value)?;
            }

            out.write_all(&[END_OF_TAGS])?;
        }
    }

    let annotation = match version {
        CgnVersion::V1 => V1_ANNOTATION,
        CgnVersion::V2 => V2_ANNOTATION,
    };

    for mov in game.moves() {
        out.write_all(&pack_move(mov.source(), mov.destination(), mov.promotion_piece()))?;
        if mov.has_annotation(true) {
            out.write_all(&[annotation])?;
            write_string(out, &mov.annotation_text(true))?;
        }
    }

    let end = match version {
        CgnVersion::V1 => V1_END,
        CgnVersion::V2 => match game.status() {
            GameStatus::WhiteWins => V2_WHITE_WINS,
            GameStatus::BlackWins => V2_BLACK_WINS,
            GameStatus::Draw => V2_DRAW,
            _ => V2_ONGOING,
        },
    };

    out.write_all(&[end])?;
    Ok(())
}

/// The game as CGN bytes.
pub fn to_cgn(game: &Game, version: CgnVersion) -> ChessResult<Vec<u8>> {
    let mut bytes = Vec::new();
    write_cgn(game, version, &mut bytes)?;
    Ok(bytes)
}

//
// Import
//

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Reader<'a> {
        Reader { bytes, offset: 0 }
    }

    fn is_empty(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn byte(&mut self) -> ChessResult<u8> {
        let byte = self
            .bytes
            .get(self.offset)
            .cloned()
            .ok_or_else(|| ChessError::InvalidCgn(format!("unexpected end of input at byte {}", self.offset)))?;
        self.offset += 1;
        Ok(byte)
    }

    fn string(&mut self) -> ChessResult<String> {
        let rest = &self.bytes[self.offset.min(self.bytes.len())..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| ChessError::InvalidCgn("unterminated string".to_owned()))?;
        let value = String::from_utf8(rest[..len].to_vec())
            .map_err(|e| ChessError::InvalidCgn(e.to_string()))?;
        self.offset += len + 1;
        Ok(value)
    }
}

fn read_tags(reader: &mut Reader, version: CgnVersion) -> ChessResult<Vec<(String, String)>> {
    let mut tags = Vec::new();
    match version {
        CgnVersion::V1 => {
            let count = reader.byte()?;
            for _ in 0..count {
                let key = reader.string()?;
                let value = reader.string()?;
                tags.push((key, value));
            }
        }
        CgnVersion::V2 => loop {
            let ordinal = reader.byte()?;
            let key = match ordinal {
                END_OF_TAGS => break,
                TAG_FROM_STRING => reader.string()?,
                _ => CGN_TAGS
                    .get(ordinal as usize)
                    .map(|name| (*name).to_owned())
                    .ok_or_else(|| ChessError::InvalidCgn(format!("unknown tag ordinal {}", ordinal)))?,
            };

            let value = reader.string()?;
            tags.push((key, value));
        },
    }

    Ok(tags)
}

fn unpack_square(file: u8, rank: u8) -> Square {
    // Both halves are three bits wide.
    Square::of(
        Rank::from_u8(rank).expect("invalid rank: three bits"),
        File::from_u8(file).expect("invalid file: three bits"),
    )
}

fn read_game(reader: &mut Reader, version: CgnVersion) -> ChessResult<Game> {
    let tags = read_tags(reader, version)?;
    let mut game = Game::new(Variant::Standard);
    let imported = configure(&mut game, tags)?;
    game.start()?;

    let (annotation, mut status) = match version {
        CgnVersion::V1 => (V1_ANNOTATION, imported.result),
        CgnVersion::V2 => (V2_ANNOTATION, None),
    };

    loop {
        let first = reader.byte()?;
        if first & CONTROL_BIT != 0 {
            if first == annotation {
                let text = reader.string()?;
                attach_comment(&mut game, &text);

                continue;
            }

            match (version, first) {
                (CgnVersion::V1, V1_END) => {}
                (CgnVersion::V2, V2_ONGOING) => status = Some(GameStatus::Ongoing),
                (CgnVersion::V2, V2_WHITE_WINS) => status = Some(GameStatus::WhiteWins),
                (CgnVersion::V2, V2_BLACK_WINS) => status = Some(GameStatus::BlackWins),
                (CgnVersion::V2, V2_DRAW) => status = Some(GameStatus::Draw),
                _ => return Err(ChessError::InvalidCgn(format!("unknown control byte {:#x}", first))),
            }

            break;
        }

        let second = reader.byte()?;
        let from = unpack_square((first >> 4) & 7, (first >> 1) & 7);
        let to = unpack_square(((first << 2) & 4) | ((second >> 6) & 3), (second >> 3) & 7);
        let promotion = match second & 7 {
            0 => None,
            ordinal => Some(
                PieceKind::from_u8(ordinal)
                    .ok_or_else(|| ChessError::InvalidCgn(format!("bad promotion piece {}", ordinal)))?,
            ),
        };

        let mov = game
            .new_move(from, to, promotion, true)
            .map_err(|e| ChessError::InvalidCgn(e.to_string()))?;
        game.commit(mov).map_err(|e| ChessError::InvalidCgn(e.to_string()))?;
    }

    finish(&mut game, imported, status);
    debug!("read game with {} moves", game.moves().len());
    Ok(game)
}

/// Reads every game in a CGN byte stream.
pub fn parse_cgn(bytes: &[u8], version: CgnVersion) -> ChessResult<Vec<Game>> {
    let mut reader = Reader::new(bytes);
    let mut games = Vec::new();
    while !reader.is_empty() {
        games.push(read_game(&mut reader, version)?);
    }

    info!("read {} games from CGN", games.len());
    Ok(games)
}

impl Game {
    pub fn to_cgn(&self, version: CgnVersion) -> ChessResult<Vec<u8>> {
        to_cgn(self, version)
    }

    /// Reads the first game of a CGN byte stream.
    pub fn from_cgn(bytes: &[u8], version: CgnVersion) -> ChessResult<Game> {
        parse_cgn(bytes, version)?
            .into_iter()
            .next()
            .ok_or_else(|| ChessError::InvalidCgn("no game found".to_owned()))
    }
}
