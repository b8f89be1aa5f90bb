// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A chess rules engine for Standard chess, Chess960, Antichess,
//! Three-check, King of the Hill, Racing Kings and Horde, with move notation
//! (UCI, algebraic in six variations and seventeen languages, FEN) and game
//! formats (PGN, CGN).
#![allow(dead_code)]

#[macro_use]
extern crate num_derive;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate pest_derive;

mod analysis;
pub mod attacks;
mod bitboard;
pub mod chess960;
pub mod engine;
mod error;
pub mod game;
mod language;
mod moves;
pub mod notation;
mod perft;
mod position;
mod types;
mod variant;

pub use analysis::Analysis;
pub use bitboard::{Bitboard, BitboardIterator};
pub use error::{ChessError, ChessResult};
pub use game::{
    format_time, CommitOptions, EndReason, Game, GameBuilder, GameStatus, TimeControl,
};
pub use language::{Language, LANGUAGES};
pub use moves::{CastlingType, Move};
pub use notation::{AlgebraicVariation, CgnVersion};
pub use perft::{divide, perft};
pub use position::{FenParseError, Position};
pub use types::{
    CastleStatus, Color, File, Piece, PieceKind, Rank, Square, COLORS, FILES, PIECE_KINDS, RANKS,
    SQUARES,
};
pub use variant::{Variant, VARIANTS};
