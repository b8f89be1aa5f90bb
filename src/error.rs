// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::error::Error;
use std::fmt;
use std::io;

use crate::position::FenParseError;

/// Every way an operation on a game can fail.
#[derive(Debug)]
pub enum ChessError {
    /// A FEN string could not be parsed.
    InvalidFen(FenParseError),
    /// Move text that can't be parsed, is ambiguous, or describes a move that
    /// can't exist (no piece, same square, bad promotion).
    InvalidMove(String),
    /// A move that was committed even though it is illegal. The game has
    /// been ended as a loss for the side that made it.
    RulesInfraction(String),
    UnknownVariant(String),
    /// The game was modified after it started in a way PGN and CGN can't express.
    NotExportable,
    GameNotStarted,
    /// The game is already over.
    GameOver,
    /// A draw was claimed while no draw is claimable.
    DrawNotClaimable,
    /// An engine was asked to evaluate while it is still busy.
    EngineBusy,
    InvalidPgn(String),
    InvalidCgn(String),
    /// A configuration value the game can't work with, such as a 0+0 clock.
    InvalidConfiguration(String),
    Io(io::Error),
}

pub type ChessResult<T> = Result<T, ChessError>;

impl fmt::Display for ChessError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChessError::InvalidFen(err) => write!(f, "invalid FEN: {:?}", err),
            ChessError::InvalidMove(reason) => write!(f, "invalid move: {}", reason),
            ChessError::RulesInfraction(reason) => write!(f, "illegal move: {}", reason),
            ChessError::UnknownVariant(name) => write!(f, "unknown variant: {}", name),
            ChessError::NotExportable => write!(
                f,
                "the game has been modified in a way that PGN and CGN can't express"
            ),
            ChessError::GameNotStarted => write!(f, "the game has not started yet"),
            ChessError::GameOver => write!(f, "the game is over"),
            ChessError::DrawNotClaimable => write!(f, "a draw can not be claimed right now"),
            ChessError::EngineBusy => write!(f, "the engine is busy"),
            ChessError::InvalidPgn(reason) => write!(f, "invalid PGN: {}", reason),
            ChessError::InvalidCgn(reason) => write!(f, "invalid CGN: {}", reason),
            ChessError::InvalidConfiguration(reason) => write!(f, "{}", reason),
            ChessError::Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl Error for ChessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChessError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ChessError {
    fn from(err: io::Error) -> ChessError {
        ChessError::Io(err)
    }
}

impl From<FenParseError> for ChessError {
    fn from(err: FenParseError) -> ChessError {
        ChessError::InvalidFen(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = ChessError::InvalidMove("There's no piece on e4".to_owned());
        assert_eq!("invalid move: There's no piece on e4", err.to_string());
        assert_eq!("the game has not started yet", ChessError::GameNotStarted.to_string());
    }

    #[test]
    fn conversions() {
        let err: ChessError = FenParseError::NotEnoughFields.into();
        match err {
            ChessError::InvalidFen(FenParseError::NotEnoughFields) => {}
            other => panic!("unexpected error {:?}", other),
        }

        let err: ChessError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(err.source().is_some());
    }
}
