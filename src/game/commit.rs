// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::error::{ChessError, ChessResult};
use crate::moves::Move;

use super::clock::{format_time, now_ms};
use super::legality::illegal_reason;
use super::termination::classify;
use super::{EndReason, Game, GameStatus};

/// Knobs for `Game::commit_with`.
#[derive(Copy, Clone, Debug, Default)]
pub struct CommitOptions {
    /// Play the move without checking it against the rules.
    pub allow_illegal: bool,
    /// Don't look for the end of the game after the move.
    pub skip_reclassification: bool,
    /// The time the move was made, for the clocks. Defaults to now.
    pub timestamp_ms: Option<i64>,
}

impl Game {
    /// Plays a move. An illegal move is still played and recorded, but the
    /// side that made it loses the game and the reason is returned as a
    /// `RulesInfraction` error.
    pub fn commit(&mut self, mov: Move) -> ChessResult<()> {
        self.commit_with(mov, CommitOptions::default())
    }

    pub fn commit_with(&mut self, mut mov: Move, options: CommitOptions) -> ChessResult<()> {
        match self.status() {
            GameStatus::Building => return Err(ChessError::GameNotStarted),
            GameStatus::Ongoing => {}
            _ => return Err(ChessError::GameOver),
        }

        let side = self.side_to_move();
        let mover = match self.position().piece_at(mov.source()) {
            Some(piece) => piece.color,
            None => {
                return Err(ChessError::InvalidMove(format!(
                    "There's no piece on {}",
                    mov.source()
                )))
            }
        };

        let illegal = if options.allow_illegal {
            None
        } else {
            illegal_reason(self.position(), &mov)
        };

        if self.clock().is_timed() {
            let now = options.timestamp_ms.unwrap_or_else(now_ms);
            let elapsed = self.clock_mut().punch(side, now);
            let remaining = self.clock().remaining(side);
            mov.add_annotation_tag(format!("[%clk {}]", format_time(remaining, true)));
            mov.add_annotation_tag(format!("[%emt {}]", format_time(elapsed, true)));
        }

        debug!("committing {} for {}", mov, side);
        self.position_mut().apply(&mov);
        if self.position().draw_timer() == 0 {
            self.repetitions_mut().clear();
        }

        self.moves_mut().push(mov);
        if !options.skip_reclassification {
            self.position_mut().determine_castling_rights();
            if self.is_check() {
                self.position_mut().add_check(side);
            }

            let fingerprint = self.position().positional_fen(true);
            *self.repetitions_mut().entry(fingerprint).or_insert(0) += 1;
            classify(self);
        }

        if let Some(reason) = illegal {
            warn!("illegal move: {}", reason);
            self.end_with(EndReason::RulesInfraction, GameStatus::win_for(mover.toggle()));
            return Err(ChessError::RulesInfraction(reason));
        }

        Ok(())
    }

    /// Plays a move on a copy of this game, leaving this one untouched.
    pub fn commit_to_copy(&self, mov: Move) -> ChessResult<Game> {
        let mut copy = self.clone();
        copy.commit(mov)?;
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use crate::game::{EndReason, Game, GameStatus};
    use crate::types::Square;
    use crate::variant::Variant;

    use super::*;

    fn play(game: &mut Game, from: Square, to: Square) {
        let mov = game.new_move(from, to, None, true).unwrap();
        game.commit(mov).unwrap();
    }

    #[test]
    fn commit_requires_started_game() {
        let game = Game::new(Variant::Standard);
        let mov = Move::new(
            Square::E2,
            Square::E4,
            None,
            crate::moves::CastlingType::None,
            false,
        );
        match game.clone().commit(mov) {
            Err(ChessError::GameNotStarted) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn illegal_move_loses() {
        let mut game = Game::started(Variant::Standard).unwrap();
        let mov = game.new_move(Square::E2, Square::E4, None, true).unwrap();
        game.commit(mov).unwrap();

        let mov = game.new_move(Square::D2, Square::D4, None, true).unwrap();
        match game.commit(mov) {
            Err(ChessError::RulesInfraction(reason)) => assert_eq!("It's not your turn", reason),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(GameStatus::BlackWins, game.status());
        assert_eq!(EndReason::RulesInfraction, game.end_reason());
        assert_eq!(2, game.moves().len());

        let mov = game.new_move(Square::E7, Square::E5, None, true).unwrap();
        match game.commit(mov) {
            Err(ChessError::GameOver) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn commit_to_copy_leaves_original() {
        let game = Game::started(Variant::Standard).unwrap();
        let mov = game.new_move(Square::G1, Square::F3, None, true).unwrap();
        let copy = game.commit_to_copy(mov).unwrap();
        assert_eq!(0, game.moves().len());
        assert_eq!(1, copy.moves().len());
    }

    #[test]
    fn timed_commit_annotates_and_times_out() {
        let mut game = Game::new(Variant::Standard);
        game.set_timed(0, 100);
        game.start_at(0).unwrap();

        let at = |game: &Game, from, to, ms| {
            let mov = game.new_move(from, to, None, true).unwrap();
            (
                mov,
                CommitOptions {
                    timestamp_ms: Some(ms),
                    ..CommitOptions::default()
                },
            )
        };

        let (mov, opts) = at(&game, Square::E2, Square::E4, 50);
        game.commit_with(mov, opts).unwrap();
        assert_eq!(
            vec!["[%clk 0:00:00]".to_owned(), "[%emt 0:00:00]".to_owned()],
            game.moves()[0].annotation_tags().to_vec()
        );

        let (mov, opts) = at(&game, Square::E7, Square::E5, 50);
        game.commit_with(mov, opts).unwrap();
        let (mov, opts) = at(&game, Square::G1, Square::F3, 250);
        game.commit_with(mov, opts).unwrap();

        assert_eq!(EndReason::Timeout, game.end_reason());
        assert_eq!(GameStatus::BlackWins, game.status());
        assert_eq!("-00.0050", game.white_time());
    }

    #[test]
    fn repetition_becomes_claimable() {
        let mut game = Game::started(Variant::Standard).unwrap();
        for _ in 0..2 {
            play(&mut game, Square::G1, Square::F3);
            play(&mut game, Square::G8, Square::F6);
            play(&mut game, Square::F3, Square::G1);
            play(&mut game, Square::F6, Square::G8);
        }

        assert_eq!(3, game.repetition_count());
        assert_eq!(Some(EndReason::ThreefoldRepetition), game.claimable_draw());
        game.claim_draw().unwrap();
        assert_eq!(GameStatus::Draw, game.status());
    }
}
