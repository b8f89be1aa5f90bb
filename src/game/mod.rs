// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `game` module tracks a whole game: the board, whose turn it is, the
//! clocks, the move history, the tags and how (or whether) the game ended.
//!
//! A `Game` is created in the `Building` state, configured, and then
//! started. Moves are constructed against the game with `new_move` (or one
//! of the notation parsers), checked with `illegal_reason` and played with
//! `commit`. After every commit the game is classified again, so `status`
//! and `end_reason` are always current.
use chrono::{Local, TimeZone, Utc};
use hashbrown::HashMap;

use crate::chess960;
use crate::error::{ChessError, ChessResult};
use crate::moves::Move;
use crate::position::Position;
use crate::types::{Color, Piece, PieceKind, Square};
use crate::variant::Variant;

mod clock;
mod commit;
mod legality;
mod tags;
mod termination;

pub use self::clock::{format_time, now_ms, Clock, TimeControl};
pub use self::commit::CommitOptions;
pub use self::legality::{has_legal_move, illegal_reason, legal_moves, play};
pub use self::tags::{TagKey, Tags, SEVEN_TAG_ROSTER};
pub use self::termination::{is_checkmate, is_insufficient_material};

pub(crate) use self::legality::{build_move, legal_sources};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Building,
    Ongoing,
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameStatus {
    /// The PGN result token for this status.
    pub fn result(self) -> &'static str {
        match self {
            GameStatus::WhiteWins => "1-0",
            GameStatus::BlackWins => "0-1",
            GameStatus::Draw => "1/2-1/2",
            _ => "*",
        }
    }

    /// Parses a PGN result token, including the `1-o`, `o-1` and `½-½`
    /// spellings found in the wild. `*` is an ongoing game.
    pub fn from_result(token: &str) -> Option<GameStatus> {
        let status = match token.to_ascii_lowercase().as_str() {
            "1-0" | "1-o" => GameStatus::WhiteWins,
            "0-1" | "o-1" => GameStatus::BlackWins,
            "1/2-1/2" | "½-½" => GameStatus::Draw,
            "*" => GameStatus::Ongoing,
            _ => return None,
        };
        Some(status)
    }

    pub fn is_over(self) -> bool {
        match self {
            GameStatus::Building | GameStatus::Ongoing => false,
            _ => true,
        }
    }

    /// The status of a game the given color has won.
    pub fn win_for(color: Color) -> GameStatus {
        match color {
            Color::White => GameStatus::WhiteWins,
            Color::Black => GameStatus::BlackWins,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EndReason {
    Unterminated,
    Checkmate,
    Stalemate,
    Resignation,
    DrawAgreement,
    FiftyMoveRule,
    SeventyFiveMoveRule,
    InsufficientMaterial,
    ThreefoldRepetition,
    FivefoldRepetition,
    Timeout,
    Abandoned,
    Adjudication,
    Death,
    Emergency,
    RulesInfraction,
}

static END_REASONS: [EndReason; 16] = [
    EndReason::Unterminated,
    EndReason::Checkmate,
    EndReason::Stalemate,
    EndReason::Resignation,
    EndReason::DrawAgreement,
    EndReason::FiftyMoveRule,
    EndReason::SeventyFiveMoveRule,
    EndReason::InsufficientMaterial,
    EndReason::ThreefoldRepetition,
    EndReason::FivefoldRepetition,
    EndReason::Timeout,
    EndReason::Abandoned,
    EndReason::Adjudication,
    EndReason::Death,
    EndReason::Emergency,
    EndReason::RulesInfraction,
];

impl EndReason {
    /// The value of the PGN Termination tag for this reason.
    pub fn pgn_name(self) -> &'static str {
        match self {
            EndReason::Unterminated => "Unterminated",
            EndReason::Timeout => "Time Forfeit",
            EndReason::Abandoned => "Abandoned",
            EndReason::Adjudication => "Adjudication",
            EndReason::Death => "Death",
            EndReason::Emergency => "Emergency",
            EndReason::RulesInfraction => "Rules Infraction",
            _ => "Normal",
        }
    }

    /// Looks up a Termination tag value. `Normal` names too many reasons to
    /// pick one and answers None.
    pub fn from_pgn_name(name: &str) -> Option<EndReason> {
        if name.eq_ignore_ascii_case("Normal") {
            return None;
        }

        END_REASONS
            .iter()
            .cloned()
            .find(|reason| reason.pgn_name().eq_ignore_ascii_case(name))
    }

    pub fn is_draw(self) -> bool {
        match self {
            EndReason::Stalemate
            | EndReason::DrawAgreement
            | EndReason::FiftyMoveRule
            | EndReason::SeventyFiveMoveRule
            | EndReason::InsufficientMaterial
            | EndReason::ThreefoldRepetition
            | EndReason::FivefoldRepetition => true,
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    status: GameStatus,
    end_reason: EndReason,
    claimable_draw: Option<EndReason>,
    clock: Clock,
    start_clock: Clock,
    repetitions: HashMap<String, u32>,
    start: Option<Position>,
    moves: Vec<Move>,
    tags: Tags,
    exportable: bool,
    board_loaded: bool,
}

//
// Construction and configuration
//

impl Game {
    pub fn new(variant: Variant) -> Game {
        Game {
            position: Position::new(variant),
            status: GameStatus::Building,
            end_reason: EndReason::Unterminated,
            claimable_draw: None,
            clock: Clock::unlimited(),
            start_clock: Clock::unlimited(),
            repetitions: HashMap::new(),
            start: None,
            moves: Vec::new(),
            tags: Tags::new(),
            exportable: true,
            board_loaded: false,
        }
    }

    /// A started game of the given variant from its usual start position.
    pub fn started(variant: Variant) -> ChessResult<Game> {
        let mut game = Game::new(variant);
        game.start()?;
        Ok(game)
    }

    /// A started game from the given FEN.
    pub fn from_fen(variant: Variant, fen: &str) -> ChessResult<Game> {
        let mut game = Game::new(variant);
        game.load_fen(fen)?;
        game.start()?;
        Ok(game)
    }

    /// Modifications after the game has started can't be written to PGN or
    /// CGN, which only know a start position and a list of moves.
    fn touch(&mut self) {
        if self.status != GameStatus::Building {
            self.exportable = false;
        }
    }

    /// Replaces the board with the one described by `fen`, or by one of the
    /// `startpos` and `random960` sentinels.
    pub fn load_fen(&mut self, fen: &str) -> ChessResult<()> {
        self.touch();
        self.position.load_fen(fen)?;
        self.board_loaded = true;
        if self.status == GameStatus::Ongoing {
            self.repetitions.clear();
            self.repetitions.insert(self.position.positional_fen(true), 1);
        }
        Ok(())
    }

    /// Loads the Chess960 start position with the given number.
    pub fn load_chess960(&mut self, id: usize) -> ChessResult<()> {
        let fen = chess960::position(id).ok_or_else(|| {
            ChessError::InvalidConfiguration(format!("There's no Chess960 position {}", id))
        })?;
        self.load_fen(&fen)
    }

    /// The number of the Chess960 position the game started from, read off
    /// the black back rank.
    pub fn chess960_id(&self) -> Option<usize> {
        let pos = self.start.as_ref().unwrap_or(&self.position);
        let placement = pos.positional_fen(true);
        placement.get(0..8).and_then(chess960::id_of)
    }

    pub fn set_variant(&mut self, variant: Variant) {
        self.touch();
        self.position.set_variant(variant);
    }

    /// Passes the turn to the other side without a move.
    pub fn flip_side(&mut self) {
        self.touch();
        let side = self.position.side_to_move().toggle();
        self.position.set_side_to_move(side);
        self.position.set_en_passant_square(None);
    }

    pub fn set_piece(&mut self, square: Square, piece: Piece) {
        self.touch();
        self.board_loaded = true;
        self.position.set_piece(square, piece);
    }

    pub fn unset_piece(&mut self, square: Square) -> Option<Piece> {
        self.touch();
        self.board_loaded = true;
        self.position.unset_piece(square)
    }

    /// Gives both sides `ms` and an increment of `increment_ms` per move.
    pub fn set_timed(&mut self, ms: i64, increment_ms: i64) {
        self.clock = Clock::timed(ms, increment_ms);
    }

    pub fn set_unlimited_time(&mut self) {
        self.clock = Clock::unlimited();
    }

    pub(crate) fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    /// Starts the game with the system clock as the start of the first ply.
    pub fn start(&mut self) -> ChessResult<()> {
        self.start_at(now_ms())
    }

    /// Starts the game. The first ply is timed from `now_ms`.
    pub fn start_at(&mut self, now_ms: i64) -> ChessResult<()> {
        if self.status != GameStatus::Building {
            return Err(ChessError::InvalidConfiguration(
                "The game has already started".to_owned(),
            ));
        }

        let clock = &self.clock;
        if clock.is_timed()
            && (clock.remaining(Color::White) == 0 || clock.remaining(Color::Black) == 0)
            && clock.increment_ms() == 0
        {
            return Err(ChessError::InvalidConfiguration(
                "A timed game needs time on both clocks or an increment".to_owned(),
            ));
        }

        if !self.board_loaded {
            let fen = self.position.variant().start_fen();
            self.position.load_fen(fen)?;
            self.board_loaded = true;
        }

        self.clock.start_ply(now_ms);
        self.start_clock = self.clock.clone();
        self.start = Some(self.position.clone());
        self.status = GameStatus::Ongoing;
        self.repetitions.clear();
        self.repetitions.insert(self.position.positional_fen(true), 1);
        self.stamp_start(now_ms);
        info!(
            "starting {} game from {}",
            self.position.variant(),
            self.position.fen(false)
        );

        if !self.has_default_start() {
            termination::classify(self);
        }

        Ok(())
    }

    /// Records when the game started, unless the tags already say.
    fn stamp_start(&mut self, now_ms: i64) {
        let local = Local.timestamp_millis_opt(now_ms).single();
        let utc = Utc.timestamp_millis_opt(now_ms).single();
        let (local, utc) = match (local, utc) {
            (Some(local), Some(utc)) => (local, utc),
            _ => return,
        };

        if self.tag("Date").is_none() && self.tag("UTCDate").is_none() {
            self.set_tag("Date", local.format("%Y.%m.%d").to_string());
            self.set_tag("UTCDate", utc.format("%Y.%m.%d").to_string());
        }

        if self.tag("Time").is_none() && self.tag("UTCTime").is_none() {
            self.set_tag("Time", local.format("%H:%M:%S").to_string());
            self.set_tag("UTCTime", utc.format("%H:%M:%S").to_string());
        }
    }

    /// Whether the game started from its variant's usual position. Chess960
    /// never does; every setup is written out.
    pub fn has_default_start(&self) -> bool {
        let variant = self.position.variant();
        if variant == Variant::Chess960 {
            return false;
        }

        let start = self.start.as_ref().unwrap_or(&self.position);
        start.fen(false) == variant.start_fen()
    }
}

//
// Getters
//

impl Game {
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn variant(&self) -> Variant {
        self.position.variant()
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn end_reason(&self) -> EndReason {
        self.end_reason
    }

    pub fn claimable_draw(&self) -> Option<EndReason> {
        self.claimable_draw
    }

    /// The position the game started from, once it has started.
    pub fn start_position(&self) -> Option<&Position> {
        self.start.as_ref()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub(crate) fn moves_mut(&mut self) -> &mut Vec<Move> {
        &mut self.moves
    }

    pub fn is_exportable(&self) -> bool {
        self.exportable
    }

    pub fn fen(&self, compact: bool) -> String {
        self.position.fen(compact)
    }

    pub fn positional_fen(&self, compact: bool) -> String {
        self.position.positional_fen(compact)
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check(self.position.side_to_move())
    }

    /// How many times the current position has occurred since the last pawn
    /// move or capture.
    pub fn repetition_count(&self) -> u32 {
        self.repetitions
            .get(&self.position.positional_fen(true))
            .cloned()
            .unwrap_or(0)
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// The clock as it was when the game started.
    pub fn start_clock(&self) -> &Clock {
        &self.start_clock
    }

    pub fn time_control(&self) -> TimeControl {
        self.clock.time_control()
    }

    pub fn white_ms(&self) -> i64 {
        self.clock.remaining(Color::White)
    }

    pub fn black_ms(&self) -> i64 {
        self.clock.remaining(Color::Black)
    }

    pub fn white_time(&self) -> String {
        format_time(self.white_ms(), false)
    }

    pub fn black_time(&self) -> String {
        format_time(self.black_ms(), false)
    }
}

//
// Tags
//

impl Game {
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(&TagKey::from(name)).map(|v| v.as_str())
    }

    pub fn set_tag<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.tags.insert(TagKey::new(name), value.into());
    }

    pub fn remove_tag(&mut self, name: &str) -> Option<String> {
        self.tags.remove(&TagKey::from(name))
    }
}

//
// Endings decided outside the rules of play
//

impl Game {
    pub fn can_claim_draw(&self) -> bool {
        self.end_reason == EndReason::Unterminated && self.claimable_draw.is_some()
    }

    pub fn claim_draw(&mut self) -> ChessResult<()> {
        let reason = match self.claimable_draw {
            Some(reason) if self.end_reason == EndReason::Unterminated => reason,
            _ => return Err(ChessError::DrawNotClaimable),
        };

        self.claimable_draw = None;
        self.end_with(reason, GameStatus::Draw);
        Ok(())
    }

    pub fn agree_to_draw(&mut self) -> ChessResult<()> {
        if self.end_reason != EndReason::Unterminated {
            return Err(ChessError::GameOver);
        }

        self.end_with(EndReason::DrawAgreement, GameStatus::Draw);
        Ok(())
    }

    pub fn resign(&mut self, color: Color) {
        self.end_with(EndReason::Resignation, GameStatus::win_for(color.toggle()));
    }

    /// Ends the game for a reason the rules of play don't decide, such as an
    /// abandoned game or an arbiter's adjudication.
    pub fn end_with(&mut self, reason: EndReason, status: GameStatus) {
        info!("game over: {:?}, {}", reason, status.result());
        self.end_reason = reason;
        self.status = status;
    }

    /// Ends the game for a reason found by the rules: draws are draws,
    /// Antichess and timeouts are won by the side to move, everything else
    /// is lost by it.
    pub(crate) fn end_by_rule(&mut self, reason: EndReason) {
        let to_move = self.position.side_to_move();
        let status = if reason.is_draw() {
            GameStatus::Draw
        } else if self.variant() == Variant::Antichess || reason == EndReason::Timeout {
            GameStatus::win_for(to_move)
        } else {
            GameStatus::win_for(to_move.toggle())
        };

        self.end_with(reason, status);
    }

    /// Used by importers, which restore outcomes recorded in the file rather
    /// than replaying them.
    pub(crate) fn restore_outcome(&mut self, status: GameStatus, reason: EndReason) {
        self.status = status;
        self.end_reason = reason;
    }
}

//
// Moves
//

impl Game {
    /// Constructs a move on the current board. Castling and en passant are
    /// recognized from the squares involved. With `validate`, a move that the
    /// piece can't make is rejected; legality is left to `illegal_reason`.
    pub fn new_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
        validate: bool,
    ) -> ChessResult<Move> {
        if self.status == GameStatus::Building {
            return Err(ChessError::GameNotStarted);
        }

        build_move(&self.position, from, to, promotion, validate)
    }

    /// Why the move can't be played now, or None if it can.
    pub fn illegal_reason(&self, mov: &Move) -> Option<String> {
        illegal_reason(&self.position, mov)
    }

    pub fn is_legal(&self, mov: &Move) -> bool {
        self.illegal_reason(mov).is_none()
    }

    /// Every legal move of the side to move, promotions and castling included.
    pub fn possible_moves(&self) -> Vec<Move> {
        if self.status == GameStatus::Building {
            return Vec::new();
        }

        legal_moves(&self.position)
    }

    pub(crate) fn repetitions_mut(&mut self) -> &mut HashMap<String, u32> {
        &mut self.repetitions
    }

    pub(crate) fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    pub(crate) fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub(crate) fn set_claimable_draw(&mut self, reason: Option<EndReason>) {
        self.claimable_draw = reason;
    }

    /// How often each position has occurred, keyed by compact positional
    /// FEN.
    pub fn repetitions(&self) -> &HashMap<String, u32> {
        &self.repetitions
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new(Variant::Standard)
    }
}

/// A configuration record for a new game. Each option left unset keeps the
/// game's default: Standard, the variant's start position, unlimited time
/// and no tags.
#[derive(Clone, Debug, Default)]
pub struct GameBuilder {
    variant: Option<Variant>,
    fen: Option<String>,
    clock_ms: Option<i64>,
    increment_ms: i64,
    white: Option<String>,
    black: Option<String>,
    tags: Vec<(String, String)>,
}

impl GameBuilder {
    pub fn new() -> GameBuilder {
        GameBuilder::default()
    }

    pub fn variant(mut self, variant: Variant) -> GameBuilder {
        self.variant = Some(variant);
        self
    }

    /// The start position, as a FEN or a `startpos`/`random960` sentinel.
    pub fn fen<S: Into<String>>(mut self, fen: S) -> GameBuilder {
        self.fen = Some(fen.into());
        self
    }

    /// Time for each side in milliseconds. Without it the game is untimed.
    pub fn clock_ms(mut self, ms: i64) -> GameBuilder {
        self.clock_ms = Some(ms);
        self
    }

    pub fn increment_ms(mut self, ms: i64) -> GameBuilder {
        self.increment_ms = ms;
        self
    }

    pub fn white<S: Into<String>>(mut self, name: S) -> GameBuilder {
        self.white = Some(name.into());
        self
    }

    pub fn black<S: Into<String>>(mut self, name: S) -> GameBuilder {
        self.black = Some(name.into());
        self
    }

    pub fn tag<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> GameBuilder {
        self.tags.push((name.into(), value.into()));
        self
    }

    /// A configured game that has not been started.
    pub fn build(self) -> ChessResult<Game> {
        let mut game = Game::new(self.variant.unwrap_or_default());
        if let Some(fen) = self.fen {
            game.load_fen(&fen)?;
        }

        if self.clock_ms.is_some() || self.increment_ms != 0 {
            game.set_timed(self.clock_ms.unwrap_or(0), self.increment_ms);
        }

        if let Some(white) = self.white {
            game.set_tag("White", white);
        }

        if let Some(black) = self.black {
            game.set_tag("Black", black);
        }

        for (name, value) in self.tags {
            game.set_tag(name, value);
        }

        Ok(game)
    }

    /// A configured game that has been started.
    pub fn start(self) -> ChessResult<Game> {
        let mut game = self.build()?;
        game.start()?;
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let mut game = Game::new(Variant::Standard);
        assert_eq!(GameStatus::Building, game.status());
        assert!(game.possible_moves().is_empty());
        match game.new_move(Square::E2, Square::E4, None, true) {
            Err(ChessError::GameNotStarted) => {}
            other => panic!("unexpected {:?}", other),
        }

        game.start().unwrap();
        assert_eq!(GameStatus::Ongoing, game.status());
        assert_eq!(20, game.possible_moves().len());
        assert!(game.start().is_err());
    }

    #[test]
    fn timed_games_need_time() {
        let mut game = Game::new(Variant::Standard);
        game.set_timed(0, 0);
        assert!(game.start().is_err());

        game.set_timed(0, 100);
        assert!(game.start().is_ok());
    }

    #[test]
    fn start_is_dated() {
        // 2019-03-04 05:06:07 UTC
        let mut game = Game::new(Variant::Standard);
        game.start_at(1_551_675_967_000).unwrap();
        assert_eq!(Some("2019.03.04"), game.tag("UTCDate"));
        assert_eq!(Some("05:06:07"), game.tag("UTCTime"));
        assert_eq!(10, game.tag("Date").unwrap().len());
        assert_eq!(8, game.tag("Time").unwrap().len());

        let mut game = Game::new(Variant::Standard);
        game.set_tag("Date", "1851.06.21");
        game.start_at(1_551_675_967_000).unwrap();
        assert_eq!(Some("1851.06.21"), game.tag("Date"));
        assert_eq!(None, game.tag("UTCDate"));
        assert_eq!(Some("05:06:07"), game.tag("UTCTime"));
    }

    #[test]
    fn builder() {
        let game = GameBuilder::new()
            .variant(Variant::KingOfTheHill)
            .clock_ms(300_000)
            .increment_ms(2000)
            .white("Alice")
            .black("Bob")
            .tag("Event", "Club night")
            .start()
            .unwrap();

        assert_eq!(Variant::KingOfTheHill, game.variant());
        assert_eq!(TimeControl::Increment, game.time_control());
        assert_eq!(Some("Alice"), game.tag("White"));
        assert_eq!(Some("Club night"), game.tag("event"));
        assert_eq!("05:00.0000", game.white_time());
    }

    #[test]
    fn modifications_after_start_are_not_exportable() {
        let mut game = Game::started(Variant::Standard).unwrap();
        assert!(game.is_exportable());
        game.flip_side();
        assert!(!game.is_exportable());
        assert_eq!(Color::Black, game.side_to_move());
    }

    #[test]
    fn chess960_ids() {
        let mut game = Game::new(Variant::Chess960);
        game.load_chess960(518).unwrap();
        game.start().unwrap();
        assert_eq!(Some(518), game.chess960_id());
        assert!(!game.has_default_start());

        assert!(game.clone().load_chess960(960).is_err());
    }

    #[test]
    fn resignation_and_agreement() {
        let mut game = Game::started(Variant::Standard).unwrap();
        game.resign(Color::White);
        assert_eq!(GameStatus::BlackWins, game.status());
        assert_eq!(EndReason::Resignation, game.end_reason());

        let mut game = Game::started(Variant::Standard).unwrap();
        assert!(!game.can_claim_draw());
        assert!(game.claim_draw().is_err());
        game.agree_to_draw().unwrap();
        assert_eq!(GameStatus::Draw, game.status());
        assert!(game.agree_to_draw().is_err());
    }

    #[test]
    fn termination_names() {
        assert_eq!("Time Forfeit", EndReason::Timeout.pgn_name());
        assert_eq!("Normal", EndReason::ThreefoldRepetition.pgn_name());
        assert_eq!(Some(EndReason::RulesInfraction), EndReason::from_pgn_name("rules infraction"));
        assert_eq!(None, EndReason::from_pgn_name("Normal"));
        assert!(EndReason::Stalemate.is_draw());
        assert!(!EndReason::Checkmate.is_draw());
    }

    #[test]
    fn result_tokens() {
        assert_eq!(Some(GameStatus::WhiteWins), GameStatus::from_result("1-o"));
        assert_eq!(Some(GameStatus::Draw), GameStatus::from_result("½-½"));
        assert_eq!(None, GameStatus::from_result("2-0"));
        assert_eq!("0-1", GameStatus::BlackWins.result());
    }
}
