// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Driving external chess engines over the universal chess interface (UCI).
//!
//! A game hands an engine an `EngineSnapshot` of where it stands and a
//! `GoCommand` saying how long to think. The engine answers with an
//! `Evaluation`, whose moves are turned back into `Move`s on the game.
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command as Process, Stdio};

use crate::error::{ChessError, ChessResult};
use crate::game::{play, Game};
use crate::moves::Move;
use crate::notation::parse_uci;
use crate::types::Color;
use crate::variant::Variant;

/// What an engine needs to know about a game to search it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EngineSnapshot {
    /// The current position.
    pub fen: String,
    /// The position the game started from.
    pub start_fen: String,
    /// Every move since the start, in UCI notation.
    pub moves_uci: Vec<String>,
    /// The value of the `UCI_Variant` option for the game.
    pub variant_key: String,
    pub chess960: bool,
    /// Remaining clock times and increment in milliseconds, for timed games.
    pub clock: Option<GoClock>,
}

impl EngineSnapshot {
    pub fn of(game: &Game) -> ChessResult<EngineSnapshot> {
        let start = game.start_position().ok_or(ChessError::GameNotStarted)?;
        let clock = if game.clock().is_timed() {
            Some(GoClock {
                wtime: game.white_ms(),
                btime: game.black_ms(),
                winc: game.clock().increment_ms(),
                binc: game.clock().increment_ms(),
            })
        } else {
            None
        };

        Ok(EngineSnapshot {
            fen: game.fen(false),
            start_fen: start.fen(false),
            moves_uci: game.moves().iter().map(|m| m.as_uci()).collect(),
            variant_key: game.variant().uci_key().to_owned(),
            chess960: game.variant() == Variant::Chess960,
            clock,
        })
    }
}

/// Clock fields appended to a `go` command.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GoClock {
    pub wtime: i64,
    pub btime: i64,
    pub winc: i64,
    pub binc: i64,
}

/// How long an engine should search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GoCommand {
    /// Search until the engine decides it is done.
    Default,
    Depth(u32),
    /// Search for this many milliseconds.
    MoveTime(u64),
    /// Search until told to stop.
    Infinite,
}

/// Commands sent to an engine.
#[derive(Clone, Debug, PartialEq)]
pub enum UciCommand {
    Uci,
    DebugOn,
    IsReady,
    SetOption { name: String, value: String },
    UciNewGame,
    Position { fen: String, moves: Vec<String> },
    Go(GoCommand, Option<GoClock>),
    Stop,
    Quit,
}

impl UciCommand {
    pub fn to_uci_wire<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match *self {
            UciCommand::Uci => writeln!(writer, "uci"),
            UciCommand::DebugOn => writeln!(writer, "debug on"),
            UciCommand::IsReady => writeln!(writer, "isready"),
            UciCommand::SetOption { ref name, ref value } => {
                writeln!(writer, "setoption name {} value {}", name, value)
            }
            UciCommand::UciNewGame => writeln!(writer, "ucinewgame"),
            UciCommand::Position { ref fen, ref moves } => {
                write!(writer, "position fen {}", fen)?;
                if !moves.is_empty() {
                    write!(writer, " moves {}", moves.join(" "))?;
                }

                writeln!(writer)
            }
            UciCommand::Go(command, clock) => {
                write!(writer, "go")?;
                match command {
                    GoCommand::Default => {}
                    GoCommand::Depth(depth) => write!(writer, " depth {}", depth)?,
                    GoCommand::MoveTime(ms) => write!(writer, " movetime {}", ms)?,
                    GoCommand::Infinite => write!(writer, " infinite")?,
                }

                if let Some(clock) = clock {
                    write!(
                        writer,
                        " wtime {} btime {} winc {} binc {}",
                        clock.wtime, clock.btime, clock.winc, clock.binc
                    )?;
                }

                writeln!(writer)
            }
            UciCommand::Stop => writeln!(writer, "stop"),
            UciCommand::Quit => writeln!(writer, "quit"),
        }
    }
}

/// Lines an engine sends back that a session cares about.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineResponse {
    IdName(String),
    IdAuthor(String),
    UciOk,
    ReadyOk,
    /// The engine offers `UCI_Chess960`.
    Chess960Option,
    /// The variants the engine lists for `UCI_Variant`.
    VariantOption(Vec<Variant>),
    /// A score report. Either field may be missing from a given line.
    Info {
        centipawns: Option<i32>,
        mate_in: Option<i32>,
    },
    BestMove {
        best: Option<String>,
        ponder: Option<String>,
    },
    Other(String),
}

/// `(none)` and `empty` stand for "no move".
fn engine_move(token: Option<&str>) -> Option<String> {
    token
        .filter(|t| *t != "(none)" && *t != "empty")
        .map(|t| t.to_owned())
}

impl EngineResponse {
    pub fn parse(line: &str) -> EngineResponse {
        let components: Vec<_> = line.split_whitespace().collect();
        match components.as_slice() {
            ["uciok"] => EngineResponse::UciOk,
            ["readyok"] => EngineResponse::ReadyOk,
            ["id", "name", rest @ ..] => EngineResponse::IdName(rest.join(" ")),
            ["id", "author", rest @ ..] => EngineResponse::IdAuthor(rest.join(" ")),
            ["option", "name", "UCI_Chess960", "type", "check", ..] => EngineResponse::Chess960Option,
            ["option", "name", "UCI_Variant", "type", "combo", rest @ ..] => {
                let mut variants = Vec::new();
                let mut tokens = rest.iter();
                while let Some(&token) = tokens.next() {
                    if token == "var" {
                        if let Some(variant) = tokens.next().and_then(|key| Variant::from_key(key)) {
                            variants.push(variant);
                        }
                    }
                }

                EngineResponse::VariantOption(variants)
            }
            ["info", rest @ ..] => {
                let mut centipawns = None;
                let mut mate_in = None;
                for pair in rest.windows(2) {
                    match pair {
                        ["cp", value] => centipawns = value.parse().ok(),
                        ["mate", value] => mate_in = value.parse().ok(),
                        _ => {}
                    }
                }

                EngineResponse::Info { centipawns, mate_in }
            }
            ["bestmove", rest @ ..] => {
                let ponder = match rest {
                    [_, "ponder", ponder, ..] => engine_move(Some(*ponder)),
                    _ => None,
                };

                EngineResponse::BestMove {
                    best: engine_move(rest.first().cloned()),
                    ponder,
                }
            }
            _ => EngineResponse::Other(line.to_owned()),
        }
    }
}

/// What an engine made of a position.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub best_move: Option<String>,
    pub ponder: Option<String>,
    /// The score in centipawns from the point of view of the side to move.
    pub centipawns: i32,
    /// Moves to mate. Negative when the side to move is getting mated.
    pub mate_in: Option<i32>,
}

impl Evaluation {
    /// The score as written in an `[%eval]` annotation: `#N` for a mate,
    /// pawns with two decimals otherwise.
    pub fn display(&self) -> String {
        match self.mate_in {
            Some(mate) if mate != 0 => format!("#{}", mate),
            _ => format!("{:.2}", self.centipawns as f64 / 100.0),
        }
    }

    /// The color delivering the mate the engine found.
    pub fn mater(&self, game: &Game) -> Option<Color> {
        match self.mate_in {
            Some(mate) if mate > 0 => Some(game.side_to_move()),
            Some(mate) if mate < 0 => Some(game.side_to_move().toggle()),
            _ => None,
        }
    }

    /// The recommended move on the game, annotated with the evaluation.
    pub fn best_move(&self, game: &Game) -> ChessResult<Option<Move>> {
        let uci = match self.best_move {
            Some(ref uci) => uci,
            None => return Ok(None),
        };

        let mut mov = game.uci_move(uci)?;
        if let Some(ref mut mov) = mov {
            mov.add_annotation_tag(format!("[%eval {}]", self.display()));
        }

        Ok(mov)
    }

    /// The reply the engine expects, in the position after the best move.
    pub fn ponder_move(&self, game: &Game) -> ChessResult<Option<Move>> {
        let (best, ponder) = match (&self.best_move, &self.ponder) {
            (Some(best), Some(ponder)) => (best, ponder),
            _ => return Ok(None),
        };

        let best = match game.uci_move(best)? {
            Some(mov) => mov,
            None => return Ok(None),
        };

        parse_uci(&play(game.position(), &best), ponder)
    }
}

//
// Sessions
//

/// A conversation with one engine. Commands go out through `writer` and
/// replies are read from `reader`, a line at a time.
pub struct UciSession<R, W> {
    reader: R,
    writer: W,
    name: Option<String>,
    ready: bool,
    evaluating: bool,
    infinite: bool,
    supports_chess960: bool,
    variants: Vec<Variant>,
    last_start: Option<String>,
    current: Evaluation,
}

impl<R: BufRead, W: Write> UciSession<R, W> {
    pub fn new(reader: R, writer: W) -> UciSession<R, W> {
        UciSession {
            reader,
            writer,
            name: None,
            ready: false,
            evaluating: false,
            infinite: false,
            supports_chess960: false,
            variants: vec![Variant::Standard],
            last_start: None,
            current: Evaluation::default(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(|n| n.as_str())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_evaluating(&self) -> bool {
        self.evaluating
    }

    /// Whether the engine said it can play the variant.
    pub fn supports(&self, variant: Variant) -> bool {
        match variant {
            Variant::Chess960 => self.supports_chess960 || self.variants.contains(&variant),
            _ => self.variants.contains(&variant),
        }
    }

    pub fn send(&mut self, command: &UciCommand) -> ChessResult<()> {
        let mut line = Vec::new();
        command.to_uci_wire(&mut line)?;
        debug!("< {}", String::from_utf8_lossy(&line).trim_end());
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Reads one line and updates the session with it.
    fn receive(&mut self) -> ChessResult<EngineResponse> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(ChessError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "the engine closed its output",
            )));
        }

        let line = line.trim_end();
        debug!("> {}", line);
        let response = EngineResponse::parse(line);
        match response {
            EngineResponse::IdName(ref name) => self.name = Some(name.clone()),
            EngineResponse::UciOk => self.ready = true,
            EngineResponse::Chess960Option => self.supports_chess960 = true,
            EngineResponse::VariantOption(ref variants) => {
                for &variant in variants {
                    if !self.variants.contains(&variant) {
                        self.variants.push(variant);
                    }
                }
            }
            EngineResponse::Info { centipawns, mate_in } => {
                if let Some(cp) = centipawns {
                    self.current.centipawns = cp;
                }

                if mate_in.is_some() {
                    self.current.mate_in = mate_in;
                }
            }
            EngineResponse::BestMove { ref best, ref ponder } => {
                self.current.best_move = best.clone();
                self.current.ponder = ponder.clone();
                self.evaluating = false;
            }
            _ => {}
        }

        Ok(response)
    }

    /// Introduces the session to the engine, waits for `uciok` and then
    /// applies the given options.
    pub fn handshake(&mut self, options: &[(String, String)], debug: bool) -> ChessResult<()> {
        self.send(&UciCommand::Uci)?;
        if debug {
            self.send(&UciCommand::DebugOn)?;
        }

        while !self.ready {
            self.receive()?;
        }

        for (name, value) in options {
            self.set_option(name, value)?;
        }

        info!(
            "engine {} is ready",
            self.name.as_ref().map(|n| n.as_str()).unwrap_or("(unnamed)")
        );
        Ok(())
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> ChessResult<()> {
        self.send(&UciCommand::SetOption {
            name: name.to_owned(),
            value: value.to_owned(),
        })
    }

    /// Sends `isready` and waits for the engine to catch up.
    pub fn synchronize(&mut self) -> ChessResult<()> {
        self.send(&UciCommand::IsReady)?;
        while self.receive()? != EngineResponse::ReadyOk {}
        Ok(())
    }

    /// Starts a search of the snapshot's position. A snapshot from another
    /// game than the last one starts a new game on the engine.
    pub fn evaluate(&mut self, snapshot: &EngineSnapshot, command: GoCommand) -> ChessResult<()> {
        if self.evaluating {
            return Err(ChessError::EngineBusy);
        }

        self.current = Evaluation::default();
        if self.last_start.as_ref() != Some(&snapshot.start_fen) {
            self.send(&UciCommand::UciNewGame)?;
            self.last_start = Some(snapshot.start_fen.clone());
        }

        self.set_option("UCI_Variant", &snapshot.variant_key)?;
        if snapshot.chess960 {
            self.set_option("UCI_Chess960", "true")?;
        }

        self.send(&UciCommand::Position {
            fen: snapshot.start_fen.clone(),
            moves: snapshot.moves_uci.clone(),
        })?;
        self.send(&UciCommand::Go(command, snapshot.clock))?;
        self.evaluating = true;
        self.infinite = command == GoCommand::Infinite;
        Ok(())
    }

    /// Snapshots the game and starts a search of it.
    pub fn evaluate_game(&mut self, game: &Game, command: GoCommand) -> ChessResult<()> {
        let snapshot = EngineSnapshot::of(game)?;
        self.evaluate(&snapshot, command)
    }

    /// Waits for the engine's best move. An infinite search is stopped first.
    pub fn await_evaluation(&mut self) -> ChessResult<Evaluation> {
        if self.infinite {
            return self.stop();
        }

        while self.evaluating {
            self.receive()?;
        }

        Ok(self.current.clone())
    }

    /// Tells the engine to stop searching and waits for its best move.
    pub fn stop(&mut self) -> ChessResult<Evaluation> {
        self.send(&UciCommand::Stop)?;
        self.infinite = false;
        self.await_evaluation()
    }

    pub fn quit(mut self) -> ChessResult<()> {
        self.send(&UciCommand::Quit)
    }
}

/// An engine running as a child process.
pub struct EngineProcess {
    child: Child,
    session: UciSession<BufReader<ChildStdout>, ChildStdin>,
}

impl EngineProcess {
    /// Launches the engine binary and completes the UCI handshake.
    pub fn spawn(binary: &str, args: &[String], options: &[(String, String)]) -> ChessResult<EngineProcess> {
        let mut child = Process::new(binary)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take().ok_or_else(|| {
            ChessError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "no engine stdin"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            ChessError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "no engine stdout"))
        })?;

        info!("launched engine {} (pid {})", binary, child.id());
        let mut session = UciSession::new(BufReader::new(stdout), stdin);
        session.handshake(options, false)?;
        Ok(EngineProcess { child, session })
    }

    pub fn session(&mut self) -> &mut UciSession<BufReader<ChildStdout>, ChildStdin> {
        &mut self.session
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        let _ = self.session.send(&UciCommand::Quit);
        if let Err(e) = self.child.kill() {
            debug!("engine already exited: {}", e);
        }

        let _ = self.child.wait();
    }
}
