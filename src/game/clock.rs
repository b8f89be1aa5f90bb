// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Game clocks. All times are milliseconds; timestamps are supplied by the
//! caller or read from the system clock.
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

use crate::error::{ChessError, ChessResult};
use crate::types::Color;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeControl {
    Unlimited,
    SuddenDeath,
    Increment,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clock {
    time_control: TimeControl,
    initial_ms: i64,
    white_ms: i64,
    black_ms: i64,
    increment_ms: i64,
    ply_start: i64,
}

lazy_static! {
    static ref TIME_CONTROL: Regex =
        Regex::new(r"^(?:(\d+):(\d+)|(\d+))(?:\+(\d+)(?:\s*seconds)?)?$").unwrap();
}

impl Clock {
    pub fn unlimited() -> Clock {
        Clock {
            time_control: TimeControl::Unlimited,
            initial_ms: 0,
            white_ms: 0,
            black_ms: 0,
            increment_ms: 0,
            ply_start: 0,
        }
    }

    /// Both sides start with `ms` on the clock and gain `increment_ms` after
    /// each of their moves. A zero increment is sudden death.
    pub fn timed(ms: i64, increment_ms: i64) -> Clock {
        let time_control = if increment_ms == 0 {
            TimeControl::SuddenDeath
        } else {
            TimeControl::Increment
        };

        Clock {
            time_control,
            initial_ms: ms,
            white_ms: ms,
            black_ms: ms,
            increment_ms,
            ply_start: 0,
        }
    }

    /// Parses the value of a PGN TimeControl tag: `-`, `S`, `S+I` or
    /// `H:M+I`, where S and I are seconds.
    pub fn from_pgn(value: &str) -> ChessResult<Clock> {
        let value = value.trim();
        if value == "-" {
            return Ok(Clock::unlimited());
        }

        let invalid = || ChessError::InvalidPgn(format!("Invalid TimeControl: {}", value));
        let caps = TIME_CONTROL.captures(value).ok_or_else(invalid)?;
        let number = |idx: usize| -> ChessResult<i64> {
            match caps.get(idx) {
                Some(m) => m.as_str().parse::<i64>().map_err(|_| invalid()),
                None => Ok(0),
            }
        };

        let seconds = if caps.get(1).is_some() {
            (number(1)? * 60 + number(2)?) * 60
        } else {
            number(3)?
        };

        Ok(Clock::timed(seconds * 1000, number(4)? * 1000))
    }

    /// The value of a PGN TimeControl tag describing this clock.
    pub fn pgn_time_control(&self) -> String {
        match self.time_control {
            TimeControl::Unlimited => "-".to_owned(),
            TimeControl::SuddenDeath => format!("{}+0", self.initial_ms / 1000),
            TimeControl::Increment => format!(
                "{}+{}",
                self.initial_ms / 1000,
                self.increment_ms / 1000
            ),
        }
    }

    pub fn time_control(&self) -> TimeControl {
        self.time_control
    }

    pub fn is_timed(&self) -> bool {
        self.time_control != TimeControl::Unlimited
    }

    pub fn initial_ms(&self) -> i64 {
        self.initial_ms
    }

    pub fn increment_ms(&self) -> i64 {
        self.increment_ms
    }

    pub fn remaining(&self, color: Color) -> i64 {
        match color {
            Color::White => self.white_ms,
            Color::Black => self.black_ms,
        }
    }

    pub fn set_remaining(&mut self, color: Color, ms: i64) {
        match color {
            Color::White => self.white_ms = ms,
            Color::Black => self.black_ms = ms,
        }
    }

    /// Starts timing the current ply at `now`.
    pub(crate) fn start_ply(&mut self, now: i64) {
        self.ply_start = now;
    }

    /// Charges `color` for the ply that ends at `now` and starts timing the
    /// next one. Returns the time the ply took.
    pub(crate) fn punch(&mut self, color: Color, now: i64) -> i64 {
        let elapsed = now - self.ply_start;
        let mut remaining = self.remaining(color);
        if self.time_control == TimeControl::Increment {
            remaining += self.increment_ms;
        }

        self.set_remaining(color, remaining - elapsed);
        self.ply_start = now;
        elapsed
    }
}

impl Default for Clock {
    fn default() -> Clock {
        Clock::unlimited()
    }
}

/// Formats a duration for display. Clocks show `MM:SS.ffff`, with hours
/// once they pass an hour; annotations always use `H:MM:SS`.
pub fn format_time(ms: i64, for_annotation: bool) -> String {
    let mut time = String::new();
    let ms = if ms < 0 {
        time.push('-');
        -ms
    } else {
        ms
    };

    let mut body = format!("{:02}", (ms / 1000) % 60);
    if !for_annotation {
        body = format!("{}.{:04}", body, ms % 1000);
    }

    if ms >= 60_000 || for_annotation {
        body = format!("{:02}:{}", (ms / 60_000) % 60, body);
        if ms >= 3_600_000 || for_annotation {
            let hours = (ms / 3_600_000) % 24;
            body = if for_annotation {
                format!("{}:{}", hours, body)
            } else {
                format!("{:02}:{}", hours, body)
            };
        }
    }

    time.push_str(&body);
    time
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
