// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::convert::TryFrom;
use std::fmt::{self, Write};

use crate::attacks;
use crate::bitboard::Bitboard;
use crate::chess960;
use crate::language::Language;
use crate::moves::{CastlingType, Move};
use crate::types::TableIndex;
use crate::types::{CastleStatus, Color, Direction, File, Piece, PieceKind, Rank, Square};
use crate::types::{COLORS, FILES, PIECE_KINDS, RANKS};
use crate::variant::{Variant, RANDOM_960, STARTPOS};

/// Possible errors that can arise when parsing a FEN string into a `Position`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FenParseError {
    NotEnoughFields,
    UnexpectedChar(char),
    UnexpectedEnd,
    InvalidDigit,
    FileDoesNotSumToEight,
    UnknownPiece,
    InvalidSideToMove,
    InvalidCastle,
    InvalidEnPassant,
    InvalidHalfmove,
    InvalidFullmove,
}

/// The board state of a game: where the pieces are, whose turn it is and the
/// counters that the rules of the game depend on. A `Position` knows nothing
/// about clocks, history or tags; those live in `Game`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    boards_by_piece: [Bitboard; 12],
    boards_by_color: [Bitboard; 2],
    side_to_move: Color,
    castle_status: CastleStatus,
    en_passant_square: Option<Square>,
    draw_timer: u32,
    ply: u32,
    checks: [u32; 2],
    variant: Variant,
}

//
// Board state getters
//

impl Position {
    /// An empty board of the given variant, white to move on ply 1.
    pub fn new(variant: Variant) -> Position {
        Position {
            boards_by_piece: [Bitboard::none(); 12],
            boards_by_color: [Bitboard::none(); 2],
            side_to_move: Color::White,
            castle_status: CastleStatus::NONE,
            en_passant_square: None,
            draw_timer: 0,
            ply: 1,
            checks: [0; 2],
            variant,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castle_status(&self) -> CastleStatus {
        self.castle_status
    }

    pub fn can_castle_kingside(&self, color: Color) -> bool {
        self.castle_status.contains(CastleStatus::kingside(color))
    }

    pub fn can_castle_queenside(&self, color: Color) -> bool {
        self.castle_status.contains(CastleStatus::queenside(color))
    }

    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    /// Half-moves since the last pawn move or capture.
    pub fn draw_timer(&self) -> u32 {
        self.draw_timer
    }

    /// The ply about to be played, starting at 1.
    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// The move number shown in FEN and PGN for the current ply.
    pub fn fullmove_number(&self) -> u32 {
        (self.ply + 1) / 2
    }

    /// The number of checks the given color has delivered.
    pub fn checks(&self, color: Color) -> u32 {
        self.checks[color.as_index()]
    }

    pub fn pieces(&self, color: Color) -> Bitboard {
        self.boards_by_color[color.as_index()]
    }

    pub fn occupancy(&self) -> Bitboard {
        self.pieces(Color::White) | self.pieces(Color::Black)
    }

    pub fn piece_count(&self) -> u32 {
        self.occupancy().count()
    }

    pub fn pieces_of_kind(&self, color: Color, kind: PieceKind) -> Bitboard {
        let offset = match color {
            Color::White => 0,
            Color::Black => 6,
        };
        self.boards_by_piece[offset + kind.as_index()]
    }

    pub fn pawns(&self, color: Color) -> Bitboard {
        self.pieces_of_kind(color, PieceKind::Pawn)
    }

    pub fn knights(&self, color: Color) -> Bitboard {
        self.pieces_of_kind(color, PieceKind::Knight)
    }

    pub fn bishops(&self, color: Color) -> Bitboard {
        self.pieces_of_kind(color, PieceKind::Bishop)
    }

    pub fn rooks(&self, color: Color) -> Bitboard {
        self.pieces_of_kind(color, PieceKind::Rook)
    }

    pub fn queens(&self, color: Color) -> Bitboard {
        self.pieces_of_kind(color, PieceKind::Queen)
    }

    pub fn kings(&self, color: Color) -> Bitboard {
        self.pieces_of_kind(color, PieceKind::King)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.kings(color).first()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let (board_offset, color) = if self.boards_by_color[Color::White.as_index()].test(square) {
            (0, Color::White)
        } else if self.boards_by_color[Color::Black.as_index()].test(square) {
            (6, Color::Black)
        } else {
            return None;
        };

        for &kind in &PIECE_KINDS {
            let board = self.boards_by_piece[kind.as_index() + board_offset];
            if board.test(square) {
                return Some(Piece::new(kind, color));
            }
        }

        // If we get here, we failed to update a bitboard somewhere.
        unreachable!()
    }
}

//
// Board manipulation
//

impl Position {
    /// Places a piece, replacing whatever stood on the square.
    pub fn set_piece(&mut self, square: Square, piece: Piece) {
        self.unset_piece(square);
        self.boards_by_color[piece.color.as_index()].set(square);
        let offset = if piece.color == Color::White { 0 } else { 6 };
        self.boards_by_piece[piece.kind.as_index() + offset].set(square);
    }

    /// Removes and returns the piece on the square, if any.
    pub fn unset_piece(&mut self, square: Square) -> Option<Piece> {
        let existing = self.piece_at(square)?;
        self.boards_by_color[existing.color.as_index()].unset(square);
        let offset = if existing.color == Color::White { 0 } else { 6 };
        self.boards_by_piece[existing.kind.as_index() + offset].unset(square);
        Some(existing)
    }

    pub fn clear(&mut self) {
        self.boards_by_piece = [Bitboard::none(); 12];
        self.boards_by_color = [Bitboard::none(); 2];
    }

    pub fn set_variant(&mut self, variant: Variant) {
        self.variant = variant;
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    pub fn set_castle_status(&mut self, status: CastleStatus) {
        self.castle_status = status;
    }

    pub fn set_en_passant_square(&mut self, square: Option<Square>) {
        self.en_passant_square = square;
    }

    pub(crate) fn add_check(&mut self, color: Color) {
        self.checks[color.as_index()] += 1;
    }

    /// Plays a move on the board without asking whether it is legal. The
    /// moving piece may belong to either color; the turn passes regardless.
    ///
    /// Panics if there is no piece on the move's source square.
    pub fn apply(&mut self, mov: &Move) {
        let moving_piece = self
            .piece_at(mov.source())
            .expect("invalid move: no piece at source square");
        let mover = moving_piece.color;
        let back_rank = mov.source().rank();
        let mut capture = false;

        if mov.is_en_passant() {
            // The captured pawn stands beside the moving pawn, not on the
            // destination square.
            let captured = Square::of(mov.source().rank(), mov.destination().file());
            capture = self.unset_piece(captured).is_some();
        }

        if mov.is_castle() {
            let rook_square = if self.variant == Variant::Chess960 {
                mov.destination()
            } else if mov.is_kingside_castle() {
                Square::of(back_rank, File::H)
            } else {
                Square::of(back_rank, File::A)
            };

            let (king_target, rook_target) = castle_landing(back_rank, mov.castling());
            self.unset_piece(mov.source());
            let rook = match self.piece_at(rook_square) {
                Some(piece) if piece.color == mover && piece.kind == PieceKind::Rook => {
                    self.unset_piece(rook_square)
                }
                _ => None,
            };

            self.set_piece(king_target, moving_piece);
            if let Some(rook) = rook {
                self.set_piece(rook_target, rook);
            }
        } else {
            if let Some(captured) = self.piece_at(mov.destination()) {
                capture = true;
                if captured.kind == PieceKind::Rook {
                    self.clear_rook_right(captured.color, mov.destination());
                }
            }

            let piece_to_add = match mov.promotion_piece() {
                Some(kind) if moving_piece.kind == PieceKind::Pawn => Piece::new(kind, mover),
                _ => moving_piece,
            };

            self.unset_piece(mov.source());
            self.set_piece(mov.destination(), piece_to_add);
        }

        // Double pawn pushes set the en-passant square, every other move
        // clears it.
        self.en_passant_square = None;
        if moving_piece.kind == PieceKind::Pawn {
            let from_rank = mov.source().rank().as_index() as i32;
            let to_rank = mov.destination().rank().as_index() as i32;
            if (from_rank - to_rank).abs() == 2 {
                let skipped = mov.source().towards(Direction::forward(mover));
                self.en_passant_square = Some(skipped);
            }
        }

        if moving_piece.kind == PieceKind::Pawn || capture {
            self.draw_timer = 0;
        } else {
            self.draw_timer += 1;
        }

        match moving_piece.kind {
            PieceKind::King => self.castle_status &= !CastleStatus::both(mover),
            PieceKind::Rook if !mov.is_castle() => self.clear_rook_right(mover, mov.source()),
            _ => {}
        }

        if mov.is_castle() {
            self.castle_status &= !CastleStatus::both(mover);
        }

        self.side_to_move = self.side_to_move.toggle();
        self.ply += 1;
    }

    /// A rook of the given color left (or was captured on) `square`; drop the
    /// castling right it stood for.
    fn clear_rook_right(&mut self, color: Color, square: Square) {
        let back_rank = Rank::back_rank(color);
        if square.rank() != back_rank {
            return;
        }

        if self.variant == Variant::Chess960 {
            if let Some(king) = self.king_square(color) {
                if king.rank() == back_rank {
                    if square.file() > king.file() {
                        self.castle_status &= !CastleStatus::kingside(color);
                    } else {
                        self.castle_status &= !CastleStatus::queenside(color);
                    }
                }
            }
            return;
        }

        if square.file() == File::H {
            self.castle_status &= !CastleStatus::kingside(color);
        } else if square.file() == File::A {
            self.castle_status &= !CastleStatus::queenside(color);
        }
    }

    /// Drops castling rights whose king and rook are no longer on their
    /// orthodox squares. Variants that place rooks elsewhere, or don't castle
    /// at all, keep their rights untouched.
    pub fn determine_castling_rights(&mut self) {
        match self.variant {
            Variant::Chess960 | Variant::Antichess | Variant::RacingKings => return,
            _ => {}
        }

        for &color in COLORS.iter() {
            let back_rank = Rank::back_rank(color);
            let has = |pos: &Position, file: File, kind: PieceKind| {
                pos.piece_at(Square::of(back_rank, file)) == Some(Piece::new(kind, color))
            };

            if !has(self, File::E, PieceKind::King) {
                self.castle_status &= !CastleStatus::both(color);
                continue;
            }

            if !has(self, File::H, PieceKind::Rook) {
                self.castle_status &= !CastleStatus::kingside(color);
            }

            if !has(self, File::A, PieceKind::Rook) {
                self.castle_status &= !CastleStatus::queenside(color);
            }
        }
    }

    /// Rights for a Chess960 board whose FEN didn't say: a side may castle
    /// towards any back-rank rook of its own on either side of its king.
    fn infer_chess960_castling(&mut self) {
        let mut status = CastleStatus::NONE;
        for &color in COLORS.iter() {
            if self.castling_rook(color, CastlingType::Kingside).is_some() {
                status |= CastleStatus::kingside(color);
            }

            if self.castling_rook(color, CastlingType::Queenside).is_some() {
                status |= CastleStatus::queenside(color);
            }
        }

        self.castle_status = status;
    }

    /// The square of the rook that castles on the given side. In Chess960 this
    /// is the outermost rook of that color on the back rank on that side of
    /// the king; otherwise the rook must stand in its corner.
    pub fn castling_rook(&self, color: Color, side: CastlingType) -> Option<Square> {
        let back_rank = Rank::back_rank(color);
        let rook = Piece::new(PieceKind::Rook, color);
        if self.variant != Variant::Chess960 {
            let square = match side {
                CastlingType::Kingside => Square::of(back_rank, File::H),
                CastlingType::Queenside => Square::of(back_rank, File::A),
                CastlingType::None => return None,
            };

            return if self.piece_at(square) == Some(rook) {
                Some(square)
            } else {
                None
            };
        }

        let king = self.king_square(color)?;
        if king.rank() != back_rank {
            return None;
        }

        let king_file = king.file().as_index();
        let candidates: Vec<usize> = match side {
            CastlingType::Kingside => (king_file + 1..8).rev().collect(),
            CastlingType::Queenside => (0..king_file).collect(),
            CastlingType::None => return None,
        };

        candidates
            .into_iter()
            .map(|file| Square::of(back_rank, File::from_index(file)))
            .find(|&sq| self.piece_at(sq) == Some(rook))
    }
}

/// Where king and rook end up after castling on the given back rank.
pub fn castle_landing(back_rank: Rank, side: CastlingType) -> (Square, Square) {
    match side {
        CastlingType::Queenside => (Square::of(back_rank, File::C), Square::of(back_rank, File::D)),
        _ => (Square::of(back_rank, File::G), Square::of(back_rank, File::F)),
    }
}

//
// Board analysis (controlled squares and check detection)
//

impl Position {
    /// The squares the piece on `square` could move to considering only how
    /// it moves and what stands in its way. Castling is not included and
    /// whether the move leaves a king in check is not considered.
    pub fn controlled_squares(&self, square: Square) -> Bitboard {
        let piece = match self.piece_at(square) {
            Some(piece) => piece,
            None => return Bitboard::none(),
        };

        let own = self.pieces(piece.color);
        let theirs = self.pieces(piece.color.toggle());
        let occupancy = own | theirs;
        if piece.kind != PieceKind::Pawn {
            return piece.attacks(square, occupancy).without(own);
        }

        let mut controlled = Bitboard::none();
        let forward = Direction::forward(piece.color);
        let promotion_rank = Rank::promotion_rank(piece.color);
        if square.rank() != promotion_rank {
            let one = square.towards(forward);
            if !occupancy.test(one) {
                controlled.set(one);
                if square.rank() == Rank::pawn_rank(piece.color) {
                    let two = one.towards(forward);
                    if !occupancy.test(two) {
                        controlled.set(two);
                    }
                }
            }
        }

        let mut targets = theirs;
        if let Some(ep) = self.en_passant_square {
            targets.set(ep);
        }

        controlled | attacks::pawn_attacks(square, piece.color).and(targets)
    }

    /// The union of the controlled squares of every piece of the given color.
    pub fn controlled_by(&self, color: Color) -> Bitboard {
        self.pieces(color)
            .into_iter()
            .fold(Bitboard::none(), |acc, sq| acc | self.controlled_squares(sq))
    }

    /// Squares holding a piece of color `to_move` that attacks `target`,
    /// whether or not the target is occupied.
    pub fn squares_attacking(&self, to_move: Color, target: Square) -> Bitboard {
        let mut attacks = Bitboard::none();

        // Pretend that there's a "super-piece" at the target square and see if it hits anything.
        let occupancy = self.occupancy();
        let sliding_pieces = self.queens(to_move) | self.rooks(to_move) | self.bishops(to_move);
        let sliding_attacks = attacks::queen_attacks(target, occupancy).and(sliding_pieces);
        for attacker in sliding_attacks {
            let piece = self
                .piece_at(attacker)
                .expect("attack table produced piece not on board?");
            if piece.attacks(attacker, occupancy).test(target) {
                attacks.set(attacker);
            }
        }

        attacks = attacks | attacks::knight_attacks(target).and(self.knights(to_move));

        // A pawn attacking the target stands where a pawn of the other color
        // on the target would attack.
        attacks = attacks | attacks::pawn_attacks(target, to_move.toggle()).and(self.pawns(to_move));
        attacks | attacks::king_attacks(target).and(self.kings(to_move))
    }

    pub fn is_attacked(&self, by: Color, target: Square) -> bool {
        !self.squares_attacking(by, target).empty()
    }

    pub fn is_check(&self, color: Color) -> bool {
        self.kings(color)
            .into_iter()
            .any(|king| self.is_attacked(color.toggle(), king))
    }
}

//
// FEN parsing and generation.
//
// Besides ordinary six-field FEN, two sentinels are understood: `startpos`
// loads the variant's own start position and `random960` a random Chess960
// setup. Everything after the side to move is optional.
//

impl Position {
    /// Parses a FEN string for a game of the given variant.
    pub fn from_fen<S: AsRef<str>>(variant: Variant, fen: S) -> Result<Position, FenParseError> {
        let mut pos = Position::new(variant);
        pos.load_fen(fen.as_ref())?;
        Ok(pos)
    }

    /// Replaces the board and all counters with the ones described by `fen`.
    /// The variant is kept.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), FenParseError> {
        use std::iter::Peekable;
        use std::str::Chars;

        type Stream<'a> = Peekable<Chars<'a>>;

        fn advance<'a>(iter: &mut Stream<'a>) -> Result<(), FenParseError> {
            let _ = iter.next();
            Ok(())
        }

        fn peek<'a>(iter: &mut Stream<'a>) -> Result<char, FenParseError> {
            if let Some(c) = iter.peek() {
                Ok(*c)
            } else {
                Err(FenParseError::UnexpectedEnd)
            }
        }

        // Piece placement, with or without the slashes between ranks.
        fn eat_placement<'a>(
            iter: &mut Stream<'a>,
            pos: &mut Position,
        ) -> Result<(), FenParseError> {
            for &rank in RANKS.iter().rev() {
                let mut file = File::A.as_index();
                while file <= File::H.as_index() {
                    let c = peek(iter)?;
                    // digits 1 through 8 indicate empty squares.
                    if c.is_digit(10) {
                        if c < '1' || c > '8' {
                            return Err(FenParseError::InvalidDigit);
                        }

                        file += c as usize - '0' as usize;
                        if file > 8 {
                            return Err(FenParseError::FileDoesNotSumToEight);
                        }

                        advance(iter)?;
                        continue;
                    }

                    // if it's not a digit, it represents a piece.
                    let piece = Piece::try_from(c).map_err(|_| FenParseError::UnknownPiece)?;
                    pos.set_piece(Square::of(rank, File::from_index(file)), piece);
                    advance(iter)?;
                    file += 1;
                }

                if rank != Rank::One && iter.peek() == Some(&'/') {
                    advance(iter)?;
                }
            }

            match iter.next() {
                Some(c) => Err(FenParseError::UnexpectedChar(c)),
                None => Ok(()),
            }
        }

        fn eat_side_to_move(field: &str) -> Result<Color, FenParseError> {
            match field {
                "w" => Ok(Color::White),
                "b" => Ok(Color::Black),
                _ => Err(FenParseError::InvalidSideToMove),
            }
        }

        fn eat_castle_status(field: &str) -> Result<CastleStatus, FenParseError> {
            if field == "-" {
                return Ok(CastleStatus::NONE);
            }

            let mut status = CastleStatus::NONE;
            for c in field.chars() {
                match c {
                    'K' => status |= CastleStatus::WHITE_KINGSIDE,
                    'k' => status |= CastleStatus::BLACK_KINGSIDE,
                    'Q' => status |= CastleStatus::WHITE_QUEENSIDE,
                    'q' => status |= CastleStatus::BLACK_QUEENSIDE,
                    _ => return Err(FenParseError::InvalidCastle),
                }
            }

            Ok(status)
        }

        fn eat_en_passant(field: &str) -> Result<Option<Square>, FenParseError> {
            if field == "-" {
                return Ok(None);
            }

            Square::from_algebraic(field)
                .map(Some)
                .ok_or(FenParseError::InvalidEnPassant)
        }

        let fen = fen.trim();
        if fen.eq_ignore_ascii_case(STARTPOS) {
            let start = self.variant.start_fen();
            return self.load_fen(start);
        }

        if fen.eq_ignore_ascii_case(RANDOM_960) {
            return self.load_fen(&chess960::random());
        }

        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(FenParseError::NotEnoughFields);
        }

        let mut pos = Position::new(self.variant);
        eat_placement(&mut fields[0].chars().peekable(), &mut pos)?;
        pos.side_to_move = eat_side_to_move(fields[1])?;
        match fields.get(2) {
            Some(field) => pos.castle_status = eat_castle_status(field)?,
            None => match pos.variant {
                Variant::Antichess | Variant::RacingKings => {}
                Variant::Chess960 => pos.infer_chess960_castling(),
                _ => {
                    pos.castle_status = CastleStatus::all();
                    pos.determine_castling_rights();
                }
            },
        }

        if let Some(field) = fields.get(3) {
            pos.en_passant_square = eat_en_passant(field)?;
        }

        if let Some(field) = fields.get(4) {
            pos.draw_timer = field
                .parse::<u32>()
                .map_err(|_| FenParseError::InvalidHalfmove)?;
        }

        if let Some(field) = fields.get(5) {
            let fullmove = field
                .parse::<u32>()
                .map_err(|_| FenParseError::InvalidFullmove)?
                .max(1);
            pos.ply = fullmove * 2 - 1;
            if pos.side_to_move == Color::Black {
                pos.ply += 1;
            }
        }

        *self = pos;
        Ok(())
    }

    /// The first four FEN fields. The compact form leaves out the slashes
    /// between ranks; it is the fingerprint used to detect repetitions.
    pub fn positional_fen(&self, compact: bool) -> String {
        let mut buf = String::new();
        for &rank in RANKS.iter().rev() {
            let mut empty_squares = 0;
            for &file in &FILES {
                let square = Square::of(rank, file);
                if let Some(piece) = self.piece_at(square) {
                    if empty_squares != 0 {
                        write!(&mut buf, "{}", empty_squares).unwrap();
                    }
                    write!(&mut buf, "{}", piece).unwrap();
                    empty_squares = 0;
                } else {
                    empty_squares += 1;
                }
            }

            if empty_squares != 0 {
                write!(&mut buf, "{}", empty_squares).unwrap();
            }

            if !compact && rank != Rank::One {
                buf.push('/');
            }
        }

        write!(&mut buf, " {} {} ", self.side_to_move, self.castle_status).unwrap();
        match self.en_passant_square {
            Some(ep_square) => write!(&mut buf, "{}", ep_square).unwrap(),
            None => buf.push('-'),
        }
        buf
    }

    /// The full FEN. The compact form is the compact positional FEN, followed
    /// by the draw timer and move number unless both are at their defaults.
    pub fn fen(&self, compact: bool) -> String {
        if compact && self.draw_timer == 0 && self.ply == 1 {
            return self.positional_fen(true);
        }

        format!(
            "{} {} {}",
            self.positional_fen(compact),
            self.draw_timer,
            self.fullmove_number()
        )
    }
}

//
// Text rendering
//

impl Position {
    /// Draws the board as text from `perspective`'s side. Pieces are shown as
    /// figurines on □/■ squares, or as letters of `language` (upper case for
    /// white) on `.` squares.
    pub fn render(&self, perspective: Color, language: Option<Language>, coordinates: bool) -> String {
        let mut ranks: Vec<Rank> = RANKS.iter().rev().cloned().collect();
        let mut files: Vec<File> = FILES.to_vec();
        if perspective == Color::Black {
            ranks.reverse();
            files.reverse();
        }

        let mut buf = String::new();
        for &rank in &ranks {
            if coordinates {
                write!(&mut buf, "{} ", rank).unwrap();
            }

            for &file in &files {
                let square = Square::of(rank, file);
                let cell = match (self.piece_at(square), language) {
                    (Some(piece), None) => piece.figurine(),
                    (Some(piece), Some(lang)) => {
                        let letter = lang.letter(piece.kind);
                        match piece.color {
                            Color::White => letter,
                            Color::Black => letter.to_ascii_lowercase(),
                        }
                    }
                    (None, None) if square.is_light() => '□',
                    (None, None) => '■',
                    (None, Some(_)) => '.',
                };
                buf.push(cell);
            }

            buf.push('\n');
        }

        if coordinates {
            buf.push_str("  ");
            for &file in &files {
                write!(&mut buf, "{}", file).unwrap();
            }
            buf.push('\n');
        }

        buf
    }
}

//
// Trait implementations
//

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &rank in RANKS.iter().rev() {
            for &file in &FILES {
                let sq = Square::of(rank, file);
                if let Some(piece) = self.piece_at(sq) {
                    write!(f, " {} ", piece)?;
                } else {
                    write!(f, " . ")?;
                }
            }

            writeln!(f, "| {}", rank)?;
        }

        for _ in &FILES {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for &file in &FILES {
            write!(f, " {} ", file)?;
        }

        writeln!(f)?;
        Ok(())
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(Variant::Standard)
    }
}

#[cfg(test)]
mod tests {
    use crate::moves::{CastlingType, Move};
    use crate::position::Position;
    use crate::types::{CastleStatus, Color, PieceKind, Square};
    use crate::variant::{Variant, STANDARD_FEN};

    fn standard(fen: &str) -> Position {
        Position::from_fen(Variant::Standard, fen).unwrap()
    }

    #[test]
    fn check_smoke() {
        let pos = standard("r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1");
        assert!(pos.is_check(Color::Black));
        assert!(!pos.is_check(Color::White));
    }

    #[test]
    fn pawn_attacks_empty_diagonals() {
        let pos = standard("8/8/8/3p4/8/8/8/8 w - - 0 1");
        assert!(pos.is_attacked(Color::Black, Square::E4));
        assert!(pos.is_attacked(Color::Black, Square::C4));
        assert!(!pos.is_attacked(Color::Black, Square::D4));
    }

    #[test]
    fn controlled_squares_exclude_own_pieces() {
        let pos = standard(STANDARD_FEN);
        assert_eq!(2, pos.controlled_squares(Square::G1).count());
        assert_eq!(0, pos.controlled_squares(Square::A1).count());
        assert_eq!(2, pos.controlled_squares(Square::E2).count());
        assert_eq!(20, pos.controlled_by(Color::White).count());
    }

    #[test]
    fn pawn_controls_en_passant_square() {
        let pos = standard("8/8/8/3Pp3/8/8/8/8 w - e6 0 1");
        let controlled = pos.controlled_squares(Square::D5);
        assert!(controlled.test(Square::E6));
        assert!(controlled.test(Square::D6));
        assert_eq!(2, controlled.count());
    }

    mod fen {
        use super::standard;
        use crate::position::{FenParseError, Position};
        use crate::types::{CastleStatus, Color, Piece, PieceKind, Square};
        use crate::variant::{Variant, STANDARD_FEN};

        #[test]
        fn starting_position() {
            let pos = standard(STANDARD_FEN);
            assert_eq!(32, pos.piece_count());
            assert_eq!(
                Some(Piece::new(PieceKind::Queen, Color::White)),
                pos.piece_at(Square::D1)
            );
            assert_eq!(
                Some(Piece::new(PieceKind::King, Color::Black)),
                pos.piece_at(Square::E8)
            );
            assert_eq!(CastleStatus::all(), pos.castle_status());
            assert_eq!(1, pos.ply());
            assert_eq!(STANDARD_FEN, pos.fen(false));
        }

        #[test]
        fn sentinels() {
            let pos = Position::from_fen(Variant::RacingKings, "startpos").unwrap();
            assert_eq!("8/8/8/8/8/8/krbnNBRK/qrbnNBRQ w - - 0 1", pos.fen(false));

            let pos = Position::from_fen(Variant::Chess960, "random960").unwrap();
            assert_eq!(32, pos.piece_count());
        }

        #[test]
        fn compact_forms() {
            let pos = standard(STANDARD_FEN);
            assert_eq!(
                "rnbqkbnrpppppppp8888PPPPPPPPRNBQKBNR w KQkq -",
                pos.fen(true)
            );

            let pos = standard("8/8/8/8/8/8/8/4K2k b - - 3 20");
            assert_eq!("88888884K2k b - - 3 20", pos.fen(true));
            assert_eq!(40, pos.ply());
        }

        #[test]
        fn compact_placement_parses() {
            let pos = standard("rnbqkbnrpppppppp8888PPPPPPPPRNBQKBNR w KQkq -");
            assert_eq!(STANDARD_FEN, pos.fen(false));
        }

        #[test]
        fn missing_fields() {
            assert_eq!(
                FenParseError::NotEnoughFields,
                Position::from_fen(Variant::Standard, "8/8/8/8/8/8/8/8").unwrap_err()
            );
            assert_eq!(
                FenParseError::NotEnoughFields,
                Position::from_fen(Variant::Standard, "").unwrap_err()
            );
        }

        #[test]
        fn absent_castling_is_inferred() {
            let pos = standard("r3k3/8/8/8/8/8/8/4K2R w");
            assert_eq!(
                CastleStatus::WHITE_KINGSIDE | CastleStatus::BLACK_QUEENSIDE,
                pos.castle_status()
            );

            let pos = Position::from_fen(Variant::Antichess, "r3k3/8/8/8/8/8/8/4K2R w").unwrap();
            assert_eq!(CastleStatus::NONE, pos.castle_status());

            let pos = Position::from_fen(Variant::Chess960, "1r4kr/8/8/8/8/8/8/RK6 w").unwrap();
            assert_eq!(
                CastleStatus::WHITE_QUEENSIDE | CastleStatus::BLACK,
                pos.castle_status()
            );
        }

        #[test]
        fn errors() {
            let err = |fen: &str| Position::from_fen(Variant::Standard, fen).unwrap_err();
            assert_eq!(FenParseError::UnknownPiece, err("z7/8/8/8/8/8/8/8 w - - 0 1"));
            assert_eq!(FenParseError::InvalidDigit, err("9/8/8/8/8/8/8/8 w - - 0 1"));
            assert_eq!(
                FenParseError::FileDoesNotSumToEight,
                err("pppp5/8/8/8/8/8/8/8 w - - 0 1")
            );
            assert_eq!(FenParseError::UnexpectedEnd, err("8/8/8 w - - 0 1"));
            assert_eq!(FenParseError::InvalidSideToMove, err("8/8/8/8/8/8/8/8 c - - 0 1"));
            assert_eq!(FenParseError::InvalidCastle, err("8/8/8/8/8/8/8/8 w a - 0 1"));
            assert_eq!(FenParseError::InvalidEnPassant, err("8/8/8/8/8/8/8/8 w - 88 0 1"));
            assert_eq!(FenParseError::InvalidHalfmove, err("8/8/8/8/8/8/8/8 w - - q 1"));
            assert_eq!(FenParseError::InvalidFullmove, err("8/8/8/8/8/8/8/8 w - - 0 q"));
            assert_eq!(
                FenParseError::UnexpectedChar('p'),
                err("8/8/8/8/8/8/8/8p w - - 0 1")
            );
        }
    }

    mod apply {
        use super::*;

        fn quiet(from: Square, to: Square) -> Move {
            Move::new(from, to, None, CastlingType::None, false)
        }

        #[test]
        fn opening_pawn() {
            let mut pos = standard("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 2 1");
            pos.apply(&quiet(Square::E2, Square::E4));
            assert_eq!(Color::Black, pos.side_to_move());
            assert_eq!(2, pos.ply());
            assert_eq!(1, pos.fullmove_number());
            assert_eq!(0, pos.draw_timer());
            assert_eq!(Some(Square::E3), pos.en_passant_square());
            assert!(pos.piece_at(Square::E2).is_none());
        }

        #[test]
        fn quiet_piece_move_ticks_timer() {
            let mut pos = standard("8/8/8/8/8/8/4B3/8 w - - 5 2");
            pos.apply(&quiet(Square::E2, Square::G4));
            assert_eq!(6, pos.draw_timer());
        }

        #[test]
        fn en_passant_capture() {
            let mut pos = standard("8/8/8/8/Pp6/8/8/8 b - a3 0 1");
            pos.apply(&Move::new(Square::B4, Square::A3, None, CastlingType::None, true));
            assert_eq!(1, pos.piece_count());
            assert_eq!(
                Some(crate::types::Piece::new(PieceKind::Pawn, Color::Black)),
                pos.piece_at(Square::A3)
            );
        }

        #[test]
        fn promotion_replaces_pawn() {
            let mut pos = standard("8/7P/8/8/8/8/8/8 w - - 0 1");
            pos.apply(&Move::new(
                Square::H7,
                Square::H8,
                Some(PieceKind::Queen),
                CastlingType::None,
                false,
            ));
            assert_eq!(
                Some(PieceKind::Queen),
                pos.piece_at(Square::H8).map(|p| p.kind)
            );
        }

        #[test]
        fn king_and_rook_moves_drop_rights() {
            let mut pos = standard("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
            pos.apply(&quiet(Square::H1, Square::H8));
            assert_eq!(
                CastleStatus::WHITE_QUEENSIDE | CastleStatus::BLACK_QUEENSIDE,
                pos.castle_status()
            );

            pos.apply(&quiet(Square::E8, Square::D8));
            assert_eq!(CastleStatus::WHITE_QUEENSIDE, pos.castle_status());
        }

        #[test]
        fn orthodox_castles() {
            let mut pos = standard("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
            pos.apply(&Move::new(Square::E1, Square::G1, None, CastlingType::Kingside, false));
            assert_eq!(Some(PieceKind::King), pos.piece_at(Square::G1).map(|p| p.kind));
            assert_eq!(Some(PieceKind::Rook), pos.piece_at(Square::F1).map(|p| p.kind));
            assert!(pos.piece_at(Square::H1).is_none());

            pos.apply(&Move::new(Square::E8, Square::C8, None, CastlingType::Queenside, false));
            assert_eq!(Some(PieceKind::King), pos.piece_at(Square::C8).map(|p| p.kind));
            assert_eq!(Some(PieceKind::Rook), pos.piece_at(Square::D8).map(|p| p.kind));
            assert_eq!(CastleStatus::NONE, pos.castle_status());
        }

        #[test]
        fn chess960_castle_onto_rook() {
            let mut pos = Position::from_fen(Variant::Chess960, "3rk3/8/8/8/8/8/8/4KR2 w Kq - 0 1")
                .unwrap();
            assert_eq!(
                Some(Square::F1),
                pos.castling_rook(Color::White, CastlingType::Kingside)
            );
            pos.apply(&Move::new(Square::E1, Square::F1, None, CastlingType::Kingside, false));
            assert_eq!(Some(PieceKind::King), pos.piece_at(Square::G1).map(|p| p.kind));
            assert_eq!(Some(PieceKind::Rook), pos.piece_at(Square::F1).map(|p| p.kind));
            assert_eq!(CastleStatus::BLACK_QUEENSIDE, pos.castle_status());
        }
    }

    #[test]
    fn render_figurines() {
        let pos = standard("8/8/8/8/8/8/8/K6k w - - 0 1");
        let board = pos.render(Color::White, None, false);
        let last = board.lines().last().unwrap();
        assert_eq!("♔□■□■□■♚", last);

        let flipped = pos.render(Color::Black, Some(crate::language::Language::German), true);
        let lines: Vec<&str> = flipped.lines().collect();
        assert_eq!("1 k......K", lines[0]);
        assert_eq!("  hgfedcba", lines[8]);
    }
}
