// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use compact_chess::{
    Analysis, CastlingType, ChessError, Color, CommitOptions, EndReason, Game, GameStatus, Piece,
    PieceKind, Square, Variant,
};

fn game(fen: &str) -> Game {
    Game::from_fen(Variant::Standard, fen).unwrap()
}

fn play(game: &mut Game, uci: &str) {
    game.play_uci(uci).unwrap();
}

#[test]
fn en_passant_capture() {
    let mut game = game("8/8/8/8/1p6/8/P6P/8 w - -");
    play(&mut game, "h2h3");
    assert_eq!(None, game.position().en_passant_square());

    // hand the move back to white for the double push
    game.flip_side();
    play(&mut game, "a2a4");
    assert_eq!(Some(Square::A3), game.position().en_passant_square());

    let mov = game.uci_move("b4a3").unwrap().unwrap();
    assert!(mov.is_en_passant());
    game.commit(mov).unwrap();
    assert_eq!(2, game.position().occupancy().count());
    assert_eq!(None, game.position().piece_at(Square::A4));
    assert_eq!(
        Some(Piece::new(PieceKind::Pawn, Color::Black)),
        game.position().piece_at(Square::A3)
    );
}

#[test]
fn promotion() {
    let mut game = game("8/7P/8/8/8/8/7p/8 w");
    assert_eq!(1, game.position().pawns(Color::White).count());
    assert_eq!(1, game.position().pawns(Color::Black).count());

    play(&mut game, "h7h8q");
    assert_eq!(1, game.position().queens(Color::White).count());
    assert_eq!(1, game.position().pawns(Color::Black).count());

    play(&mut game, "h2h1q");
    assert_eq!(1, game.position().queens(Color::White).count());
    assert_eq!(1, game.position().queens(Color::Black).count());

    play(&mut game, "h8h1");
    assert_eq!(1, game.position().queens(Color::White).count());
    assert_eq!(0, game.position().queens(Color::Black).count());
}

#[test]
fn promotion_off_the_last_rank_is_rejected() {
    let game = game("8/8/8/8/8/8/4P3/8 w");
    let mov = game
        .new_move(Square::E2, Square::E3, Some(PieceKind::Queen), true)
        .unwrap();
    assert_eq!(
        Some("You can only promote on the last rank".to_owned()),
        game.illegal_reason(&mov)
    );
}

#[test]
fn castling_out_of_check() {
    let mut game = game("4k2r/8/8/3q3Q/8/8/8/R3K3 b");
    let pos = game.position();
    assert!(!pos.can_castle_kingside(Color::White));
    assert!(pos.can_castle_queenside(Color::White));
    assert!(pos.can_castle_kingside(Color::Black));
    assert!(!pos.can_castle_queenside(Color::Black));

    // the queen on h5 checks the black king
    let castle = game.uci_move("e8g8").unwrap().unwrap();
    assert!(!game.is_legal(&castle));

    play(&mut game, "d5h5");
    let long = game.uci_move("e1c1").unwrap().unwrap();
    assert_eq!(CastlingType::Queenside, long.castling());
    assert!(!game.is_legal(&long));
    game.commit_with(
        long,
        CommitOptions {
            allow_illegal: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(
        Some(Piece::new(PieceKind::Rook, Color::White)),
        game.position().piece_at(Square::D1)
    );

    let short = game.uci_move("e8g8").unwrap().unwrap();
    assert_eq!(CastlingType::Kingside, short.castling());
    assert!(game.is_legal(&short));
    game.commit(short).unwrap();
    assert_eq!(
        Some(Piece::new(PieceKind::Rook, Color::Black)),
        game.position().piece_at(Square::F8)
    );
}

#[test]
fn castling_needs_a_clear_path() {
    let mut game = game("rn2k3/8/1R6/8/8/8/8/4K3 b q -");
    assert!(!game.is_legal(&game.uci_move("e8c8").unwrap().unwrap()));

    play(&mut game, "b8c6");
    game.flip_side();

    // b8 is attacked, but the king never crosses it
    let castle = game.uci_move("e8c8").unwrap().unwrap();
    assert!(game.is_legal(&castle));
}

#[test]
fn pinned_pawn_cannot_move() {
    let game = game("8/8/8/8/4b3/8/6P1/7K w");
    let mov = game.uci_move("g2g3").unwrap().unwrap();
    assert!(game.illegal_reason(&mov).is_some());
}

#[test]
fn illegal_reply_to_check_loses() {
    let mut game = game("5k2/8/8/8/8/8/8/4K2R w K");
    assert!(!game.is_check());

    let castle = game.uci_move("e1g1").unwrap().unwrap();
    assert!(game.is_legal(&castle));
    game.commit(castle).unwrap();
    assert!(game.is_check());
    assert_ne!(EndReason::Checkmate, game.end_reason());

    match game.play_uci("f8f7") {
        Err(ChessError::RulesInfraction(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(EndReason::RulesInfraction, game.end_reason());
    assert_eq!(GameStatus::WhiteWins, game.status());
    assert!(game.play_uci("g1g2").is_err());
}

#[test]
fn stalemate() {
    let game = game("k1K5/pp6/N7/8/8/8/8/7B b");
    assert_eq!(EndReason::Stalemate, game.end_reason());
    assert_eq!(GameStatus::Draw, game.status());
}

#[test]
fn checkmate() {
    let game_over = game("8/8/8/3b4/8/Kk6/8/8 w - -");
    assert!(game_over.is_check());
    assert_eq!(EndReason::Checkmate, game_over.end_reason());
    assert_eq!(GameStatus::BlackWins, game_over.status());

    let mut game = game("5r2/3q2kp/6p1/1bpBP1K1/1p1p3P/6P1/3P1P2/r7 b - - 0 40");
    assert!(!game.is_check());
    play(&mut game, "d7f5");
    assert!(game.is_check());
    assert_eq!(EndReason::Checkmate, game.end_reason());
    assert_eq!(GameStatus::BlackWins, game.status());
}

#[test]
fn repetition() {
    let mut game = game("8/6k1/8/8/8/8/1KQ5/8 w - -");
    let shuffle = ["c2d2", "g7f7", "d2c2", "f7g7"];
    for uci in shuffle.iter() {
        play(&mut game, uci);
    }

    for uci in shuffle[..3].iter() {
        play(&mut game, uci);
    }

    assert!(!game.can_claim_draw());
    play(&mut game, "f7g7");
    assert_eq!(EndReason::Unterminated, game.end_reason());
    assert_eq!(GameStatus::Ongoing, game.status());
    assert!(game.can_claim_draw());
    assert_eq!(Some(EndReason::ThreefoldRepetition), game.claimable_draw());

    let mut copy = game.clone();
    copy.claim_draw().unwrap();
    assert_eq!(EndReason::ThreefoldRepetition, copy.end_reason());
    assert_eq!(GameStatus::Draw, copy.status());
    assert_eq!(EndReason::Unterminated, game.end_reason());
    assert_eq!(GameStatus::Ongoing, game.status());

    for uci in shuffle.iter() {
        play(&mut game, uci);
    }

    for uci in shuffle[..3].iter() {
        play(&mut game, uci);
    }

    assert_eq!(GameStatus::Ongoing, game.status());
    play(&mut game, "f7g7");
    assert_eq!(EndReason::FivefoldRepetition, game.end_reason());
    assert_eq!(GameStatus::Draw, game.status());
}

#[test]
fn draw_claim_without_cause() {
    let mut game = Game::started(Variant::Standard).unwrap();
    match game.claim_draw() {
        Err(ChessError::DrawNotClaimable) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn insufficient_material() {
    let mut game = game("4k3/8/2b5/8/4P3/8/6B1/4K3 b");
    assert_eq!(EndReason::Unterminated, game.end_reason());
    assert_eq!(GameStatus::Ongoing, game.status());
    play(&mut game, "c6e4");
    assert_eq!(EndReason::InsufficientMaterial, game.end_reason());
    assert_eq!(GameStatus::Draw, game.status());

    // knight and bishop can still mate
    let game_on = self::game("8/8/8/2k1NK2/4B3/8/8/8 w - -");
    assert_eq!(EndReason::Unterminated, game_on.end_reason());
    assert_eq!(GameStatus::Ongoing, game_on.status());

    let drawn = self::game("8/8/8/2k2K2/2b2B2/8/8/8 w - -");
    assert_eq!(EndReason::InsufficientMaterial, drawn.end_reason());
    assert_eq!(GameStatus::Draw, drawn.status());
}

#[test]
fn hanging_pawn() {
    let game = game("rnbqkb1r/pppppppp/5n2/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq -");
    let analysis = Analysis::new(game.position());
    assert_eq!(1, analysis.controllers(Square::E4).count());
    assert_eq!(1, analysis.attackers(Square::E4).count());
    assert_eq!(0, analysis.defenders(Square::E4).count());
    assert!(analysis.is_hanging(Square::E4));
    assert!(!analysis.is_hanging(Square::D2));
}

fn controlled_by_kind(fen: &str, kind: PieceKind, color: Option<Color>) -> usize {
    let game = game(fen);
    let pos = game.position();
    pos.occupancy()
        .into_iter()
        .filter(|&sq| match pos.piece_at(sq) {
            Some(piece) => piece.kind == kind && color.map_or(true, |c| c == piece.color),
            None => false,
        })
        .map(|sq| pos.controlled_squares(sq).count() as usize)
        .sum()
}

#[test]
fn controlled_squares() {
    assert_eq!(8, controlled_by_kind("8/5p2/8/8/8/8/8/2B2RN1 w", PieceKind::Rook, None));
    assert_eq!(
        8,
        controlled_by_kind(
            "8/8/8/4Pp2/8/8/P2P3P/8 w - f6 0 2",
            PieceKind::Pawn,
            Some(Color::White)
        )
    );
    assert_eq!(26, controlled_by_kind("7k/8/3k2k1/8/8/1k6/8/k7 w - -", PieceKind::King, None));
    assert_eq!(13, controlled_by_kind("8/8/8/8/3B4/8/8/8 w", PieceKind::Bishop, None));
    assert_eq!(27, controlled_by_kind("8/8/8/8/3Q4/8/8/8 w", PieceKind::Queen, None));
    assert_eq!(22, controlled_by_kind("8/1N4N1/8/8/3N4/8/1N4N1/8 w", PieceKind::Knight, None));
}

#[test]
fn every_square_occupied() {
    let fen = "NnBbRrQq/nnBbRrQq/BBBbRrQq/bbbbRrQq/RRRRRrQq/rrrrrrQq/QQQQQQQq/qqqqqqqq w - -";
    let game = game(fen);
    assert_eq!(64, game.position().occupancy().count());
    assert_eq!(fen, game.positional_fen(false));
}

#[test]
fn fifty_moves_are_claimable() {
    let game = game("8/8/4k3/8/8/3K4/8/7R w - - 101 80");
    assert_eq!(GameStatus::Ongoing, game.status());
    assert_eq!(Some(EndReason::FiftyMoveRule), game.claimable_draw());

    let game = self::game("8/8/4k3/8/8/3K4/8/7R w - - 151 100");
    assert_eq!(EndReason::SeventyFiveMoveRule, game.end_reason());
    assert_eq!(GameStatus::Draw, game.status());
}
