// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate clap;
#[macro_use]
extern crate serde_derive;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::time::Instant;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use compact_chess::game::play;
use compact_chess::notation::{parse_cgn, parse_pgn, to_pgn, write_cgn};
use compact_chess::{
    divide, perft, AlgebraicVariation, Analysis, CgnVersion, ChessResult, Color, Game, Language,
    Position, Variant,
};

#[derive(Serialize)]
struct GameSummary {
    tags: BTreeMap<String, String>,
    variant: String,
    result: String,
    termination: String,
    plies: usize,
    moves: Vec<String>,
}

#[derive(Serialize)]
struct MoveRecord {
    game: usize,
    ply: usize,
    uci: String,
    san: String,
    fen: String,
    annotation: String,
}

/// The game formats a file can hold.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Format {
    Pgn,
    Cgn(CgnVersion),
}

fn variant_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("variant")
        .help("Chess variant, by name or UCI key")
        .value_name("VARIANT")
        .short("-v")
        .long("--variant")
        .takes_value(true)
}

fn language_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("language")
        .help("Language of the piece letters")
        .value_name("LANGUAGE")
        .short("-l")
        .long("--language")
        .takes_value(true)
}

fn notation_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("notation")
        .help("Algebraic notation variation: SAN, FIDE-SAN, FAN, MAN, LAN or RAN")
        .value_name("NOTATION")
        .short("-n")
        .long("--notation")
        .takes_value(true)
}

fn cgn_version_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("cgn-version")
        .help("CGN version of .cgn files (1 or 2)")
        .value_name("VERSION")
        .long("--cgn-version")
        .takes_value(true)
}

fn fen_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("FEN")
        .help("FEN string for a board position, or startpos")
        .required(true)
        .index(1)
}

fn file_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("FILE")
        .help("PGN or CGN file to read games from")
        .required(true)
        .index(1)
}

fn main() {
    env_logger::init();
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("fen")
                .about("Draws a position and describes its state")
                .arg(fen_arg())
                .arg(variant_arg())
                .arg(language_arg())
                .arg(
                    Arg::with_name("black")
                        .help("Draw the board from black's side")
                        .short("-b")
                        .long("--black"),
                ),
        )
        .subcommand(
            SubCommand::with_name("moves")
                .about("Lists the legal moves of a position")
                .arg(fen_arg())
                .arg(variant_arg())
                .arg(notation_arg())
                .arg(language_arg()),
        )
        .subcommand(
            SubCommand::with_name("perft")
                .about("PERFT analysis of board positions")
                .arg(fen_arg())
                .arg(variant_arg())
                .arg(
                    Arg::with_name("depth")
                        .help("Depth of move tree to search")
                        .value_name("DEPTH")
                        .short("-d")
                        .long("--depth")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("divide")
                        .help("Print the node count below each root move")
                        .long("--divide"),
                ),
        )
        .subcommand(
            SubCommand::with_name("convert")
                .about("Converts games between PGN and CGN")
                .arg(file_arg())
                .arg(
                    Arg::with_name("OUTPUT")
                        .help("File to write; the extension picks the format")
                        .required(true)
                        .index(2),
                )
                .arg(notation_arg())
                .arg(language_arg())
                .arg(cgn_version_arg()),
        )
        .subcommand(
            SubCommand::with_name("summary")
                .about("Prints a JSON summary of every game in a file")
                .arg(file_arg())
                .arg(language_arg())
                .arg(cgn_version_arg()),
        )
        .subcommand(
            SubCommand::with_name("export-csv")
                .about("Writes every move of every game in a file as CSV")
                .arg(file_arg())
                .arg(language_arg())
                .arg(cgn_version_arg()),
        )
        .get_matches();

    let result = match matches.subcommand() {
        ("fen", Some(matches)) => run_fen(matches),
        ("moves", Some(matches)) => run_moves(matches),
        ("perft", Some(matches)) => run_perft(matches),
        ("convert", Some(matches)) => run_convert(matches),
        ("summary", Some(matches)) => run_summary(matches),
        ("export-csv", Some(matches)) => run_export_csv(matches),
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

//
// Argument helpers
//

fn fail(message: String) -> ! {
    eprintln!("error: {}", message);
    process::exit(1);
}

fn variant_of(matches: &ArgMatches) -> Variant {
    match matches.value_of("variant") {
        Some(name) => Variant::lookup(name).unwrap_or_else(|| fail(format!("unknown variant: {}", name))),
        None => Variant::Standard,
    }
}

fn language_of(matches: &ArgMatches) -> Language {
    match matches.value_of("language") {
        Some(name) => Language::from_name(name).unwrap_or_else(|| fail(format!("unknown language: {}", name))),
        None => Language::English,
    }
}

fn notation_of(matches: &ArgMatches) -> AlgebraicVariation {
    match matches.value_of("notation") {
        Some(name) => AlgebraicVariation::from_name(name)
            .unwrap_or_else(|| fail(format!("unknown notation: {}", name))),
        None => AlgebraicVariation::San,
    }
}

fn format_of(path: &str, matches: &ArgMatches) -> Format {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_ref().map(|e| e.as_str()) {
        Some("cgn") => match matches.value_of("cgn-version").unwrap_or("2") {
            "1" => Format::Cgn(CgnVersion::V1),
            "2" => Format::Cgn(CgnVersion::V2),
            other => fail(format!("unknown CGN version: {}", other)),
        },
        _ => Format::Pgn,
    }
}

fn position_of(matches: &ArgMatches) -> Position {
    let fen = matches.value_of("FEN").unwrap();
    Position::from_fen(variant_of(matches), fen).unwrap_or_else(|e| fail(format!("invalid FEN: {:?}", e)))
}

fn read_games(path: &str, matches: &ArgMatches) -> ChessResult<Vec<Game>> {
    match format_of(path, matches) {
        Format::Pgn => {
            let text = fs::read_to_string(path)?;
            parse_pgn(&text, language_of(matches))
        }
        Format::Cgn(version) => {
            let bytes = fs::read(path)?;
            parse_cgn(&bytes, version)
        }
    }
}

//
// Subcommands
//

fn run_fen(matches: &ArgMatches) -> ChessResult<()> {
    let pos = position_of(matches);
    let perspective = if matches.is_present("black") {
        Color::Black
    } else {
        Color::White
    };
    let language = matches.value_of("language").map(|_| language_of(matches));

    let game = Game::from_fen(pos.variant(), &pos.fen(false))?;
    println!("{}", pos.render(perspective, language, true));
    println!("fen:      {}", game.fen(false));
    println!("variant:  {}", game.variant());
    println!("to move:  {:?}", game.side_to_move());
    println!("check:    {}", game.is_check());
    println!("moves:    {}", game.possible_moves().len());
    println!("material: {}", Analysis::new(game.position()).material_score(Color::White));
    if game.status().is_over() {
        println!("result:   {} ({})", game.status().result(), game.end_reason().pgn_name());
    }

    if let Some(id) = game.chess960_id() {
        println!("chess960: #{}", id);
    }

    Ok(())
}

fn run_moves(matches: &ArgMatches) -> ChessResult<()> {
    let game = Game::from_fen(variant_of(matches), &position_of(matches).fen(false))?;
    let variation = notation_of(matches);
    let language = language_of(matches);
    for mov in game.possible_moves() {
        println!("{}\t{}", mov.as_uci(), game.to_algebraic(&mov, variation, language));
    }

    Ok(())
}

fn run_perft(matches: &ArgMatches) -> ChessResult<()> {
    let pos = position_of(matches);
    let depth = value_t!(matches, "depth", u32).unwrap_or(3);
    println!("fen:   {}", pos.fen(false));
    println!("depth: {}", depth);
    println!();
    println!("{}", pos.render(Color::White, Some(Language::English), true));
    println!();
    if matches.is_present("divide") {
        let mut split = divide(&pos, depth);
        split.sort();
        for (uci, nodes) in &split {
            println!("{}: {}", uci, nodes);
        }

        println!();
    }

    for i in 1..depth + 1 {
        let start = Instant::now();
        let results = perft(&pos, i);
        let duration = start.elapsed();
        let ms = duration.as_secs() * 1000 + u64::from(duration.subsec_millis());
        println!("perft({}) = {} ({} ms)", i, results, ms);
    }

    Ok(())
}

fn run_convert(matches: &ArgMatches) -> ChessResult<()> {
    let input = matches.value_of("FILE").unwrap();
    let output = matches.value_of("OUTPUT").unwrap();
    let games = read_games(input, matches)?;

    let mut file = File::create(output)?;
    match format_of(output, matches) {
        Format::Pgn => {
            let variation = notation_of(matches);
            let language = language_of(matches);
            for (i, game) in games.iter().enumerate() {
                if i > 0 {
                    writeln!(file)?;
                }

                file.write_all(to_pgn(game, variation, language)?.as_bytes())?;
            }
        }
        Format::Cgn(version) => {
            for game in &games {
                write_cgn(game, version, &mut file)?;
            }
        }
    }

    eprintln!("converted {} games", games.len());
    Ok(())
}

fn summarize(game: &Game) -> GameSummary {
    GameSummary {
        tags: game
            .tags()
            .iter()
            .map(|(k, v)| (k.as_str().to_owned(), v.clone()))
            .collect(),
        variant: game.variant().name().to_owned(),
        result: game.status().result().to_owned(),
        termination: game.end_reason().pgn_name().to_owned(),
        plies: game.moves().len(),
        moves: game.algebraic_history(AlgebraicVariation::San, Language::English),
    }
}

fn run_summary(matches: &ArgMatches) -> ChessResult<()> {
    let games = read_games(matches.value_of("FILE").unwrap(), matches)?;
    let summaries: Vec<_> = games.iter().map(summarize).collect();
    let stdout = io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &summaries)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    println!();
    Ok(())
}

fn run_export_csv(matches: &ArgMatches) -> ChessResult<()> {
    let games = read_games(matches.value_of("FILE").unwrap(), matches)?;
    let mut writer = csv::Writer::from_writer(io::stdout());
    for (index, game) in games.iter().enumerate() {
        let mut pos = match game.start_position() {
            Some(start) => start.clone(),
            None => continue,
        };

        let sans = game.algebraic_history(AlgebraicVariation::San, Language::English);
        for (ply, (mov, san)) in game.moves().iter().zip(sans).enumerate() {
            pos = play(&pos, mov);
            let record = MoveRecord {
                game: index + 1,
                ply: ply + 1,
                uci: mov.as_uci(),
                san,
                fen: pos.fen(false),
                annotation: mov.annotation_text(true),
            };
            writer
                .serialize(record)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        }
    }

    writer.flush()?;
    Ok(())
}
