//! Self-play PGN driver (spec.md §6.3): an external collaborator over the
//! `engine` library, not part of its public search contract. Grounded on
//! `examples/patrickangusjohngrant-vibechess/src/bin/selfplay.rs` (bin-per-
//! driver layout, direct-call loop shape) and
//! `examples/original_source/match_vs_stockfish.py` (PGN headers, per-move
//! `{eval ±NN cp}` annotation, `board.san(res.move)` movetext, and
//! resignation/forfeit handling).

use std::fs::OpenOptions;
use std::io::Write;

use chess::{ChessMove, Color, Piece, Square};
use engine::search::Engine;
use engine::position::Position;

const DEPTH_WHITE: i32 = 3;
const DEPTH_BLACK: i32 = 3;
const MAX_PLIES: usize = 200;
const PGN_PATH: &str = "selfplay.pgn";

fn main() {
    env_logger::init();

    let mut engine = Engine::new();
    let mut position = Position::default();

    let mut sans: Vec<String> = Vec::new();
    let mut termination = "normal";

    for ply in 0..MAX_PLIES {
        if position.is_game_over() {
            break;
        }

        let depth = if position.side_to_move() == Color::White {
            DEPTH_WHITE
        } else {
            DEPTH_BLACK
        };
        let (best, _score) = engine.best_move(&mut position, depth);
        let mv = match best {
            Some(mv) => mv,
            None => {
                // No legal moves without the position already reporting
                // game-over (stalemate/checkmate) cannot happen per spec.md
                // §9's totality guarantee, but a resigning side still needs
                // a PGN termination.
                termination = "resignation";
                break;
            }
        };

        let mover = position.side_to_move();
        let san = to_san(&position, mv);
        position.push(mv);
        let eval_after = engine.white_eval_after_move(&mut position, DEPTH_WHITE, DEPTH_BLACK);

        let move_number = ply / 2 + 1;
        let prefix = if mover == Color::White {
            format!("{}.", move_number)
        } else {
            format!("{}...", move_number)
        };
        sans.push(format!("{} {} {{eval {:+} cp}}", prefix, san, eval_after));

        eprintln!("{} {} ({:?})", prefix, san, mover);
    }

    let result = if position.is_checkmate() {
        if position.side_to_move() == Color::White {
            "0-1"
        } else {
            "1-0"
        }
    } else if termination == "resignation" {
        if position.side_to_move() == Color::White {
            "0-1"
        } else {
            "1-0"
        }
    } else {
        "1/2-1/2"
    };

    write_pgn(&sans, result, termination).expect("writing PGN should not fail");
    eprintln!("Game over: {} ({})", result, termination);
}

/// Standard Algebraic Notation for `mv`, played from `position`. PGN
/// movetext needs SAN, not the UCI long-algebraic form `ChessMove::Display`
/// produces (`e2e4` rather than `e4`), matching the grounding source's
/// `board.san(res.move)` call.
fn to_san(position: &Position, mv: ChessMove) -> String {
    let from = mv.get_source();
    let to = mv.get_dest();
    let piece = position
        .piece_on(from)
        .expect("source square of a legal move is occupied");

    if piece == Piece::King {
        let file_delta = to.get_file().to_index() as i32 - from.get_file().to_index() as i32;
        if file_delta == 2 {
            return with_check_suffix(position, mv, "O-O".to_string());
        }
        if file_delta == -2 {
            return with_check_suffix(position, mv, "O-O-O".to_string());
        }
    }

    let is_capture = position.is_capture(mv);
    let mut san = String::new();

    if piece == Piece::Pawn {
        if is_capture {
            san.push(file_char(from));
            san.push('x');
        }
        san.push_str(&square_str(to));
        if let Some(promo) = mv.get_promotion() {
            san.push('=');
            san.push_str(piece_letter(promo));
        }
    } else {
        san.push_str(piece_letter(piece));
        san.push_str(&disambiguation(position, mv, piece, from, to));
        if is_capture {
            san.push('x');
        }
        san.push_str(&square_str(to));
    }

    with_check_suffix(position, mv, san)
}

/// File/rank/both disambiguation, needed when another same-type piece of
/// the mover's color could also legally reach `to`.
fn disambiguation(position: &Position, mv: ChessMove, piece: Piece, from: Square, to: Square) -> String {
    let mover = position.side_to_move();
    let others: Vec<Square> = position
        .legal_moves()
        .into_iter()
        .filter(|&m| {
            m != mv
                && m.get_dest() == to
                && position.piece_on(m.get_source()) == Some(piece)
                && position.color_on(m.get_source()) == Some(mover)
        })
        .map(|m| m.get_source())
        .collect();

    if others.is_empty() {
        return String::new();
    }

    let file_unique = others.iter().all(|&o| o.get_file() != from.get_file());
    let rank_unique = others.iter().all(|&o| o.get_rank() != from.get_rank());

    if file_unique {
        file_char(from).to_string()
    } else if rank_unique {
        rank_char(from).to_string()
    } else {
        square_str(from)
    }
}

/// Appends `+`/`#` by tentatively playing `mv` on a clone of `position`,
/// never mutating the caller's position.
fn with_check_suffix(position: &Position, mv: ChessMove, mut san: String) -> String {
    let mut after = position.clone();
    after.push(mv);
    if after.is_checkmate() {
        san.push('#');
    } else if after.is_in_check() {
        san.push('+');
    }
    san
}

fn piece_letter(piece: Piece) -> &'static str {
    match piece {
        Piece::King => "K",
        Piece::Queen => "Q",
        Piece::Rook => "R",
        Piece::Bishop => "B",
        Piece::Knight => "N",
        Piece::Pawn => "",
    }
}

fn file_char(sq: Square) -> char {
    (b'a' + sq.get_file().to_index() as u8) as char
}

fn rank_char(sq: Square) -> char {
    (b'1' + sq.get_rank().to_index() as u8) as char
}

fn square_str(sq: Square) -> String {
    format!("{}{}", file_char(sq), rank_char(sq))
}

fn write_pgn(sans: &[String], result: &str, termination: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(PGN_PATH)?;

    writeln!(file, "[Event \"Corvid self-play\"]")?;
    writeln!(file, "[Site \"Local\"]")?;
    writeln!(file, "[Date \"????.??.??\"]")?;
    writeln!(file, "[Round \"1\"]")?;
    writeln!(file, "[White \"Corvid (depth {})\"]", DEPTH_WHITE)?;
    writeln!(file, "[Black \"Corvid (depth {})\"]", DEPTH_BLACK)?;
    writeln!(file, "[Result \"{}\"]", result)?;
    if termination != "normal" {
        writeln!(file, "[Termination \"{}\"]", termination)?;
    }
    writeln!(file)?;
    writeln!(file, "{} {}", sans.join(" "), result)?;
    writeln!(file)?;
    Ok(())
}
