//! UCI text loop (spec.md §6.1), an external collaborator around the core
//! search engine rather than part of it. Grounded on the dedicated
//! `uci.rs`-module pattern (a struct wrapping the engine, one handler method
//! per command) instead of the teacher's monolithic `main.rs`.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use chess::ChessMove;
use log::{info, warn};

use crate::position::Position;
use crate::search::Engine;

const ENGINE_NAME: &str = "Corvid";
const ENGINE_AUTHOR: &str = "Corvid Chess contributors";
const DEFAULT_DEPTH: i32 = 3;

pub struct Uci {
    engine: Engine,
    position: Position,
    default_depth: i32,
    tt_capacity: usize,
}

impl Default for Uci {
    fn default() -> Self {
        Self::new()
    }
}

impl Uci {
    pub fn new() -> Self {
        Self::with_config(DEFAULT_DEPTH, crate::tt::MAX_TT_SIZE)
    }

    /// Same as [`Uci::new`], but with `go`'s default depth and the
    /// transposition table's capacity overridden — wired to the CLI's
    /// `--depth`/`--tt-size` flags.
    pub fn with_config(default_depth: i32, tt_capacity: usize) -> Self {
        Self {
            engine: Engine::with_tt_capacity(tt_capacity),
            position: Position::default(),
            default_depth,
            tt_capacity,
        }
    }

    /// Reads commands from `input` and writes responses to `output`, one
    /// command per line, flushing after every response. Returns on `quit`
    /// or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some(&command) = tokens.first() else {
                continue;
            };

            match command {
                "uci" => self.handle_uci(&mut output)?,
                "isready" => self.handle_isready(&mut output)?,
                "ucinewgame" => self.handle_ucinewgame(),
                "position" => self.handle_position(&tokens),
                "go" => self.handle_go(&tokens, &mut output)?,
                "quit" => break,
                _ => warn!("ignoring unknown UCI command: {}", command),
            }
        }
        Ok(())
    }

    fn handle_uci<W: Write>(&self, output: &mut W) -> io::Result<()> {
        writeln!(output, "id name {}", ENGINE_NAME)?;
        writeln!(output, "id author {}", ENGINE_AUTHOR)?;
        writeln!(output, "uciok")?;
        output.flush()
    }

    fn handle_isready<W: Write>(&self, output: &mut W) -> io::Result<()> {
        writeln!(output, "readyok")?;
        output.flush()
    }

    fn handle_ucinewgame(&mut self) {
        info!("ucinewgame: clearing transposition table");
        self.engine = Engine::with_tt_capacity(self.tt_capacity);
        self.position = Position::default();
    }

    fn handle_position(&mut self, tokens: &[&str]) {
        if tokens.len() < 2 {
            return;
        }

        let moves_at = match tokens[1] {
            "startpos" => {
                self.position = Position::default();
                2
            }
            "fen" => {
                // A FEN is exactly 6 whitespace-separated fields.
                let fen_fields = &tokens[2..];
                if fen_fields.len() < 6 {
                    warn!("malformed FEN in position command: {:?}", tokens);
                    return;
                }
                let fen = fen_fields[..6].join(" ");
                match Position::from_fen(&fen) {
                    Ok(p) => self.position = p,
                    Err(e) => {
                        warn!("rejecting malformed FEN {:?}: {}", fen, e);
                        return;
                    }
                }
                2 + 6
            }
            _ => return,
        };

        if tokens.get(moves_at) != Some(&"moves") {
            return;
        }
        for mv_str in &tokens[moves_at + 1..] {
            match ChessMove::from_str(mv_str) {
                Ok(mv) => {
                    if self.position.try_push(mv).is_err() {
                        warn!("rejecting illegal move {}: position unchanged", mv_str);
                        return;
                    }
                }
                Err(_) => {
                    warn!("rejecting malformed UCI move {:?}", mv_str);
                    return;
                }
            }
        }
    }

    fn handle_go<W: Write>(&mut self, tokens: &[&str], output: &mut W) -> io::Result<()> {
        let depth = parse_depth(tokens).unwrap_or(self.default_depth);
        let (best, score) = self.engine.best_move(&mut self.position, depth);
        info!("go depth {}: best {:?} score {}", depth, best, score);
        match best {
            Some(mv) => writeln!(output, "bestmove {}", mv)?,
            None => writeln!(output, "bestmove 0000")?,
        }
        output.flush()
    }
}

fn parse_depth(tokens: &[&str]) -> Option<i32> {
    let pos = tokens.iter().position(|&t| t == "depth")?;
    tokens.get(pos + 1)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(commands: &str) -> String {
        let mut uci = Uci::new();
        let mut out = Vec::new();
        uci.run(commands.as_bytes(), &mut out).expect("run should not fail");
        String::from_utf8(out).expect("valid utf8")
    }

    #[test]
    fn uci_handshake() {
        let out = run("uci\nquit\n");
        assert!(out.contains("id name Corvid"));
        assert!(out.contains("uciok"));
    }

    #[test]
    fn go_from_startpos_returns_a_move() {
        let out = run("position startpos\ngo depth 1\nquit\n");
        assert!(out.starts_with("bestmove "));
        assert_ne!(out.trim(), "bestmove 0000");
    }

    #[test]
    fn unknown_commands_are_ignored() {
        let out = run("bananas\nisready\nquit\n");
        assert_eq!(out, "readyok\n");
    }

    #[test]
    fn configured_default_depth_is_used_when_go_omits_depth() {
        let mut uci = Uci::with_config(1, crate::tt::MAX_TT_SIZE);
        let mut out = Vec::new();
        uci.run("position startpos\ngo\nquit\n".as_bytes(), &mut out)
            .expect("run should not fail");
        let out = String::from_utf8(out).expect("valid utf8");
        assert!(out.starts_with("bestmove "));
        assert_ne!(out.trim(), "bestmove 0000");
    }

    #[test]
    fn ucinewgame_preserves_configured_tt_capacity() {
        let mut uci = Uci::with_config(DEFAULT_DEPTH, 5);
        uci.run("ucinewgame\nquit\n".as_bytes(), &mut Vec::new())
            .expect("run should not fail");
        assert_eq!(uci.tt_capacity, 5);
    }

    #[test]
    fn position_with_moves_applies_them() {
        let out = run("position startpos moves e2e4 e7e5\nisready\ngo depth 1\nquit\n");
        assert!(out.contains("bestmove "));
    }
}
