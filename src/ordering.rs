//! Move ordering (spec.md §4.2). Heuristic scoring feeds `Vec::sort_by_key`
//! with a stable sort, which is what gives the "ties break by insertion
//! order" guarantee for free.

use chess::{ChessMove, Color, Piece};

use crate::eval::piece_value;
use crate::position::{opposite_color, Position};
use crate::tt::TranspositionTable;

const CAPTURE_BASE: i32 = 10_000;
const PROMOTION_BASE: i32 = 5_000;
const TT_MOVE_BONUS: i32 = 5_000;
const CHECK_BONUS: i32 = 50;

/// A move the mover leaves unable to recapture if it turns out to hang:
/// squares the opponent attacks and the mover does not defend.
fn is_hanging_after(position: &mut Position, mv: ChessMove) -> bool {
    let mover = position.side_to_move();
    let defender = opposite_color(mover);
    position.push(mv);
    let dest = mv.get_dest();
    let attacked_by_opponent = position.is_square_attacked(dest, defender);
    let defended_by_mover = position.is_square_attacked(dest, mover);
    position.pop();
    attacked_by_opponent && !defended_by_mover
}

fn capture_victim_value(position: &Position, mv: ChessMove) -> i32 {
    match position.piece_on(mv.get_dest()) {
        Some(piece) => piece_value(piece),
        None => piece_value(Piece::Pawn),
    }
}

fn move_score(position: &mut Position, mv: ChessMove, tt_move: Option<ChessMove>) -> Option<i32> {
    let mut score = 0;

    let is_capture = position.is_capture(mv);
    if is_capture {
        let victim = capture_victim_value(position, mv);
        let attacker = position
            .piece_on(mv.get_source())
            .map(piece_value)
            .unwrap_or(0);
        score += CAPTURE_BASE + victim - attacker;
    }

    if let Some(promo) = mv.get_promotion() {
        score += PROMOTION_BASE + piece_value(promo);
    }

    if tt_move == Some(mv) {
        score += TT_MOVE_BONUS;
    }

    let gives_check = position.gives_check(mv);
    if gives_check {
        score += CHECK_BONUS;
        let is_promotion = mv.get_promotion().is_some();
        if !is_capture && !is_promotion && is_hanging_after(position, mv) {
            return None;
        }
    }

    Some(score)
}

/// Legal moves of `position`, sorted by descending heuristic score,
/// filtering out non-capturing/non-promoting checks that hang the moved
/// piece. `tt` is probed (never stored to) for the current position's
/// remembered best move.
pub fn ordered_moves(position: &mut Position, tt: &TranspositionTable) -> Vec<ChessMove> {
    let tt_move = tt.probe_move(position.zobrist_hash());
    let candidates = position.legal_moves();

    let mut scored: Vec<(usize, i32, ChessMove)> = Vec::with_capacity(candidates.len());
    for (insertion_order, mv) in candidates.into_iter().enumerate() {
        if let Some(score) = move_score(position, mv, tt_move) {
            scored.push((insertion_order, score, mv));
        }
    }

    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.into_iter().map(|(_, _, mv)| mv).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_outrank_quiet_moves() {
        let mut pos =
            Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").expect("valid fen");
        let tt = TranspositionTable::new();
        let moves = ordered_moves(&mut pos, &tt);
        let capture = moves
            .iter()
            .find(|m| pos.is_capture(**m))
            .expect("a capture should be legal");
        assert_eq!(moves[0], *capture);
    }

    #[test]
    fn tt_move_is_preferred_among_quiet_moves() {
        // No captures are available from the start position, so the TT
        // bonus alone should be enough to rank the remembered move first.
        let mut pos = Position::default();
        let tt_move = pos.legal_moves()[10];
        let tt = TranspositionTable::new();
        tt.store(pos.zobrist_hash(), 1, 0, crate::tt::Flag::Exact, Some(tt_move));
        let moves = ordered_moves(&mut pos, &tt);
        assert_eq!(moves[0], tt_move);
    }

    #[test]
    fn hanging_speculative_check_is_excluded() {
        // Qh1-h8+ checks the black king on d4 along the long diagonal, but
        // h8 is attacked by the rook on a8 (open rank 8) and defended by
        // nothing White — a non-capturing, non-promoting speculative check
        // that hangs the queen.
        let mut pos =
            Position::from_fen("r7/8/8/8/3k4/8/8/4K2Q w - - 0 1").expect("valid fen");
        let moves = ordered_moves(&mut pos, &TranspositionTable::new());
        let forbidden = ChessMove::new(chess::Square::H1, chess::Square::H8, None);
        assert!(!moves.contains(&forbidden));
    }
}
