//! Position model: a `chess::Board` plus the make/unmake history and
//! terminal-state queries the search and evaluator need.
//!
//! `chess::Board` is an immutable, `Copy` value — making a move produces a
//! new board rather than mutating one in place. `Position` supplies the
//! push/pop discipline spec.md's Data Model asks for by keeping a stack of
//! prior boards, and tracks the whole game's hash history for
//! threefold-repetition claims (a single board's Zobrist hash says nothing
//! about how many times that position has been reached).

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square};

use crate::error::{EngineError, Result};

/// A move is exactly a `chess::ChessMove`; the spec's "null move sentinel"
/// exists only at the UCI text boundary (`"0000"`), never as a value the
/// search handles.
pub type Move = ChessMove;

#[inline]
pub fn opposite_color(c: Color) -> Color {
    match c {
        Color::White => Color::Black,
        Color::Black => Color::White,
    }
}

#[derive(Clone, Debug)]
pub struct Position {
    board: Board,
    history: Vec<Board>,
    hash_history: Vec<u64>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new(Board::default())
    }
}

impl Position {
    pub fn new(board: Board) -> Self {
        let hash_history = vec![board.get_hash()];
        Self {
            board,
            history: Vec::new(),
            hash_history,
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        use std::str::FromStr;
        let board = Board::from_str(fen).map_err(EngineError::InvalidFen)?;
        Ok(Self::new(board))
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.board.get_hash()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        MoveGen::new_legal(&self.board).collect()
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        MoveGen::new_legal(&self.board).any(|m| m == mv)
    }

    /// Applies an already-known-legal move (e.g. one drawn from
    /// `ordered_moves`). Callers that cannot already guarantee legality
    /// (UCI-supplied moves) must use [`Position::try_push`] instead.
    pub fn push(&mut self, mv: Move) {
        self.history.push(self.board);
        self.board = self.board.make_move_new(mv);
        self.hash_history.push(self.board.get_hash());
    }

    /// Validates legality before mutating, never touching `self` on
    /// rejection — the "illegal move input" contract from spec.md §7.
    pub fn try_push(&mut self, mv: Move) -> Result<()> {
        if !self.is_legal(mv) {
            return Err(EngineError::IllegalMove(mv));
        }
        self.push(mv);
        Ok(())
    }

    /// Restores the position to its state before the most recent `push`.
    /// Panics if called with no prior push, which would indicate a broken
    /// make/unmake discipline in the caller (search code never calls `pop`
    /// more times than it called `push`).
    pub fn pop(&mut self) {
        self.hash_history.pop();
        self.board = self
            .history
            .pop()
            .expect("pop called with empty history — unbalanced make/unmake");
    }

    pub fn is_checkmate(&self) -> bool {
        matches!(self.board.status(), BoardStatus::Checkmate)
    }

    pub fn is_stalemate(&self) -> bool {
        matches!(self.board.status(), BoardStatus::Stalemate)
    }

    pub fn is_in_check(&self) -> bool {
        self.board.checkers().popcnt() > 0
    }

    pub fn is_insufficient_material(&self) -> bool {
        let b = &self.board;
        let no_pawns = b.pieces(Piece::Pawn).popcnt() == 0;
        let no_rooks = b.pieces(Piece::Rook).popcnt() == 0;
        let no_queens = b.pieces(Piece::Queen).popcnt() == 0;
        if !(no_pawns && no_rooks && no_queens) {
            return false;
        }
        let minors = |c: Color| {
            (b.pieces(Piece::Knight) & b.color_combined(c)).popcnt()
                + (b.pieces(Piece::Bishop) & b.color_combined(c)).popcnt()
        };
        minors(Color::White) <= 1 && minors(Color::Black) <= 1
    }

    /// Half-move clock read back out of the board's own FEN, the same
    /// technique the teacher engine uses (`chess::Board` does not expose
    /// the clock directly).
    pub fn halfmove_clock(&self) -> u32 {
        self.board
            .to_string()
            .split_whitespace()
            .nth(4)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    pub fn is_fifty_move_claim(&self) -> bool {
        self.halfmove_clock() >= 100
    }

    /// True once the current hash has already appeared twice before in
    /// this game's history (so the current occurrence is the third).
    pub fn is_threefold_claim(&self) -> bool {
        let key = self.board.get_hash();
        self.hash_history.iter().filter(|&&h| h == key).count() >= 3
    }

    /// Any of the draw claims `evaluate`/`qsearch` short-circuit on. Mirrors
    /// spec.md §4.1/§4.4's terminal-condition lists exactly, which are
    /// explicit and exhaustive and never mention the fifty-move rule — so
    /// `is_fifty_move_claim` deliberately does not gate this (it would
    /// otherwise make `search` truncate into `qsearch`/`evaluate` nodes that
    /// don't themselves know to score the position as a `0` draw).
    pub fn is_drawn_by_rule(&self) -> bool {
        self.is_stalemate() || self.is_insufficient_material() || self.is_threefold_claim()
    }

    pub fn is_game_over(&self) -> bool {
        !matches!(self.board.status(), BoardStatus::Ongoing) || self.is_drawn_by_rule()
    }

    pub fn is_capture(&self, mv: Move) -> bool {
        let to = mv.get_dest();
        let them = opposite_color(self.side_to_move());
        if self.board.color_on(to) == Some(them) {
            return true;
        }
        self.is_en_passant(mv)
    }

    pub fn is_en_passant(&self, mv: Move) -> bool {
        let to = mv.get_dest();
        match self.board.en_passant() {
            Some(ep_sq) if ep_sq == to => matches!(
                self.board.piece_on(mv.get_source()),
                Some(Piece::Pawn)
            ) && mv.get_source().get_file() != to.get_file()
                && self.board.piece_on(to).is_none(),
            _ => false,
        }
    }

    pub fn is_promotion(&self, mv: Move) -> bool {
        mv.get_promotion().is_some()
    }

    pub fn gives_check(&self, mv: Move) -> bool {
        self.board.make_move_new(mv).checkers().popcnt() > 0
    }

    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.board.piece_on(sq)
    }

    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.board.color_on(sq)
    }

    /// Whether any `color` piece attacks `square`, by raw geometry (not
    /// move legality — pins and whose turn it is are irrelevant here).
    /// Used by the move orderer's hanging-speculative-check filter, which
    /// must ask this question about a position where the side to move is
    /// in check (so a move-legality-based query via a null move, which the
    /// `chess` crate refuses while in check, cannot answer it).
    pub fn is_square_attacked(&self, square: Square, by_color: Color) -> bool {
        let board = &self.board;
        let tf = file_of(square);
        let tr = rank_of(square);

        let has = |sq: Square, piece: Piece| -> bool {
            board.piece_on(sq) == Some(piece) && board.color_on(sq) == Some(by_color)
        };

        let pawn_rank_delta: i32 = if by_color == Color::White { -1 } else { 1 };
        for df in [-1, 1] {
            if let Some(sq) = square_at(tf + df, tr + pawn_rank_delta) {
                if has(sq, Piece::Pawn) {
                    return true;
                }
            }
        }

        const KNIGHT_DELTAS: [(i32, i32); 8] = [
            (1, 2), (2, 1), (2, -1), (1, -2),
            (-1, -2), (-2, -1), (-2, 1), (-1, 2),
        ];
        for (df, dr) in KNIGHT_DELTAS {
            if let Some(sq) = square_at(tf + df, tr + dr) {
                if has(sq, Piece::Knight) {
                    return true;
                }
            }
        }

        for df in -1..=1 {
            for dr in -1..=1 {
                if df == 0 && dr == 0 {
                    continue;
                }
                if let Some(sq) = square_at(tf + df, tr + dr) {
                    if has(sq, Piece::King) {
                        return true;
                    }
                }
            }
        }

        const ROOK_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        for (df, dr) in ROOK_DIRS {
            if slides_to_attacker(board, tf, tr, df, dr, by_color, &[Piece::Rook, Piece::Queen]) {
                return true;
            }
        }

        const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
        for (df, dr) in BISHOP_DIRS {
            if slides_to_attacker(board, tf, tr, df, dr, by_color, &[Piece::Bishop, Piece::Queen])
            {
                return true;
            }
        }

        false
    }
}

#[inline]
fn file_of(sq: Square) -> i32 {
    (sq.to_index() % 8) as i32
}

#[inline]
fn rank_of(sq: Square) -> i32 {
    (sq.to_index() / 8) as i32
}

#[inline]
fn square_at(file: i32, rank: i32) -> Option<Square> {
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        // SAFETY: file and rank are both checked to be in 0..8 above.
        Some(unsafe { Square::new((rank * 8 + file) as u8) })
    } else {
        None
    }
}

fn slides_to_attacker(
    board: &Board,
    from_file: i32,
    from_rank: i32,
    df: i32,
    dr: i32,
    by_color: Color,
    attacker_pieces: &[Piece],
) -> bool {
    let mut f = from_file + df;
    let mut r = from_rank + dr;
    while let Some(sq) = square_at(f, r) {
        if let Some(piece) = board.piece_on(sq) {
            return board.color_on(sq) == Some(by_color) && attacker_pieces.contains(&piece);
        }
        f += df;
        r += dr;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop_restores_hash_exactly() {
        let mut pos = Position::default();
        let before = pos.zobrist_hash();
        let moves = pos.legal_moves();
        for mv in moves.into_iter().take(5) {
            pos.push(mv);
            pos.pop();
            assert_eq!(pos.zobrist_hash(), before);
        }
    }

    #[test]
    fn try_push_rejects_illegal_move_without_mutating() {
        let mut pos = Position::default();
        let before = pos.zobrist_hash();
        let illegal = ChessMove::new(Square::E2, Square::E5, None);
        assert!(pos.try_push(illegal).is_err());
        assert_eq!(pos.zobrist_hash(), before);
    }

    #[test]
    fn rook_attacks_along_open_file() {
        let pos = Position::from_fen("4k3/8/8/8/4R3/8/8/4K3 w - - 0 1").expect("valid fen");
        assert!(pos.is_square_attacked(Square::E8, Color::White));
        assert!(!pos.is_square_attacked(Square::D8, Color::White));
    }

    #[test]
    fn attacker_blocked_by_intervening_piece_does_not_attack() {
        let pos =
            Position::from_fen("4k3/8/8/8/4p3/8/4R3/4K3 w - - 0 1").expect("valid fen");
        assert!(!pos.is_square_attacked(Square::E8, Color::White));
    }

    #[test]
    fn square_attacked_works_while_side_to_move_is_in_check() {
        // Black king on h8 is in check from the white rook on h1 (open
        // h-file); querying white's attack on a1 along the rook's rank
        // must not depend on a null move, which would be illegal here.
        let pos = Position::from_fen("7k/8/8/8/8/8/8/7R b - - 0 1").expect("valid fen");
        assert!(pos.is_in_check());
        assert!(pos.is_square_attacked(Square::A1, Color::White));
    }
}
