//! Transposition table (spec.md §4.3): Zobrist-hash-keyed, depth-preferred
//! replacement, FIFO eviction at capacity.
//!
//! The teacher's `tt.rs` uses a 4-way bucket table with age-based
//! replacement; see DESIGN.md "TT eviction data structure" for why this port
//! uses a `HashMap` plus an insertion-order `VecDeque` instead — it is the
//! simplest structure whose probe/store semantics match the quantified
//! invariants exactly.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use chess::ChessMove;

pub const MAX_TT_SIZE: usize = 200_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug)]
pub struct TTEntry {
    pub depth: i32,
    pub score: i32,
    pub flag: Flag,
    pub best_move: Option<ChessMove>,
}

/// What a probe found: either nothing usable (`Miss`), or a score that can
/// be returned directly (`Cut`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeResult {
    Miss,
    Cut(i32),
}

pub struct TranspositionTable {
    entries: RefCell<HashMap<u64, TTEntry>>,
    insertion_order: RefCell<VecDeque<u64>>,
    max_size: usize,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::with_capacity(MAX_TT_SIZE)
    }

    /// Same probe/store semantics as [`TranspositionTable::new`], bounded at
    /// `max_size` entries instead of the default `MAX_TT_SIZE` — wired to
    /// the CLI's `--tt-size` flag.
    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            insertion_order: RefCell::new(VecDeque::new()),
            max_size,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// spec.md §4.3 "Probe".
    pub fn probe(&self, key: u64, depth: i32, alpha: i32, beta: i32) -> ProbeResult {
        let entries = self.entries.borrow();
        let entry = match entries.get(&key) {
            Some(e) => e,
            None => return ProbeResult::Miss,
        };
        if entry.depth < depth {
            return ProbeResult::Miss;
        }
        match entry.flag {
            Flag::Exact => ProbeResult::Cut(entry.score),
            Flag::Lower if entry.score >= beta => ProbeResult::Cut(entry.score),
            Flag::Upper if entry.score <= alpha => ProbeResult::Cut(entry.score),
            _ => ProbeResult::Miss,
        }
    }

    /// The remembered best move for `key`, regardless of depth — used by
    /// the move orderer's TT-move bonus, which is not itself a cutoff probe.
    pub fn probe_move(&self, key: u64) -> Option<ChessMove> {
        self.entries.borrow().get(&key).and_then(|e| e.best_move)
    }

    /// spec.md §4.3 "Store". `alpha0` is the alpha bound on entry to the
    /// node, used to classify the flag.
    pub fn store(
        &self,
        key: u64,
        depth: i32,
        score: i32,
        alpha0: i32,
        beta: i32,
        best_move: Option<ChessMove>,
    ) {
        let flag = if score <= alpha0 {
            Flag::Upper
        } else if score >= beta {
            Flag::Lower
        } else {
            Flag::Exact
        };
        let entry = TTEntry {
            depth,
            score,
            flag,
            best_move,
        };

        let mut entries = self.entries.borrow_mut();
        if let Some(prior) = entries.get(&key) {
            if depth >= prior.depth {
                entries.insert(key, entry);
            }
            return;
        }

        if entries.len() >= self.max_size {
            let mut order = self.insertion_order.borrow_mut();
            if let Some(oldest) = order.pop_front() {
                entries.remove(&oldest);
            }
        }
        self.insertion_order.borrow_mut().push_back(key);
        entries.insert(key, entry);
    }
}
