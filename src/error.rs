//! Error kinds surfaced at the edges of the engine (§7 of the design doc).
//!
//! The search itself is total: `Engine::search`/`Engine::qsearch` never
//! return `Result`. Fallibility lives at the boundary where untrusted text
//! (a FEN string, a UCI move) becomes a `Position`/`ChessMove`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("illegal move: {0}")]
    IllegalMove(chess::ChessMove),

    #[error("invalid FEN: {0}")]
    InvalidFen(#[from] chess::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
