//! Narrow trait seams for the collaborators §1 keeps outside the CORE:
//! opening book, tablebase, and (conceptually) NNUE evaluation. The CORE
//! only depends on these traits; file/network I/O for any concrete backend
//! lives in the `engine` collaborator layer (or is never implemented, for
//! tablebases — see `DESIGN.md`).

use super::{Board, Move};

/// Win/draw/loss classification returned by a tablebase probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wdl {
    Loss,
    BlessedLoss,
    Draw,
    CursedWin,
    Win,
}

/// Result of probing a tablebase at a non-root node.
#[derive(Debug, Clone, Copy)]
pub struct TbProbeResult {
    pub wdl: Wdl,
    pub dtz: i32,
}

/// Result of probing a tablebase at the search root: includes the move to
/// play, since root probes pick among tied-DTZ moves.
#[derive(Debug, Clone, Copy)]
pub struct TbRootResult {
    pub best_move: Move,
    pub wdl: Wdl,
    pub dtz: i32,
}

/// Endgame tablebase adapter (§6.5). No concrete implementation ships in
/// this crate: local-file and network (e.g. Lichess API) backends are
/// external collaborators the search consults only through this trait.
pub trait Prober: Send + Sync {
    /// Probe a non-root position. Called when `ply > 0`, `depth` is at
    /// least the prober's preferred probe depth, and the piece count is at
    /// most `max_pieces()`.
    fn probe(&self, pos: &Board) -> Option<TbProbeResult>;

    /// Probe the search root, returning a move to play immediately.
    fn probe_root(&self, pos: &Board) -> Option<TbRootResult>;

    /// Largest total piece count (both sides, including kings) this
    /// tablebase set covers.
    fn max_pieces(&self) -> u32;

    /// Whether the backend is currently usable (files loaded / network
    /// reachable).
    fn available(&self) -> bool;
}

/// Maps a tablebase WDL verdict to a mate-distance-aware score, ready to
/// seed the transposition table the same way a search result would: a
/// `Draw` is `Exact`, a `Win`/`CursedWin` is a `LowerBound`, a `Loss`/
/// `BlessedLoss` is an `UpperBound` (§6.5).
#[must_use]
pub fn wdl_to_score(wdl: Wdl, ply: u32) -> i32 {
    use super::search::MATE_SCORE;

    // Tablebase "mate scores" are pushed just inside the search's own mate
    // range and then adjusted by ply, exactly like a real forced mate found
    // by search (§4.7 "mate distance bookkeeping").
    const TB_WIN_SCORE: i32 = MATE_SCORE - 1000;

    match wdl {
        Wdl::Win => TB_WIN_SCORE - ply as i32,
        Wdl::CursedWin => 1,
        Wdl::Draw => 0,
        Wdl::BlessedLoss => -1,
        Wdl::Loss => -TB_WIN_SCORE + ply as i32,
    }
}

/// Opening book adapter (§6.4). A Polyglot-backed implementation lives in
/// the `engine` collaborator (`engine::book::PolyglotBook`); the CORE only
/// knows about this trait.
pub trait Book: Send + Sync {
    /// Select a move for `pos`, or `None` if the position isn't in the book.
    /// Implementations pick by weight-proportional random draw among all
    /// entries for the position's hash (§6.4); ties at weight zero resolve
    /// to the first entry in descending-weight order.
    fn probe(&self, pos: &Board) -> Option<Move>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wdl_win_outranks_cursed_win() {
        assert!(wdl_to_score(Wdl::Win, 4) > wdl_to_score(Wdl::CursedWin, 4));
        assert!(wdl_to_score(Wdl::CursedWin, 4) > wdl_to_score(Wdl::Draw, 4));
        assert!(wdl_to_score(Wdl::Draw, 4) > wdl_to_score(Wdl::BlessedLoss, 4));
        assert!(wdl_to_score(Wdl::BlessedLoss, 4) > wdl_to_score(Wdl::Loss, 4));
    }

    #[test]
    fn wdl_win_closer_to_mate_scores_more() {
        assert!(wdl_to_score(Wdl::Win, 2) > wdl_to_score(Wdl::Win, 20));
    }
}
