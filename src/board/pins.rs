//! Pin detection.
//!
//! `compute_pinned` finds the blockers of a king against enemy sliders: own
//! pieces that, if removed, would expose the king to a rook/bishop/queen
//! attack along the line between them. The move generator doesn't need this
//! directly (`generate_moves` filters legality with a make/unmake probe on
//! every pseudo-legal move instead, see `movegen::generate_moves`'s own doc
//! comment), but eval's threat detection and `see.rs`'s x-ray walk both care
//! about "is this piece pinned", and the corpus treats pin detection as its
//! own `Position` operation rather than folding it into move generation.

use super::attack_tables::slider_attacks;
use super::{Bitboard, Board, Color, Piece};

impl Board {
    /// Own pieces of `color` that are pinned against `color`'s king by an
    /// enemy rook/bishop/queen.
    ///
    /// For every enemy slider that would attack the king square on an
    /// otherwise-empty board (a "candidate pinner" on the same rank, file,
    /// or diagonal as the king), the squares strictly between the king and
    /// that slider are found by intersecting the slider's attack set with
    /// the king treated as the only blocker, and vice versa. Exactly one
    /// occupied square in that intersection, and it's an own piece, means
    /// that piece is pinned.
    #[must_use]
    #[allow(dead_code)]
    pub(crate) fn compute_pinned(&self, color: Color) -> Bitboard {
        let king_sq = self.king_square_index(color);
        let own = self.occupied_by(color);
        let opponent = color.opponent();
        let opponent_occ = self.occupied_by(opponent);

        let rook_like =
            Bitboard(self.pieces_of(opponent, Piece::Rook).0 | self.pieces_of(opponent, Piece::Queen).0);
        let bishop_like = Bitboard(
            self.pieces_of(opponent, Piece::Bishop).0 | self.pieces_of(opponent, Piece::Queen).0,
        );

        let mut pinned = Bitboard(0);
        pinned.0 |= self.pinned_along(king_sq, rook_like, own, opponent_occ, false);
        pinned.0 |= self.pinned_along(king_sq, bishop_like, own, opponent_occ, true);
        pinned
    }

    fn pinned_along(
        &self,
        king_sq: usize,
        candidates: Bitboard,
        own: Bitboard,
        opponent_occ: Bitboard,
        diagonal: bool,
    ) -> u64 {
        // Candidate pinners: sliders of the right kind that share a rank/
        // file/diagonal with the king on an empty board.
        let empty_board_rays = slider_attacks(king_sq, 0, diagonal);
        let mut pinners = candidates.0 & empty_board_rays;
        let mut pinned = 0u64;

        while pinners != 0 {
            let pinner_sq = pinners.trailing_zeros() as usize;
            pinners &= pinners - 1;

            let king_bit = 1u64 << king_sq;
            let pinner_bit = 1u64 << pinner_sq;
            let between = slider_attacks(king_sq, pinner_bit, diagonal)
                & slider_attacks(pinner_sq, king_bit, diagonal);

            let blockers = between & (own.0 | opponent_occ.0);
            if blockers.count_ones() == 1 && (blockers & own.0) == blockers {
                pinned |= blockers;
            }
        }

        pinned
    }
}
