mod kings;
mod knights;
mod pawns;
mod sliders;

use self::sliders::SliderType;
use super::{Board, Color, Move, MoveList, Piece, Square};

impl Board {
    fn generate_pseudo_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        let color = self.current_color();
        let c_idx = color.index();

        for from in self.pieces[c_idx][Piece::Pawn.index()].iter() {
            for m in self.generate_pawn_moves(from).iter() {
                moves.push(*m);
            }
        }
        for from in self.pieces[c_idx][Piece::Knight.index()].iter() {
            for m in self.generate_knight_moves(from).iter() {
                moves.push(*m);
            }
        }
        for from in self.pieces[c_idx][Piece::Bishop.index()].iter() {
            for m in self.generate_slider_moves(from, SliderType::Bishop).iter() {
                moves.push(*m);
            }
        }
        for from in self.pieces[c_idx][Piece::Rook.index()].iter() {
            for m in self.generate_slider_moves(from, SliderType::Rook).iter() {
                moves.push(*m);
            }
        }
        for from in self.pieces[c_idx][Piece::Queen.index()].iter() {
            for m in self.generate_slider_moves(from, SliderType::Queen).iter() {
                moves.push(*m);
            }
        }
        for from in self.pieces[c_idx][Piece::King.index()].iter() {
            for m in self.generate_king_moves(from).iter() {
                moves.push(*m);
            }
        }
        moves
    }

    fn generate_piece_moves(&self, from: Square, piece: Piece) -> MoveList {
        match piece {
            Piece::Pawn => self.generate_pawn_moves(from),
            Piece::Knight => self.generate_knight_moves(from),
            Piece::Bishop => self.generate_slider_moves(from, SliderType::Bishop),
            Piece::Rook => self.generate_slider_moves(from, SliderType::Rook),
            Piece::Queen => self.generate_slider_moves(from, SliderType::Queen),
            Piece::King => self.generate_king_moves(from),
        }
    }

    /// Generate all fully legal moves in the current position.
    ///
    /// Pseudo-legal moves are generated first, then filtered by a make/unmake
    /// probe that rejects any move leaving the mover's own king in check. This
    /// is simpler than maintaining pin bitboards and cheap enough in practice
    /// because `make_move`/`unmake_move` only touch a handful of bitboards.
    #[must_use]
    pub fn generate_moves(&mut self) -> MoveList {
        let current_color = self.current_color();
        let opponent_color = current_color.opponent();
        let pseudo_moves = self.generate_pseudo_moves();
        let mut legal_moves = MoveList::new();

        for m in pseudo_moves.iter() {
            let m = *m;
            if m.is_castling() {
                let king_start_sq = m.from();
                let mid_file = usize::midpoint(m.from().file(), m.to().file());
                let king_mid_sq = Square::new(m.from().rank(), mid_file);
                let king_end_sq = m.to();

                if self.is_square_attacked(king_start_sq, opponent_color)
                    || self.is_square_attacked(king_mid_sq, opponent_color)
                    || self.is_square_attacked(king_end_sq, opponent_color)
                {
                    continue;
                }
            }

            let info = self.make_move(m);
            if !self.is_in_check(current_color) {
                legal_moves.push(m);
            }
            self.unmake_move(m, info);
        }
        legal_moves
    }

    /// Whether `mv` is a legal move in the current position, checked by
    /// scanning the legal move list rather than a dedicated from/to probe
    /// (simpler, and `generate_moves` is already cheap relative to search).
    #[must_use]
    pub(crate) fn is_legal_move(&mut self, mv: Move) -> bool {
        self.generate_moves().iter().any(|m| *m == mv)
    }

    #[must_use]
    pub fn is_checkmate(&mut self) -> bool {
        let color = self.current_color();
        self.is_in_check(color) && self.generate_moves().is_empty()
    }

    #[must_use]
    pub fn is_stalemate(&mut self) -> bool {
        !self.is_in_check(self.current_color()) && self.generate_moves().is_empty()
    }

    /// Pseudo-legal tactical moves (captures, en passant, promotions) filtered for legality.
    pub(crate) fn generate_tactical_moves(&mut self) -> MoveList {
        let current_color = self.current_color();
        let mut pseudo_tactical_moves = MoveList::new();
        let c_idx = current_color.index();

        for from in self.pieces[c_idx][Piece::Pawn.index()].iter() {
            self.generate_pawn_tactical_moves(from, &mut pseudo_tactical_moves);
        }

        for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
            for from in self.pieces[c_idx][piece.index()].iter() {
                for m in self.generate_piece_moves(from, piece).iter() {
                    if m.is_capture() {
                        pseudo_tactical_moves.push(*m);
                    }
                }
            }
        }

        let mut legal_tactical_moves = MoveList::new();
        for m in pseudo_tactical_moves.iter() {
            let m = *m;
            let info = self.make_move(m);
            if !self.is_in_check(current_color) {
                legal_tactical_moves.push(m);
            }
            self.unmake_move(m, info);
        }

        legal_tactical_moves
    }

    /// Count leaf nodes at `depth` plies, for perft testing.
    #[must_use]
    pub fn perft(&mut self, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }

        let moves = self.generate_moves();
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0;
        for m in moves.iter() {
            let info = self.make_move(*m);
            nodes += self.perft(depth - 1);
            self.unmake_move(*m, info);
        }

        nodes
    }
}

