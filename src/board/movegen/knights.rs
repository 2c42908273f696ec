use super::super::attack_tables::KNIGHT_ATTACKS;
use super::super::{Bitboard, Board, Move, MoveList, Square};

impl Board {
    pub(crate) fn generate_knight_moves(&self, from: Square) -> MoveList {
        let mut moves = MoveList::new();
        let color = self.current_color();
        let own_occ = self.occupied_by(color).0;
        let targets = Bitboard(KNIGHT_ATTACKS[from.index()] & !own_occ);

        for to_sq in targets.iter() {
            if self.piece_at(to_sq).is_some() {
                moves.push(Move::capture(from, to_sq));
            } else {
                moves.push(Move::quiet(from, to_sq));
            }
        }
        moves
    }
}
