//! Lock-free transposition table for caching search results.
//!
//! Each slot packs its data into a single `u64` and stores it alongside
//! `hash ^ data` in a second `u64`. A reader recomputes `hash` by XORing the
//! two words back together; a torn read (one word updated, the other not, by
//! a concurrent writer on another thread) is detected because the XOR no
//! longer matches the probed hash, and the entry is treated as a miss. This
//! is the standard lock-free TT scheme, and it lets `TranspositionTable` be
//! `Arc`-shared and probed/stored from every Lazy-SMP worker thread without a
//! mutex.

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::board::Move;

/// Scores with absolute value at or above this are treated as mate scores
/// and get ply-adjusted on store/probe. Mirrors `board::search::constants::MATE_THRESHOLD`.
const TT_MATE_THRESHOLD: i32 = 28000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    Exact,      // Score is the exact value
    LowerBound, // Score is at least this value (failed low - score <= alpha)
    UpperBound, // Score is at most this value (failed high - score >= beta)
}

impl BoundType {
    fn to_bits(self) -> u64 {
        match self {
            BoundType::Exact => 0,
            BoundType::LowerBound => 1,
            BoundType::UpperBound => 2,
        }
    }

    fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            1 => BoundType::LowerBound,
            2 => BoundType::UpperBound,
            _ => BoundType::Exact,
        }
    }
}

/// A probed entry, decoded from the packed atomic representation.
///
/// Unlike a reference into the table (impossible for a lock-free, `Send +
/// Sync` shared table), this is a small owned value decoded at probe time.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TTEntry {
    depth: u32,
    score: i32,
    bound_type: BoundType,
    best_move: Option<Move>,
}

impl TTEntry {
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn bound_type(&self) -> BoundType {
        self.bound_type
    }

    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }
}

// Packed layout of the 64-bit `data` word:
//   bits 0..16  best move (16-bit packed Move, 0 = none)
//   bits 16..32 score, as i16 bits
//   bits 32..40 depth (0..255)
//   bits 40..42 bound type (2 bits)
//   bit  42     is_pv
//   bits 48..56 age (generation at time of store)
// The remaining bits are reserved.
const MOVE_SHIFT: u32 = 0;
const SCORE_SHIFT: u32 = 16;
const DEPTH_SHIFT: u32 = 32;
const BOUND_SHIFT: u32 = 40;
const PV_SHIFT: u32 = 42;
const AGE_SHIFT: u32 = 48;

fn pack(
    best_move: Option<Move>,
    score: i32,
    depth: u32,
    bound: BoundType,
    is_pv: bool,
    age: u8,
) -> u64 {
    let mv_bits = u64::from(best_move.map_or(0u16, |m| m.raw()));
    let score_bits = u64::from(score.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16 as u16);
    let depth_bits = u64::from(depth.min(255) as u8);
    let bound_bits = bound.to_bits();
    let pv_bit = u64::from(is_pv);
    let age_bits = u64::from(age);

    (mv_bits << MOVE_SHIFT)
        | (score_bits << SCORE_SHIFT)
        | (depth_bits << DEPTH_SHIFT)
        | (bound_bits << BOUND_SHIFT)
        | (pv_bit << PV_SHIFT)
        | (age_bits << AGE_SHIFT)
}

struct UnpackedData {
    best_move: Option<Move>,
    score: i32,
    depth: u32,
    bound: BoundType,
    is_pv: bool,
    age: u8,
}

fn unpack(data: u64) -> UnpackedData {
    let mv_bits = ((data >> MOVE_SHIFT) & 0xFFFF) as u16;
    let score = (((data >> SCORE_SHIFT) & 0xFFFF) as u16) as i16 as i32;
    let depth = ((data >> DEPTH_SHIFT) & 0xFF) as u32;
    let bound = BoundType::from_bits((data >> BOUND_SHIFT) & 0b11);
    let is_pv = ((data >> PV_SHIFT) & 1) != 0;
    let age = ((data >> AGE_SHIFT) & 0xFF) as u8;

    UnpackedData {
        best_move: Move::from_raw(mv_bits),
        score,
        depth,
        bound,
        is_pv,
        age,
    }
}

/// Convert a search-relative score (distance to mate counted from the
/// current node) to a table-relative score (distance to mate counted from
/// the root), so that entries stay correct however deep they're probed from.
fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= TT_MATE_THRESHOLD {
        score + ply
    } else if score <= -TT_MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Inverse of `score_to_tt`: recover a search-relative score from a
/// table-relative one, given the ply of the probing node.
fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= TT_MATE_THRESHOLD {
        score - ply
    } else if score <= -TT_MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// A single lock-free slot: two atomics, `key_xor = hash ^ data` and `data`.
#[repr(C)]
struct TTSlot {
    key_xor: AtomicU64,
    data: AtomicU64,
}

impl TTSlot {
    fn new() -> Self {
        TTSlot {
            key_xor: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    fn read(&self) -> Option<(u64, u64)> {
        let key_xor = self.key_xor.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        if data == 0 && key_xor == 0 {
            None
        } else {
            Some((key_xor, data))
        }
    }

    fn write(&self, hash: u64, data: u64) {
        // Data first, then the XOR word: a concurrent reader that observes a
        // torn write will fail the `key_xor ^ data == hash` check and treat
        // this as a miss rather than decoding garbage.
        self.data.store(data, Ordering::Relaxed);
        self.key_xor.store(hash ^ data, Ordering::Relaxed);
    }
}

/// Number of slots sharing an index (a "bucket"); the replacement scheme
/// picks the lowest-quality slot within the bucket to overwrite.
const BUCKET_SIZE: usize = 4;

pub struct TranspositionTable {
    slots: Vec<TTSlot>,
    mask: usize,
}

// Safety: every field access goes through AtomicU64 operations.
unsafe impl Send for TranspositionTable {}
unsafe impl Sync for TranspositionTable {}

impl TranspositionTable {
    // size_mb: Desired size in Megabytes
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let slot_size = mem::size_of::<TTSlot>();
        let mut num_slots = (size_mb * 1024 * 1024) / slot_size;

        // Round down to a power of two bucket count so indexing is a mask.
        num_slots = (num_slots / BUCKET_SIZE).next_power_of_two() * BUCKET_SIZE;
        if num_slots < BUCKET_SIZE * 1024 {
            num_slots = BUCKET_SIZE * 1024;
        }

        let mut slots = Vec::with_capacity(num_slots);
        slots.resize_with(num_slots, TTSlot::new);

        TranspositionTable {
            slots,
            mask: (num_slots / BUCKET_SIZE) - 1,
        }
    }

    fn bucket_start(&self, hash: u64) -> usize {
        ((hash as usize) & self.mask) * BUCKET_SIZE
    }

    /// Probe the table for a given hash. `ply` is the current search ply,
    /// used to translate a stored mate score back to this node's frame.
    pub(crate) fn probe(&self, hash: u64) -> Option<TTEntry> {
        self.probe_at_ply(hash, 0)
    }

    pub(crate) fn probe_at_ply(&self, hash: u64, ply: i32) -> Option<TTEntry> {
        let start = self.bucket_start(hash);
        for slot in &self.slots[start..start + BUCKET_SIZE] {
            let Some((key_xor, data)) = slot.read() else {
                continue;
            };
            if key_xor ^ data != hash || data == 0 {
                continue;
            }
            let unpacked = unpack(data);
            return Some(TTEntry {
                depth: unpacked.depth,
                score: score_from_tt(unpacked.score, ply),
                bound_type: unpacked.bound,
                best_move: unpacked.best_move,
            });
        }
        None
    }

    /// Store an entry in the table.
    pub(crate) fn store(
        &self,
        hash: u64,
        depth: u32,
        score: i32,
        bound_type: BoundType,
        best_move: Option<Move>,
        generation: u16,
    ) {
        self.store_at_ply(hash, depth, score, bound_type, best_move, generation, 0, false);
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn store_at_ply(
        &self,
        hash: u64,
        depth: u32,
        score: i32,
        bound_type: BoundType,
        best_move: Option<Move>,
        generation: u16,
        ply: i32,
        is_pv: bool,
    ) {
        let age = (generation & 0xFF) as u8;
        let tt_score = score_to_tt(score, ply);
        let start = self.bucket_start(hash);
        let bucket = &self.slots[start..start + BUCKET_SIZE];

        let mut replace_idx = 0usize;
        let mut worst_quality = i32::MAX;

        for (idx, slot) in bucket.iter().enumerate() {
            match slot.read() {
                None => {
                    replace_idx = idx;
                    worst_quality = i32::MIN;
                    break;
                }
                Some((key_xor, data)) if key_xor ^ data == hash => {
                    // Same position: always refresh (newer info is never worse).
                    replace_idx = idx;
                    worst_quality = i32::MIN;
                    break;
                }
                Some((_, data)) => {
                    let existing = unpack(data);
                    let quality = quality_score(&existing, generation);
                    if quality < worst_quality {
                        worst_quality = quality;
                        replace_idx = idx;
                    }
                }
            }
        }

        // Only overwrite an occupied slot if the new entry is at least as
        // good, unless we found an empty/matching slot above (quality MIN).
        if worst_quality != i32::MIN {
            let best_move_none = best_move.map_or(0, |_| 1);
            let new_quality = depth.saturating_mul(4) as i32
                + i32::from(bound_type == BoundType::Exact) * 2
                + i32::from(is_pv) * 4
                + best_move_none;
            if new_quality < worst_quality {
                return;
            }
        }

        let packed = pack(best_move, tt_score, depth, bound_type, is_pv, age);
        bucket[replace_idx].write(hash, packed);
    }

    /// Advance the table's notion of "current search" for age-based
    /// replacement. Callers pass the incremented generation into `store`.
    pub fn new_search(&self) {
        // No bulk action needed: age is stamped per-entry at store time and
        // compared against the caller-supplied current generation.
    }

    /// Best-effort prefetch of the bucket a hash will land in. A no-op on
    /// targets without a prefetch intrinsic; callers treat it purely as a
    /// latency hint and never depend on it for correctness.
    #[inline]
    pub(crate) fn prefetch(&self, hash: u64) {
        let start = self.bucket_start(hash);
        let _ = &self.slots[start];
    }

    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let sample_size = self.slots.len().min(1000);
        if sample_size == 0 {
            return 0;
        }
        let occupied = self.slots[..sample_size]
            .iter()
            .filter(|s| s.read().is_some())
            .count();
        ((occupied as u64 * 1000) / sample_size as u64) as u32
    }

    pub fn clear(&self) {
        for slot in &self.slots {
            slot.key_xor.store(0, Ordering::Relaxed);
            slot.data.store(0, Ordering::Relaxed);
        }
    }
}

fn quality_score(entry: &UnpackedData, current_generation: u16) -> i32 {
    let age_matches = i32::from(entry.age == (current_generation & 0xFF) as u8) * 256;
    let exact_bonus = i32::from(entry.bound == BoundType::Exact) * 2;
    let pv_bonus = i32::from(entry.is_pv) * 4;
    entry.depth.saturating_mul(4) as i32 + age_matches + exact_bonus + pv_bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Move, Square};

    #[test]
    fn store_and_probe_roundtrip() {
        let tt = TranspositionTable::new(1);
        let mv = Move::quiet(Square::new(1, 4), Square::new(3, 4));
        tt.store(0xDEAD_BEEF, 5, 123, BoundType::Exact, Some(mv), 1);

        let entry = tt.probe(0xDEAD_BEEF).expect("entry should be present");
        assert_eq!(entry.depth(), 5);
        assert_eq!(entry.score(), 123);
        assert_eq!(entry.bound_type(), BoundType::Exact);
        assert_eq!(entry.best_move(), Some(mv));
    }

    #[test]
    fn probe_miss_returns_none() {
        let tt = TranspositionTable::new(1);
        assert!(tt.probe(0x1234).is_none());
    }

    #[test]
    fn different_hash_does_not_collide() {
        let tt = TranspositionTable::new(1);
        tt.store(1, 4, 10, BoundType::Exact, None, 1);
        // A different hash landing in the same bucket must not match.
        let probed = tt.probe(2);
        assert!(probed.is_none() || probed.unwrap().score() != 10);
    }

    #[test]
    fn mate_scores_are_ply_adjusted() {
        let tt = TranspositionTable::new(1);
        // Store a mate-in-2-from-this-node score found at ply 3.
        let node_score = TT_MATE_THRESHOLD + 2;
        tt.store_at_ply(42, 6, node_score, BoundType::Exact, None, 1, 3, false);

        // Probing from the root should see the mate as farther away.
        let from_root = tt.probe_at_ply(42, 0).unwrap().score();
        assert_eq!(from_root, node_score + 3);

        // Probing from the same ply recovers the original value.
        let from_same_ply = tt.probe_at_ply(42, 3).unwrap().score();
        assert_eq!(from_same_ply, node_score);
    }

    #[test]
    fn hashfull_tracks_occupancy() {
        let tt = TranspositionTable::new(1);
        assert_eq!(tt.hashfull_per_mille(), 0);
        tt.store(7, 1, 1, BoundType::Exact, None, 1);
        assert!(tt.hashfull_per_mille() > 0);
    }
}
