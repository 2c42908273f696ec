use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chess_engine::board::{
    find_best_move, find_best_move_with_time, Board, SearchClock, SearchLimits, SearchState,
};

#[test]
fn engine_depth_search_returns_move() {
    let mut board = Board::new();
    let mut state = SearchState::new(16);
    let stop = AtomicBool::new(false);

    let best = find_best_move(&mut board, &mut state, 1, &stop);
    assert!(best.is_some(), "depth-1 search from the starting position should return a move");
}

#[test]
fn engine_time_limited_search_returns_move_within_time() {
    let mut board = Board::new();
    let mut state = SearchState::new(16);

    let start = Instant::now();
    let hard_deadline = start + Duration::from_millis(50);
    let limits = SearchLimits {
        clock: Arc::new(SearchClock::new(start, Some(hard_deadline), Some(hard_deadline))),
        stop: Arc::new(AtomicBool::new(false)),
    };

    let best = find_best_move_with_time(&mut board, &mut state, &limits);
    let elapsed = start.elapsed();

    assert!(best.is_some(), "a time-limited search from the starting position should return a move");
    assert!(elapsed < Duration::from_secs(5), "search overran its deadline: {:?}", elapsed);
}
