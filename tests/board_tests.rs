use chess_engine::board::Board;

#[test]
fn perft_positions() {
    struct TestPosition {
        name: &'static str,
        fen: &'static str,
        depths: &'static [(usize, u64)],
    }

    const TEST_POSITIONS: &[TestPosition] = &[
        TestPosition {
            name: "Initial Position",
            fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            depths: &[(1, 20), (2, 400), (3, 8902), (4, 197281)],
        },
        TestPosition {
            name: "Kiwipete",
            fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            depths: &[(1, 48), (2, 2039), (3, 97862)],
        },
    ];

    for position in TEST_POSITIONS {
        let mut board = Board::from_fen(position.fen);
        for &(depth, expected) in position.depths {
            let nodes = board.perft(depth);
            assert_eq!(nodes, expected, "Perft failed for {} at depth {}", position.name, depth);
        }
    }
}

#[test]
fn test_draw_detection_50_move() {
    // Halfmove clock embedded directly in the FEN (5th field) rather than
    // poking at board internals, which aren't part of the public API.
    let board = Board::from_fen("8/8/8/8/8/8/8/K6k w - - 99 1");
    assert!(board.is_draw(), "100 halfmoves without a pawn move or capture should be a draw");
}

#[test]
fn no_draw_with_fresh_halfmove_clock() {
    let board = Board::new();
    assert!(!board.is_draw(), "The starting position should not be a draw");
}
