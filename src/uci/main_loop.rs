//! The UCI command loop: reads commands from stdin and drives an
//! [`EngineController`] until `quit` (or EOF) is seen.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::{Color, SearchIterationInfo, DEFAULT_TT_MB};
use crate::engine::{
    build_search_request, EngineController, SearchParams as EngineSearchParams, TimeConfig,
    TimeControl,
};

use super::command::{parse_go_params, parse_uci_command, GoParams, UciCommand};
use super::options::{parse_setoption, UciOptionAction, UciOptions};
use super::print::print_perft_info;
use super::report::{print_bestmove, print_ready};
use super::parse_position_command;

/// Run the UCI protocol loop over stdin/stdout until `quit` or end of input.
pub fn run_uci_loop() {
    let mut options = UciOptions::new(DEFAULT_TT_MB);
    let mut controller = EngineController::new(options.hash_mb);
    controller.set_info_callback(Some(Arc::new(print_search_info)));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let Some(cmd) = parse_uci_command(&line) else {
            continue;
        };

        match cmd {
            UciCommand::Uci => {
                let params = controller
                    .with_search_state_ref(|state| state.params().clone())
                    .unwrap_or_default();
                options.print(&params);
            }
            UciCommand::IsReady => print_ready(),
            UciCommand::UciNewGame => controller.new_game(),
            UciCommand::Position(parts) => {
                let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
                let mut board = controller.board().clone();
                parse_position_command(&mut board, &refs);
                controller.set_board(board);
            }
            UciCommand::Go(parts) => {
                let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
                let go_params = parse_go_params(&refs);
                handle_go(&mut controller, &options, &go_params);
            }
            UciCommand::Perft(depth) => {
                let mut board = controller.board().clone();
                let start = Instant::now();
                let nodes = board.perft(depth);
                print_perft_info(depth, nodes, start.elapsed());
            }
            UciCommand::SetOption(parts) => {
                let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
                if let Some((name, value)) = parse_setoption(&refs) {
                    let action = controller
                        .with_search_state(|state| {
                            options.apply_setoption(&name, value.as_deref(), state)
                        })
                        .flatten();
                    match action {
                        Some(UciOptionAction::ReinitHash(mb)) => controller.resize_hash(mb),
                        Some(UciOptionAction::SetThreads(n)) => controller.set_threads(n),
                        Some(UciOptionAction::SetOwnBook(enabled)) => {
                            controller.set_own_book(enabled);
                        }
                        Some(UciOptionAction::LoadBook(path)) => {
                            if let Err(err) = controller.load_book(&path) {
                                eprintln!("info string failed to load book {}: {err}", path.display());
                                #[cfg(feature = "logging")]
                                log::warn!("failed to load book {}: {err}", path.display());
                            }
                        }
                        None => {}
                    }
                }
            }
            UciCommand::Debug(_) => {}
            UciCommand::Stop => controller.signal_stop(),
            UciCommand::PonderHit => controller.ponderhit(),
            UciCommand::Quit => {
                controller.stop_search();
                break;
            }
            UciCommand::Unknown(cmd) => {
                eprintln!("info string unknown command: {cmd}");
                #[cfg(feature = "logging")]
                log::warn!("unrecognized UCI command: {cmd}");
            }
        }
        let _ = io::stdout().flush();
    }
}

fn time_config_from_options(options: &UciOptions) -> TimeConfig {
    TimeConfig {
        move_overhead_ms: options.move_overhead_ms,
        soft_time_percent: options.soft_time_percent,
        hard_time_percent: options.hard_time_percent,
        default_max_nodes: options.default_max_nodes,
    }
}

/// Build a `TimeControl` from the `go` parameters and the side to move.
fn time_control_from_go(go: &GoParams, stm: Color) -> TimeControl {
    if let Some(movetime) = go.movetime {
        return TimeControl::move_time_ms(movetime);
    }
    if go.infinite || go.ponder {
        return TimeControl::Infinite;
    }

    let (time_left, inc) = match stm {
        Color::White => (go.wtime, go.winc),
        Color::Black => (go.btime, go.binc),
    };

    match time_left {
        Some(time_left_ms) => TimeControl::incremental(
            Duration::from_millis(time_left_ms),
            Duration::from_millis(inc.unwrap_or(0)),
            go.movestogo,
        ),
        None if go.depth.is_some() => TimeControl::Depth,
        None => TimeControl::Infinite,
    }
}

/// Whether `go` leaves every limit unspecified, i.e. a GUI just said "go" and
/// expects the engine to pick its own defaults.
fn go_has_no_explicit_limit(go: &GoParams) -> bool {
    go.movetime.is_none()
        && go.depth.is_none()
        && go.nodes.is_none()
        && go.wtime.is_none()
        && go.btime.is_none()
        && !go.infinite
        && !go.ponder
}

fn handle_go(controller: &mut EngineController, options: &UciOptions, go: &GoParams) {
    let stm = controller.board().side_to_move();

    let mut depth_override = go.depth;
    let mut movetime_override = None;
    if let Some(difficulty) = options.difficulty {
        if go_has_no_explicit_limit(go) {
            let (depth, movetime_ms) = difficulty.limits();
            depth_override = Some(depth);
            movetime_override = Some(movetime_ms);
        }
    }

    let time_control = match movetime_override {
        Some(movetime_ms) => TimeControl::move_time_ms(movetime_ms),
        None => time_control_from_go(go, stm),
    };
    let config = time_config_from_options(options);

    let (request, _) = build_search_request(
        time_control,
        depth_override,
        go.nodes,
        go.ponder,
        go.infinite,
        &config,
    );

    controller.set_max_nodes(request.max_nodes);

    let params = EngineSearchParams {
        depth: request.depth,
        soft_time_ms: request.soft_time_ms,
        hard_time_ms: request.hard_time_ms,
        ponder: request.ponder,
        infinite: request.infinite,
        multi_pv: options.multi_pv,
    };

    controller.start_search(params, |result| {
        print_bestmove(result.best_move);
        let _ = io::stdout().flush();
    });
}

fn print_search_info(info: &SearchIterationInfo) {
    let score = match info.mate_in {
        Some(mate) => format!("mate {mate}"),
        None => format!("cp {}", info.score),
    };
    println!(
        "info depth {} seldepth {} multipv {} score {} nodes {} nps {} hashfull {} tbhits 0 time {} pv {}",
        info.depth,
        info.seldepth,
        info.multipv,
        score,
        info.nodes,
        info.nps,
        info.hashfull,
        info.time_ms,
        info.pv
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_go() -> GoParams {
        GoParams::default()
    }

    #[test]
    fn bare_go_has_no_explicit_limit() {
        assert!(go_has_no_explicit_limit(&bare_go()));
    }

    #[test]
    fn explicit_depth_counts_as_a_limit() {
        let go = GoParams { depth: Some(6), ..bare_go() };
        assert!(!go_has_no_explicit_limit(&go));
    }

    #[test]
    fn explicit_movetime_counts_as_a_limit() {
        let go = GoParams { movetime: Some(1000), ..bare_go() };
        assert!(!go_has_no_explicit_limit(&go));
    }

    #[test]
    fn explicit_wtime_counts_as_a_limit() {
        let go = GoParams { wtime: Some(60_000), ..bare_go() };
        assert!(!go_has_no_explicit_limit(&go));
    }

    #[test]
    fn infinite_counts_as_a_limit() {
        let go = GoParams { infinite: true, ..bare_go() };
        assert!(!go_has_no_explicit_limit(&go));
    }
}
