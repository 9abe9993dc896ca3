//! End-to-end driver tests against scripted in-memory oracles.

use std::collections::HashMap;

use forza_core::MoveSeq;
use forza_engine::{Bounds, SearchError, Solver};
use forza_oracle::{Oracle, OracleError, WdlResponse};

/// Oracle backed by a map from move-sequence strings to fixed replies.
///
/// Panics on a query for an unscripted position; in these tests that
/// means the driver expanded a node it should not have.
struct ScriptedOracle {
    replies: HashMap<String, WdlResponse>,
    queries: u64,
}

impl ScriptedOracle {
    fn new(entries: &[(&str, WdlResponse)]) -> Self {
        Self {
            replies: entries
                .iter()
                .map(|(moves, reply)| (moves.to_string(), *reply))
                .collect(),
            queries: 0,
        }
    }
}

impl Oracle for ScriptedOracle {
    fn query(&mut self, moves: &MoveSeq) -> Result<WdlResponse, OracleError> {
        self.queries += 1;
        let key = moves.to_string();
        match self.replies.get(&key) {
            Some(reply) => Ok(*reply),
            None => panic!("unscripted query for \"{key}\""),
        }
    }
}

const TERMINAL: WdlResponse = WdlResponse {
    terminal: true,
    children: [None; 7],
};

fn node(children: [Option<i8>; 7]) -> WdlResponse {
    WdlResponse { terminal: false, children }
}

fn only(col: usize, value: i8) -> [Option<i8>; 7] {
    let mut children = [None; 7];
    children[col] = Some(value);
    children
}

fn seq(s: &str) -> MoveSeq {
    s.parse().unwrap()
}

#[test]
fn forced_win_root() {
    let oracle = ScriptedOracle::new(&[("", node(only(3, 1))), ("3", TERMINAL)]);
    let mut solver = Solver::new(oracle, 64);

    assert_eq!(solver.search_root().unwrap(), 1);
    assert_eq!(solver.tt().len(), 2);

    // Both nodes cached: the win as a fail-high record against an
    // unbounded prior upper bound, the terminal as an exact loss.
    let root = solver.tt().get(seq("").encode()).unwrap().unwrap();
    assert_eq!(Bounds::unpack(root), Bounds { lower: 1, upper: 1 });
    let child = solver.tt().get(seq("3").encode()).unwrap().unwrap();
    assert_eq!(Bounds::unpack(child), Bounds::exact(-1));
}

#[test]
fn beta_cutoff_expands_single_child() {
    // Columns 2 and 4 both win; the preferred ordering reaches 2 first
    // and 4 must never be queried.
    let mut children = [None; 7];
    children[2] = Some(1);
    children[4] = Some(1);
    let oracle = ScriptedOracle::new(&[("", node(children)), ("2", TERMINAL)]);
    let mut solver = Solver::new(oracle, 64);

    assert_eq!(solver.search_root().unwrap(), 1);
    assert_eq!(solver.tt().len(), 2);
    assert_eq!(solver.tt().get(seq("4").encode()).unwrap(), None);
}

#[test]
fn losing_root_expands_every_child() {
    // Both legal moves lose; the PV expansion verifies the first and
    // still searches the sibling.
    let mut children = [None; 7];
    children[3] = Some(-1);
    children[0] = Some(-1);
    let oracle = ScriptedOracle::new(&[
        ("", node(children)),
        ("3", node(only(3, 1))),
        ("33", TERMINAL),
        ("0", node(only(0, 1))),
        ("00", TERMINAL),
    ]);
    let mut solver = Solver::new(oracle, 64);

    assert_eq!(solver.search_root().unwrap(), -1);
    assert_eq!(solver.tt().len(), 5);
    let root = solver.tt().get(seq("").encode()).unwrap().unwrap();
    assert_eq!(Bounds::unpack(root), Bounds::exact(-1));
}

/// Script a single forced 42-ply line that fills the board column by
/// column. `final_wdl` is the parent-of-full-board value for the last
/// move: +1 makes the full board a loss, 0 makes it a draw.
fn full_board_script(final_wdl: i8) -> (ScriptedOracle, i8) {
    let mut line = String::new();
    for col in 0..7u8 {
        for _ in 0..6 {
            line.push(char::from(b'0' + col));
        }
    }

    // Value of playing move k, from the mover's perspective. Each value
    // is the negation of the next one; the last is fixed by the caller.
    let mut wdl = [0i8; 42];
    wdl[41] = final_wdl;
    for ply in (0..41).rev() {
        wdl[ply] = -wdl[ply + 1];
    }

    let mut entries: Vec<(String, WdlResponse)> = Vec::new();
    for ply in 0..42 {
        let col = line.as_bytes()[ply] - b'0';
        entries.push((line[..ply].to_string(), node(only(col as usize, wdl[ply]))));
    }
    entries.push((line.clone(), TERMINAL));

    let oracle = ScriptedOracle {
        replies: entries.into_iter().collect(),
        queries: 0,
    };
    (oracle, wdl[0])
}

#[test]
fn full_board_draw_disambiguation() {
    let (oracle, root_value) = full_board_script(0);
    assert_eq!(root_value, 0);
    let mut solver = Solver::new(oracle, 128);

    assert_eq!(solver.search_root().unwrap(), 0);
    // Every node along the line is cached, including the full board.
    assert_eq!(solver.tt().len(), 43);
}

#[test]
fn full_board_loss_disambiguation() {
    let (oracle, root_value) = full_board_script(1);
    assert_eq!(root_value, -1);
    let mut solver = Solver::new(oracle, 128);

    assert_eq!(solver.search_root().unwrap(), -1);
    let root = solver.tt().get(seq("").encode()).unwrap().unwrap();
    assert_eq!(Bounds::unpack(root), Bounds::exact(-1));
}

#[test]
fn inconsistent_oracle_aborts() {
    // The root promises a win in column 3, but the child claims a win for
    // its own side too, so the recursion comes back with the wrong sign.
    let oracle = ScriptedOracle::new(&[
        ("", node(only(3, 1))),
        ("3", node(only(3, 1))),
        ("33", TERMINAL),
    ]);
    let mut solver = Solver::new(oracle, 64);

    let err = solver.search_root().unwrap_err();
    assert!(matches!(err, SearchError::ChildMismatch { .. }), "{err}");
}

#[test]
fn non_terminal_without_children_aborts() {
    let oracle = ScriptedOracle::new(&[("", node([None; 7]))]);
    let mut solver = Solver::new(oracle, 64);

    let err = solver.search_root().unwrap_err();
    assert!(matches!(err, SearchError::NoChildren { .. }), "{err}");
}

#[test]
fn opening_move_matches_root_wdl() {
    let oracle = ScriptedOracle::new(&[("", node(only(3, 1))), ("3", TERMINAL)]);
    let mut solver = Solver::new(oracle, 64);

    let root_wdl = 1;
    let child = solver.search(seq("3"), -1, 1).unwrap();
    assert_eq!(-child, root_wdl);
}

#[test]
fn cached_root_skips_the_oracle() {
    let oracle = ScriptedOracle::new(&[("", node(only(3, 1))), ("3", TERMINAL)]);
    let mut solver = Solver::new(oracle, 64);

    assert_eq!(solver.search_root().unwrap(), 1);
    let queries_after_first = {
        let (tt, oracle) = solver.into_parts();
        let queries = oracle.queries;
        solver = Solver::from_parts(tt, oracle);
        queries
    };

    assert_eq!(solver.search_root().unwrap(), 1);
    let (_, oracle) = solver.into_parts();
    assert_eq!(oracle.queries, queries_after_first);
}

#[test]
#[should_panic(expected = "window must be non-empty")]
fn empty_window_is_rejected() {
    let oracle = ScriptedOracle::new(&[]);
    let mut solver = Solver::new(oracle, 64);
    let _ = solver.search(MoveSeq::new(), 1, 1);
}
