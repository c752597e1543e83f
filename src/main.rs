//! CLI test harness.
//!
//! Not part of the library's public surface -- a thin runner over a fixed registry of
//! named scenarios, mirroring the original project's own unit-test binary: pick a test by
//! name (or run all of them) and report pass/fail with a process exit code.

use clap::Parser;
use gatefuse::{Solver, SolverState};
use log::{info, LevelFilter};

/// Run one named gate-construction scenario, or all of them.
#[derive(Parser, Debug)]
#[command(name = "gatefuse", about = "Gate-construction scenario runner")]
struct Cli {
    /// Name of the scenario to run, or "all" to run the full registry.
    test_name: Option<String>,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

type ScenarioFn = fn();

fn registry() -> Vec<(&'static str, ScenarioFn)> {
    vec![
        ("and_basic", scenario_and_basic),
        ("and_simplification", scenario_and_simplification),
        ("xor_commutes_and_cancels", scenario_xor_commutes_and_cancels),
        ("mux_identities", scenario_mux_identities),
        ("at_most_one", scenario_at_most_one),
        ("empty_clause_unsat", scenario_empty_clause_unsat),
        ("contract_violations", scenario_contract_violations),
    ]
}

fn scenario_and_basic() {
    let mut s = Solver::new();
    let a = s.new_var();
    let b = s.new_var();
    let c = s.make_and(a, b);
    s.assume(a);
    s.assume(-b);
    assert_eq!(s.check(), SolverState::Sat);
    assert!(!s.value(c));
}

fn scenario_and_simplification() {
    let mut s = Solver::new();
    let a = s.new_var();
    let before = s.num_vars();
    let c = s.make_and(a, -a);
    assert_eq!(c, gatefuse::Literal::ZERO);
    assert_eq!(s.num_vars(), before);
}

fn scenario_xor_commutes_and_cancels() {
    let mut s = Solver::new();
    let a = s.new_var();
    let b = s.new_var();
    let x1 = s.make_xor(a, b);
    let x2 = s.make_xor(b, a);
    let x3 = s.make_xor(-a, -b);
    assert_eq!(x1, x2);
    assert_eq!(x1, x3);
}

fn scenario_mux_identities() {
    let mut s = Solver::new();
    let sel = s.new_var();
    let t = s.new_var();
    let e = s.new_var();
    assert_eq!(s.make_mux(sel, gatefuse::Literal::ONE, e), s.make_or(sel, e));
    assert_eq!(s.make_mux(sel, t, gatefuse::Literal::ZERO), s.make_and(sel, t));
    assert_eq!(s.make_mux(sel, t, -t), -s.make_xor(sel, t));
}

fn scenario_at_most_one() {
    let mut s = Solver::new();
    let ins: Vec<gatefuse::Literal> = (0..3).map(|_| s.new_var()).collect();
    let r = s.make_at_most(&ins, 1);
    for mask in 0u32..8 {
        let assignment: Vec<bool> = (0..3).map(|i| (mask >> i) & 1 != 0).collect();
        for (i, &v) in ins.iter().enumerate() {
            s.assume(if assignment[i] { v } else { -v });
        }
        assert_eq!(s.check(), SolverState::Sat);
        let popcount = assignment.iter().filter(|&&b| b).count();
        assert_eq!(s.value(r), popcount <= 1);
    }
}

fn scenario_empty_clause_unsat() {
    let mut s = Solver::new();
    s.add_clause([]);
    assert_eq!(s.check(), SolverState::Unsat);
}

/// Exercises the `try_*` fallible siblings' `Err` paths -- the ones that report a
/// contract violation as a value instead of aborting via `debug_assert!`.
fn scenario_contract_violations() {
    let mut s = Solver::new();

    // A literal from an unrelated solver is unknown here: no variables allocated yet.
    let mut other = Solver::new();
    let foreign = other.new_var();
    assert!(matches!(
        s.try_check_literal(foreign),
        Err(gatefuse::GateError::UnknownLiteral { .. })
    ));

    // ILLEGAL is rejected outright.
    assert!(matches!(
        s.try_check_literal(gatefuse::Literal::ILLEGAL),
        Err(gatefuse::GateError::IllegalLiteral)
    ));

    let a = s.new_var();
    assert!(s.try_check_literal(a).is_ok());

    // value() is undefined outside SAT state.
    assert!(matches!(
        s.try_value(a),
        Err(gatefuse::GateError::StateMismatch { .. })
    ));

    s.assume(a);
    assert_eq!(s.check(), SolverState::Sat);
    assert_eq!(s.try_value(a), Ok(true));
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    #[cfg(feature = "cli-logging")]
    env_logger::Builder::new().filter_level(level).init();
    #[cfg(not(feature = "cli-logging"))]
    let _ = level;
}

fn run_guarded(run: ScenarioFn) -> bool {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(run)).is_ok()
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(test_name) = cli.test_name else {
        eprintln!("usage: gatefuse <test-name | \"all\">");
        std::process::exit(1);
    };

    let tests = registry();

    if test_name == "all" {
        for (name, run) in &tests {
            info!("running {name}");
            if !run_guarded(*run) {
                eprintln!("scenario {name:?} failed its assertions");
                std::process::exit(3);
            }
        }
        info!("all {} scenarios passed", tests.len());
        std::process::exit(0);
    }

    match tests.iter().find(|(name, _)| *name == test_name) {
        Some((name, run)) => {
            info!("running {name}");
            if !run_guarded(*run) {
                eprintln!("scenario {name:?} failed its assertions");
                std::process::exit(3);
            }
            std::process::exit(0);
        }
        None => {
            eprintln!(
                "unknown test {:?}; known tests: {}",
                test_name,
                tests.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", ")
            );
            std::process::exit(2);
        }
    }
}
