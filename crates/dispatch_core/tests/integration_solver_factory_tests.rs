mod support;

use std::io::Write;

use dispatch_core::config::SolverConfig;
use dispatch_core::scenario::{build_solver, SolverKind};
use support::instances::{assert_valid, greedy_trap};

fn write_config(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn every_kind_solves_from_a_json_config() {
    let file = write_config(
        r#"{
            "milp": { "time_limit_secs": 10.0 },
            "batch": { "grid_dimension": 2, "backlog_size": 1, "seed": 4 }
        }"#,
    );
    let config = SolverConfig::from_json_file(file.path()).unwrap();
    let (workers, tasks) = greedy_trap();

    for kind in SolverKind::ALL {
        let solver = build_solver(kind, &config).unwrap();
        let result = solver.solve(&workers, &tasks);
        assert_valid(&workers, &tasks, &result);
        assert!(result.total_reward >= 10.0 - 1e-4, "{kind}: {result:?}");
    }
}

#[test]
fn invalid_json_config_is_rejected() {
    let file = write_config(r#"{ "batch": { "grid_dimension": 0 } }"#);
    assert!(SolverConfig::from_json_file(file.path()).is_err());

    let file = write_config("not json");
    assert!(SolverConfig::from_json_file(file.path()).is_err());
}
