//! Tests for builder modules

use prometheus_process_sim::builders::{build_core, SimulatorBuilder};
use prometheus_process_sim::config::SimulatorConfig;
use prometheus_process_sim::infra::{InMemorySink, TokenStreamSource};

#[test]
fn test_builder_overrides() {
    let builder = SimulatorBuilder::default().max_processes(4).init_pid("root");
    assert_eq!(builder.config().max_processes, 4);
    assert_eq!(builder.config().init_pid, "root");

    let core = builder.build_core().unwrap();
    assert_eq!(core.current_id(), "root");
    assert_eq!(core.processes().capacity(), 4);
}

#[test]
fn test_builder_rejects_invalid_config() {
    assert!(SimulatorBuilder::default().max_processes(0).build_core().is_err());
    assert!(build_core(&SimulatorConfig {
        init_pid: String::new(),
        ..SimulatorConfig::default()
    })
    .is_err());
}

#[test]
fn test_builder_wires_simulator() {
    let source = TokenStreamSource::new("cr A 1".as_bytes());
    let mut sim = SimulatorBuilder::default()
        .init_pid("root")
        .build(source, InMemorySink::new())
        .unwrap();
    sim.run();
    assert_eq!(sim.sink().trace(), "root A");
}
