//! End-to-end runs of the mesh benchmark against in-memory machines

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{failed, ok, FakeMachine, InFlight};
use libmeshperf_core::{
    BenchmarkConfig, BenchmarkKind, MachineError, MeshBenchmark, MeshError,
};

fn benchmark(connections: usize) -> MeshBenchmark {
    MeshBenchmark::new(BenchmarkConfig::new(connections, 1, None).unwrap()).unwrap()
}

#[test]
fn test_three_machine_throughput_and_latency() {
    // Each source reports 100 Mbits/sec in total and two 1000 trans/sec
    // samples, i.e. 2.0 ms of raw latency
    let machines: Vec<_> = (0..3)
        .map(|i| FakeMachine::netperf(i, "60.00 \n40.00 \n", "1000.00 \n1000.00 \n"))
        .collect();

    let results = benchmark(1).run(&machines).unwrap();

    assert_eq!(results.len(), 2);

    let throughput = &results[0];
    assert_eq!(throughput.metric, "TCP_STREAM_Total_Throughput");
    assert_eq!(throughput.unit, "Mbits/sec");
    assert_eq!(throughput.value, 300.0);
    assert_eq!(throughput.metadata["number_machines"], 3);
    assert_eq!(throughput.metadata["number_connections"], 1);

    let latency = &results[1];
    assert_eq!(latency.metric, "TCP_RR_Average_Latency");
    assert_eq!(latency.unit, "ms");
    assert_eq!(latency.value, 1.0);
}

#[test]
fn test_records_always_in_kind_order() {
    for n in 2..=5 {
        let machines: Vec<_> = (0..n)
            .map(|i| FakeMachine::netperf(i, "1.00 \n", "100.00 \n"))
            .collect();
        let results = benchmark(2).run(&machines).unwrap();

        let metrics: Vec<_> = results.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(
            metrics,
            vec![
                BenchmarkKind::Throughput.metric_name(),
                BenchmarkKind::Latency.metric_name()
            ]
        );
    }
}

#[test]
fn test_latency_normalized_by_connections() {
    // 2 machines, 3 connections: 6 directed links. Each source raw = 3 * 10ms.
    let machines: Vec<_> = (0..2)
        .map(|i| FakeMachine::netperf(i, "", "100.00 \n100.00 \n100.00 \n"))
        .collect();

    let record = benchmark(3)
        .run_kind(&machines, BenchmarkKind::Latency)
        .unwrap();

    assert_eq!(record.value, 60.0 / 6.0);
}

#[test]
fn test_one_command_per_source_per_kind() {
    let machines: Vec<_> = (0..4)
        .map(|i| FakeMachine::netperf(i, "1.00 \n", "1.00 \n"))
        .collect();

    benchmark(2).run(&machines).unwrap();

    for (i, machine) in machines.iter().enumerate() {
        let commands = machine.commands();
        assert_eq!(commands.len(), 2);
        assert!(commands[0].contains("-t TCP_STREAM"));
        assert!(commands[1].contains("-t TCP_RR"));

        for cmd in &commands {
            assert!(cmd.ends_with("wait"));
            assert_eq!(cmd.matches("/usr/local/bin/netperf").count(), 3 * 2);
            assert!(!cmd.contains(&format!("-H 10.0.0.{} ", i + 1)));
        }
    }
}

#[test]
fn test_empty_output_contributes_zero() {
    let machines = vec![
        FakeMachine::netperf(0, "50.00 \n", "500.00 \n"),
        FakeMachine::netperf(1, "", ""),
    ];

    let results = benchmark(1).run(&machines).unwrap();

    assert_eq!(results[0].value, 50.0);
    assert_eq!(results[1].value, 2.0 / 2.0);
}

#[test]
fn test_rejects_single_machine() {
    let machines = vec![FakeMachine::netperf(0, "1.00 \n", "1.00 \n")];

    let err = benchmark(1).run(&machines).unwrap_err();

    assert!(matches!(err, MeshError::InvalidArgs(_)));
    assert!(machines[0].commands().is_empty());
}

#[test]
fn test_failed_command_aborts_phase() {
    let machines = vec![
        FakeMachine::netperf(0, "10.00 \n", "10.00 \n"),
        FakeMachine::new(1, |_| Ok(failed(255, "establish_control: connection refused"))),
        FakeMachine::netperf(2, "10.00 \n", "10.00 \n"),
    ];

    let err = benchmark(1).run(&machines).unwrap_err();

    match err {
        MeshError::Machine(MachineError::CommandFailed { machine, exit_code, .. }) => {
            assert_eq!(machine, "vm-1");
            assert_eq!(exit_code, 255);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Every source still ran the throughput phase; latency never started
    for machine in &machines {
        assert_eq!(machine.commands().len(), 1);
    }
}

#[test]
fn test_transport_error_propagates() {
    let machines = vec![
        FakeMachine::netperf(0, "10.00 \n", "10.00 \n"),
        FakeMachine::new(1, |_| {
            Err(MachineError::Transport {
                machine: "vm-1".to_string(),
                reason: "connection timed out".to_string(),
            })
        }),
    ];

    let err = benchmark(1).run(&machines).unwrap_err();

    assert!(matches!(err, MeshError::Machine(MachineError::Transport { .. })));
    assert_eq!(err.error_code(), "transport_error");
}

#[test]
fn test_sources_run_concurrently() {
    let in_flight = Arc::new(InFlight::default());
    let machines: Vec<_> = (0..4)
        .map(|i| {
            FakeMachine::new(i, |_| Ok(ok("1.00 \n")))
                .with_delay(Duration::from_millis(100))
                .with_in_flight(Arc::clone(&in_flight))
        })
        .collect();

    let record = benchmark(1)
        .run_kind(&machines, BenchmarkKind::Throughput)
        .unwrap();

    assert_eq!(record.value, 4.0);
    assert_eq!(in_flight.peak(), 4);
}
