//! Composition of the per-source netperf command
//!
//! A source machine runs one netperf process per link, all backgrounded, and
//! the command ends with `wait` so the remote shell only returns once every
//! process has finished. Concurrency inside a source machine therefore lives
//! in the remote shell; the aggregator only needs one call per machine.

use std::fmt::Write;

use crate::config::BenchmarkConfig;
use crate::kind::BenchmarkKind;
use crate::netperf::NETPERF_BIN;
use crate::topology::targets_for;

/// Build the command run on `source`.
///
/// `addresses` are the internal addresses of every machine in the mesh, in
/// machine-set order; `source` indexes into it.
pub fn compose(
    kind: BenchmarkKind,
    addresses: &[&str],
    source: usize,
    config: &BenchmarkConfig,
) -> String {
    let mut cmd = String::new();
    for link in targets_for(addresses.len(), source, config.connections) {
        push_invocation(&mut cmd, kind, addresses[link.target], config);
    }
    cmd.push_str("wait");
    cmd
}

/// A single backgrounded netperf invocation against `address`
pub fn invocation(kind: BenchmarkKind, address: &str, config: &BenchmarkConfig) -> String {
    let mut cmd = String::new();
    push_invocation(&mut cmd, kind, address, config);
    cmd
}

fn push_invocation(cmd: &mut String, kind: BenchmarkKind, address: &str, config: &BenchmarkConfig) {
    // Writing to a String cannot fail
    let _ = write!(
        cmd,
        "{} -t {} -H {} -i {} ",
        NETPERF_BIN,
        kind.tool_id(),
        address,
        config.iterations
    );
    if let Some(secs) = config.duration_seconds {
        let _ = write!(cmd, "-l {} ", secs);
    }
    cmd.push_str("& ");
}
