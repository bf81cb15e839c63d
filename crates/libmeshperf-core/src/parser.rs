//! netperf report parsing
//!
//! netperf prints its result as the last column of the result line, so every
//! decimal number that ends a line is taken as a sample. Anything else in the
//! report (headers, socket sizes, integer columns) is ignored.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::kind::BenchmarkKind;

fn sample_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+\.[0-9]+)\s+\n").expect("sample pattern is valid"))
}

/// Every line-ending decimal sample in `output`, in order of appearance
pub fn extract_samples(output: &str) -> Vec<f64> {
    sample_re()
        .captures_iter(output)
        .filter_map(|caps| caps[1].parse::<f64>().ok())
        .collect()
}

/// Contribution of one source machine's netperf output to the aggregate.
///
/// Output without any sample contributes 0.0. That is not an error, but it
/// biases the aggregate low, so it is logged.
pub fn contribution(kind: BenchmarkKind, source: &str, output: &str) -> f64 {
    let samples = extract_samples(output);
    if samples.is_empty() {
        warn!(
            source = %source,
            benchmark = %kind,
            output_len = output.len(),
            "No netperf samples found in output, contributing 0"
        );
        return 0.0;
    }
    kind.reduce(&samples)
}
