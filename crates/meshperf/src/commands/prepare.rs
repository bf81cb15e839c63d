use libmeshperf_core::{netperf, MeshError};
use serde_json::json;

use crate::cli::{Cli, Selection};
use crate::commands::connect;
use crate::output::{output_success, print_human};

pub fn run(cli: &Cli, selection: &Selection) -> Result<(), MeshError> {
    let (_, machines) = connect(cli, selection)?;

    netperf::prepare(&machines)?;

    print_human(
        cli,
        &format!("netperf {} ready on {} machines", netperf::NETPERF_VERSION, machines.len()),
    );
    output_success(cli, json!({ "prepared": machines.len() }))
}
