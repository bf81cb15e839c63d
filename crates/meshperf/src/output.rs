use comfy_table::{presets::UTF8_FULL, Table};
use libmeshperf_core::{MeshError, ResultRecord};
use serde::Serialize;

use crate::cli::Cli;

/// JSON response envelope
#[derive(Serialize)]
pub struct JsonResponse<T: Serialize> {
    pub schema_version: u32,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

#[derive(Serialize)]
pub struct JsonError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

/// Output a successful result as JSON
pub fn output_success<T: Serialize>(cli: &Cli, data: T) -> Result<(), MeshError> {
    if cli.json {
        let response = JsonResponse {
            schema_version: 1,
            ok: true,
            data: Some(data),
            error: None,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}

/// Output benchmark results: a table for humans, the envelope for `--json`
pub fn output_results(cli: &Cli, results: &[ResultRecord]) -> Result<(), MeshError> {
    if cli.json {
        return output_success(cli, results);
    }
    if !cli.quiet {
        println!("{}", results_table(results));
    }
    Ok(())
}

pub fn results_table(results: &[ResultRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Metric", "Value", "Unit", "Machines", "Connections"]);

    for record in results {
        let meta = |key: &str| {
            record
                .metadata
                .get(key)
                .map(|v| v.to_string())
                .unwrap_or_default()
        };
        table.add_row(vec![
            record.metric.clone(),
            format!("{:.3}", record.value),
            record.unit.clone(),
            meta(libmeshperf_core::record::META_NUMBER_MACHINES),
            meta(libmeshperf_core::record::META_NUMBER_CONNECTIONS),
        ]);
    }
    table
}

/// Output an error
pub fn output_error(cli: &Cli, err: &MeshError) {
    if cli.json {
        let suggestions = err.suggestions();
        let details = if suggestions.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::json!({ "suggestions": suggestions })
        };

        let response: JsonResponse<()> = JsonResponse {
            schema_version: 1,
            ok: false,
            data: None,
            error: Some(JsonError {
                code: err.error_code().to_string(),
                message: err.to_string(),
                details,
            }),
        };
        match serde_json::to_string_pretty(&response) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("error: {}", err),
        }
    } else {
        eprintln!("error: {}", err);
        let suggestions = err.suggestions();
        if !suggestions.is_empty() {
            eprintln!();
            eprintln!("Suggestions:");
            for suggestion in suggestions {
                eprintln!("  - {}", suggestion);
            }
        }
    }
}

/// Print human-readable output (ignored in quiet and JSON modes)
pub fn print_human(cli: &Cli, msg: &str) {
    if !cli.json && !cli.quiet {
        println!("{}", msg);
    }
}
