//! JSON output for CLI commands
//!
//! Every command prints exactly one JSON object on stdout.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response<T: Serialize>(data: &T) -> CliResult<()> {
    let response = envelope(serde_json::to_value(data)?);

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

fn envelope(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}
