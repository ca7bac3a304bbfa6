#![forbid(unsafe_code)]

//! Scenario replay runner.
//!
//! Replays a JSONL scenario against the stock synthetic portfolio and prints
//! the final [`folio_harness::PageSnapshot`] as JSON.
//!
//! # Running
//!
//! ```sh
//! FOLIO_HARNESS_SCENARIO=tour.jsonl cargo run -p folio-harness
//! ```
//!
//! - `FOLIO_HARNESS_SCENARIO`: scenario path (required).
//! - `FOLIO_HARNESS_CONFIG`: path to a JSON options object (optional).
//! - `FOLIO_HARNESS_EXPECT`: path to a snapshot JSON; exit code 2 on mismatch.
//! - `RUST_LOG`: log filter, e.g. `folio_core=debug`. Logs go to stderr.

use std::io;

use folio_core::PageConfig;
use folio_harness::logging::init_cli_logging;
use folio_harness::{PageSnapshot, parse_jsonl, portfolio, replay};

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

fn main() -> io::Result<()> {
    init_cli_logging();

    let scenario_path = std::env::var("FOLIO_HARNESS_SCENARIO")
        .map_err(|_| invalid("FOLIO_HARNESS_SCENARIO must be set".into()))?;
    let events = parse_jsonl(&std::fs::read_to_string(&scenario_path)?)
        .map_err(|e| invalid(format!("{scenario_path}: {e}")))?;

    let config = match std::env::var("FOLIO_HARNESS_CONFIG") {
        Ok(path) => PageConfig::from_json(&std::fs::read_to_string(&path)?)
            .map_err(|e| invalid(format!("{path}: {e}")))?,
        Err(_) => PageConfig::default(),
    };

    let (page, _) = portfolio();
    let snapshot = replay(page, config, &events).map_err(|e| invalid(e.to_string()))?;
    let json = serde_json::to_string_pretty(&snapshot).map_err(|e| invalid(e.to_string()))?;
    println!("{json}");

    if let Ok(expect_path) = std::env::var("FOLIO_HARNESS_EXPECT") {
        let expected: PageSnapshot = serde_json::from_str(&std::fs::read_to_string(&expect_path)?)
            .map_err(|e| invalid(format!("{expect_path}: {e}")))?;
        if expected != snapshot {
            eprintln!("snapshot mismatch against {expect_path}");
            std::process::exit(2);
        }
        eprintln!("replay OK: events={}", events.len());
    }
    Ok(())
}
