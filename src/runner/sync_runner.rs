use std::io::Write;
use std::path::Path;

use tracing::info;

use super::{ReportSpec, RunnerError, ScriptSession};
use crate::{config::Config, csv_utils::read_csv, dto::ScriptRow};

/// Runs a ledger script from the given input file and writes the requested report to the
/// provided writer.
///
/// # Arguments
/// * `input_path` - Path to the input CSV file containing script rows
/// * `writer` - Where to write the report (e.g. stdout)
/// * `report` - Which report to write, with optional paging and category filter
/// * `config` - Page size and validation limits
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * Writing to the output fails
pub fn run<P, W>(
    input_path: P,
    writer: W,
    report: &ReportSpec,
    config: &Config,
) -> Result<(), RunnerError>
where
    P: AsRef<Path>,
    W: Write,
{
    let input_path = input_path.as_ref();
    info!(path = %input_path.display(), report = %report.report, "running ledger script");
    let mut session = ScriptSession::new(config.max_description);

    let rows = read_csv::<ScriptRow, _>(input_path)?;
    for row in rows {
        // CSV parsing errors are critical - propagate them
        let row = row?;
        // Rejected rows are logged and skipped
        session.process(row);
    }

    session.write_report(writer, report, config.page_size)?;
    Ok(())
}
