use std::io::Write;
use std::path::Path;

use crate::{config::Config, dto::ScriptRow};

use super::{ReportSpec, RunnerError, ScriptSession};

use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, info};

type Result<T, E = RunnerError> = std::result::Result<T, E>;

/// Runs a ledger script async from the given input file and writes the requested report to
/// the provided writer.
/// Spawns two tasks:
/// * CSV reader - streams script rows from the input file, deserializes them and sends them to the processor via channel.
/// * Processor - receives rows from the channel and applies them to the store until the channel is closed.
///
/// # Arguments
/// * `input_path` - Path to the input CSV file containing script rows
/// * `writer` - Where to write the report (e.g. stdout)
/// * `report` - Which report to write, with optional paging and category filter
/// * `config` - Page size, validation limits and channel capacity
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * Writing to the output fails
pub async fn run<P, W>(
    input_path: P,
    writer: W,
    report: &ReportSpec,
    config: &Config,
) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    // Create channel for passing rows from reader to processor
    let (tx, rx) = mpsc::channel(config.channel_buffer);
    let input_path = input_path.as_ref().to_owned();
    info!(path = %input_path.display(), report = %report.report, "running ledger script");

    let reader_handle = tokio::spawn(read_rows(input_path, tx));
    let session = ScriptSession::new(config.max_description);
    let processor_handle = tokio::spawn(process_rows(rx, session));

    // Wait for reader to finish and propagate any errors
    reader_handle.await??;

    // Get final session state
    let session = processor_handle.await?;

    session.write_report(writer, report, config.page_size)?;
    Ok(())
}

/// Reads and deserializes script rows from a CSV file.
/// Returns them through the provided channel.
async fn read_rows(
    input_path: impl AsRef<Path> + Send,
    tx: mpsc::Sender<ScriptRow>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .create_deserializer(file);

    let mut records = csv_reader.deserialize::<ScriptRow>();
    while let Some(result) = records.next().await {
        match result {
            Ok(row) => {
                if tx.send(row).await.is_err() {
                    debug!("processor dropped, stopping reader");
                    break;
                }
            }
            // CSV parsing errors are critical - propagate them
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Applies rows received through the channel.
/// Returns the final session once the channel is closed by the reader.
async fn process_rows(
    mut rx: mpsc::Receiver<ScriptRow>,
    mut session: ScriptSession,
) -> ScriptSession {
    while let Some(row) = rx.recv().await {
        // Rejected rows are logged and skipped
        session.process(row);
    }
    session
}
