//! Writing collocation tables.

use anyhow::{Context, Result};
use collocation::CollocationTable;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write the table as a JSON array of row objects.
///
/// Goes to `path` when given, stdout otherwise.
pub fn write_table(table: &CollocationTable, path: Option<&Path>) -> Result<()> {
    let records = table.to_json_records().context("Failed to serialize table")?;

    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {:?}", path))?;
            write_records(&records, BufWriter::new(file))
        }
        None => write_records(&records, io::stdout().lock()),
    }
}

fn write_records<W: Write>(records: &[serde_json::Value], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
