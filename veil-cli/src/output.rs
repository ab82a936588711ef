use anyhow::{Context, Result};
use clap::ValueEnum;
use std::io::Write;
use veil_core::TransactionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Csv,
}

pub fn write_records<W: Write>(out: W, records: &[TransactionRecord], format: Format) -> Result<()> {
    match format {
        Format::Json => write_json(out, records),
        Format::Csv => write_csv(out, records),
    }
}

fn write_json<W: Write>(mut out: W, records: &[TransactionRecord]) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, records).context("serialize records")?;
    writeln!(out)?;
    Ok(())
}

fn write_csv<W: Write>(out: W, records: &[TransactionRecord]) -> Result<()> {
    let mut w = csv::Writer::from_writer(out);
    if records.is_empty() {
        w.write_record(["source", "date", "description", "amount", "category", "card_last_four"])?;
    }
    for r in records {
        w.serialize(r).context("write csv row")?;
    }
    w.flush()?;
    Ok(())
}
