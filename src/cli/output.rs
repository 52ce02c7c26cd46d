//! Rendering of correlated packs as JSON, a plain table, or CSV

use clap::ValueEnum;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::errors::AppResult;
use crate::types::{CorrelatedPack, ScanReport};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
}

/// One flattened CSV/table row per pack
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PackRow {
    pub buy_tx_hash: String,
    pub buyer: String,
    pub buy_block: u64,
    pub reward_tx_hash: String,
    pub reward_block: Option<u64>,
    pub delay_blocks: Option<u64>,
    pub confidence: String,
    pub reward_tokens: String,
}

impl From<&CorrelatedPack> for PackRow {
    fn from(pack: &CorrelatedPack) -> Self {
        let reward = pack.reward.as_ref();
        Self {
            buy_tx_hash: pack.buy_tx_hash.clone(),
            buyer: pack.buyer.clone(),
            buy_block: pack.buy_block,
            reward_tx_hash: reward.map(|r| r.reward_tx_hash.clone()).unwrap_or_default(),
            reward_block: reward.map(|r| r.reward_block),
            delay_blocks: reward.map(|r| r.delay_blocks),
            confidence: reward
                .map(|r| r.confidence.to_string())
                .unwrap_or_default(),
            reward_tokens: reward
                .map(|r| {
                    r.reward_tokens
                        .iter()
                        .map(|t| format!("{} {}", t.amount, t.token_symbol))
                        .collect::<Vec<_>>()
                        .join("; ")
                })
                .unwrap_or_default(),
        }
    }
}

pub fn render_pack_json(pack: &CorrelatedPack) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(pack)?)
}

/// Write packs as CSV with a header row
pub fn write_csv<W: Write>(packs: &[CorrelatedPack], writer: W) -> AppResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for pack in packs {
        csv_writer.serialize(PackRow::from(pack))?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn write_table<W: Write>(packs: &[CorrelatedPack], mut writer: W) -> AppResult<()> {
    writeln!(
        writer,
        "{:<68} {:<44} {:>10} {:>7} {:<7} TOKENS",
        "BUY TX", "BUYER", "BLOCK", "DELAY", "CONF"
    )?;
    for row in packs.iter().map(PackRow::from) {
        writeln!(
            writer,
            "{:<68} {:<44} {:>10} {:>7} {:<7} {}",
            row.buy_tx_hash,
            row.buyer,
            row.buy_block,
            row.delay_blocks
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            if row.confidence.is_empty() { "-" } else { row.confidence.as_str() },
            if row.reward_tokens.is_empty() { "not found" } else { row.reward_tokens.as_str() }
        )?;
    }
    Ok(())
}

fn write_to<W: Write>(report: &ScanReport, format: OutputFormat, mut writer: W) -> AppResult<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, report)?;
            writeln!(writer)?;
        }
        OutputFormat::Table => write_table(&report.packs, &mut writer)?,
        OutputFormat::Csv => write_csv(&report.packs, &mut writer)?,
    }
    Ok(())
}

/// Render a scan report to `path`, or stdout when no path is given
pub fn write_report(report: &ScanReport, format: OutputFormat, path: Option<&Path>) -> AppResult<()> {
    match path {
        Some(path) => write_to(report, format, File::create(path)?),
        None => write_to(report, format, io::stdout().lock()),
    }
}
