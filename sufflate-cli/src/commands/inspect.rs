//! Inspect command implementation.

use crate::utils::format_ratio;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use sufflate_deflate::{BlockSummary, Decoder};

/// JSON serializable block data.
#[derive(Debug, Serialize, Deserialize)]
struct BlockJson {
    index: usize,
    kind: String,
    is_final: bool,
    output_len: u64,
    bit_len: u64,
}

impl BlockJson {
    fn from_summary(index: usize, summary: &BlockSummary) -> Self {
        Self {
            index,
            kind: summary.kind.as_str().to_string(),
            is_final: summary.is_final,
            output_len: summary.output_len,
            bit_len: summary.bit_len,
        }
    }
}

/// JSON output for a stream.
#[derive(Debug, Serialize, Deserialize)]
struct StreamJson {
    file: String,
    compressed_size: u64,
    uncompressed_size: u64,
    blocks: Vec<BlockJson>,
}

pub fn cmd_inspect(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let compressed_size = std::fs::metadata(input)?.len();
    let mut decoder = Decoder::new(BufReader::new(File::open(input)?));
    let uncompressed_size = std::io::copy(&mut decoder, &mut std::io::sink())?;
    let summaries = decoder.block_summaries();

    if json {
        let report = StreamJson {
            file: input.display().to_string(),
            compressed_size,
            uncompressed_size,
            blocks: summaries
                .iter()
                .enumerate()
                .map(|(i, s)| BlockJson::from_summary(i, s))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Stream: {}", input.display());
    println!(
        "  {} -> {} bytes ({})",
        compressed_size,
        uncompressed_size,
        format_ratio(uncompressed_size, compressed_size)
    );
    println!();
    println!("{:>6}  {:<8} {:>5} {:>12} {:>12}", "Block", "Type", "Final", "Output", "Bits");
    println!("{}", "-".repeat(48));
    for (i, summary) in summaries.iter().enumerate() {
        println!(
            "{:>6}  {:<8} {:>5} {:>12} {:>12}",
            i,
            summary.kind,
            if summary.is_final { "yes" } else { "" },
            summary.output_len,
            summary.bit_len
        );
    }
    Ok(())
}
