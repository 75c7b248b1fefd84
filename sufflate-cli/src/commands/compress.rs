//! Compress command implementation.

use crate::utils::{create_progress_bar, format_ratio};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;
use sufflate_deflate::{DeflateConfig, Deflater};

/// Read size per progress update.
const READ_BUFFER: usize = 64 * 1024;

/// Options for the compress command.
pub struct CompressOptions {
    pub level: u8,
    pub chunk_size: usize,
    pub progress: bool,
}

pub fn cmd_compress(
    input: &Path,
    output: &Path,
    options: &CompressOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let input_len = std::fs::metadata(input)?.len();
    let mut reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);

    let config = DeflateConfig::with_level(options.level).with_chunk_size(options.chunk_size);
    info!(
        "compressing {} at level {} ({} byte chunks, {} candidates)",
        input.display(),
        options.level,
        config.chunk_size,
        config.max_candidates
    );
    let mut deflater = Deflater::with_config(writer, config);

    let pb = create_progress_bar(input_len, options.progress);
    let mut buf = vec![0u8; READ_BUFFER];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        deflater.write(&buf[..n])?;
        pb.inc(n as u64);
    }

    let total_in = deflater.total_in();
    let writer = deflater.finish()?;
    writer.into_inner().map_err(|e| e.into_error())?;
    pb.finish_and_clear();

    let total_out = std::fs::metadata(output)?.len();
    println!(
        "{} -> {}: {} -> {} bytes ({})",
        input.display(),
        output.display(),
        total_in,
        total_out,
        format_ratio(total_in, total_out)
    );
    Ok(())
}
