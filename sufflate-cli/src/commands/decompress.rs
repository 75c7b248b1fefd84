//! Decompress command implementation.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use sufflate_deflate::Decoder;

pub fn cmd_decompress(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);

    let mut decoder = Decoder::new(reader);
    let written = std::io::copy(&mut decoder, &mut writer)?;
    writer.flush()?;

    println!(
        "{} -> {}: {} bytes in {} blocks",
        input.display(),
        output.display(),
        written,
        decoder.block_summaries().len()
    );
    Ok(())
}
