//! sufflate CLI
//!
//! Compress, decompress and inspect raw DEFLATE (RFC 1951) streams.

mod commands;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use commands::{CompressOptions, cmd_compress, cmd_decompress, cmd_inspect};
use std::path::PathBuf;
use sufflate_deflate::config::DEFAULT_CHUNK_SIZE;

#[derive(Parser)]
#[command(name = "sufflate")]
#[command(author, version, about = "Raw DEFLATE codec with a suffix-array match finder")]
#[command(long_about = "
sufflate reads and writes raw DEFLATE streams (no zlib or gzip framing).

Examples:
  sufflate compress notes.txt notes.deflate
  sufflate compress -l 9 --chunk-size 131072 --progress big.log big.deflate
  sufflate decompress notes.deflate notes.txt
  sufflate inspect notes.deflate
  sufflate inspect --json notes.deflate
")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a raw DEFLATE stream
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Compression level (0 = store, 9 = best)
        #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(0..=9))]
        level: u8,

        /// Bytes per block handed to the match finder
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decompress a raw DEFLATE stream
    #[command(alias = "d")]
    Decompress {
        /// Compressed file
        input: PathBuf,

        /// Output file
        output: PathBuf,
    },

    /// List the blocks of a raw DEFLATE stream
    #[command(alias = "i")]
    Inspect {
        /// Compressed file
        input: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            level,
            chunk_size,
            progress,
        } => cmd_compress(
            &input,
            &output,
            &CompressOptions {
                level,
                chunk_size,
                progress,
            },
        ),
        Commands::Decompress { input, output } => cmd_decompress(&input, &output),
        Commands::Inspect { input, json } => cmd_inspect(&input, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
