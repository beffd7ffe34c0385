#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::io::prelude::*;

use anyhow::{bail, Result};
use env_logger::Builder;
use log::{Level, LevelFilter};
use owo_colors::OwoColorize;
use szskit_core::prelude::*;
use szskit_yaz0::prelude::*;

mod menu;
use menu::Mode;

fn color_level(level: Level) -> String {
    match level {
        Level::Error => level.red().to_string(),
        Level::Warn => level.yellow().to_string(),
        Level::Info => level.green().to_string(),
        Level::Debug => level.blue().to_string(),
        Level::Trace => level.purple().to_string(),
    }
}

const fn level_filter(verbose: usize) -> LevelFilter {
    match verbose {
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        5 => LevelFilter::Trace,
        //default to off
        _ => LevelFilter::Off,
    }
}

fn main() -> Result<()> {
    //Parse command line input
    let args: menu::SzsKit = argp::parse_args_or_exit(argp::DEFAULT);

    if args.version {
        println!("szskit {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Build up a logger with custom formatting and set it to the verbosity from the command line args
    if args.verbose != 0 {
        Builder::new()
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{}] {} {}",
                    szskit_core::time::current_time(), // Timestamp from the core crate
                    color_level(record.level()),       // Colored log level
                    record.args()                      // Log message
                )
            })
            .filter(None, level_filter(args.verbose))
            .init();
    }

    let Some(input) = args.input else {
        bail!("Missing input file! Run with --help for usage.");
    };
    if args.compress && args.decompress {
        bail!("Please select at most one of -c and -d!");
    }

    let data = std::fs::read(&input)?;

    let mode = if args.compress {
        Mode::Compress
    } else if args.decompress {
        Mode::Decompress
    } else {
        menu::detect_mode(&input, &data)
    };

    match mode {
        Mode::Decompress => {
            log::info!("Decompressing file {}", input);
            if let Some(identity) = Yaz0::identify(&data) {
                log::info!("{}", identity.info);
            }
            let output_data = Yaz0::decompress_from(&data)?;
            let output = args.output.unwrap_or_else(|| menu::decompressed_path(&input));
            println!(
                "{} ({}) -> {} ({})",
                input,
                util::format_size(data.len()),
                output,
                util::format_size(output_data.len())
            );
            log::info!("Writing file {}", output);
            std::fs::write(output, output_data)?;
        }
        Mode::Compress => {
            log::info!("Compressing file {}", input);
            let output_data = Yaz0::compress_from(&data, yaz0::CompressionAlgo::Greedy, 0)?;
            let output = args.output.unwrap_or_else(|| menu::compressed_path(&input));
            let ratio = if data.is_empty() {
                100.0
            } else {
                output_data.len() as f64 * 100.0 / data.len() as f64
            };
            println!(
                "{} ({}) -> {} ({}, {:.2}%)",
                input,
                util::format_size(data.len()),
                output,
                util::format_size(output_data.len()),
                ratio
            );
            log::info!("Writing file {}", output);
            std::fs::write(output, output_data)?;
        }
    }
    Ok(())
}
