use argp::FromArgs;
use szskit_yaz0::prelude::*;

/// Top-level command
#[derive(FromArgs, PartialEq, Debug)]
#[argp(description = "Yaz0 (SZS) compression and decompression.")]
pub struct SzsKit {
    #[argp(switch, short = 'c')]
    #[argp(description = "Compress the input file using Yaz0")]
    pub compress: bool,

    #[argp(switch, short = 'd')]
    #[argp(description = "Decompress a Yaz0-compressed file")]
    pub decompress: bool,

    #[argp(option, short = 'o')]
    #[argp(description = "Output file to write to (inferred from the input path if absent)")]
    pub output: Option<String>,

    #[argp(option, default = "0")]
    #[argp(
        description = "Logging level (0 = Off, 1 = Error, 2 = Warn, 3 = Info, 4 = Debug, 5 = Trace)"
    )]
    pub verbose: usize,

    #[argp(switch, short = 'v')]
    #[argp(description = "Print version information")]
    pub version: bool,

    //We always need an input file, output file can be optional with a default
    #[argp(positional)]
    #[argp(description = "Input file to be processed")]
    pub input: Option<String>,
}

/// Which direction the tool runs in.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Mode {
    Compress,
    Decompress,
}

/// Filename suffixes that imply an already-compressed input.
const COMPRESSED_SUFFIXES: [&str; 3] = [".yaz0", ".szs", ".carc"];

/// Picks a mode from the input filename, falling back to sniffing the magic number.
pub fn detect_mode(path: &str, data: &[u8]) -> Mode {
    let lowered = path.to_ascii_lowercase();
    if COMPRESSED_SUFFIXES.iter().any(|suffix| lowered.ends_with(suffix)) || Yaz0::is_yaz0(data) {
        Mode::Decompress
    } else {
        Mode::Compress
    }
}

/// Output path for compression: the input path with `.yaz0` appended.
pub fn compressed_path(input: &str) -> String {
    format!("{input}.yaz0")
}

/// Output path for decompression, based on the input suffix (case-insensitive): `.yaz0` and
/// `.szs` are stripped, `.carc` becomes `.arc`, and anything else gets `.bin` appended.
pub fn decompressed_path(input: &str) -> String {
    let lowered = input.to_ascii_lowercase();
    if lowered.ends_with(".yaz0") {
        input[..input.len() - 5].to_string()
    } else if lowered.ends_with(".szs") {
        input[..input.len() - 4].to_string()
    } else if lowered.ends_with(".carc") {
        format!("{}.arc", &input[..input.len() - 5])
    } else {
        format!("{input}.bin")
    }
}
