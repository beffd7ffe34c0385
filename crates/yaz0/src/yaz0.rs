//! Adds support for the Yaz0 compression format used for N64, GameCube, Wii, Wii U, and Switch.
//!
//! Because the Yaz0 format is so lightweight, this module is designed to not have any persistence.
//! It takes in data, and will return the de/compressed data contained inside.
//!
//! # Format
//! The Yaz0 format is part of the [Lempel-Ziv family of algorithms](https://w.wiki/F6n), which use
//! a "sliding window" to allow for copying repetitive data from previously in the output buffer.
//! The stream consists of lookback+length pairs, unique bytes to copy, and "flag bytes" which
//! determine which of the two operations to do.
//!
//! # Header
//! The header is as follows, in big-endian format:
//!
//! | Offset | Field | Type | Notes |
//! |--------|-------|------|-------|
//! | 0x0 | Magic number | u8\[4\] | Unique identifier ("Yaz0") to let us know we're reading a Yaz0-compressed file. |
//! | 0x4 | Output size  | u32     | The size of the decompressed data, needed for the output buffer. |
//! | 0x8 | Alignment    | u32     | Alignment hint for the output buffer. Non-zero starting with Wii U; this encoder writes 0. |
//! | 0xC | Padding      | u8\[4\] | Alignment to a 0x10 byte boundary. Always 0. |
//!
//! # Decompression
//! The decompression algorithm is as follows, ran in a loop until you write enough bytes to fill
//! the output buffer:
//!
//! * Read one byte from the input, which is 8 flag bits from high to low.
//! * For each flag bit, if it is a 1, copy one byte from the input to the output.
//! * If it is a 0, copy bytes from earlier in the output buffer:
//!     * Read two bytes from the input.
//!     * Get the first nibble (code >> 12). If it is 0, read one more byte and add 18 (0x12).
//!       Otherwise, add 2 to the nibble. Use that as the number of bytes to copy.
//!     * Add 1 to the lower nibbles (code & 0xFFF) and treat that as how far back in the buffer to
//!       read, from the current position.
//!     * **Note that the count can overlap with the destination, and needs to be copied one byte at
//!       a time for correct behavior.**
//!     * Copy that amount of bytes from the lookback position to the current position.
//!
//! # Compression
//! The encoder runs a greedy hash-table matcher: the three bytes at each position are hashed into
//! a 16384-entry table of prior positions, the single remembered candidate is checked against a
//! 4 KiB window, and the first valid match wins. Copies longer than a single code can hold are
//! split across several lookback codes. The output is deterministic for a given input and decodes
//! in any conforming Yaz0 decoder.
//!
//! # Usage
//! This module offers the following functionality:
//! ## Decompression
//! * [`decompress_from_path`](Yaz0::decompress_from_path): Provide a path, get decompressed data back
//! * [`decompress_from`](Yaz0::decompress_from): Provide the input data, get decompressed data back
//! * [`decompress`](Yaz0::decompress): Provide the input data and output buffer, run the
//!   decompression algorithm
//! ## Compression
//! * [`compress_from_path`](Yaz0::compress_from_path): Provide a path, get compressed data back
//! * [`compress_from`](Yaz0::compress_from): Provide the input data, get compressed data back
//! * [`compress`](Yaz0::compress): Provide the input data and output buffer, run the compression
//!   algorithm
//! ## Utilities
//! * [`read_header`](Yaz0::read_header): Returns the header information for a given Yaz0 file
//! * [`is_yaz0`](Yaz0::is_yaz0): Checks for the magic number
//! * [`peek_decompressed_size`](Yaz0::peek_decompressed_size): Reads the output size without
//!   touching the rest of the stream
//! * [`worst_possible_size`](Yaz0::worst_possible_size): Calculates the worst possible compression
//!   size for a given filesize

#[cfg(feature = "std")]
use std::path::Path;

use snafu::prelude::*;
#[cfg(feature = "std")]
use szskit_core::prelude::*;

use crate::algorithms::{MatchFinder, MAX_MATCH, MIN_MATCH};
#[cfg(not(feature = "std"))]
use crate::no_std::*;

/// Error conditions for when reading/writing Yaz0 files
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Thrown when trying to open a file or folder that doesn't exist.
    #[snafu(display("Unable to find file/folder!"))]
    NotFound,
    /// Thrown if reading/writing tries to go out of bounds.
    #[snafu(display("Unexpected End-Of-File!"))]
    EndOfFile,
    /// Thrown when unable to open a file or folder.
    #[snafu(display("No permissions to open file/folder!"))]
    PermissionDenied,
    /// Thrown if the declared decompressed size is zero, or larger than the output buffer.
    #[snafu(display("Invalid Size Encountered!"))]
    InvalidSize,
    /// Thrown if a lookback code points back past the start of the decompressed data.
    #[snafu(display("Invalid Lookback Encountered!"))]
    InvalidLookback,
    /// Thrown if the file is larger than u32::MAX since the header cannot store it.
    #[snafu(display("File too large to fit into u32::MAX!"))]
    FileTooBig,
    /// Thrown if the header contains a magic number other than "Yaz0".
    #[snafu(display("Invalid Magic! Expected {:?}.", Yaz0::MAGIC))]
    InvalidMagic,
}
type Result<T> = core::result::Result<T, Error>;

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    #[inline]
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::UnexpectedEof => Self::EndOfFile,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => panic!("Unexpected std::io::error! Something has gone horribly wrong"),
        }
    }
}

/// See the module [header](self#header) for more information.
pub struct Header {
    pub decompressed_size: u32,
    pub alignment: u32,
}

/// All supported Yaz0 compression algorithms
#[derive(Clone, Copy)]
#[non_exhaustive]
pub enum CompressionAlgo {
    /// Greedy hash-table matching, tuned for speed. See the
    /// [module documentation](self#compression).
    Greedy,
}

/// Utility struct for handling Yaz0 compression.
///
/// Yaz0 is stateless, and is merely a namespace for implementing certain traits.
///
/// See the [module documentation](self) for more information.
pub struct Yaz0;

impl Yaz0 {
    /// Unique identifier that tells us if we're reading a Yaz0-compressed file
    pub const MAGIC: [u8; 4] = *b"Yaz0";

    /// Checks whether the data starts with the Yaz0 magic number.
    ///
    /// # Examples
    /// ```
    /// # use szskit_yaz0::prelude::*;
    /// assert!(Yaz0::is_yaz0(b"Yaz0\x00\x00\x01\x00"));
    /// assert!(!Yaz0::is_yaz0(b"Yay0\x00\x00\x01\x00"));
    /// assert!(!Yaz0::is_yaz0(b"Ya"));
    /// ```
    #[must_use]
    #[inline]
    pub fn is_yaz0(data: &[u8]) -> bool {
        data.len() >= 4 && data[0..4] == Self::MAGIC
    }

    /// Reads the decompressed size out of a Yaz0 header, without touching the rest of the stream.
    ///
    /// Returns 0 if there are less than 8 bytes to read, or if the magic number doesn't match.
    ///
    /// # Examples
    /// ```
    /// # use szskit_yaz0::prelude::*;
    /// assert_eq!(Yaz0::peek_decompressed_size(b"Yaz0\x00\x00\x01\x00"), 0x100);
    /// assert_eq!(Yaz0::peek_decompressed_size(b"Yay0\x00\x00\x01\x00"), 0);
    /// ```
    #[must_use]
    #[inline]
    pub fn peek_decompressed_size(data: &[u8]) -> u32 {
        if data.len() >= 8 && data[0..4] == Self::MAGIC {
            u32::from_be_bytes([data[4], data[5], data[6], data[7]])
        } else {
            0
        }
    }

    /// Returns the metadata from a Yaz0 header.
    ///
    /// # Examples
    /// ```
    /// # use szskit_yaz0::prelude::*;
    /// let data = Yaz0::compress_from(&[0u8; 64], yaz0::CompressionAlgo::Greedy, 0)?;
    /// let header = Yaz0::read_header(&data)?;
    /// assert_eq!(header.decompressed_size, 64);
    /// assert_eq!(header.alignment, 0);
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if there are less than 0x10 bytes to read, or
    /// [`InvalidMagic`](Error::InvalidMagic) if the header does not match a Yaz0 file.
    #[inline]
    pub fn read_header(data: &[u8]) -> Result<Header> {
        // Make sure we have enough data to actually check a header
        ensure!(data.len() >= 0x10, EndOfFileSnafu);
        ensure!(data[0..4] == Self::MAGIC, InvalidMagicSnafu);

        let decompressed_size = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        //0 on GC/Wii files, an alignment hint on Wii U and Switch
        let alignment = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);

        Ok(Header { decompressed_size, alignment })
    }

    /// Calculates the filesize for the largest possible file that can be created with Yaz0
    /// compression.
    ///
    /// This consists of the 0x10 header, the length of the input file, all flag bits needed
    /// (rounded up), and one flag byte held open past the final token.
    #[must_use]
    #[inline]
    pub const fn worst_possible_size(input_len: usize) -> usize {
        0x10 + input_len + input_len.div_ceil(8) + 1
    }

    /// Loads a Yaz0 file and returns the decompressed data.
    ///
    /// # Examples
    /// ```no_run
    /// # use szskit_yaz0::prelude::*;
    /// let output = Yaz0::decompress_from_path("course.szs")?;
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns:
    /// * [`NotFound`](Error::NotFound) if the path does not exist
    /// * [`PermissionDenied`](Error::PermissionDenied) if unable to open the file
    /// * Any error [`decompress_from`](Self::decompress_from) can return
    #[cfg(feature = "std")]
    #[inline]
    pub fn decompress_from_path<P: AsRef<Path>>(path: P) -> Result<Box<[u8]>> {
        let input = std::fs::read(path)?;
        Self::decompress_from(&input)
    }

    /// Decompresses a Yaz0 file and returns the decompressed data.
    ///
    /// # Examples
    /// ```
    /// # use szskit_yaz0::prelude::*;
    /// let input = b"Hello, Hello, Hello, Goodbye!".repeat(8);
    /// let compressed = Yaz0::compress_from(&input, yaz0::CompressionAlgo::Greedy, 0)?;
    /// let output = Yaz0::decompress_from(&compressed)?;
    /// assert_eq!(*output, *input);
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns any error [`decompress`](Self::decompress) can return.
    #[inline]
    pub fn decompress_from(data: &[u8]) -> Result<Box<[u8]>> {
        let header = Self::read_header(data)?;

        //Allocate decompression buffer
        let mut output = vec![0u8; header.decompressed_size as usize].into_boxed_slice();

        //Perform the actual decompression
        Self::decompress(data, &mut output)?;

        //If we've gotten this far, output contains valid decompressed data
        Ok(output)
    }

    /// Decompresses a Yaz0 input file into the output buffer, and returns how many bytes were
    /// written.
    ///
    /// The buffer must be at least as large as the size declared in the header; exactly that many
    /// bytes are written. Trailing flag bits in the final group are not consumed, so a stream may
    /// end mid-group once the declared byte count is produced.
    ///
    /// # Examples
    /// ```
    /// # use szskit_yaz0::prelude::*;
    /// let input = b"Hello, Hello, Hello, Goodbye!".repeat(8);
    /// let compressed = Yaz0::compress_from(&input, yaz0::CompressionAlgo::Greedy, 0)?;
    ///
    /// let header = Yaz0::read_header(&compressed)?;
    /// let mut output = vec![0u8; header.decompressed_size as usize];
    /// let written = Yaz0::decompress(&compressed, &mut output)?;
    /// assert_eq!(written, input.len());
    /// assert_eq!(output, input);
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns:
    /// * [`EndOfFile`](Error::EndOfFile) if the header is short, or the stream ends mid-token
    /// * [`InvalidMagic`](Error::InvalidMagic) if the header does not match a Yaz0 file
    /// * [`InvalidSize`](Error::InvalidSize) if the declared size is zero, larger than the output
    ///   buffer, or a copy would run past it
    /// * [`InvalidLookback`](Error::InvalidLookback) if a lookback points before the output start
    pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize> {
        let header = Self::read_header(input)?;
        let declared = header.decompressed_size as usize;
        ensure!(declared != 0 && declared <= output.len(), InvalidSizeSnafu);

        let mut input_pos: usize = 0x10;
        let mut written: usize = 0;
        let mut flags: u8 = 0;
        let mut bits_left: u8 = 0;

        while written < declared {
            //Check if we need a new flag byte
            if bits_left == 0 {
                ensure!(input_pos < input.len(), EndOfFileSnafu);
                flags = input[input_pos];
                input_pos += 1;
                bits_left = 8;
            }

            //Check what kind of copy we're doing
            if (flags & 0x80) != 0 {
                //Copy one byte from the input stream
                ensure!(input_pos < input.len(), EndOfFileSnafu);
                output[written] = input[input_pos];
                input_pos += 1;
                written += 1;
            } else {
                //Copy from previously in the output buffer
                ensure!(input_pos + 2 <= input.len(), EndOfFileSnafu);
                let code = u16::from_be_bytes([input[input_pos], input[input_pos + 1]]);
                input_pos += 2;

                //Extract the lookback information from the code, reading another byte for the
                //size if the upper nibble signals a long copy
                let distance = usize::from(code & 0xFFF) + 1;
                let size = match code >> 12 {
                    0 => {
                        ensure!(input_pos < input.len(), EndOfFileSnafu);
                        let value = input[input_pos];
                        input_pos += 1;
                        usize::from(value) + 0x12
                    }
                    n => usize::from(n) + 2,
                };

                ensure!(distance <= written, InvalidLookbackSnafu);
                ensure!(size <= declared - written, InvalidSizeSnafu);

                //The source can overlap the destination, so this has to stay a bytewise copy
                for _ in 0..size {
                    output[written] = output[written - distance];
                    written += 1;
                }
            }

            flags <<= 1;
            bits_left -= 1;
        }

        Ok(written)
    }

    /// Loads a file and returns the Yaz0-compressed data.
    ///
    /// # Examples
    /// ```no_run
    /// # use szskit_yaz0::prelude::*;
    /// let output = Yaz0::compress_from_path("course.arc", yaz0::CompressionAlgo::Greedy, 0)?;
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    ///
    /// # Warnings
    /// Alignment should be zero for N64, GameCube, and Wii, and should be non-zero on Wii U and
    /// Switch. This encoder currently always writes zero; see
    /// [`compress_from`](Self::compress_from).
    ///
    /// # Errors
    /// Returns:
    /// * [`NotFound`](Error::NotFound) if the path does not exist
    /// * [`PermissionDenied`](Error::PermissionDenied) if unable to open the file
    /// * [`FileTooBig`](Error::FileTooBig) if too large for the filesize to be stored in the header
    #[cfg(feature = "std")]
    #[inline]
    pub fn compress_from_path<P>(path: P, algo: CompressionAlgo, align: u32) -> Result<Box<[u8]>>
    where
        P: AsRef<Path>,
    {
        let input = std::fs::read(path)?;
        Self::compress_from(&input, algo, align)
    }

    /// Compresses the input data using a given compression algorithm.
    ///
    /// # Examples
    /// ```
    /// # use szskit_yaz0::prelude::*;
    /// let input = [0x42u8; 4096];
    /// let output = Yaz0::compress_from(&input, yaz0::CompressionAlgo::Greedy, 0)?;
    /// assert!(output.len() < input.len());
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    ///
    /// # Warnings
    /// The alignment parameter is accepted for Wii U/Switch-style headers but not written yet;
    /// the reserved header bytes always end up zero, which every known decoder accepts.
    ///
    /// # Errors
    /// Returns [`FileTooBig`](Error::FileTooBig) if the input is too large for the filesize to be
    /// stored in the header.
    #[inline]
    pub fn compress_from(input: &[u8], algo: CompressionAlgo, _align: u32) -> Result<Box<[u8]>> {
        ensure!(u32::try_from(input.len()).is_ok(), FileTooBigSnafu);

        //Assume 0x10 header, every byte is a literal, and include flag bytes (rounded up)
        let mut output = vec![0u8; Self::worst_possible_size(input.len())];

        let output_size = match algo {
            CompressionAlgo::Greedy => Self::compress(input, &mut output),
        };
        ensure!(output_size != 0, InvalidSizeSnafu);

        output.truncate(output_size);

        Ok(output.into_boxed_slice())
    }

    /// Compresses the input into the output buffer, and returns the size of the compressed data.
    ///
    /// The output buffer must hold at least
    /// [`worst_possible_size(input.len())`](Self::worst_possible_size) bytes; if it is too small,
    /// or the input length does not fit in the header's u32, 0 is returned and the buffer contents
    /// are unspecified. No other failure exists: any well-sized input compresses.
    ///
    /// # Examples
    /// ```
    /// # use szskit_yaz0::prelude::*;
    /// let input = [0x42u8; 256];
    /// let mut output = vec![0u8; Yaz0::worst_possible_size(input.len())];
    /// let output_size = Yaz0::compress(&input, &mut output);
    /// assert!(output_size != 0);
    /// output.truncate(output_size);
    ///
    /// let roundtrip = Yaz0::decompress_from(&output)?;
    /// assert_eq!(*roundtrip, input[..]);
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    pub fn compress(input: &[u8], output: &mut [u8]) -> usize {
        if u32::try_from(input.len()).is_err()
            || output.len() < Self::worst_possible_size(input.len())
        {
            return 0;
        }

        output[0..4].copy_from_slice(&Self::MAGIC);
        output[4..8].copy_from_slice(&u32::to_be_bytes(input.len() as u32));
        //No alignment on anything before Wii U, so the rest of the header stays zero
        output[8..16].fill(0);

        let mut writer = TokenWriter::new(output, 0x10);
        let mut finder = MatchFinder::new();

        //The first two bytes can never be a lookback target, and stopping 13 bytes short keeps
        //the finder's reads in bounds; whatever is left over is flushed as literals below
        let ip_limit = input.len().saturating_sub(13);
        let mut anchor: usize = 0;
        let mut ip: usize = 2;

        while ip < ip_limit {
            match finder.find(input, ip) {
                Some((distance, length)) => {
                    //Write out everything since the last match, then the lookback itself
                    writer.emit_literals(&input[anchor..ip]);
                    writer.emit_match(length, distance);
                    ip += length;
                    anchor = ip;

                    //Prime the table so later data can reference the match boundary
                    finder.insert(input, ip);
                    finder.insert(input, ip + 1);
                }
                None => ip += 1,
            }
        }

        //Flush the remaining bytes, including the reserved tail, as literals
        writer.emit_literals(&input[anchor..]);
        writer.finish()
    }
}

/// Incremental writer for Yaz0's flag-grouped token stream.
///
/// A flag byte is reserved (zeroed) the moment a group opens, then filled in bit by bit as the
/// following eight tokens are emitted. `shift` marks the bit the next token will occupy; when it
/// underflows, the next flag byte is reserved immediately, so one group is always open.
struct TokenWriter<'a> {
    output: &'a mut [u8],
    /// Next write position
    pos: usize,
    /// Position of the flag byte for the currently open group
    flag_pos: usize,
    /// Bit of the flag byte the next token will occupy
    shift: u8,
}

impl<'a> TokenWriter<'a> {
    fn new(output: &'a mut [u8], start: usize) -> Self {
        output[start] = 0;
        Self { output, pos: start + 1, flag_pos: start, shift: 0x80 }
    }

    /// Reserves a fresh flag byte at the current position and aims the mask at its high bit.
    fn open_group(&mut self) {
        self.output[self.pos] = 0;
        self.flag_pos = self.pos;
        self.pos += 1;
        self.shift = 0x80;
    }

    /// Consumes one flag bit for a lookback token, opening a new group on underflow.
    fn advance_group(&mut self) {
        self.shift >>= 1;
        if self.shift == 0 {
            self.open_group();
        }
    }

    /// Copies `src` to the output as literals, setting one flag bit per byte.
    fn emit_literals(&mut self, src: &[u8]) {
        let mut offset = 0;

        //Top up the group currently being filled
        if self.shift != 0x80 {
            while offset < src.len() {
                self.output[self.flag_pos] |= self.shift;
                self.output[self.pos] = src[offset];
                self.pos += 1;
                offset += 1;
                self.shift >>= 1;
                if self.shift == 0 {
                    self.open_group();
                    break;
                }
            }
            if offset == src.len() {
                return;
            }
        }

        //Whole groups of eight literals at a time
        while src.len() - offset >= 8 {
            self.output[self.flag_pos] = 0xFF;
            self.output[self.pos..self.pos + 8].copy_from_slice(&src[offset..offset + 8]);
            self.pos += 8;
            offset += 8;
            self.open_group();
        }

        //One to seven leftovers fill the high bits of the fresh group
        let tail = src.len() - offset;
        if tail > 0 {
            self.output[self.flag_pos] = 0xFF << (8 - tail);
            self.output[self.pos..self.pos + tail].copy_from_slice(&src[offset..]);
            self.pos += tail;
            self.shift = 0x80 >> tail;
        }
    }

    /// Emits a lookback copy, splitting it over several codes when it exceeds what a single
    /// long-form code can hold.
    fn emit_match(&mut self, mut length: usize, distance: usize) {
        //Every chunk but the last is maximal, except that the tail left behind must stay
        //at least the minimum match length so it remains encodable
        while length > MAX_MATCH {
            let chunk = if length - MAX_MATCH < MIN_MATCH { MAX_MATCH - 2 } else { MAX_MATCH };
            self.put_long(chunk, distance);
            length -= chunk;
        }

        //The final chunk uses the two-byte form whenever its length fits the upper nibble
        if length >= 0x12 {
            self.put_long(length, distance);
        } else {
            self.put_short(length, distance);
        }
    }

    /// Two-byte code: upper nibble holds `length - 2` (non-zero), the rest is `distance - 1`.
    fn put_short(&mut self, length: usize, distance: usize) {
        let code = distance - 1;
        self.output[self.pos] = (((length - 2) << 4) | (code >> 8)) as u8;
        self.output[self.pos + 1] = code as u8;
        self.pos += 2;
        self.advance_group();
    }

    /// Three-byte code: zero upper nibble, `distance - 1`, then `length - 0x12` in the third byte.
    fn put_long(&mut self, length: usize, distance: usize) {
        let code = distance - 1;
        self.output[self.pos] = (code >> 8) as u8;
        self.output[self.pos + 1] = code as u8;
        self.output[self.pos + 2] = (length - 0x12) as u8;
        self.pos += 3;
        self.advance_group();
    }

    /// Total bytes written, including the flag byte of the group still open.
    fn finish(self) -> usize {
        self.pos
    }
}

#[cfg(feature = "std")]
impl FileIdentifier for Yaz0 {
    fn identify(data: &[u8]) -> Option<FileInfo> {
        Self::read_header(data).ok().map(|header| {
            let info = format!(
                "Nintendo Yaz0-compressed file, decompressed size: {}",
                util::format_size(header.decompressed_size as usize)
            );
            FileInfo::new(info, None)
        })
    }

    fn identify_deep(data: &[u8]) -> Option<FileInfo> {
        Self::read_header(data).ok().map(|header| {
            let info = format!(
                "Nintendo Yaz0-compressed file, decompressed size: {}",
                util::format_size(header.decompressed_size as usize)
            );
            let payload = Self::decompress_from(data).ok();
            FileInfo::new(info, payload)
        })
    }
}
