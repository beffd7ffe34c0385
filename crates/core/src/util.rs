//! Utility functions that can't be grouped into any other module.

#[cfg(not(feature = "std"))]
use crate::no_std::*;

/// Converts a byte count to a human-readable format.
///
/// The length is divided down until it fits its largest unit (bytes, KB, MB, GB, etc) and
/// formatted with two decimal places.
///
/// # Warnings
/// This function uses f64, which will lose precision for very large lengths, but it still rounds
/// to a close-enough value for display purposes.
#[must_use]
pub fn format_size(length: usize) -> String {
    const UNITS: [&str; 7] = ["bytes", "KB", "MB", "GB", "TB", "PB", "EB"];
    let mut size = length as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
