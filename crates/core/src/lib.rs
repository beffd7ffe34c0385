//! This crate is used as a utilities library for common functionality across
//! [SZSKit](https://crates.io/crates/szskit) modules.
//!
//! By default, this crate only enables modules which do not have any crate dependencies.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
mod no_std {
    extern crate alloc;
    pub use alloc::format;
    pub use alloc::string::String;
}

pub mod prelude;

// Enable any modules that don't have dependencies by default
pub mod util;

#[cfg(feature = "std")]
pub mod identify;

// Optional modules
#[cfg(feature = "time")]
pub mod time;
