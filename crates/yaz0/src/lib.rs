//! This crate contains the [SZSKit](https://crates.io/crates/szskit) module that adds support
//! for the Yaz0 compression format shared across Nintendo systems from the N64 onwards.

#![deny(unused_crate_dependencies)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
mod no_std {
    extern crate alloc;
    pub use alloc::boxed::Box;
    pub use alloc::vec;
}

// All public modules
pub mod yaz0;

// For internal use only right now
mod algorithms;

// Prelude, for convenience
pub mod prelude;
