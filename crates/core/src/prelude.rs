//! Convenient re-exports of commonly used data types, designed to make crate usage painless.
//!
//! The contents of this module can be used by including the following in any module:
//! ```
//! use szskit_core::prelude::*;
//! ```

#[cfg(feature = "std")]
pub use crate::identify::*;

pub mod util {
    pub use crate::util::format_size;
}

#[cfg(all(feature = "time", feature = "std"))]
pub mod time {
    pub use crate::time::*;
}
