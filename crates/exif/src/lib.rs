//! Capture-date resolution for image files.
//!
//! Answers one question: *when was this photo taken?* The embedded EXIF
//! timestamp is authoritative when present and well-formed; everything else
//! falls back to the file's modification time. Callers only learn which of
//! the two happened via [`DateSource`], never through an error.
//!
//! This crate is deliberately synchronous. Reading a few KiB of EXIF headers
//! is blocking-pool work, and the caller decides where that pool is.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let date = shoebox_exif::resolve("/photos/dump/IMG_0042.CR2")?;
//! println!("taken {:?} ({:?})", date.taken, date.source);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod format;
mod resolve;

pub use crate::format::Format;
pub use crate::resolve::{CaptureDate, DateSource, resolve};
