//! Creation time extraction for MP4/QuickTime files.
//!
//! This crate provides:
//! - Random-access byte sources: [`source`] module
//! - Backward, bounded marker search: [`scan`] module
//! - Movie header decoding: [`mvhd`] module
//! - Mac HFS+ epoch conversions: [`time`] module
//!
//! The movie header usually sits in the `moov` box, which many writers place
//! at the end of the file. The lookup therefore reads the source backwards in
//! chunks and never loads more than the configured byte budget.
//!
//! # Examples
//!
//! ```no_run
//! use mp4_creation_time::{FileSource, ScanOptions, get_creation_time};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let source = FileSource::open("/tmp/video.mp4")?;
//! let options = ScanOptions::default().with_max_bytes(16 * 1024 * 1024);
//!
//! match get_creation_time(&source, &options)? {
//!     Some(created) => println!("created at {created}"),
//!     None => println!("no creation time"),
//! }
//! # Ok(())
//! # }
//! ```

// Core error types used throughout the crate
pub mod error;

// Scan configuration
pub mod options;

// Byte range sources
pub mod source;

// Backward marker search
pub mod scan;

// Movie header box decoding
pub mod mvhd;

// Timestamp conversions
pub mod time;

// Creation time lookup
mod creation;

pub use error::{Error, Result};
pub use options::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_BYTES, ScanOptions};
pub use source::{AsyncByteRangeSource, AsyncFileSource, ByteRangeSource, FileSource};

pub use creation::{
    creation_datetime, creation_datetime_async, find_movie_header, find_movie_header_async,
    get_creation_time, get_creation_time_async,
};
pub use mvhd::{MovieHeader, Version};
