//! Row-Diagonal-Anti-diagonal Triple Parity (RTP) erasure coding.
//!
//! An XOR-only erasure code for striped disk arrays: `k` data symbols plus
//! row, diagonal, and anti-diagonal parity symbols, tolerating up to three
//! simultaneous symbol erasures.
//!
//! # Architecture
//!
//! ```text
//! Geometry -> IO Adapter -> Encoder / Decoder / Updater / Checker
//! ```
//!
//! [`Geometry`](geometry::Geometry) owns the pure index math (`p`, the
//! diagonal/anti-diagonal maps); the `io` module layers typed symbol and
//! subsymbol reads/writes over a caller-supplied [`DiskArray`](disk_array::DiskArray);
//! [`encoder`], [`decoder`], [`updater`], and [`checker`] implement the five
//! upward operations. [`processor::RtpProcessor`] ties these together behind
//! a small, attach-once API.
//!
//! # Modules
//!
//! - [`buffer`] - aligned, move-only scratch buffers for the XOR hot path
//! - [`checker`] - `CheckCodeword`
//! - [`decoder`] - `DecodeDataSymbols` / `DecodeDataSubsymbols`
//! - [`diag`] - shared diagonal/anti-diagonal accumulation helpers
//! - [`disk_array`] - the `DiskArray` capability interface
//! - [`encoder`] - `EncodeStripe`
//! - [`error`] - error types
//! - [`geometry`] - code geometry and index math
//! - [`gf2`] - GF(2) linear algebra for the triple-erasure decode branch
//! - [`io`] - typed symbol/subsymbol I/O over `DiskArray`
//! - [`mem_array`] - in-memory `DiskArray` test double
//! - [`params`] - construction-time configuration
//! - [`processor`] - `RtpProcessor` / `Attached`
//! - [`scratch`] - per-thread scratch pool reserved at `attach`
//! - [`updater`] - `UpdateInformationSymbols`

pub mod buffer;
pub mod checker;
pub mod decoder;
pub mod diag;
pub mod disk_array;
pub mod encoder;
pub mod error;
pub mod geometry;
pub mod gf2;
pub mod io;
pub mod mem_array;
pub mod params;
pub mod processor;
pub mod scratch;
pub mod updater;

pub use disk_array::DiskArray;
pub use error::{Result, RtpError};
pub use geometry::Geometry;
pub use params::RtpParams;
pub use processor::{Attached, RtpProcessor};
pub use updater::EncodingStrategy;
