//! Error types for the RTP erasure-coding engine.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, RtpError>;

/// Errors that can occur while constructing or driving an [`RtpProcessor`](crate::processor::RtpProcessor).
#[derive(Error, Debug)]
pub enum RtpError {
    /// `code_dimension + 1` must be prime; the RDP/RTP algebra has no
    /// fallback geometry for a composite `p`.
    #[error("code dimension {code_dimension} yields p = {p}, which is not prime")]
    NonPrimeDimension { code_dimension: u32, p: u32 },

    /// The configured stripe unit size can't back a symbol.
    #[error("stripe unit size must be non-zero")]
    ZeroStripeUnitSize,

    /// More than three positions were marked erased for a single call; the
    /// codeword can tolerate at most three simultaneous losses.
    #[error("erasure set has {count} erasures, at most 3 are correctable")]
    TooManyErasures { count: usize },

    /// `check_codeword` could not read a symbol it needed; the underlying
    /// `DiskArray` API has no way to distinguish "read failed" from a
    /// mismatch, so this case gets its own error instead of folding into
    /// a `false` verification result.
    #[error("check_codeword read failed for stripe {stripe}, symbol {symbol}")]
    CheckReadFailed { stripe: u64, symbol: u32 },

    /// A decode or update range referenced a symbol or subsymbol index
    /// outside the code's geometry.
    #[error("index out of range: {what} = {value}, bound = {bound}")]
    IndexOutOfRange {
        what: &'static str,
        value: usize,
        bound: usize,
    },

    /// Allocation of an aligned scratch buffer failed.
    #[error("aligned allocation failed for size {size}, align {align}")]
    AllocationFailed { size: usize, align: usize },

    /// A `RtpParams` config file could not be read or parsed.
    #[error("failed to load params from {path}: {reason}")]
    ConfigLoad { path: String, reason: String },
}
