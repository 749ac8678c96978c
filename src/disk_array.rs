//! The capability interface the engine needs from its enclosing disk array.
//!
//! `DiskArray` stands in for the placement, scheduling, and physical I/O
//! machinery that lives above this engine. The engine only ever calls the
//! five methods below; everything else about how symbols land on physical
//! devices is the array's business.

/// Opaque identifier for a precomputed combination of up to three erased
/// symbol positions.
pub type ErasureSetId = u32;

/// Identifies a stripe within the array.
pub type StripeId = u64;

/// A disk array capable of reading and writing stripe units and reporting
/// which symbol positions are currently erased for a given erasure set.
///
/// Implemented synchronously and deliberately so: the engine is called from
/// a thread pool the array already owns, and adding `async` here would only
/// push an executor dependency onto a component that does no I/O waiting of
/// its own (every await point would belong to the array's implementation,
/// not this trait).
pub trait DiskArray {
    /// Read `count` consecutive subsymbols of `symbol_pos` within `stripe`
    /// into `out`, starting at subsymbol `sub_start`. Returns `false` on
    /// I/O failure. Precondition: `symbol_pos` is not erased for `id`.
    fn read_stripe_unit(
        &self,
        stripe: StripeId,
        id: ErasureSetId,
        symbol_pos: u32,
        sub_start: u32,
        out: &mut [u8],
    ) -> bool;

    /// Write `data` as `count` consecutive subsymbols of `symbol_pos`
    /// within `stripe`, starting at subsymbol `sub_start`. Returns `false`
    /// on I/O failure.
    fn write_stripe_unit(
        &self,
        stripe: StripeId,
        id: ErasureSetId,
        symbol_pos: u32,
        sub_start: u32,
        data: &[u8],
    ) -> bool;

    /// Whether `symbol_pos` is erased under erasure set `id`.
    fn is_erased(&self, id: ErasureSetId, symbol_pos: u32) -> bool;

    /// The `k`-th erased position (`k` in `0..3`) under erasure set `id`,
    /// or `None` if there is no `k`-th erasure.
    fn get_erased_position(&self, id: ErasureSetId, k: u32) -> Option<u32>;

    /// Number of erased positions under erasure set `id` (`0..=3`).
    fn get_num_of_erasures(&self, id: ErasureSetId) -> u32;
}
