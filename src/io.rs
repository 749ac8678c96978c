//! Typed symbol/subsymbol read and write, layered over [`DiskArray`].

use crate::disk_array::{DiskArray, ErasureSetId, StripeId};
use crate::geometry::Geometry;

/// Read all `stripe_units_per_symbol` subsymbols of `symbol_pos` into `out`.
///
/// Precondition: `symbol_pos` is not erased under `id`. Callers (Encoder,
/// Decoder) are responsible for checking this before calling.
pub fn read_symbol<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    stripe: StripeId,
    id: ErasureSetId,
    symbol_pos: u32,
    out: &mut [u8],
) -> bool {
    debug_assert_eq!(out.len(), geo.symbol_size());
    array.read_stripe_unit(stripe, id, symbol_pos, 0, out)
}

/// Read `count` subsymbols of `symbol_pos`, starting at `sub_start`.
pub fn read_subsymbols<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    stripe: StripeId,
    id: ErasureSetId,
    symbol_pos: u32,
    sub_start: u32,
    count: u32,
    out: &mut [u8],
) -> bool {
    debug_assert_eq!(out.len(), count as usize * geo.stripe_unit_size);
    array.read_stripe_unit(stripe, id, symbol_pos, sub_start, out)
}

/// Write all `stripe_units_per_symbol` subsymbols of `symbol_pos`.
pub fn write_symbol<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    stripe: StripeId,
    id: ErasureSetId,
    symbol_pos: u32,
    data: &[u8],
) -> bool {
    debug_assert_eq!(data.len(), geo.symbol_size());
    array.write_stripe_unit(stripe, id, symbol_pos, 0, data)
}

/// Write `count` subsymbols of `symbol_pos`, starting at `sub_start`.
pub fn write_subsymbols<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    stripe: StripeId,
    id: ErasureSetId,
    symbol_pos: u32,
    sub_start: u32,
    count: u32,
    data: &[u8],
) -> bool {
    debug_assert_eq!(data.len(), count as usize * geo.stripe_unit_size);
    array.write_stripe_unit(stripe, id, symbol_pos, sub_start, data)
}
