//! `EncodeStripe`: compute row/diagonal/anti-diagonal parity from `k` data
//! symbols and write the full codeword.

use tracing::instrument;

use crate::diag::add_to_diag_flat;
use crate::disk_array::{DiskArray, ErasureSetId, StripeId};
use crate::error::Result;
use crate::geometry::Geometry;
use crate::io;
use crate::scratch::ScratchPool;

/// Encode `data` (`k` contiguous symbols) and write every non-erased
/// position of the codeword. Returns `Ok(true)` iff every write succeeded.
///
/// `tid` selects which of `scratch`'s per-thread slots backs the row,
/// diagonal, and anti-diagonal accumulators for this call.
#[instrument(skip(array, scratch, data), fields(stripe, p = geo.p))]
#[allow(clippy::too_many_arguments)]
pub fn encode_stripe<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    scratch: &ScratchPool,
    stripe: StripeId,
    id: ErasureSetId,
    tid: usize,
    data: &[u8],
) -> Result<bool> {
    let sym_size = geo.symbol_size();
    let k = geo.k as usize;
    debug_assert_eq!(data.len(), k * sym_size);

    let mut guard = scratch.acquire(tid)?;
    let slot = guard.slot_mut();
    let row = &mut slot.a;
    let diag = &mut slot.b;
    let adiag = &mut slot.c;

    let mut ok = true;
    for s in 0..geo.k {
        let sym = &data[s as usize * sym_size..(s as usize + 1) * sym_size];
        if !array.is_erased(id, s) {
            ok &= io::write_symbol(array, geo, stripe, id, s, sym);
        }
        row.xor_into(sym);
        add_to_diag_flat(geo, diag, false, s, sym);
        add_to_diag_flat(geo, adiag, true, s, sym);
    }

    // The row-parity symbol itself occupies column p - 1 of the
    // diagonal/anti-diagonal traces.
    add_to_diag_flat(geo, diag, false, geo.row_pos(), row);
    add_to_diag_flat(geo, adiag, true, geo.row_pos(), row);

    if !array.is_erased(id, geo.row_pos()) {
        ok &= io::write_symbol(array, geo, stripe, id, geo.row_pos(), row);
    }
    if !array.is_erased(id, geo.diag_pos()) {
        ok &= io::write_symbol(array, geo, stripe, id, geo.diag_pos(), diag);
    }
    if !array.is_erased(id, geo.adiag_pos()) {
        ok &= io::write_symbol(array, geo, stripe, id, geo.adiag_pos(), adiag);
    }

    tracing::debug!(ok, "encode_stripe complete");
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem_array::MemDiskArray;
    use crate::params::RtpParams;
    use crate::scratch::ScratchPool;

    #[test]
    fn encode_then_check_with_no_erasures_round_trips() {
        let params = RtpParams::new(2, 1).unwrap(); // p = 3
        let geo = params.geometry();
        let array = MemDiskArray::new(&geo);
        let scratch = ScratchPool::new(geo.symbol_size(), 1).unwrap();
        let data = [0xAAu8, 0xBB];
        let ok = encode_stripe(&array, &geo, &scratch, 0, array.no_erasures_id(), 0, &data).unwrap();
        assert!(ok);
        // Row parity should be XOR of the two data bytes.
        let mut row = vec![0u8; 1];
        array.read_for_test(0, geo.row_pos(), &mut row);
        assert_eq!(row[0], 0xAA ^ 0xBB);
    }
}
