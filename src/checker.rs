//! `CheckCodeword`: stripe-wide consistency verification.

use tracing::instrument;

use crate::diag::add_to_diag_flat;
use crate::disk_array::{DiskArray, ErasureSetId, StripeId};
use crate::error::{Result, RtpError};
use crate::geometry::Geometry;
use crate::io;
use crate::scratch::ScratchPool;

/// Verify that the stored row/diagonal/anti-diagonal parities match the
/// stored data symbols. Returns `Ok(true)` vacuously if the erasure set is
/// non-empty (there is nothing to check against when a disk is missing).
///
/// `tid` selects which of `scratch`'s per-thread slots backs the row,
/// diagonal, and anti-diagonal accumulators for this call.
#[instrument(skip(array, scratch), fields(stripe))]
pub fn check_codeword<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    scratch: &ScratchPool,
    stripe: StripeId,
    id: ErasureSetId,
    tid: usize,
) -> Result<bool> {
    if array.get_num_of_erasures(id) > 0 {
        return Ok(true);
    }

    let sym_size = geo.symbol_size();
    let mut guard = scratch.acquire(tid)?;
    let slot = guard.slot_mut();
    let row = &mut slot.a;
    let diag = &mut slot.b;
    let adiag = &mut slot.c;
    let mut buf = vec![0u8; sym_size];

    for s in 0..geo.k {
        if !io::read_symbol(array, geo, stripe, id, s, &mut buf) {
            return Err(RtpError::CheckReadFailed { stripe, symbol: s });
        }
        row.xor_into(&buf);
        add_to_diag_flat(geo, diag, false, s, &buf);
        add_to_diag_flat(geo, adiag, true, s, &buf);
    }
    add_to_diag_flat(geo, diag, false, geo.row_pos(), row);
    add_to_diag_flat(geo, adiag, true, geo.row_pos(), row);

    if row.iter().any(|&b| b != 0) {
        return Ok(false);
    }

    let mut stored_diag = vec![0u8; sym_size];
    if !io::read_symbol(array, geo, stripe, id, geo.diag_pos(), &mut stored_diag) {
        return Err(RtpError::CheckReadFailed {
            stripe,
            symbol: geo.diag_pos(),
        });
    }
    if **diag != stored_diag[..] {
        return Ok(false);
    }

    let mut stored_adiag = vec![0u8; sym_size];
    if !io::read_symbol(array, geo, stripe, id, geo.adiag_pos(), &mut stored_adiag) {
        return Err(RtpError::CheckReadFailed {
            stripe,
            symbol: geo.adiag_pos(),
        });
    }
    Ok(**adiag == stored_adiag[..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_stripe;
    use crate::mem_array::MemDiskArray;
    use crate::params::RtpParams;
    use crate::scratch::ScratchPool;

    #[test]
    fn fresh_encode_passes_check() {
        let params = RtpParams::new(4, 8).unwrap();
        let geo = params.geometry();
        let array = MemDiskArray::new(&geo);
        let scratch = ScratchPool::new(geo.symbol_size(), 1).unwrap();
        let data = vec![7u8; geo.k as usize * geo.symbol_size()];
        encode_stripe(&array, &geo, &scratch, 0, array.no_erasures_id(), 0, &data).unwrap();
        assert!(check_codeword(&array, &geo, &scratch, 0, array.no_erasures_id(), 0).unwrap());
    }

    #[test]
    fn corrupted_parity_fails_check() {
        let params = RtpParams::new(4, 8).unwrap();
        let geo = params.geometry();
        let array = MemDiskArray::new(&geo);
        let scratch = ScratchPool::new(geo.symbol_size(), 1).unwrap();
        let data = vec![7u8; geo.k as usize * geo.symbol_size()];
        encode_stripe(&array, &geo, &scratch, 0, array.no_erasures_id(), 0, &data).unwrap();
        array.corrupt_for_test(0, geo.row_pos(), 0);
        assert!(!check_codeword(&array, &geo, &scratch, 0, array.no_erasures_id(), 0).unwrap());
    }
}
