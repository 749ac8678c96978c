//! `UpdateInformationSymbols`: incremental parity maintenance via a lazy
//! checksum, avoiding a full-stripe read for small in-place writes.

use tracing::instrument;

use crate::disk_array::{DiskArray, ErasureSetId, StripeId};
use crate::error::Result;
use crate::geometry::Geometry;
use crate::io;
use crate::scratch::ScratchPool;

/// Whether a caller should apply an in-place delta (`Update`) or re-encode
/// the whole stripe (`ReadWrite`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingStrategy {
    Update,
    ReadWrite,
}

/// Policy hint: prefer `Update` only when the touched range is small
/// relative to the stripe and none of the target data disks are erased.
pub fn get_encoding_strategy<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    id: ErasureSetId,
    first_subsymbol: u32,
    count: u32,
) -> EncodingStrategy {
    let units_per_symbol = geo.stripe_units_per_symbol();
    let first_symbol = first_subsymbol / units_per_symbol;
    let last_symbol = (first_subsymbol + count - 1) / units_per_symbol;
    for s in first_symbol..=last_symbol {
        if array.is_erased(id, s) {
            return EncodingStrategy::ReadWrite;
        }
    }
    if 4 * count < 3 * units_per_symbol * geo.k {
        EncodingStrategy::Update
    } else {
        EncodingStrategy::ReadWrite
    }
}

/// Per-parity-disk accumulator: a zeroed `symbol_size` scratch buffer plus a
/// bitmap of which subsymbols have been folded in. `empty` disks (the
/// parity disk itself erased) are skipped entirely.
struct LazyChecksum<'a> {
    buf: &'a mut [u8],
    initialized: Vec<bool>,
    empty: bool,
}

impl<'a> LazyChecksum<'a> {
    fn new(buf: &'a mut [u8], units_per_symbol: usize, empty: bool) -> Self {
        Self {
            buf,
            initialized: vec![false; units_per_symbol],
            empty,
        }
    }

    fn fold(&mut self, unit: usize, slot: u32, delta: &[u8]) {
        if self.empty {
            return;
        }
        let slot = slot as usize;
        let range = slot * unit..(slot + 1) * unit;
        if self.initialized[slot] {
            for (a, b) in self.buf[range].iter_mut().zip(delta) {
                *a ^= b;
            }
        } else {
            self.buf[range].copy_from_slice(delta);
            self.initialized[slot] = true;
        }
    }
}

/// Apply a delta write of `count` contiguous subsymbols starting at global
/// subsymbol index `first_subsymbol`.
///
/// `tid` selects which of `scratch`'s per-thread slots backs the row,
/// diagonal, and anti-diagonal lazy checksums for this call.
#[instrument(skip(array, scratch, data), fields(stripe, first_subsymbol, count))]
#[allow(clippy::too_many_arguments)]
pub fn update_information_symbols<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    scratch: &ScratchPool,
    stripe: StripeId,
    id: ErasureSetId,
    tid: usize,
    first_subsymbol: u32,
    count: u32,
    data: &[u8],
) -> Result<bool> {
    let u = geo.stripe_unit_size;
    debug_assert_eq!(data.len(), count as usize * u);

    let row_erased = array.is_erased(id, geo.row_pos());
    let diag_erased = array.is_erased(id, geo.diag_pos());
    let adiag_erased = array.is_erased(id, geo.adiag_pos());

    if row_erased && diag_erased && adiag_erased {
        return Ok(write_data_only(array, geo, stripe, id, first_subsymbol, count, data));
    }

    let units_per_symbol = geo.stripe_units_per_symbol() as usize;
    let mut guard = scratch.acquire(tid)?;
    let slot = guard.slot_mut();
    let mut row = LazyChecksum::new(&mut slot.a, units_per_symbol, row_erased);
    let mut diag = LazyChecksum::new(&mut slot.b, units_per_symbol, diag_erased);
    let mut adiag = LazyChecksum::new(&mut slot.c, units_per_symbol, adiag_erased);

    let mut ok = true;
    for i in 0..count {
        let global = first_subsymbol + i;
        let symbol = global / geo.stripe_units_per_symbol();
        let sub = global % geo.stripe_units_per_symbol();
        let new_bytes = &data[i as usize * u..(i as usize + 1) * u];

        let mut old = vec![0u8; u];
        if !array.is_erased(id, symbol) {
            ok &= io::read_subsymbols(array, geo, stripe, id, symbol, sub, 1, &mut old);
        }
        let mut delta = old;
        for (d, n) in delta.iter_mut().zip(new_bytes) {
            *d ^= n;
        }

        row.fold(u, sub, &delta);

        let zero_row = geo.p - 1;
        let dd = geo.diag_num(false, symbol, sub);
        if dd != zero_row {
            if !diag.initialized[dd as usize] && !diag.empty {
                ok &= io::read_subsymbols(
                    array,
                    geo,
                    stripe,
                    id,
                    geo.diag_pos(),
                    dd,
                    1,
                    &mut diag.buf[dd as usize * u..(dd as usize + 1) * u],
                );
                diag.initialized[dd as usize] = true;
            }
            diag.fold(u, dd, &delta);
        }

        let ad = geo.diag_num(true, symbol, sub);
        if ad != zero_row {
            if !adiag.initialized[ad as usize] && !adiag.empty {
                ok &= io::read_subsymbols(
                    array,
                    geo,
                    stripe,
                    id,
                    geo.adiag_pos(),
                    ad,
                    1,
                    &mut adiag.buf[ad as usize * u..(ad as usize + 1) * u],
                );
                adiag.initialized[ad as usize] = true;
            }
            adiag.fold(u, ad, &delta);
        }

        if !array.is_erased(id, symbol) {
            ok &= io::write_subsymbols(array, geo, stripe, id, symbol, sub, 1, new_bytes);
        }
    }

    // Fold the row-parity delta into the diagonals via its own column
    // (the row symbol occupies position p - 1 in the diagonal traces).
    let zero_row = geo.p - 1;
    for i in 0..units_per_symbol as u32 {
        if !row.initialized[i as usize] {
            continue;
        }
        let delta = row.buf[i as usize * u..(i as usize + 1) * u].to_vec();
        let dd = geo.diag_num(false, geo.row_pos(), i);
        if dd != zero_row {
            if !diag.initialized[dd as usize] && !diag.empty {
                ok &= io::read_subsymbols(
                    array,
                    geo,
                    stripe,
                    id,
                    geo.diag_pos(),
                    dd,
                    1,
                    &mut diag.buf[dd as usize * u..(dd as usize + 1) * u],
                );
                diag.initialized[dd as usize] = true;
            }
            diag.fold(u, dd, &delta);
        }
        let ad = geo.diag_num(true, geo.row_pos(), i);
        if ad != zero_row {
            if !adiag.initialized[ad as usize] && !adiag.empty {
                ok &= io::read_subsymbols(
                    array,
                    geo,
                    stripe,
                    id,
                    geo.adiag_pos(),
                    ad,
                    1,
                    &mut adiag.buf[ad as usize * u..(ad as usize + 1) * u],
                );
                adiag.initialized[ad as usize] = true;
            }
            adiag.fold(u, ad, &delta);
        }
    }

    if !row_erased {
        for i in 0..units_per_symbol as u32 {
            if row.initialized[i as usize] {
                let mut current = vec![0u8; u];
                ok &= io::read_subsymbols(array, geo, stripe, id, geo.row_pos(), i, 1, &mut current);
                for (c, d) in current.iter_mut().zip(&row.buf[i as usize * u..(i as usize + 1) * u]) {
                    *c ^= d;
                }
                ok &= io::write_subsymbols(array, geo, stripe, id, geo.row_pos(), i, 1, &current);
            }
        }
    }
    if !diag_erased {
        for i in 0..units_per_symbol as u32 {
            if diag.initialized[i as usize] {
                ok &= io::write_subsymbols(
                    array,
                    geo,
                    stripe,
                    id,
                    geo.diag_pos(),
                    i,
                    1,
                    &diag.buf[i as usize * u..(i as usize + 1) * u],
                );
            }
        }
    }
    if !adiag_erased {
        for i in 0..units_per_symbol as u32 {
            if adiag.initialized[i as usize] {
                ok &= io::write_subsymbols(
                    array,
                    geo,
                    stripe,
                    id,
                    geo.adiag_pos(),
                    i,
                    1,
                    &adiag.buf[i as usize * u..(i as usize + 1) * u],
                );
            }
        }
    }

    Ok(ok)
}

fn write_data_only<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    stripe: StripeId,
    id: ErasureSetId,
    first_subsymbol: u32,
    count: u32,
    data: &[u8],
) -> bool {
    let u = geo.stripe_unit_size;
    let mut ok = true;
    for i in 0..count {
        let global = first_subsymbol + i;
        let symbol = global / geo.stripe_units_per_symbol();
        let sub = global % geo.stripe_units_per_symbol();
        if !array.is_erased(id, symbol) {
            ok &= io::write_subsymbols(
                array,
                geo,
                stripe,
                id,
                symbol,
                sub,
                1,
                &data[i as usize * u..(i as usize + 1) * u],
            );
        }
    }
    ok
}
