//! `DecodeDataSymbols` / `DecodeDataSubsymbols`: the RAID4 -> RDP -> RTP
//! reconstruction ladder.

use tracing::instrument;

use crate::diag::{self, DiagVec};
use crate::disk_array::{DiskArray, ErasureSetId, StripeId};
use crate::error::Result;
use crate::geometry::Geometry;
use crate::gf2::Gf2System;
use crate::io;
use crate::scratch::ScratchPool;

/// Sorted, `None`-padded erased positions for an erasure set (at most 3).
fn erased_positions<D: DiskArray>(array: &D, id: ErasureSetId) -> [Option<u32>; 3] {
    let mut out = [None, None, None];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = array.get_erased_position(id, i as u32);
    }
    out
}

/// Read or reconstruct `count` contiguous data symbols starting at `first`.
///
/// `tid` selects which of `scratch`'s per-thread slots backs the
/// reconstruction ladder's transient parity-read buffer.
#[instrument(skip(array, scratch, dst), fields(stripe, first, count))]
#[allow(clippy::too_many_arguments)]
pub fn decode_data_symbols<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    scratch: &ScratchPool,
    stripe: StripeId,
    id: ErasureSetId,
    tid: usize,
    first: u32,
    count: u32,
    dst: &mut [u8],
) -> Result<bool> {
    let sym_size = geo.symbol_size();
    debug_assert_eq!(dst.len(), count as usize * sym_size);
    debug_assert!(first + count <= geo.k);

    let erasures = erased_positions(array, id);
    let requested_erased = erasures
        .iter()
        .flatten()
        .any(|&pos| pos < geo.k && pos >= first && pos < first + count);

    if !requested_erased {
        let mut ok = true;
        for i in 0..count {
            let out = &mut dst[i as usize * sym_size..(i as usize + 1) * sym_size];
            ok &= io::read_symbol(array, geo, stripe, id, first + i, out);
        }
        return Ok(ok);
    }

    let mut guard = scratch.acquire(tid)?;
    let parity_buf: &mut [u8] = &mut guard.slot_mut().a;
    let (symbols, ok) = reconstruct_raid4_symbols(array, geo, stripe, id, &erasures, parity_buf)?;
    for i in 0..count {
        let out = &mut dst[i as usize * sym_size..(i as usize + 1) * sym_size];
        out.copy_from_slice(&symbols[(first + i) as usize]);
    }
    Ok(ok)
}

/// Read or reconstruct a subrange of a single symbol's subsymbols.
///
/// `tid` selects which of `scratch`'s per-thread slots backs the streaming
/// row-XOR buffers in the single-erasure fast path, and is forwarded to
/// [`decode_data_symbols`] when full reconstruction is needed.
#[allow(clippy::too_many_arguments)]
pub fn decode_data_subsymbols<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    scratch: &ScratchPool,
    stripe: StripeId,
    id: ErasureSetId,
    tid: usize,
    symbol: u32,
    sub_start: u32,
    count: u32,
    dst: &mut [u8],
) -> Result<bool> {
    let u = geo.stripe_unit_size;
    debug_assert_eq!(dst.len(), count as usize * u);

    if !array.is_erased(id, symbol) {
        return Ok(io::read_subsymbols(
            array, geo, stripe, id, symbol, sub_start, count, dst,
        ));
    }

    let erasures = erased_positions(array, id);
    let raid4_erased: Vec<u32> = erasures
        .iter()
        .flatten()
        .copied()
        .filter(|&pos| pos <= geo.row_pos())
        .collect();

    if raid4_erased.len() == 1 && raid4_erased[0] == symbol {
        // Single RAID4 erasure: a streaming row-XOR across the other
        // present RAID4 symbols reconstructs just the requested range.
        let byte_count = count as usize * u;
        let mut guard = scratch.acquire(tid)?;
        let slot = guard.slot_mut();
        let out = &mut slot.a[..byte_count];
        out.fill(0);
        let buf = &mut slot.b[..byte_count];
        let mut ok = true;
        for s in 0..geo.p {
            if s == symbol {
                continue;
            }
            ok &= io::read_subsymbols(array, geo, stripe, id, s, sub_start, count, buf);
            for (a, b) in out.iter_mut().zip(buf.iter()) {
                *a ^= b;
            }
        }
        dst.copy_from_slice(out);
        return Ok(ok);
    }

    let sym_size = geo.symbol_size();
    let mut full = vec![0u8; sym_size];
    let ok = decode_data_symbols(array, geo, scratch, stripe, id, tid, symbol, 1, &mut full)?;
    let start = sub_start as usize * u;
    dst.copy_from_slice(&full[start..start + count as usize * u]);
    Ok(ok)
}

/// Reconstruct all `p` RAID4 symbols (data + row parity) for the stripe,
/// given up to three erasures anywhere in the codeword. `scratch_buf`
/// (symbol-sized, borrowed from the caller's checked-out scratch slot)
/// backs the transient stored-parity reads used along the way. Returns the
/// reconstructed symbols together with whether every read along the way
/// succeeded.
fn reconstruct_raid4_symbols<D: DiskArray>(
    array: &D,
    geo: &Geometry,
    stripe: StripeId,
    id: ErasureSetId,
    erasures: &[Option<u32>; 3],
    scratch_buf: &mut [u8],
) -> Result<(Vec<Vec<u8>>, bool)> {
    let p = geo.p;
    let sym_size = geo.symbol_size();

    let mut ok = true;
    let mut symbols: Vec<Vec<u8>> = Vec::with_capacity(p as usize);
    for s in 0..p {
        let mut buf = vec![0u8; sym_size];
        if !array.is_erased(id, s) {
            ok &= io::read_symbol(array, geo, stripe, id, s, &mut buf);
        }
        symbols.push(buf);
    }

    let raid4_erased: Vec<u32> = erasures
        .iter()
        .flatten()
        .copied()
        .filter(|&pos| pos <= geo.row_pos())
        .collect();
    let e = raid4_erased.len();
    let is_anti = array.is_erased(id, geo.diag_pos());

    if e == 0 {
        return Ok((symbols, ok));
    }

    let mut diag_full = None;
    if e > 1 {
        let parity_pos = if is_anti { geo.adiag_pos() } else { geo.diag_pos() };
        ok &= io::read_symbol(array, geo, stripe, id, parity_pos, scratch_buf);
        let mut vec = diag::rebuild_full(geo, scratch_buf);
        for s in 0..p {
            if !array.is_erased(id, s) {
                diag::add_to_full(geo, &mut vec, is_anti, s, &symbols[s as usize]);
            }
        }
        diag_full = Some(vec);
    }

    match e {
        1 => {
            let x = raid4_erased[0];
            restore_single_raid4(geo, &mut symbols, x);
        }
        2 => {
            let mut diag = diag_full.expect("e > 1 always builds a residual diagonal");
            let x = raid4_erased[0];
            let y = raid4_erased[1];
            rdp_restore(geo, &mut symbols, &mut diag, is_anti, x, y);
        }
        3 => {
            debug_assert!(!is_anti, "RTP requires both diagonal parities present");
            let mut diag = diag_full.expect("e > 1 always builds a residual diagonal");
            let x = raid4_erased[0];
            let y = raid4_erased[1];
            let z = raid4_erased[2];
            ok &= rtp_restore(geo, array, stripe, id, &mut symbols, &mut diag, scratch_buf, x, y, z);
        }
        _ => unreachable!("at most 3 erasures are correctable"),
    }

    Ok((symbols, ok))
}

fn restore_single_raid4(geo: &Geometry, symbols: &mut [Vec<u8>], x: u32) {
    let sym_size = geo.symbol_size();
    let mut acc = vec![0u8; sym_size];
    for s in 0..geo.p {
        if s != x {
            for (a, b) in acc.iter_mut().zip(symbols[s as usize].iter()) {
                *a ^= b;
            }
        }
    }
    symbols[x as usize] = acc;
}

/// The RDP double-erasure ladder: walks the diagonal/row relation one row
/// pair `(X[r], Y[r])` at a time, starting from the imaginary zero row.
fn rdp_restore(
    geo: &Geometry,
    symbols: &mut [Vec<u8>],
    diag: &mut DiagVec,
    is_anti: bool,
    x: u32,
    y: u32,
) {
    let p = geo.p;
    let u = geo.stripe_unit_size;
    let zero_row = p - 1;
    let mut r = zero_row;

    for _ in 0..geo.stripe_units_per_symbol() {
        let d = geo.diag_num(is_anti, y, r) as usize;
        if r != zero_row {
            let y_r = symbols[y as usize][r as usize * u..(r as usize + 1) * u].to_vec();
            for (a, b) in diag[d].iter_mut().zip(y_r.iter()) {
                *a ^= b;
            }
        }
        let r_new = if is_anti {
            (p + x - d as u32) % p
        } else {
            (p + d as u32 - x) % p
        };

        symbols[x as usize][r_new as usize * u..(r_new as usize + 1) * u]
            .copy_from_slice(&diag[d]);

        let mut row_sum = vec![0u8; u];
        for s in 0..p {
            if s != y {
                let src = &symbols[s as usize][r_new as usize * u..(r_new as usize + 1) * u];
                for (a, b) in row_sum.iter_mut().zip(src.iter()) {
                    *a ^= b;
                }
            }
        }
        symbols[y as usize][r_new as usize * u..(r_new as usize + 1) * u]
            .copy_from_slice(&row_sum);

        r = r_new;
    }
}

/// The RTP triple-erasure path: solves a `p x (p - 1)` GF(2) linear system
/// for symbol `Y`, then relabels `Y <-> Z` and falls through to the RDP
/// ladder to restore `X` and the (now-labelled) `Y`. `scratch_buf` backs the
/// transient stored anti-diagonal-parity read. Returns whether that read
/// succeeded.
#[allow(clippy::too_many_arguments)]
fn rtp_restore<D: DiskArray>(
    geo: &Geometry,
    array: &D,
    stripe: StripeId,
    id: ErasureSetId,
    symbols: &mut [Vec<u8>],
    diag: &mut DiagVec,
    scratch_buf: &mut [u8],
    x: u32,
    y: u32,
    z: u32,
) -> bool {
    let p = geo.p;
    let u = geo.stripe_unit_size;

    let ok = io::read_symbol(array, geo, stripe, id, geo.adiag_pos(), scratch_buf);
    let mut adiag = diag::rebuild_full(geo, scratch_buf);
    for s in 0..p {
        if !array.is_erased(id, s) {
            diag::add_to_full(geo, &mut adiag, true, s, &symbols[s as usize]);
        }
    }

    let zero_row = p - 1;
    let mut row = vec![vec![0u8; u]; p as usize];
    for s in 0..p {
        if s != x && s != y && s != z {
            for i in 0..zero_row {
                let src = &symbols[s as usize][i as usize * u..(i as usize + 1) * u];
                for (a, b) in row[i as usize].iter_mut().zip(src.iter()) {
                    *a ^= b;
                }
            }
        }
    }

    let cols = geo.stripe_units_per_symbol() as usize;
    let mut sys = Gf2System::new(p as usize, cols, u).expect("p - 1 fits a u64 bitset");
    for kk in 0..p {
        for delta in [0i64, (z as i64 - y as i64), (y as i64 - x as i64), (z as i64 - x as i64)] {
            let c = (((kk as i64 + delta) % p as i64) + p as i64) % p as i64;
            sys.flip(kk as usize, c as usize);
        }
        let row_idx = (((kk as i64 + z as i64 - x as i64) % p as i64) + p as i64) % p as i64;
        let d_row = geo.diag_num(false, z, kk) as usize;
        let d_ad = geo.diag_num(true, x, kk) as usize;
        let rhs = sys.rhs_mut(kk as usize);
        for i in 0..u {
            rhs[i] = row[row_idx as usize][i] ^ diag[d_row][i] ^ adiag[d_ad][i];
        }
    }
    sys.solve();

    for r in 0..geo.stripe_units_per_symbol() {
        let sol = sys.solution(r as usize);
        symbols[y as usize][r as usize * u..(r as usize + 1) * u].copy_from_slice(sol);
    }
    diag::add_to_full(geo, diag, false, y, &symbols[y as usize]);

    rdp_restore(geo, symbols, diag, false, x, z);
    ok
}
