//! Diagonal/anti-diagonal accumulation shared by the encoder and decoder.

use crate::geometry::Geometry;

/// XOR `sym`'s contribution into a symbol-sized (`p - 1` slots) diagonal
/// accumulator, dropping any contribution that lands on the unstored
/// imaginary zero row (`p - 1`).
pub fn add_to_diag_flat(geo: &Geometry, target: &mut [u8], is_anti: bool, s: u32, sym: &[u8]) {
    let u = geo.stripe_unit_size;
    let zero_row = geo.p - 1;
    for r in 0..geo.stripe_units_per_symbol() {
        let d = geo.diag_num(is_anti, s, r);
        if d == zero_row {
            continue;
        }
        let src = &sym[r as usize * u..(r as usize + 1) * u];
        let dst = &mut target[d as usize * u..(d as usize + 1) * u];
        for (a, b) in dst.iter_mut().zip(src) {
            *a ^= b;
        }
    }
}

/// A full length-`p` diagonal vector: one `stripe_unit_size`-byte slot per
/// diagonal index, including the imaginary zero row at index `p - 1`.
pub type DiagVec = Vec<Vec<u8>>;

/// Synthesize the full `p`-slot vector from the `p - 1` subsymbols actually
/// stored on a parity disk: slot `p - 1` is the XOR of the others.
pub fn rebuild_full(geo: &Geometry, stored: &[u8]) -> DiagVec {
    let u = geo.stripe_unit_size;
    let mut v: DiagVec = (0..geo.stripe_units_per_symbol() as usize)
        .map(|i| stored[i * u..(i + 1) * u].to_vec())
        .collect();
    let mut last = vec![0u8; u];
    for slot in &v {
        for (a, b) in last.iter_mut().zip(slot) {
            *a ^= b;
        }
    }
    v.push(last);
    v
}

/// XOR `sym`'s contribution into every slot of a full `p`-slot diagonal
/// vector (unlike [`add_to_diag_flat`], the zero row is a real slot here).
pub fn add_to_full(geo: &Geometry, target: &mut DiagVec, is_anti: bool, s: u32, sym: &[u8]) {
    let u = geo.stripe_unit_size;
    for r in 0..geo.stripe_units_per_symbol() {
        let d = geo.diag_num(is_anti, s, r) as usize;
        let src = &sym[r as usize * u..(r as usize + 1) * u];
        for (a, b) in target[d].iter_mut().zip(src) {
            *a ^= b;
        }
    }
}
