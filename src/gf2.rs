//! Bit-packed GF(2) Gauss-Jordan elimination for the triple-erasure (RTP)
//! decode branch.
//!
//! The system solved there is always `p` equations in `p - 1` unknowns
//! (the `p`-th row is the identity the algebra guarantees is redundant),
//! with `p - 1` realistically well under 64 for any array size this engine
//! targets — so rows are packed into a `u64` bitset instead of `Vec<bool>`.

use crate::error::{Result, RtpError};

/// `[A | R]` augmented with a byte-vector right-hand side (`R` holds
/// `unit`-byte rows rather than single bits, since the unknowns are
/// subsymbols, not scalars).
pub struct Gf2System {
    rows: usize,
    cols: usize,
    unit: usize,
    a: Vec<u64>,
    r: Vec<Vec<u8>>,
}

impl Gf2System {
    pub fn new(rows: usize, cols: usize, unit: usize) -> Result<Self> {
        if cols > 63 {
            return Err(RtpError::IndexOutOfRange {
                what: "gf2 column count (p - 1)",
                value: cols,
                bound: 63,
            });
        }
        Ok(Self {
            rows,
            cols,
            unit,
            a: vec![0u64; rows],
            r: vec![vec![0u8; unit]; rows],
        })
    }

    /// Flip bit `col` of row `row`. Columns `>= cols` (the imaginary zero
    /// row) are silently dropped, matching the algebra's "ignoring flips
    /// targeting column p-1" rule.
    pub fn flip(&mut self, row: usize, col: usize) {
        if col < self.cols {
            self.a[row] ^= 1u64 << col;
        }
    }

    pub fn rhs_mut(&mut self, row: usize) -> &mut [u8] {
        &mut self.r[row]
    }

    pub fn rhs(&self, row: usize) -> &[u8] {
        &self.r[row]
    }

    /// Gauss-Jordan elimination to reduced row-echelon form. After this
    /// call, `solution(c)` for `c in 0..cols` holds the value of unknown
    /// `c`.
    pub fn solve(&mut self) {
        for pivot in 0..self.cols {
            if self.a[pivot] & (1 << pivot) == 0 {
                let swap_with = (pivot + 1..self.rows)
                    .find(|&row| self.a[row] & (1 << pivot) != 0)
                    .expect("RTP algebra guarantees a pivot exists in every column");
                self.a.swap(pivot, swap_with);
                self.r.swap(pivot, swap_with);
            }
            for row in 0..self.rows {
                if row != pivot && self.a[row] & (1 << pivot) != 0 {
                    self.a[row] ^= self.a[pivot];
                    let pivot_rhs = self.r[pivot].clone();
                    for (d, s) in self.r[row].iter_mut().zip(pivot_rhs.iter()) {
                        *d ^= s;
                    }
                }
            }
        }
        self.debug_check_invariants();
    }

    fn debug_check_invariants(&self) {
        if cfg!(debug_assertions) {
            for c in 0..self.cols {
                let expected = 1u64 << c;
                debug_assert_eq!(
                    self.a[c], expected,
                    "gf2 row {c} did not reduce to the identity column"
                );
            }
            debug_assert_eq!(self.a[self.rows - 1], 0, "redundant row did not vanish");
            debug_assert!(
                self.r[self.rows - 1].iter().all(|&b| b == 0),
                "redundant row's rhs did not vanish"
            );
        }
    }

    pub fn solution(&self, unknown: usize) -> &[u8] {
        &self.r[unknown]
    }
}
