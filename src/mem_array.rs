//! An in-memory [`DiskArray`] test double.
//!
//! Backs both the unit/property test suite and the CLI demo harness. It has
//! no placement or scheduling logic of its own: one stripe is one flat
//! byte buffer, and erasure sets are precomputed boolean masks keyed by
//! `ErasureSetId`, matching the "immutable precomputed combination"
//! language used for erasure sets elsewhere in this crate.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::disk_array::{DiskArray, ErasureSetId, StripeId};
use crate::geometry::Geometry;

pub struct MemDiskArray {
    geo: Geometry,
    storage: RefCell<HashMap<StripeId, Vec<u8>>>,
    erasure_sets: RefCell<Vec<Vec<bool>>>,
}

impl MemDiskArray {
    pub fn new(geo: &Geometry) -> Self {
        let n = geo.n() as usize;
        Self {
            geo: *geo,
            storage: RefCell::new(HashMap::new()),
            erasure_sets: RefCell::new(vec![vec![false; n]]),
        }
    }

    /// The always-present erasure set with nothing erased.
    pub fn no_erasures_id(&self) -> ErasureSetId {
        0
    }

    /// Register a new erasure set with the given positions marked erased
    /// (at most 3) and return its id.
    pub fn erase(&self, positions: &[u32]) -> ErasureSetId {
        debug_assert!(positions.len() <= 3, "at most 3 erasures are correctable");
        let n = self.geo.n() as usize;
        let mut mask = vec![false; n];
        for &pos in positions {
            mask[pos as usize] = true;
        }
        let mut sets = self.erasure_sets.borrow_mut();
        sets.push(mask);
        (sets.len() - 1) as ErasureSetId
    }

    fn symbol_offset(&self, symbol_pos: u32, sub_start: u32) -> usize {
        symbol_pos as usize * self.geo.symbol_size() + sub_start as usize * self.geo.stripe_unit_size
    }

    /// Read raw bytes ignoring erasure state, for test assertions against
    /// what actually landed on a parity disk.
    pub fn read_for_test(&self, stripe: StripeId, symbol_pos: u32, out: &mut [u8]) {
        let storage = self.storage.borrow();
        let buf = storage.get(&stripe).expect("stripe has been written");
        let offset = self.symbol_offset(symbol_pos, 0);
        out.copy_from_slice(&buf[offset..offset + out.len()]);
    }

    /// Flip a byte within a subsymbol, simulating silent corruption.
    pub fn corrupt_for_test(&self, stripe: StripeId, symbol_pos: u32, subsymbol: u32) {
        let mut storage = self.storage.borrow_mut();
        let buf = storage.get_mut(&stripe).expect("stripe has been written");
        let offset = self.symbol_offset(symbol_pos, subsymbol);
        buf[offset] ^= 0xFF;
    }
}

impl DiskArray for MemDiskArray {
    fn read_stripe_unit(
        &self,
        stripe: StripeId,
        id: ErasureSetId,
        symbol_pos: u32,
        sub_start: u32,
        out: &mut [u8],
    ) -> bool {
        if self.is_erased(id, symbol_pos) {
            return false;
        }
        let storage = self.storage.borrow();
        let Some(buf) = storage.get(&stripe) else {
            return false;
        };
        let offset = self.symbol_offset(symbol_pos, sub_start);
        if offset + out.len() > buf.len() {
            return false;
        }
        out.copy_from_slice(&buf[offset..offset + out.len()]);
        true
    }

    fn write_stripe_unit(
        &self,
        stripe: StripeId,
        id: ErasureSetId,
        symbol_pos: u32,
        sub_start: u32,
        data: &[u8],
    ) -> bool {
        if self.is_erased(id, symbol_pos) {
            return false;
        }
        let mut storage = self.storage.borrow_mut();
        let n = self.geo.n() as usize;
        let sym_size = self.geo.symbol_size();
        let buf = storage.entry(stripe).or_insert_with(|| vec![0u8; n * sym_size]);
        let offset = self.symbol_offset(symbol_pos, sub_start);
        if offset + data.len() > buf.len() {
            return false;
        }
        buf[offset..offset + data.len()].copy_from_slice(data);
        true
    }

    fn is_erased(&self, id: ErasureSetId, symbol_pos: u32) -> bool {
        self.erasure_sets
            .borrow()
            .get(id as usize)
            .and_then(|mask| mask.get(symbol_pos as usize).copied())
            .unwrap_or(false)
    }

    fn get_erased_position(&self, id: ErasureSetId, k: u32) -> Option<u32> {
        let sets = self.erasure_sets.borrow();
        let mask = sets.get(id as usize)?;
        mask.iter()
            .enumerate()
            .filter(|(_, &erased)| erased)
            .map(|(pos, _)| pos as u32)
            .nth(k as usize)
    }

    fn get_num_of_erasures(&self, id: ErasureSetId) -> u32 {
        self.erasure_sets
            .borrow()
            .get(id as usize)
            .map(|mask| mask.iter().filter(|&&e| e).count() as u32)
            .unwrap_or(0)
    }
}
