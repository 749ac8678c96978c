//! `RtpProcessor`: construction and the bound, attached engine.

use crate::checker::check_codeword;
use crate::decoder::{decode_data_subsymbols, decode_data_symbols};
use crate::disk_array::{DiskArray, ErasureSetId, StripeId};
use crate::encoder::encode_stripe;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::params::RtpParams;
use crate::scratch::ScratchPool;
use crate::updater::{get_encoding_strategy, update_information_symbols, EncodingStrategy};

/// Validates parameters and holds the code geometry; immutable once built.
pub struct RtpProcessor {
    geo: Geometry,
}

impl RtpProcessor {
    pub fn new(params: RtpParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            geo: params.geometry(),
        })
    }

    pub fn geometry(&self) -> Geometry {
        self.geo
    }

    /// Bind to a disk array by reference (the processor never owns it) and
    /// reserve per-thread scratch for up to `concurrent_threads` in-flight
    /// calls.
    pub fn attach<'a, D: DiskArray>(
        &'a self,
        array: &'a D,
        concurrent_threads: usize,
    ) -> Result<Attached<'a, D>> {
        let scratch = ScratchPool::new(self.geo.symbol_size(), concurrent_threads)?;
        Ok(Attached {
            geo: self.geo,
            array,
            scratch,
        })
    }
}

/// An `RtpProcessor` bound to a concrete `DiskArray` implementor. Borrows
/// the array for as long as the binding lives; the caller guarantees the
/// array outlives it.
pub struct Attached<'a, D: DiskArray> {
    geo: Geometry,
    array: &'a D,
    scratch: ScratchPool,
}

impl<'a, D: DiskArray> Attached<'a, D> {
    pub fn is_correctable(&self, id: ErasureSetId) -> bool {
        self.array.get_num_of_erasures(id) <= 3
    }

    /// `tid` selects the per-thread scratch slot reserved at [`RtpProcessor::attach`]
    /// for this call's temporaries; callers issuing concurrent calls must use
    /// distinct `tid`s in `0..concurrent_threads`.
    pub fn encode_stripe(
        &self,
        stripe: StripeId,
        id: ErasureSetId,
        tid: usize,
        data: &[u8],
    ) -> Result<bool> {
        encode_stripe(self.array, &self.geo, &self.scratch, stripe, id, tid, data)
    }

    pub fn decode_data_symbols(
        &self,
        stripe: StripeId,
        id: ErasureSetId,
        tid: usize,
        first: u32,
        count: u32,
        dst: &mut [u8],
    ) -> Result<bool> {
        decode_data_symbols(self.array, &self.geo, &self.scratch, stripe, id, tid, first, count, dst)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn decode_data_subsymbols(
        &self,
        stripe: StripeId,
        id: ErasureSetId,
        tid: usize,
        symbol: u32,
        sub_start: u32,
        count: u32,
        dst: &mut [u8],
    ) -> Result<bool> {
        decode_data_subsymbols(
            self.array, &self.geo, &self.scratch, stripe, id, tid, symbol, sub_start, count, dst,
        )
    }

    pub fn update_information_symbols(
        &self,
        stripe: StripeId,
        id: ErasureSetId,
        tid: usize,
        first_subsymbol: u32,
        count: u32,
        data: &[u8],
    ) -> Result<bool> {
        update_information_symbols(
            self.array, &self.geo, &self.scratch, stripe, id, tid, first_subsymbol, count, data,
        )
    }

    pub fn check_codeword(&self, stripe: StripeId, id: ErasureSetId, tid: usize) -> Result<bool> {
        check_codeword(self.array, &self.geo, &self.scratch, stripe, id, tid)
    }

    pub fn get_encoding_strategy(
        &self,
        id: ErasureSetId,
        first_subsymbol: u32,
        count: u32,
    ) -> EncodingStrategy {
        get_encoding_strategy(self.array, &self.geo, id, first_subsymbol, count)
    }

    /// Scratch capacity reserved at attach time, mostly exposed for tests
    /// and diagnostics.
    pub fn scratch(&self) -> &ScratchPool {
        &self.scratch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem_array::MemDiskArray;

    #[test]
    fn construction_rejects_non_prime_p() {
        let params = RtpParams {
            code_dimension: 3, // p = 4
            stripe_unit_size: 1,
        };
        assert!(RtpProcessor::new(params).is_err());
    }

    #[test]
    fn full_cycle_encode_corrupt_decode_check() {
        let params = RtpParams::new(4, 1).unwrap(); // p = 5
        let processor = RtpProcessor::new(params).unwrap();
        let array = MemDiskArray::new(&processor.geometry());
        let attached = processor.attach(&array, 2).unwrap();

        let data = [10u8, 20, 30, 40];
        let ok = attached
            .encode_stripe(0, array.no_erasures_id(), 0, &data)
            .unwrap();
        assert!(ok);
        assert!(attached
            .check_codeword(0, array.no_erasures_id(), 0)
            .unwrap());

        let id = array.erase(&[1, 3, 4]);
        assert!(attached.is_correctable(id));
        let mut out = vec![0u8; data.len()];
        assert!(attached
            .decode_data_symbols(0, id, 0, 0, 4, &mut out)
            .unwrap());
        assert_eq!(out, data);
    }
}
