//! Property-based tests for the RTP codeword invariants.

use proptest::prelude::*;
use proptest::sample;

use rtp_ec::mem_array::MemDiskArray;
use rtp_ec::{DiskArray, EncodingStrategy, RtpParams, RtpProcessor};

/// Small primes-minus-one usable as `code_dimension` across these tests.
fn code_dimension_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![Just(2u32), Just(4), Just(6), Just(10), Just(12)]
}

fn stripe_unit_size_strategy() -> impl Strategy<Value = usize> {
    1usize..=8
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property 1 - round trip with no erasures.
    #[test]
    fn round_trip_no_erasures(
        code_dimension in code_dimension_strategy(),
        unit in stripe_unit_size_strategy(),
        seed in any::<u8>(),
    ) {
        let params = RtpParams::new(code_dimension, unit).unwrap();
        let processor = RtpProcessor::new(params).unwrap();
        let geo = processor.geometry();
        let array = MemDiskArray::new(&geo);
        let attached = processor.attach(&array, 1).unwrap();

        let data: Vec<u8> = (0..geo.k as usize * geo.symbol_size())
            .map(|i| seed.wrapping_add(i as u8))
            .collect();
        attached.encode_stripe(0, array.no_erasures_id(), 0, &data).unwrap();
        prop_assert!(attached.check_codeword(0, array.no_erasures_id(), 0).unwrap());

        let mut out = vec![0u8; data.len()];
        attached.decode_data_symbols(0, array.no_erasures_id(), 0, 0, geo.k, &mut out).unwrap();
        prop_assert_eq!(out, data);
    }

    /// Property 2 - single erasure tolerance, any position.
    #[test]
    fn single_erasure_any_position(
        code_dimension in code_dimension_strategy(),
        unit in stripe_unit_size_strategy(),
        seed in any::<u8>(),
        pos_fraction in 0.0f64..1.0,
    ) {
        let params = RtpParams::new(code_dimension, unit).unwrap();
        let processor = RtpProcessor::new(params).unwrap();
        let geo = processor.geometry();
        let n = geo.n();
        let array = MemDiskArray::new(&geo);
        let attached = processor.attach(&array, 1).unwrap();

        let data: Vec<u8> = (0..geo.k as usize * geo.symbol_size())
            .map(|i| seed.wrapping_add(i as u8))
            .collect();
        attached.encode_stripe(0, array.no_erasures_id(), 0, &data).unwrap();

        let pos = (pos_fraction * n as f64) as u32 % n;
        let id = array.erase(&[pos]);
        prop_assert!(attached.is_correctable(id));

        let mut out = vec![0u8; data.len()];
        attached.decode_data_symbols(0, id, 0, 0, geo.k, &mut out).unwrap();
        prop_assert_eq!(out, data);
    }

    /// Property 3 - double erasure, any pair.
    #[test]
    fn double_erasure_any_pair(
        code_dimension in code_dimension_strategy(),
        unit in stripe_unit_size_strategy(),
        seed in any::<u8>(),
        a_fraction in 0.0f64..1.0,
        b_fraction in 0.0f64..1.0,
    ) {
        let params = RtpParams::new(code_dimension, unit).unwrap();
        let processor = RtpProcessor::new(params).unwrap();
        let geo = processor.geometry();
        let n = geo.n();
        let array = MemDiskArray::new(&geo);
        let attached = processor.attach(&array, 1).unwrap();

        let data: Vec<u8> = (0..geo.k as usize * geo.symbol_size())
            .map(|i| seed.wrapping_add(i as u8))
            .collect();
        attached.encode_stripe(0, array.no_erasures_id(), 0, &data).unwrap();

        let a = (a_fraction * n as f64) as u32 % n;
        let mut b = (b_fraction * n as f64) as u32 % n;
        if b == a {
            b = (b + 1) % n;
        }
        let id = array.erase(&[a, b]);
        prop_assert!(attached.is_correctable(id));

        let mut out = vec![0u8; data.len()];
        attached.decode_data_symbols(0, id, 0, 0, geo.k, &mut out).unwrap();
        prop_assert_eq!(out, data);
    }

    /// Property 4 - triple erasure succeeds whenever both diagonal
    /// parities are not simultaneously erased (`{p, p+1} ⊄ erased`).
    /// Samples the erased triple (including combinations touching exactly
    /// one of the two diagonal-parity positions) and varies `p` itself,
    /// rather than fixing either.
    #[test]
    fn triple_erasure_when_both_diagonals_present(
        picked in code_dimension_strategy().prop_flat_map(|cd| {
            let n = cd + 3;
            sample::subsequence((0..n).collect::<Vec<u32>>(), 3)
                .prop_map(move |triple| (cd, triple))
        }),
        unit in stripe_unit_size_strategy(),
        seed in any::<u8>(),
    ) {
        let (code_dimension, triple) = picked;
        let params = RtpParams::new(code_dimension, unit).unwrap();
        let processor = RtpProcessor::new(params).unwrap();
        let geo = processor.geometry();
        let array = MemDiskArray::new(&geo);
        let attached = processor.attach(&array, 1).unwrap();

        // Property 4 excludes triples erasing both diagonal parities at once.
        prop_assume!(!(triple.contains(&geo.diag_pos()) && triple.contains(&geo.adiag_pos())));

        let data: Vec<u8> = (0..geo.k as usize * geo.symbol_size())
            .map(|i| seed.wrapping_add(i as u8))
            .collect();
        attached.encode_stripe(0, array.no_erasures_id(), 0, &data).unwrap();

        let id = array.erase(&triple);
        prop_assert!(attached.is_correctable(id));
        let mut out = vec![0u8; data.len()];
        attached.decode_data_symbols(0, id, 0, 0, geo.k, &mut out).unwrap();
        prop_assert_eq!(out, data);
    }

    /// Property 5 - update equivalence: encoding `A` and then updating a
    /// sub-range to match `B` produces the same parity disks as encoding
    /// `B` directly.
    #[test]
    fn update_equivalence(
        code_dimension in code_dimension_strategy(),
        unit in stripe_unit_size_strategy(),
        seed_a in any::<u8>(),
        seed_b in any::<u8>(),
        first_fraction in 0.0f64..1.0,
        count_fraction in 0.0f64..1.0,
    ) {
        let params = RtpParams::new(code_dimension, unit).unwrap();
        let processor = RtpProcessor::new(params).unwrap();
        let geo = processor.geometry();
        let u = geo.stripe_unit_size;
        let total_subsymbols = geo.k * geo.stripe_units_per_symbol();

        let a_data: Vec<u8> = (0..geo.k as usize * geo.symbol_size())
            .map(|i| seed_a.wrapping_add(i as u8))
            .collect();

        let first_subsymbol = (first_fraction * total_subsymbols as f64) as u32 % total_subsymbols;
        let max_count = total_subsymbols - first_subsymbol;
        let count = 1 + (count_fraction * (max_count.max(1) - 1) as f64) as u32 % max_count;

        let byte_start = first_subsymbol as usize * u;
        let byte_len = count as usize * u;
        let mut b_data = a_data.clone();
        for (i, byte) in b_data[byte_start..byte_start + byte_len].iter_mut().enumerate() {
            *byte = seed_b.wrapping_add(i as u8);
        }

        let array_a = MemDiskArray::new(&geo);
        let attached_a = processor.attach(&array_a, 1).unwrap();
        attached_a.encode_stripe(0, array_a.no_erasures_id(), 0, &a_data).unwrap();
        let delta = &b_data[byte_start..byte_start + byte_len];
        attached_a
            .update_information_symbols(0, array_a.no_erasures_id(), 0, first_subsymbol, count, delta)
            .unwrap();

        let array_b = MemDiskArray::new(&geo);
        let attached_b = processor.attach(&array_b, 1).unwrap();
        attached_b.encode_stripe(0, array_b.no_erasures_id(), 0, &b_data).unwrap();

        for pos in [geo.row_pos(), geo.diag_pos(), geo.adiag_pos()] {
            let mut x = vec![0u8; geo.symbol_size()];
            let mut y = vec![0u8; geo.symbol_size()];
            array_a.read_for_test(0, pos, &mut x);
            array_b.read_for_test(0, pos, &mut y);
            prop_assert_eq!(x, y, "mismatch on parity disk {}", pos);
        }
    }

    /// Property 6 - strategy bound: `GetEncodingStrategy` returns `Update`
    /// only when no touched data disk is erased and `4*count < 3*(p-1)*k`.
    #[test]
    fn strategy_bound_matches_formula(
        code_dimension in code_dimension_strategy(),
        unit in stripe_unit_size_strategy(),
        first_fraction in 0.0f64..1.0,
        count_fraction in 0.0f64..1.0,
        erase_one in any::<bool>(),
        erase_pos_fraction in 0.0f64..1.0,
    ) {
        let params = RtpParams::new(code_dimension, unit).unwrap();
        let processor = RtpProcessor::new(params).unwrap();
        let geo = processor.geometry();
        let array = MemDiskArray::new(&geo);
        let attached = processor.attach(&array, 1).unwrap();

        let total_subsymbols = geo.k * geo.stripe_units_per_symbol();
        let first_subsymbol = (first_fraction * total_subsymbols as f64) as u32 % total_subsymbols;
        let max_count = total_subsymbols - first_subsymbol;
        let count = 1 + (count_fraction * (max_count.max(1) - 1) as f64) as u32 % max_count;

        let id = if erase_one {
            let pos = (erase_pos_fraction * geo.k as f64) as u32 % geo.k;
            array.erase(&[pos])
        } else {
            array.no_erasures_id()
        };

        let strategy = attached.get_encoding_strategy(id, first_subsymbol, count);

        let first_symbol = first_subsymbol / geo.stripe_units_per_symbol();
        let last_symbol = (first_subsymbol + count - 1) / geo.stripe_units_per_symbol();
        let touches_erased = erase_one && {
            let erased_pos = array.get_erased_position(id, 0).unwrap();
            erased_pos >= first_symbol && erased_pos <= last_symbol
        };
        let expects_update = !touches_erased && 4 * count < 3 * (geo.p - 1) * geo.k;

        if expects_update {
            prop_assert_eq!(strategy, EncodingStrategy::Update);
        } else {
            prop_assert_eq!(strategy, EncodingStrategy::ReadWrite);
        }
    }

    /// Property 7 - geometry: for fixed subsymbol row, the diagonal map is
    /// a bijection over symbol position.
    #[test]
    fn diag_num_bijective(code_dimension in code_dimension_strategy()) {
        let geo = RtpParams::new(code_dimension, 1).unwrap().geometry();
        for r in 0..geo.p {
            let mut seen = vec![false; geo.p as usize];
            for s in 0..geo.p {
                let d = geo.diag_num(false, s, r);
                prop_assert!(!seen[d as usize]);
                seen[d as usize] = true;
            }
        }
    }
}
