use ef_sequence::EfSequence;
use proptest::prelude::*;

proptest! {
    #[test]
    fn roundtrip_any_monotone_sequence(
        mut values in prop::collection::vec(3u64..1_000_000, 1..200),
    ) {
        values.sort_unstable();

        let seq = EfSequence::new(&values);
        prop_assert_eq!(seq.len(), values.len());

        for (i, &expected) in values.iter().enumerate() {
            prop_assert_eq!(seq.get(i), expected);
        }
    }

    #[test]
    fn prefix_sums_invert_by_differencing(
        raw in prop::collection::vec(3u64..10_000, 1..100),
    ) {
        // The prefix-sum trick: encode arbitrary values >= 3 as a strictly
        // increasing sequence, recover each by differencing.
        let mut sums = Vec::with_capacity(raw.len());
        let mut acc = 0u64;
        for &v in &raw {
            acc += v;
            sums.push(acc);
        }

        let seq = EfSequence::new(&sums);
        prop_assert_eq!(seq.get(0), raw[0]);
        for i in 1..raw.len() {
            prop_assert_eq!(seq.get(i) - seq.get(i - 1), raw[i]);
        }
    }

    #[test]
    fn wide_universe_roundtrip(
        mut values in prop::collection::vec(3u64..(1u64 << 40), 2..50),
    ) {
        values.sort_unstable();

        let seq = EfSequence::new(&values);
        for (i, &expected) in values.iter().enumerate() {
            prop_assert_eq!(seq.get(i), expected);
        }
    }
}
