//! Classification assignment for priority and fairness runs.
//!
//! Priority runs cycle through levels 1..=5. Fairness runs either cycle
//! through the configured bands or, when any band carries an explicit count,
//! expand the bands into a multiset that the planner shuffles.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::Band;

/// Number of distinct priority levels.
pub const PRIORITY_LEVELS: u8 = 5;

/// Priority for a 1-based ordinal: `((n - 1) mod 5) + 1`.
pub fn priority_for_ordinal(ordinal: u32) -> u8 {
    debug_assert!(ordinal >= 1, "ordinals are 1-based");
    (ordinal.saturating_sub(1) % PRIORITY_LEVELS as u32) as u8 + 1
}

/// Round-robin band for a 1-based ordinal. Returns `None` only for an empty
/// band list.
pub fn band_for_ordinal(bands: &[Band], ordinal: u32) -> Option<&Band> {
    if bands.is_empty() {
        return None;
    }
    let idx = ordinal.saturating_sub(1) as usize % bands.len();
    bands.get(idx)
}

/// Bands used when a fairness run supplies none. They carry no counts, so a
/// defaulted run always uses round-robin assignment.
pub fn default_bands() -> Vec<Band> {
    vec![
        Band::new("first-class", 15),
        Band::new("business-class", 5),
        Band::new("economy-class", 1),
    ]
}

/// Returns the caller's bands, or [default_bands] when the list is empty.
pub fn effective_bands(bands: &[Band]) -> Vec<Band> {
    if bands.is_empty() {
        default_bands()
    } else {
        bands.to_vec()
    }
}

/// True when at least one band has a positive explicit count.
pub fn has_explicit_counts(bands: &[Band]) -> bool {
    bands.iter().any(|b| b.explicit_count() > 0)
}

/// Sum of explicit counts; absent counts contribute zero. `None` when the sum
/// does not fit in a `u32`.
pub fn explicit_total(bands: &[Band]) -> Option<u32> {
    bands
        .iter()
        .try_fold(0u32, |total, band| total.checked_add(band.explicit_count()))
}

/// Expands bands into their explicit multiset, in declaration order. Callers
/// bound the total through [crate::RunConfig::validate] first.
pub fn explicit_distribution(bands: &[Band]) -> Vec<Band> {
    let mut out = Vec::with_capacity(explicit_total(bands).unwrap_or(0) as usize);
    for band in bands {
        for _ in 0..band.explicit_count() {
            out.push(band.clone());
        }
    }
    out
}

/// Explicit multiset in a uniformly random submission order.
pub fn shuffled_distribution<R: Rng + ?Sized>(bands: &[Band], rng: &mut R) -> Vec<Band> {
    let mut order = explicit_distribution(bands);
    order.shuffle(rng);
    order
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn priority_round_robin_for_twelve_jobs() {
        let assigned: Vec<u8> = (1..=12).map(priority_for_ordinal).collect();
        assert_eq!(assigned, vec![1, 2, 3, 4, 5, 1, 2, 3, 4, 5, 1, 2]);

        let mut counts = [0u32; 5];
        for p in assigned {
            counts[(p - 1) as usize] += 1;
        }
        assert_eq!(counts, [3, 3, 2, 2, 2]);
    }

    #[test]
    fn priority_buckets_differ_by_at_most_one() {
        for n in [0u32, 1, 4, 5, 6, 99, 100, 101, 573] {
            let mut counts = [0u32; 5];
            for ordinal in 1..=n {
                counts[(priority_for_ordinal(ordinal) - 1) as usize] += 1;
            }
            assert_eq!(counts.iter().sum::<u32>(), n);
            let (k, r) = (n / 5, n % 5);
            for (i, c) in counts.iter().enumerate() {
                let expected = if (i as u32) < r { k + 1 } else { k };
                assert_eq!(*c, expected, "n={} bucket={}", n, i + 1);
            }
        }
    }

    #[test]
    fn band_round_robin_follows_declaration_order() {
        let bands = default_bands();
        let keys: Vec<&str> = (1..=5)
            .map(|n| band_for_ordinal(&bands, n).expect("band").key.as_str())
            .collect();
        assert_eq!(
            keys,
            vec![
                "first-class",
                "business-class",
                "economy-class",
                "first-class",
                "business-class"
            ]
        );
        assert!(band_for_ordinal(&[], 1).is_none());
    }

    #[test]
    fn default_bands_have_no_counts() {
        let bands = effective_bands(&[]);
        assert_eq!(bands.len(), 3);
        assert!(!has_explicit_counts(&bands));
        assert_eq!(
            bands.iter().map(|b| b.weight).collect::<Vec<_>>(),
            vec![15, 5, 1]
        );
    }

    #[test]
    fn explicit_counts_ignore_zero_and_absent() {
        let bands = vec![
            Band::new("a", 3).with_count(0),
            Band::new("b", 2),
            Band::new("c", 1).with_count(2),
        ];
        assert!(has_explicit_counts(&bands));
        assert_eq!(explicit_total(&bands), Some(2));
        let keys: Vec<String> = explicit_distribution(&bands)
            .into_iter()
            .map(|b| b.key)
            .collect();
        assert_eq!(keys, vec!["c", "c"]);
    }

    #[test]
    fn shuffle_preserves_multiplicities() {
        let bands = vec![
            Band::new("gold", 10).with_count(7),
            Band::new("silver", 5).with_count(3),
            Band::new("bronze", 1).with_count(11),
        ];
        for seed in 0..8u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let order = shuffled_distribution(&bands, &mut rng);
            assert_eq!(order.len(), 21);
            let mut counts: HashMap<String, u32> = HashMap::new();
            for band in order {
                *counts.entry(band.key).or_default() += 1;
            }
            assert_eq!(counts["gold"], 7);
            assert_eq!(counts["silver"], 3);
            assert_eq!(counts["bronze"], 11);
        }
    }

    #[test]
    fn explicit_total_reports_overflow() {
        let bands = vec![
            Band::new("a", 1).with_count(u32::MAX),
            Band::new("b", 1).with_count(1),
        ];
        assert_eq!(explicit_total(&bands), None);
        assert_eq!(
            explicit_total(&[Band::new("a", 1).with_count(u32::MAX)]),
            Some(u32::MAX)
        );
    }
}
