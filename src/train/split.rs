//! Stratified train/test splitting
//!
//! The held-out size is fixed first as `round(n * test_size)` and then
//! allocated across classes proportionally (largest fractional remainder
//! first), so each label's proportion is preserved up to rounding and the
//! partition sizes always sum to `n`. Splitting is fully deterministic for
//! a given seed: groups are visited in canonical label order and shuffled
//! by a single seeded RNG.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::schema::NeedLevel;
use crate::error::{Error, Result};

/// Row indices of a train/test partition.
#[derive(Clone, Debug)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partition `labels` into stratified train/test index sets.
///
/// `test_size` must lie strictly inside (0, 1). Every class needs at least
/// 2 members so that both partitions see each class at least once.
pub fn stratified_split(labels: &[NeedLevel], test_size: f64, seed: u64) -> Result<Split> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::InvalidTestSize(test_size));
    }

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); NeedLevel::ALL.len()];
    for (i, label) in labels.iter().enumerate() {
        groups[label.index()].push(i);
    }

    for level in NeedLevel::ALL {
        let count = groups[level.index()].len();
        if count == 1 {
            return Err(Error::InsufficientClassSamples {
                label: level.as_str().to_string(),
                count,
            });
        }
    }

    let present: Vec<usize> = NeedLevel::ALL
        .iter()
        .map(|l| l.index())
        .filter(|&c| !groups[c].is_empty())
        .collect();
    let n = labels.len();
    let k = present.len();

    // Fix the total first, then spread it over classes; per-class rounding
    // alone can drift the total by one row per class.
    let total_test = (((n as f64) * test_size).round() as usize).clamp(k, n - k);
    let takes = allocate(&present, &groups, test_size, total_test);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - total_test);
    let mut test = Vec::with_capacity(total_test);

    for (&class, &take) in present.iter().zip(&takes) {
        let group = &mut groups[class];
        group.shuffle(&mut rng);
        test.extend_from_slice(&group[..take]);
        train.extend_from_slice(&group[take..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(Split { train, test })
}

/// Per-class held-out counts: floor of the ideal share, clamped so both
/// partitions keep at least one member, then corrected toward `total_test`
/// by largest (or smallest) fractional remainder.
fn allocate(
    present: &[usize],
    groups: &[Vec<usize>],
    test_size: f64,
    total_test: usize,
) -> Vec<usize> {
    let ideals: Vec<f64> = present
        .iter()
        .map(|&c| groups[c].len() as f64 * test_size)
        .collect();
    let mut takes: Vec<usize> = present
        .iter()
        .zip(&ideals)
        .map(|(&c, &ideal)| (ideal.floor() as usize).clamp(1, groups[c].len() - 1))
        .collect();

    let mut diff = total_test as isize - takes.iter().sum::<usize>() as isize;

    let mut order: Vec<usize> = (0..present.len()).collect();
    if diff > 0 {
        order.sort_by(|&a, &b| {
            let fa = ideals[a] - ideals[a].floor();
            let fb = ideals[b] - ideals[b].floor();
            fb.total_cmp(&fa).then(a.cmp(&b))
        });
    } else {
        order.sort_by(|&a, &b| {
            let fa = ideals[a] - ideals[a].floor();
            let fb = ideals[b] - ideals[b].floor();
            fa.total_cmp(&fb).then(a.cmp(&b))
        });
    }

    while diff != 0 {
        let mut moved = false;
        for &i in &order {
            if diff == 0 {
                break;
            }
            let cap = groups[present[i]].len() - 1;
            if diff > 0 && takes[i] < cap {
                takes[i] += 1;
                diff -= 1;
                moved = true;
            } else if diff < 0 && takes[i] > 1 {
                takes[i] -= 1;
                diff += 1;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }

    takes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn labels(low: usize, medium: usize, high: usize) -> Vec<NeedLevel> {
        let mut v = Vec::new();
        v.extend(std::iter::repeat(NeedLevel::Low).take(low));
        v.extend(std::iter::repeat(NeedLevel::Medium).take(medium));
        v.extend(std::iter::repeat(NeedLevel::High).take(high));
        v
    }

    #[test]
    fn test_split_sizes_sum_to_total() {
        let y = labels(50, 30, 20);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.train.len() + split.test.len(), 100);
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);
    }

    #[test]
    fn test_split_preserves_proportions() {
        let y = labels(50, 30, 20);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        let count = |idx: &[usize], level: NeedLevel| idx.iter().filter(|&&i| y[i] == level).count();
        assert_eq!(count(&split.test, NeedLevel::Low), 10);
        assert_eq!(count(&split.test, NeedLevel::Medium), 6);
        assert_eq!(count(&split.test, NeedLevel::High), 4);
    }

    #[test]
    fn test_uneven_classes_still_hit_exact_total() {
        // 34/33/33: naive per-class rounding would take 21 rows.
        let y = labels(33, 33, 34);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);

        let count = |idx: &[usize], level: NeedLevel| idx.iter().filter(|&&i| y[i] == level).count();
        // Proportions within one row of ideal.
        for (level, total) in [
            (NeedLevel::Low, 33.0),
            (NeedLevel::Medium, 33.0),
            (NeedLevel::High, 34.0),
        ] {
            let got = count(&split.test, level) as f64;
            assert!((got - total * 0.2).abs() < 1.0);
        }
    }

    #[test]
    fn test_split_is_deterministic() {
        let y = labels(17, 11, 9);
        let a = stratified_split(&y, 0.25, 7).unwrap();
        let b = stratified_split(&y, 0.25, 7).unwrap();
        assert_eq!(a.train, b.train);
        assert_eq!(a.test, b.test);
    }

    #[test]
    fn test_split_differs_across_seeds() {
        let y = labels(40, 40, 40);
        let a = stratified_split(&y, 0.2, 1).unwrap();
        let b = stratified_split(&y, 0.2, 2).unwrap();
        assert_ne!(a.test, b.test);
    }

    #[test]
    fn test_singleton_class_rejected() {
        let y = labels(5, 5, 1);
        let err = stratified_split(&y, 0.2, 42).unwrap_err();
        match err {
            Error::InsufficientClassSamples { label, count } => {
                assert_eq!(label, "HIGH");
                assert_eq!(count, 1);
            }
            other => panic!("expected InsufficientClassSamples, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_class_is_allowed() {
        // Two-class data still splits; stratification only needs the
        // classes that actually occur.
        let y = labels(10, 10, 0);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 4);
        assert_eq!(split.train.len(), 16);
    }

    #[test]
    fn test_tiny_classes_keep_one_on_each_side() {
        let y = labels(2, 2, 2);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        for level in NeedLevel::ALL {
            assert!(split.train.iter().any(|&i| y[i] == level));
            assert!(split.test.iter().any(|&i| y[i] == level));
        }
    }

    #[test]
    fn test_invalid_test_size() {
        let y = labels(5, 5, 5);
        assert!(matches!(
            stratified_split(&y, 0.0, 42),
            Err(Error::InvalidTestSize(_))
        ));
        assert!(matches!(
            stratified_split(&y, 1.0, 42),
            Err(Error::InvalidTestSize(_))
        ));
    }

    #[test]
    fn test_indices_are_disjoint() {
        let y = labels(8, 9, 10);
        let split = stratified_split(&y, 0.3, 3).unwrap();
        for i in &split.test {
            assert!(!split.train.contains(i));
        }
    }

    proptest! {
        #[test]
        fn prop_partition_is_exact(
            low in 2usize..40,
            medium in 2usize..40,
            high in 2usize..40,
            seed in 0u64..1000,
        ) {
            let y = labels(low, medium, high);
            let split = stratified_split(&y, 0.2, seed).unwrap();
            prop_assert_eq!(split.train.len() + split.test.len(), y.len());

            let mut all: Vec<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
            all.sort_unstable();
            let expected: Vec<usize> = (0..y.len()).collect();
            prop_assert_eq!(all, expected);
        }

        #[test]
        fn prop_total_matches_requested_fraction(
            low in 2usize..40,
            medium in 2usize..40,
            high in 2usize..40,
            seed in 0u64..1000,
        ) {
            let y = labels(low, medium, high);
            let split = stratified_split(&y, 0.2, seed).unwrap();
            let expected = (((y.len() as f64) * 0.2).round() as usize).clamp(3, y.len() - 3);
            prop_assert_eq!(split.test.len(), expected);
        }

        #[test]
        fn prop_each_class_on_both_sides(
            low in 2usize..20,
            medium in 2usize..20,
            high in 2usize..20,
            seed in 0u64..1000,
        ) {
            let y = labels(low, medium, high);
            let split = stratified_split(&y, 0.2, seed).unwrap();
            for level in NeedLevel::ALL {
                prop_assert!(split.train.iter().any(|&i| y[i] == level));
                prop_assert!(split.test.iter().any(|&i| y[i] == level));
            }
        }
    }
}
