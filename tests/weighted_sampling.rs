//! Statistical checks of the bandwidth-weighted shuffle.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use mirrorlist_resolver::sampler::{random_shuffle, weighted_shuffle};

const TRIALS: usize = 20_000;

#[test]
fn test_first_pick_is_proportional_to_weight() {
    let weights: [(i64, char); 4] = [(10, 'a'), (20, 'b'), (30, 'c'), (40, 'd')];
    let total: i64 = weights.iter().map(|(w, _)| w).sum();
    let mut rng = StdRng::seed_from_u64(2024);

    let mut first: HashMap<char, usize> = HashMap::new();
    for _ in 0..TRIALS {
        let order = weighted_shuffle(weights.to_vec(), &mut rng);
        *first.entry(order[0]).or_default() += 1;
    }

    for (weight, item) in weights {
        let expected = weight as f64 / total as f64;
        let observed = first.get(&item).copied().unwrap_or(0) as f64 / TRIALS as f64;
        assert!(
            (observed - expected).abs() < 0.02,
            "{}: observed {:.3}, expected {:.3}",
            item,
            observed,
            expected
        );
    }
}

#[test]
fn test_non_positive_weights_count_as_one() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut zero_first = 0usize;
    for _ in 0..TRIALS {
        let order = weighted_shuffle(vec![(0, 'z'), (-3, 'n'), (1, 'o')], &mut rng);
        if order[0] == 'z' {
            zero_first += 1;
        }
    }
    let observed = zero_first as f64 / TRIALS as f64;
    assert!((observed - 1.0 / 3.0).abs() < 0.02, "observed {:.3}", observed);
}

#[test]
fn test_every_item_appears_exactly_once() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let items: Vec<(i64, u32)> = (0..50).map(|i| (i64::from(i % 7), i)).collect();
        let mut order = weighted_shuffle(items, &mut rng);
        order.sort_unstable();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }
}

#[test]
fn test_uniform_shuffle_has_no_favourite() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut first = [0usize; 4];
    for _ in 0..TRIALS {
        let order = random_shuffle(vec![0usize, 1, 2, 3], &mut rng);
        first[order[0]] += 1;
    }
    for count in first {
        let observed = count as f64 / TRIALS as f64;
        assert!((observed - 0.25).abs() < 0.02, "observed {:.3}", observed);
    }
}
