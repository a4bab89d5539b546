//! Score-proportional sampling without replacement
//!
//! Draws k distinct items from a weighted candidate pool. Selection
//! probability is proportional to weight, with a floor that keeps even
//! zero-scored candidates reachable. The random source is injected so tests
//! can fix a seed and assert the exact sampling order.

use rand::prelude::*;

/// Floor applied to every weight so no candidate becomes unreachable
pub const MIN_WEIGHT: f64 = 0.1;

/// Draw attempts allowed per requested item
const ATTEMPTS_PER_ITEM: usize = 100;

/// Weighted sampler over an explicit random source
#[derive(Debug)]
pub struct WeightedSampler {
    rng: StdRng,
}

impl Default for WeightedSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightedSampler {
    /// Create a sampler seeded from system entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a sampler with a fixed seed (for reproducibility in tests)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw up to `k` distinct indices, weighted by `weights`
    ///
    /// If the pool is no larger than `k` the whole pool is returned
    /// unchanged. Otherwise cumulative-weight buckets are drawn repeatedly,
    /// skipping already-chosen indices, until `k` are collected or the
    /// attempt budget (`100 * k`) runs out; fewer than `k` results is a
    /// valid outcome, not an error.
    pub fn sample_indices(&mut self, weights: &[f64], k: usize) -> Vec<usize> {
        if weights.is_empty() || k == 0 {
            return Vec::new();
        }
        if weights.len() <= k {
            return (0..weights.len()).collect();
        }

        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total = 0.0;
        for weight in weights {
            total += weight.max(MIN_WEIGHT);
            cumulative.push(total);
        }

        let mut chosen: Vec<usize> = Vec::with_capacity(k);
        let max_attempts = k * ATTEMPTS_PER_ITEM;

        for _ in 0..max_attempts {
            if chosen.len() == k {
                break;
            }

            let draw = self.rng.gen_range(0.0..total);
            let index = cumulative
                .partition_point(|&bound| bound <= draw)
                .min(weights.len() - 1);

            if !chosen.contains(&index) {
                chosen.push(index);
            }
        }

        chosen
    }

    /// Shuffle a slice in place (reason ordering)
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_small_pool_returned_unchanged() {
        let mut sampler = WeightedSampler::with_seed(42);
        let weights = vec![5.0, 0.0, 12.5];

        assert_eq!(sampler.sample_indices(&weights, 3), vec![0, 1, 2]);
        assert_eq!(sampler.sample_indices(&weights, 10), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_inputs() {
        let mut sampler = WeightedSampler::with_seed(42);
        assert!(sampler.sample_indices(&[], 3).is_empty());
        assert!(sampler.sample_indices(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn test_draws_exactly_k_distinct() {
        let mut sampler = WeightedSampler::with_seed(42);
        let weights = vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0];

        let drawn = sampler.sample_indices(&weights, 3);
        assert_eq!(drawn.len(), 3);

        let distinct: HashSet<usize> = drawn.iter().copied().collect();
        assert_eq!(distinct.len(), 3);
        assert!(drawn.iter().all(|&i| i < weights.len()));
    }

    #[test]
    fn test_zero_weight_items_remain_reachable() {
        let mut sampler = WeightedSampler::with_seed(42);
        // Index 0 has zero score; the clamp keeps it drawable
        let weights = vec![0.0, 1.0, 1.0, 1.0];

        let mut seen_zero = false;
        for _ in 0..2000 {
            if sampler.sample_indices(&weights, 1) == vec![0] {
                seen_zero = true;
                break;
            }
        }
        assert!(seen_zero, "zero-weight item should still be sampled");
    }

    #[test]
    fn test_higher_weights_drawn_more_often() {
        let mut sampler = WeightedSampler::with_seed(42);
        let weights = vec![1.0, 99.0];

        let mut heavy = 0;
        for _ in 0..500 {
            if sampler.sample_indices(&weights, 1) == vec![1] {
                heavy += 1;
            }
        }
        assert!(heavy > 400, "expected heavy item most draws, got {}", heavy);
    }

    #[test]
    fn test_same_seed_same_order() {
        let weights = vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0];

        let a = WeightedSampler::with_seed(7).sample_indices(&weights, 4);
        let b = WeightedSampler::with_seed(7).sample_indices(&weights, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_preserves_elements() {
        let mut sampler = WeightedSampler::with_seed(42);
        let mut items = vec!["a", "b", "c", "d"];
        sampler.shuffle(&mut items);

        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["a", "b", "c", "d"]);
    }
}
