use proptest::prelude::*;
use rust_swarmsim::scenarios::cohesion::{cohesion_factor, collision_factor};
use rust_swarmsim::scenarios::go_to_position::{
    collision_penalty, shaped_progress, spacing_score,
};

proptest! {
    // The shaped goal reward is exactly (previous scaled distance - current
    // scaled distance), and the returned buffer value is the current scaled
    // distance.
    #[test]
    fn shaped_progress_is_the_distance_delta(
        prev in 0.0f32..50.0,
        dist in 0.0f32..5.0,
        shaping in 0.1f32..20.0,
    ) {
        let (rew, shaped) = shaped_progress(prev, dist, shaping);
        prop_assert!((shaped - dist * shaping).abs() < 1e-4);
        prop_assert!((rew - (prev - dist * shaping)).abs() < 1e-4);
    }

    // The spacing score is symmetric under reordering of the other agents.
    #[test]
    fn spacing_score_is_permutation_symmetric(
        mut dists in proptest::collection::vec(0.0f32..3.0, 1..10),
        desired in 0.01f32..1.0,
        rotate in 0usize..10,
    ) {
        let original = spacing_score(&dists, desired);
        let len = dists.len();
        dists.rotate_left(rotate % len);
        dists.reverse();
        let reordered = spacing_score(&dists, desired);
        prop_assert!((original - reordered).abs() < 1e-5);
    }

    // The spacing score is zero exactly when every pairwise distance equals
    // the desired distance, and positive otherwise.
    #[test]
    fn spacing_score_zero_only_at_target(
        n in 1usize..8,
        desired in 0.01f32..1.0,
        off in 0.01f32..0.5,
    ) {
        let at_target = vec![desired; n];
        prop_assert_eq!(spacing_score(&at_target, desired), 0.0);

        let mut perturbed = vec![desired; n];
        perturbed[0] = desired + off;
        prop_assert!(spacing_score(&perturbed, desired) > 0.0);
    }

    // The collision penalty contributes the fixed penalty exactly once per
    // distance at or below the threshold.
    #[test]
    fn collision_penalty_counts_offenders(
        below in proptest::collection::vec(0.0f32..0.005, 0..6),
        above in proptest::collection::vec(0.0051f32..2.0, 0..6),
        penalty in -10.0f32..-0.1,
    ) {
        let mut dists = below.clone();
        dists.extend_from_slice(&above);
        let expected = below.len() as f32 * penalty;
        prop_assert!((collision_penalty(&dists, 0.005, penalty) - expected).abs() < 1e-5);
    }

    // Collision factor: 0 beyond sigma, exp(-min/sigma) at or below.
    #[test]
    fn collision_factor_regimes(min in 0.0f32..2.0, sigma in 0.01f32..0.5) {
        let v = collision_factor(min, sigma);
        if min > sigma {
            prop_assert_eq!(v, 0.0);
        } else {
            prop_assert!((v - (-(min / sigma)).exp()).abs() < 1e-6);
            prop_assert!(v > 0.0 && v <= 1.0);
        }
    }

    // Cohesion factor: 0 inside sigma, else negative proportional to
    // (max - sigma).
    #[test]
    fn cohesion_factor_regimes(
        min in 0.0f32..2.0,
        extra in 0.0f32..2.0,
        sigma in 0.01f32..0.5,
    ) {
        let max = min + extra;
        let v = cohesion_factor(min, max, sigma);
        if min < sigma {
            prop_assert_eq!(v, 0.0);
        } else {
            prop_assert!((v + (max - sigma)).abs() < 1e-6);
        }
    }

    // Collision decays with distance: closer minimums never score lower.
    #[test]
    fn collision_factor_monotone(a in 0.0f32..0.5, b in 0.0f32..0.5, sigma in 0.01f32..0.5) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(collision_factor(lo, sigma) >= collision_factor(hi, sigma));
    }
}
