use fibcalc::config::PoolConfig;
use fibcalc::{checked_uint64, concurrent, concurrent_async, concurrent_in, sequential, uint64};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

// F(0)..=F(limit) by plain addition
fn iterative(limit: usize) -> Vec<BigUint> {
    let mut fibs = vec![BigUint::zero(), BigUint::one()];
    for i in 2..=limit {
        let next = &fibs[i - 1] + &fibs[i - 2];
        fibs.push(next);
    }
    fibs
}

#[test]
fn all_variants_exact_up_to_fixed_width_limit() {
    let expected = iterative(93);
    for n in 0..=93u8 {
        let want = &expected[n as usize];
        assert_eq!(BigUint::from(uint64(n)), *want, "uint64({n})");
        assert_eq!(sequential(n.into()), *want, "sequential({n})");
        assert_eq!(concurrent(n.into()), *want, "concurrent({n})");
    }
}

#[test]
fn big_variants_match_iteration_past_threshold() {
    let expected = iterative(600);
    for n in 94..=600 {
        assert_eq!(sequential(n as u64), expected[n], "sequential({n})");
    }
    for n in [94, 95, 96, 255, 256, 257, 511, 512, 600] {
        assert_eq!(concurrent(n as u64), expected[n], "concurrent({n})");
    }
}

#[test]
fn sequential_and_concurrent_agree_on_sampled_indices() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    for _ in 0..25 {
        let n = rng.gen_range(94..=10_000u64);
        assert_eq!(sequential(n), concurrent(n), "F({n})");
    }
}

#[test]
fn known_values() {
    for (n, want) in [
        (10u8, 55u64),
        (20, 6765),
        (30, 832040),
        (40, 102334155),
        (50, 12586269025),
    ] {
        assert_eq!(uint64(n), want);
        assert_eq!(sequential(n.into()), BigUint::from(want));
        assert_eq!(concurrent(n.into()), BigUint::from(want));
    }
}

#[test]
fn base_cases() {
    assert_eq!(uint64(0), 0);
    assert_eq!(uint64(1), 1);
    assert!(sequential(0).is_zero());
    assert!(sequential(1).is_one());
    assert!(concurrent(0).is_zero());
    assert!(concurrent(1).is_one());
}

#[test]
fn recurrence_across_threshold() {
    for n in 90..=96u64 {
        assert_eq!(sequential(n), sequential(n - 1) + sequential(n - 2), "F({n})");
    }
}

#[test]
fn threshold_continuity() {
    let f92 = sequential(92);
    let f93 = sequential(93);
    let f94 = sequential(94);
    assert_eq!(f93, BigUint::from(uint64(93)));
    assert_eq!(f94, &f92 + &f93);
    assert!(f94 > BigUint::from(u64::MAX));
}

#[test]
fn repeated_calls_are_identical() {
    let first = concurrent(5_000);
    for _ in 0..5 {
        assert_eq!(concurrent(5_000), first);
        assert_eq!(sequential(5_000), first);
    }
}

#[test]
fn fixed_width_out_of_range() {
    assert!(checked_uint64(94).is_err());
    let wrapped = sequential(120) % (BigUint::one() << 64u32);
    assert_eq!(BigUint::from(uint64(120)), wrapped);
}

#[test]
fn concurrent_on_dedicated_pool() {
    let pool = PoolConfig::default().num_threads(4).build().unwrap();
    for n in [0, 93, 94, 3_000] {
        assert_eq!(concurrent_in(&pool, n), sequential(n));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn async_variant_agrees() {
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..5 {
        let n = rng.gen_range(0..=4_000u64);
        assert_eq!(concurrent_async(n).await.unwrap(), sequential(n), "F({n})");
    }
}
