use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use searchinator_core::{DelayRange, RangeError};

#[test]
fn samples_stay_within_inclusive_bounds() {
    let range = DelayRange::from_secs(1.0, 3.0).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..1_000 {
        let d = range.sample(&mut rng);
        assert!(d >= Duration::from_secs(1) && d <= Duration::from_secs(3), "{d:?}");
    }
}

#[test]
fn degenerate_range_always_returns_the_bound() {
    let range = DelayRange::from_secs(0.5, 0.5).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(range.sample(&mut rng), Duration::from_millis(500));
    assert_eq!(DelayRange::zero().sample(&mut rng), Duration::ZERO);
}

#[test]
fn invalid_ranges_are_rejected() {
    assert!(matches!(
        DelayRange::from_secs(3.0, 1.0),
        Err(RangeError::Inverted { .. })
    ));
    assert!(matches!(
        DelayRange::from_secs(-1.0, 1.0),
        Err(RangeError::Invalid { .. })
    ));
    assert!(matches!(
        DelayRange::from_secs(0.0, f64::INFINITY),
        Err(RangeError::Invalid { .. })
    ));
}

#[test]
fn default_matches_cli_defaults() {
    let range = DelayRange::default();
    assert_eq!(range.min(), Duration::from_secs(1));
    assert_eq!(range.max(), Duration::from_secs(3));
}

#[test]
fn delays_beyond_duration_range_are_rejected() {
    assert!(matches!(
        DelayRange::from_secs(1.0, 1e20),
        Err(RangeError::TooLong(secs)) if secs == 1e20
    ));
    assert!(matches!(
        DelayRange::from_secs(1e20, 1e21),
        Err(RangeError::TooLong(_))
    ));

    let long = DelayRange::from_secs(0.0, 1e9).unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    assert!(long.sample(&mut rng) <= Duration::from_secs(1_000_000_000));
}
