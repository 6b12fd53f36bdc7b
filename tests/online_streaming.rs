//! Streaming scenarios for the online selector family
//!
//! Exercises state lineages across repeated updates: growth bounds,
//! append-only guarantees, pure/destructive equivalence and defensive
//! rejection of mismatched state.

use ipsel::{
    select_with, update_in_place_with, update_with, AlgorithmConfig, Point, RBFKernel, SelectArgs,
    SelectionError, StreamKmeans, UniGrid, Webscale, OIPS, SeqDPP,
};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

fn uniform_batch(n: usize, center: (f64, f64), spread: f64, seed: u64) -> Vec<Point> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Point::new(vec![
                center.0 + (rng.gen::<f64>() - 0.5) * spread,
                center.1 + (rng.gen::<f64>() - 0.5) * spread,
            ])
        })
        .collect()
}

#[test]
fn test_oips_same_region_stays_within_kmax() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = AlgorithmConfig::from(OIPS::new(0.3).with_kmin(3).with_kmax(12));
    let mut rng = XorShiftRng::seed_from_u64(1);

    let batch_a = uniform_batch(40, (0.0, 0.0), 1.0, 10);
    let selection = select_with(&mut rng, &config, &batch_a, SelectArgs::new()).unwrap();
    let mut set = selection.set;
    let mut state = selection.state.unwrap();
    assert!(set.len() <= 12);
    let after_init = set.len();

    // Disjoint batch covering the same spatial region: little new coverage
    let batch_b = uniform_batch(40, (0.0, 0.0), 1.0, 11);
    update_in_place_with(&mut rng, &mut set, &mut state, &config, &batch_b, SelectArgs::new())
        .unwrap();
    assert!(set.len() <= 12);
    assert!(set.len() >= after_init, "OIPS must never silently shrink");
}

#[test]
fn test_oips_distant_region_accepted_up_to_kmax() {
    let config = AlgorithmConfig::from(OIPS::new(0.3).with_kmin(3).with_kmax(10));
    let mut rng = XorShiftRng::seed_from_u64(2);

    // Near-identical points: only the kmin floor admits anyone
    let batch_a = uniform_batch(30, (0.0, 0.0), 0.01, 20);
    let selection = select_with(&mut rng, &config, &batch_a, SelectArgs::new()).unwrap();
    let mut set = selection.set;
    let mut state = selection.state.unwrap();
    let before = set.len();
    assert_eq!(before, 3);

    // Far-away region: new points must be accepted until the cap
    let batch_b = uniform_batch(30, (100.0, 100.0), 0.01, 21);
    update_in_place_with(&mut rng, &mut set, &mut state, &config, &batch_b, SelectArgs::new())
        .unwrap();
    assert!(set.len() > before);
    assert!(set.len() <= 10);
}

#[test]
fn test_oips_growth_monotone_until_kmin() {
    let config = AlgorithmConfig::from(OIPS::new(0.5).with_kmin(6));
    let mut rng = XorShiftRng::seed_from_u64(3);
    // Fewer points than kmin: everything is admitted
    let tiny = uniform_batch(4, (0.0, 0.0), 0.1, 30);
    let selection = select_with(&mut rng, &config, &tiny, SelectArgs::new()).unwrap();
    assert_eq!(selection.set.len(), 4);

    let mut set = selection.set;
    let mut state = selection.state.unwrap();
    let more = uniform_batch(4, (0.0, 0.0), 0.1, 31);
    update_in_place_with(&mut rng, &mut set, &mut state, &config, &more, SelectArgs::new())
        .unwrap();
    assert!(set.len() >= 6, "growth below kmin must continue");
}

#[test]
fn test_oips_with_kernel_distance() {
    let kernel = RBFKernel::new(0.5);
    let config = AlgorithmConfig::from(OIPS::new(0.4).with_kmin(2).with_kmax(20));
    let mut rng = XorShiftRng::seed_from_u64(4);
    let batch = uniform_batch(30, (0.0, 0.0), 4.0, 40);
    let selection = select_with(
        &mut rng,
        &config,
        &batch,
        SelectArgs::new().with_kernel(&kernel),
    )
    .unwrap();
    assert!(selection.set.len() >= 2);
    assert!(selection.set.len() <= 20);
}

#[test]
fn test_seqdpp_never_shrinks_across_updates() {
    let kernel = RBFKernel::new(0.3);
    let config = AlgorithmConfig::from(SeqDPP::new());
    let mut rng = XorShiftRng::seed_from_u64(5);
    let args = SelectArgs::new().with_kernel(&kernel);

    let selection = select_with(&mut rng, &config, &uniform_batch(12, (0.0, 0.0), 2.0, 50), args)
        .unwrap();
    let mut set = selection.set;
    let mut state = selection.state.unwrap();

    let mut previous = set.to_points();
    for round in 0..5 {
        let batch = uniform_batch(10, (round as f64 * 8.0, 0.0), 2.0, 51 + round as u64);
        update_in_place_with(&mut rng, &mut set, &mut state, &config, &batch, args).unwrap();
        let current = set.to_points();
        assert!(current.len() >= previous.len());
        assert_eq!(&current[..previous.len()], &previous[..]);
        previous = current;
    }
}

#[test]
fn test_unigrid_box_extends_and_stays_lazy() {
    let config = AlgorithmConfig::from(UniGrid::new(5));
    let mut rng = XorShiftRng::seed_from_u64(6);
    let selection = select_with(
        &mut rng,
        &config,
        &uniform_batch(20, (0.0, 0.0), 2.0, 60),
        SelectArgs::new(),
    )
    .unwrap();
    let mut set = selection.set;
    let mut state = selection.state.unwrap();
    assert_eq!(set.len(), 25);

    let far = vec![Point::new(vec![50.0, -50.0])];
    update_in_place_with(&mut rng, &mut set, &mut state, &config, &far, SelectArgs::new())
        .unwrap();
    let grid = set.as_grid().expect("grid must stay lazy across updates");
    assert_eq!(set.len(), 25);
    assert!(grid.axes()[0].last().copied().unwrap() >= 50.0);
    assert!(grid.axes()[1].first().copied().unwrap() <= -50.0);
}

#[test]
fn test_streaming_kmeans_family_keeps_size() {
    let mut rng = XorShiftRng::seed_from_u64(7);
    for config in [
        AlgorithmConfig::from(StreamKmeans::new(6)),
        AlgorithmConfig::from(Webscale::new(6)),
    ] {
        let selection = select_with(
            &mut rng,
            &config,
            &uniform_batch(30, (0.0, 0.0), 2.0, 70),
            SelectArgs::new(),
        )
        .unwrap();
        let mut set = selection.set;
        let mut state = selection.state.unwrap();
        assert_eq!(set.len(), 6);

        for round in 0..4 {
            let batch = uniform_batch(25, (round as f64 * 3.0, 1.0), 2.0, 71 + round as u64);
            update_in_place_with(&mut rng, &mut set, &mut state, &config, &batch, SelectArgs::new())
                .unwrap();
            assert_eq!(set.len(), 6, "{} must keep its target size", config.name());
        }
    }
}

#[test]
fn test_webscale_centroids_follow_drift() {
    let config = AlgorithmConfig::from(Webscale::new(4));
    let mut rng = XorShiftRng::seed_from_u64(8);
    let selection = select_with(
        &mut rng,
        &config,
        &uniform_batch(20, (0.0, 0.0), 1.0, 80),
        SelectArgs::new(),
    )
    .unwrap();
    let mut set = selection.set;
    let mut state = selection.state.unwrap();

    for round in 0..10 {
        let batch = uniform_batch(20, (20.0, 20.0), 1.0, 81 + round as u64);
        update_in_place_with(&mut rng, &mut set, &mut state, &config, &batch, SelectArgs::new())
            .unwrap();
    }
    let drifted = set
        .iter()
        .map(|c| c.distance(&Point::new(vec![20.0, 20.0])))
        .fold(f64::INFINITY, f64::min);
    assert!(drifted < 5.0, "at least one centroid must track the stream");
}

#[test]
fn test_pure_update_leaves_inputs_untouched() {
    let config = AlgorithmConfig::from(OIPS::new(0.4).with_kmin(3));
    let mut rng = XorShiftRng::seed_from_u64(9);
    let selection = select_with(
        &mut rng,
        &config,
        &uniform_batch(15, (0.0, 0.0), 1.5, 90),
        SelectArgs::new(),
    )
    .unwrap();
    let state = selection.state.unwrap();
    let original = selection.set.to_points();

    let refreshed = update_with(
        &mut rng,
        &selection.set,
        &state,
        &config,
        &uniform_batch(15, (30.0, 30.0), 1.5, 91),
        SelectArgs::new(),
    )
    .unwrap();

    assert_eq!(selection.set.to_points(), original);
    assert!(refreshed.set.len() >= original.len());
    assert!(refreshed.state.is_some());
}

#[test]
fn test_foreign_state_shape_rejected() {
    let mut rng = XorShiftRng::seed_from_u64(10);
    let config = AlgorithmConfig::from(Webscale::new(5));
    let first = select_with(
        &mut rng,
        &config,
        &uniform_batch(20, (0.0, 0.0), 1.0, 100),
        SelectArgs::new(),
    )
    .unwrap();
    let second = select_with(
        &mut rng,
        &AlgorithmConfig::from(Webscale::new(7)),
        &uniform_batch(20, (0.0, 0.0), 1.0, 101),
        SelectArgs::new(),
    )
    .unwrap();

    // Pair the first set with the second lineage's state
    let result = update_with(
        &mut rng,
        &first.set,
        &second.state.unwrap(),
        &config,
        &uniform_batch(5, (0.0, 0.0), 1.0, 102),
        SelectArgs::new(),
    );
    assert!(matches!(result, Err(SelectionError::StateMismatch(_))));
}
