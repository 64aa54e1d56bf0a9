mod common;
use common::*;

use platescan::config::ChainLimits;
use platescan::detection::chains::{
    CharacterChain, angle_between, compatible, distance_between, find_chains, find_matches,
    longest_chain,
};
use std::collections::HashSet;

fn limits() -> ChainLimits {
    ChainLimits::default()
}

#[test]
fn test_distance_and_angle() {
    let a = centered_candidate(100, 100, 10, 40);
    let b = centered_candidate(130, 140, 10, 40);

    assert!((distance_between(&a, &b) - 50.0).abs() < 1e-9);
    assert!((angle_between(&a, &b) - (40.0f64 / 30.0).atan().to_degrees()).abs() < 1e-9);
    assert_eq!(angle_between(&a, &b), angle_between(&b, &a));
}

#[test]
fn test_vertical_neighbours_are_never_compatible() {
    let a = centered_candidate(100, 100, 10, 40);
    let above = centered_candidate(100, 60, 10, 40);
    let same = centered_candidate(100, 100, 10, 40);

    assert_eq!(angle_between(&a, &above), 90.0);
    assert_eq!(angle_between(&a, &same), 90.0);
    assert!(!compatible(&a, &above, &limits()));
    assert!(!compatible(&a, &same, &limits()));
}

#[test]
fn test_compatible_neighbours() {
    let a = centered_candidate(100, 100, 12, 40);
    let b = centered_candidate(140, 104, 12, 42);
    assert!(compatible(&a, &b, &limits()));
}

#[test]
fn test_each_tolerance_rejects() {
    let a = centered_candidate(100, 100, 12, 40);
    let far = centered_candidate(100 + 250, 100, 12, 40);
    let steep = centered_candidate(140, 110, 12, 40);
    let tall = centered_candidate(140, 100, 12, 50);
    let wide = centered_candidate(140, 100, 24, 40);

    assert!(!compatible(&a, &far, &limits()));
    assert!(!compatible(&a, &steep, &limits()));
    assert!(!compatible(&a, &tall, &limits()));
    assert!(!compatible(&a, &wide, &limits()));
}

#[test]
fn test_compatibility_is_asymmetric() {
    // height change 8/40 = 0.2 from a, 8/48 < 0.2 from b
    let a = centered_candidate(100, 100, 10, 40);
    let b = centered_candidate(130, 100, 10, 48);

    assert!(!compatible(&a, &b, &limits()));
    assert!(compatible(&b, &a, &limits()));
}

#[test]
fn test_find_matches_excludes_anchor() {
    let candidates = vec![
        centered_candidate(100, 100, 12, 40),
        centered_candidate(130, 100, 12, 40),
        centered_candidate(160, 100, 12, 40),
    ];
    let pool: Vec<usize> = (0..candidates.len()).collect();

    assert_eq!(find_matches(&candidates, 1, &pool, &limits()), vec![0, 2]);
}

#[test]
fn test_single_chain_puts_anchor_last() {
    let candidates = vec![
        centered_candidate(100, 100, 12, 40),
        centered_candidate(130, 100, 12, 40),
        centered_candidate(160, 100, 12, 40),
    ];

    let chains = find_chains(&candidates, &limits());

    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].indices(), &[1, 2, 0]);
    assert_eq!(chains[0].anchor().unwrap().center_x(), 100);
}

#[test]
fn test_fewer_than_three_gives_nothing() {
    let pair = vec![centered_candidate(100, 100, 12, 40), centered_candidate(130, 100, 12, 40)];
    assert!(find_chains(&pair, &limits()).is_empty());

    // three candidates, but no two compatible
    let scattered = vec![
        centered_candidate(100, 100, 12, 40),
        centered_candidate(100, 180, 12, 40),
        centered_candidate(400, 100, 12, 40),
    ];
    assert!(find_chains(&scattered, &limits()).is_empty());
    assert!(find_chains(&[], &limits()).is_empty());
}

#[test]
fn test_separate_groups_become_separate_chains() {
    let candidates = vec![
        // small glyphs on the left
        centered_candidate(50, 50, 10, 30),
        centered_candidate(70, 50, 10, 30),
        centered_candidate(90, 50, 10, 30),
        // noise
        centered_candidate(300, 20, 3, 3),
        // larger glyphs far to the right
        centered_candidate(600, 300, 20, 60),
        centered_candidate(640, 300, 20, 60),
        centered_candidate(680, 300, 20, 60),
        centered_candidate(720, 300, 20, 60),
    ];

    let chains = find_chains(&candidates, &limits());

    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].len(), 3);
    assert_eq!(chains[1].len(), 4);
}

#[test]
fn test_chains_partition_the_input() {
    let candidates = vec![
        centered_candidate(50, 50, 10, 30),
        centered_candidate(70, 52, 10, 31),
        centered_candidate(90, 50, 11, 30),
        centered_candidate(110, 51, 10, 29),
        centered_candidate(300, 20, 3, 3),
        centered_candidate(600, 300, 20, 60),
        centered_candidate(640, 300, 20, 60),
        centered_candidate(680, 301, 21, 60),
        centered_candidate(60, 250, 14, 44),
    ];

    let chains = find_chains(&candidates, &limits());

    let mut seen = HashSet::new();
    let mut total = 0;
    for chain in &chains {
        assert!(chain.len() >= 3);
        for &i in chain.indices() {
            assert!(i < candidates.len());
            assert!(seen.insert(i), "candidate {} is in two chains", i);
            total += 1;
        }
    }
    assert!(total <= candidates.len());
}

#[test]
fn test_result_depends_on_input_order() {
    // heights 40, 48, 48, 40, 56 share a centre line
    let a = centered_candidate(0, 100, 10, 40);
    let b = centered_candidate(20, 100, 10, 48);
    let c = centered_candidate(40, 100, 10, 48);
    let d = centered_candidate(60, 100, 10, 40);
    let e = centered_candidate(80, 100, 10, 56);

    // b anchors first and takes everyone
    let b_first = vec![b.clone(), a.clone(), c.clone(), d.clone(), e.clone()];
    let chains = find_chains(&b_first, &limits());
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].len(), 5);

    // e anchors first and only reaches b and c; a and d are left over
    let e_first = vec![e, a, b, c, d];
    let chains = find_chains(&e_first, &limits());
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].indices(), &[2, 3, 0]);
}

#[test]
fn test_min_chain_len_is_configurable() {
    let pair = vec![centered_candidate(100, 100, 12, 40), centered_candidate(130, 100, 12, 40)];
    let relaxed = ChainLimits {
        min_chain_len: 2,
        ..ChainLimits::default()
    };

    assert_eq!(find_chains(&pair, &relaxed).len(), 1);
}

#[test]
fn test_longest_chain_prefers_first_on_tie() {
    let candidates: Vec<_> = (0..11).map(|i| centered_candidate(i * 30, 100, 12, 40)).collect();
    let chains = vec![
        CharacterChain::new(&candidates, vec![0, 1, 2]),
        CharacterChain::new(&candidates, vec![3, 4, 5, 6]),
        CharacterChain::new(&candidates, vec![7, 8, 9, 10]),
    ];

    let longest = longest_chain(&chains).unwrap();
    assert_eq!(longest.indices(), &[3, 4, 5, 6]);
    assert!(longest_chain(&[]).is_none());
}

#[test]
fn test_sort_orders() {
    let candidates = vec![
        centered_candidate(60, 100, 12, 40),
        centered_candidate(20, 100, 12, 40),
        centered_candidate(40, 100, 12, 40),
    ];
    let chain = CharacterChain::new(&candidates, vec![0, 1, 2]);

    let ltr: Vec<i32> = chain.sorted_left_to_right().iter().map(|c| c.center_x()).collect();
    let rtl: Vec<i32> = chain.sorted_right_to_left().iter().map(|c| c.center_x()).collect();

    assert_eq!(ltr, vec![20, 40, 60]);
    assert_eq!(rtl, vec![60, 40, 20]);
}
