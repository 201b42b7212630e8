use rand::{SeedableRng, rngs::StdRng};

use super::*;
use crate::testing::{component, doll_config};

#[test]
fn key_joins_indices_with_pipe() {
    assert_eq!(Combination::new(vec![1, 12, 0]).key(), "1|12|0");
    assert_ne!(
        Combination::new(vec![1, 12]).key(),
        Combination::new(vec![11, 2]).key()
    );
}

#[test]
fn never_repeats_within_one_set() {
    let config = doll_config();
    let generator = CombinationGenerator::default();
    let mut generated = GeneratedSet::new();
    let mut rng = StdRng::seed_from_u64(11);

    let mut seen = HashSet::new();
    while let Some(c) = generator
        .generate(&config.components, &mut generated, None, &mut rng)
        .unwrap()
    {
        assert!(seen.insert(c.key()), "repeated {}", c.key());
    }
    assert!(seen.len() <= 4);
    assert_eq!(generated.len(), seen.len());
}

#[test]
fn exhaustive_fallback_fills_the_whole_space() {
    let components = vec![
        component("A", "a", &[(None, 1), (None, 5), (None, 1)]),
        component("B", "b", &[(None, 9), (None, 1)]),
        component("C", "c", &[(None, 1), (None, 1)]),
    ];
    let generator = CombinationGenerator {
        exhaustive_fallback: true,
        ..CombinationGenerator::default()
    };
    let mut generated = GeneratedSet::new();
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..12 {
        let c = generator
            .generate(&components, &mut generated, None, &mut rng)
            .unwrap();
        assert!(c.is_some());
    }
    assert_eq!(generated.len(), 12);

    let extra = generator
        .generate(&components, &mut generated, None, &mut rng)
        .unwrap();
    assert!(extra.is_none());
}

#[test]
fn exhaustive_scan_resumes_where_it_stopped() {
    let config = doll_config();
    let generator = CombinationGenerator {
        max_attempts: 0,
        exhaustive_fallback: true,
    };
    let mut generated = GeneratedSet::new();
    generated.insert(&Combination::new(vec![1, 0]));
    let mut rng = StdRng::seed_from_u64(1);

    let mut order = vec![];
    while let Some(c) = generator
        .generate(&config.components, &mut generated, None, &mut rng)
        .unwrap()
    {
        order.push(c.parts().to_vec());
    }
    assert_eq!(order, vec![vec![0, 0], vec![0, 1], vec![1, 1]]);
    assert_eq!(generated.len(), 4);
    assert!(
        generator
            .generate(&config.components, &mut generated, None, &mut rng)
            .unwrap()
            .is_none()
    );
}

#[test]
fn exhausted_pool_reports_none_available() {
    let components = vec![component("Only", "only", &[(None, 1)])];
    let generator = CombinationGenerator::default();
    let mut generated = GeneratedSet::new();
    let mut rng = StdRng::seed_from_u64(2);

    let first = generator
        .generate(&components, &mut generated, None, &mut rng)
        .unwrap();
    assert_eq!(first, Some(Combination::new(vec![0])));
    let second = generator
        .generate(&components, &mut generated, None, &mut rng)
        .unwrap();
    assert!(second.is_none());
}

#[test]
fn hook_replacement_is_used() {
    let config = doll_config();
    let generator = CombinationGenerator::default();
    let mut generated = GeneratedSet::new();
    let mut rng = StdRng::seed_from_u64(4);
    let hook = |_: &[usize]| -> Option<Vec<usize>> { Some(vec![1, 0]) };

    let c = generator
        .generate(&config.components, &mut generated, Some(&hook), &mut rng)
        .unwrap();
    assert_eq!(c, Some(Combination::new(vec![1, 0])));

    let again = generator
        .generate(&config.components, &mut generated, Some(&hook), &mut rng)
        .unwrap();
    assert!(again.is_none(), "hook forces a duplicate on every attempt");
}

#[test]
fn hook_returning_none_keeps_sample() {
    let config = doll_config();
    let mut generated = GeneratedSet::new();
    let mut rng = StdRng::seed_from_u64(4);
    let hook = |_: &[usize]| -> Option<Vec<usize>> { None };

    let c = CombinationGenerator::default()
        .generate(&config.components, &mut generated, Some(&hook), &mut rng)
        .unwrap()
        .unwrap();
    assert_eq!(c.parts().len(), 2);
}

#[test]
fn malformed_hook_output_is_config_error() {
    let config = doll_config();
    let mut generated = GeneratedSet::new();
    let mut rng = StdRng::seed_from_u64(4);

    let short = |_: &[usize]| -> Option<Vec<usize>> { Some(vec![0]) };
    let err = CombinationGenerator::default()
        .generate(&config.components, &mut generated, Some(&short), &mut rng)
        .unwrap_err();
    assert!(matches!(err, DollError::Config(_)));

    let out_of_range = |_: &[usize]| -> Option<Vec<usize>> { Some(vec![0, 7]) };
    assert!(
        CombinationGenerator::default()
            .generate(
                &config.components,
                &mut generated,
                Some(&out_of_range),
                &mut rng,
            )
            .is_err()
    );
}

#[test]
fn sequential_mode_wraps_per_component() {
    let components = vec![
        component("A", "a", &[(None, 1), (None, 1), (None, 1)]),
        component("B", "b", &[(None, 1), (None, 1)]),
    ];
    assert_eq!(sequential_combination(&components, 4).parts(), &[1, 0]);

    let all = sequential_combinations(&components, 3);
    let parts: Vec<&[usize]> = all.iter().map(Combination::parts).collect();
    assert_eq!(parts, vec![&[0, 0][..], &[1, 1][..], &[2, 0][..]]);
}

#[test]
fn replay_requires_valid_parts() {
    let config = doll_config();
    let record = |parts: Option<Vec<usize>>| Metadata {
        name: "x".to_string(),
        description: String::new(),
        image: String::new(),
        id: None,
        source: None,
        parts,
        attributes: None,
    };

    let replayed =
        replay_combinations(&config.components, &[record(Some(vec![1, 0]))]).unwrap();
    assert_eq!(replayed, vec![Combination::new(vec![1, 0])]);

    assert!(replay_combinations(&config.components, &[record(None)]).is_err());
    assert!(replay_combinations(&config.components, &[record(Some(vec![2, 0]))]).is_err());
}
