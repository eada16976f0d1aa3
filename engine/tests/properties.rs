use engine::{
    attackers_per_hit, hit_chance, resolve, simulate_hits, AdMode, AttackBatch, Dice, LookupPolicy,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn simulated_hits_stay_within_bounds(
        attacks in 0u32..200,
        armor_class in -40i32..80,
        to_hit in -40i32..80,
        advantage in any::<bool>(),
        disadvantage in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let mut batch = AttackBatch::new(attacks, armor_class, to_hit);
        batch.advantage = advantage;
        batch.disadvantage = disadvantage;
        let mut dice = Dice::from_seed(seed);
        let res = simulate_hits(&mut dice, &batch);
        let crits = res.critical_hits().unwrap();
        prop_assert!(res.hits() <= attacks);
        prop_assert!(crits <= res.hits());
    }

    #[test]
    fn table_estimate_is_deterministic_floor_division(
        attacks in 0u32..10_000,
        roll_needed in 1i32..=20,
        to_hit in -10i32..15,
        seed_a in any::<u64>(),
        seed_b in any::<u64>(),
    ) {
        let batch = AttackBatch::new(attacks, roll_needed + to_hit, to_hit).approximate();
        let a = resolve(&mut Dice::from_seed(seed_a), &batch, LookupPolicy::Strict).unwrap();
        let b = resolve(&mut Dice::from_seed(seed_b), &batch, LookupPolicy::Strict).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(a.hits(), attacks / attackers_per_hit(roll_needed).unwrap());
    }

    #[test]
    fn hit_chance_is_a_probability(armor_class in -50i32..80, to_hit in -50i32..80) {
        for mode in [AdMode::Normal, AdMode::Advantage, AdMode::Disadvantage] {
            let p = hit_chance(armor_class, to_hit, mode);
            prop_assert!((0.002..=0.998).contains(&p), "p={}", p);
        }
    }
}
