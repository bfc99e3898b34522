//! Dice engine tests through the public API

use std::sync::Arc;
use std::thread;

use skirmish::dice::{DiceError, ScriptedDice};
use skirmish::{Config, Dice};

#[test]
fn test_roll_bounds() {
    let dice = Dice::seeded(1);
    for _ in 0..500 {
        let total = dice.roll_multiple(3, 6).unwrap();
        assert!((3..=18).contains(&total), "3d6 gave {}", total);
    }
    for _ in 0..500 {
        let total = dice.parse("3d6+2").unwrap();
        assert!((5..=20).contains(&total), "3d6+2 gave {}", total);
        let total = dice.parse("d20").unwrap();
        assert!((1..=20).contains(&total), "d20 gave {}", total);
    }
}

#[test]
fn test_malformed_notation_leaves_log_alone() {
    let dice = Dice::seeded(2);
    dice.parse("1d4").unwrap();
    let before = dice.recent_rolls(10);

    for bad in ["5x6", "", "d", "2d", "1d6+", "abc"] {
        assert!(
            matches!(dice.parse(bad), Err(DiceError::InvalidNotation(_))),
            "{:?} should be rejected",
            bad
        );
    }
    assert_eq!(dice.recent_rolls(10), before);
}

#[test]
fn test_invalid_dice_rejected() {
    let dice = Dice::seeded(3);
    assert!(matches!(dice.roll(0), Err(DiceError::InvalidDie { .. })));
    assert!(matches!(dice.roll_multiple(0, 6), Err(DiceError::InvalidDie { .. })));
    assert!(matches!(dice.roll_multiple(2, -4), Err(DiceError::InvalidDie { .. })));
    assert_eq!(dice.history_size(), 0);
}

#[test]
fn test_advantage_and_disadvantage() {
    let dice = Dice::scripted([7, 15, 7, 15]);
    assert_eq!(dice.roll_with_advantage(), 15);
    assert_eq!(dice.roll_with_disadvantage(), 7);

    let log = dice.recent_rolls(2);
    assert_eq!(log[0].formula, "2d20 advantage");
    assert_eq!(log[0].dice, vec![7, 15]);
    assert_eq!(log[1].formula, "2d20 disadvantage");
}

#[test]
fn test_dc_checks() {
    let dice = Dice::scripted([10, 20, 1]);
    assert!(dice.check_against_dc(2, 12), "10+2 meets DC 12");

    let crit = dice.check(-5, 30);
    assert_eq!(crit.natural, 20);
    assert!(!crit.success, "a natural 20 does not override the DC");
    assert!(dice.last_roll().unwrap().formula.contains("natural 20"));

    let fumble = dice.check(10, 5);
    assert!(fumble.success, "a natural 1 does not override the DC");
    assert!(dice.last_roll().unwrap().formula.contains("natural 1"));
}

#[test]
fn test_history_caps_and_keeps_counting() {
    let dice = Dice::with_source(ScriptedDice::new([]).with_fallback(4), 3);
    for _ in 0..5 {
        dice.roll(6).unwrap();
    }
    assert_eq!(dice.history_size(), 3);
    let seqs: Vec<u64> = dice.recent_rolls(10).iter().map(|r| r.sequence).collect();
    assert_eq!(seqs, vec![3, 4, 5]);

    dice.clear_history();
    assert_eq!(dice.history_size(), 0);
    dice.roll(6).unwrap();
    assert_eq!(dice.last_roll().unwrap().sequence, 6);
}

#[test]
fn test_shared_engine_across_threads() {
    let dice = Arc::new(Config::default().dice());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dice = dice.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let total = dice.parse("2d8+1").unwrap();
                    assert!((3..=17).contains(&total));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(dice.history_size(), 400);

    let mut seqs: Vec<u64> = dice.recent_rolls(400).iter().map(|r| r.sequence).collect();
    seqs.dedup();
    assert_eq!(seqs.len(), 400, "sequence numbers are unique");
}
