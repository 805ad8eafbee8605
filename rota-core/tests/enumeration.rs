//! Whole-run checks for the placement-phase enumeration.
//!
//! Counts below were cross-checked against an independent brute-force
//! count and must stay stable: any change means the search order, the
//! equivalence test or the key packing changed.

use rota_core::{enumerate, enumerate_all, Board, BoardKey, Color, Enumeration, Winners};

fn run_ab() -> Enumeration {
    enumerate(Color::A, Color::B).expect("A/B is a valid pairing")
}

fn depth_table(result: &Enumeration) -> Vec<(u64, u64)> {
    (1..=6)
        .map(|d| {
            let stats = result.stats().depth(d);
            (stats.candidates, stats.new_classes)
        })
        .collect()
}

#[test]
fn test_single_order_baseline() {
    let result = run_ab();
    let stats = result.stats();

    println!(
        "classes={} candidates={} exact={} rotated={}",
        result.len(),
        stats.candidates,
        stats.exact_duplicates,
        stats.rotation_duplicates
    );

    assert_eq!(result.len(), 290);
    assert_eq!(stats.candidates, 88_009);
    assert_eq!(stats.exact_duplicates, 5_790);
    assert_eq!(stats.rotation_duplicates, 81_932);
    assert_eq!(stats.collisions, 0);
    assert_eq!(
        depth_table(&result),
        vec![(17, 2), (128, 9), (840, 28), (4_704, 78), (21_840, 95), (60_480, 76)]
    );
}

#[test]
fn test_single_order_winners() {
    assert_eq!(
        run_ab().winners(),
        Winners {
            a: 30,
            b: 17,
            undecided: 243
        }
    );

    let swapped = enumerate(Color::B, Color::A).unwrap();
    assert_eq!(swapped.len(), 290);
    assert_eq!(
        swapped.winners(),
        Winners {
            a: 17,
            b: 30,
            undecided: 243
        }
    );
}

#[test]
fn test_both_orders_baseline() {
    let result = enumerate_all().unwrap();
    let stats = result.stats();

    assert_eq!(result.len(), 402);
    assert_eq!(stats.candidates, 176_018);
    assert_eq!(stats.collisions, 0);
    assert_eq!(
        depth_table(&result),
        vec![(34, 3), (256, 13), (1_680, 44), (9_408, 111), (43_680, 152), (120_960, 76)]
    );
    assert_eq!(
        result.winners(),
        Winners {
            a: 30,
            b: 32,
            undecided: 340
        }
    );
}

#[test]
fn test_discovery_order() {
    let result = enumerate_all().unwrap();
    let keys: Vec<BoardKey> = result.iter().take(3).map(|c| c.key()).collect();
    // Empty board, center A, center A with B on position 1.
    assert_eq!(keys, vec![BoardKey(0), BoardKey(0x10000), BoardKey(0x10002)]);
}

#[test]
fn test_no_anomalies() {
    let result = enumerate_all().unwrap();
    assert!(result.collisions().is_empty());
    assert_eq!(result.verify(), 0);
    assert_eq!(result.multi_member_classes(), 0);
    assert_eq!(result.member_count(), result.len());
}

#[test]
fn test_members_respect_turn_order() {
    let result = run_ab();
    let mut failures = Vec::new();

    for class in result.iter() {
        for board in class.members() {
            let a = board.count(Color::A);
            let b = board.count(Color::B);
            if a < b || a - b > 1 || a > 3 || b > 3 {
                failures.push(format!("{} (A={}, B={})", board, a, b));
            }
        }
    }

    assert!(failures.is_empty(), "unreachable boards: {:?}", &failures[..failures.len().min(10)]);
}

#[test]
fn test_keys_match_first_member() {
    let result = enumerate_all().unwrap();
    for class in result.iter() {
        assert_eq!(class.key(), class.representative().raw_key());
        assert_eq!(result.get(class.key()).map(|c| c.key()), Some(class.key()));
        assert_eq!(Board::from_key(class.key()).as_ref(), Ok(class.representative()));
    }
}

#[test]
fn test_representatives_pairwise_distinct() {
    let result = run_ab();
    let reps: Vec<&Board> = result.iter().map(|c| c.representative()).collect();

    for (i, a) in reps.iter().enumerate() {
        for b in &reps[i + 1..] {
            assert!(!a.is_equivalent(b), "{} and {} share a class", a, b);
        }
    }
}

#[test]
fn test_canonical_keys_unique_per_class() {
    let result = enumerate_all().unwrap();
    let mut canon: Vec<BoardKey> = result.iter().map(|c| c.representative().canonical_key()).collect();
    canon.sort_unstable();
    canon.dedup();
    assert_eq!(canon.len(), result.len());
}

#[test]
fn test_find_every_reading() {
    let result = run_ab();
    for class in result.iter().step_by(7) {
        for image in class.representative().symmetries() {
            let found = result.find(&image).expect("every reading is filed");
            assert_eq!(found.key(), class.key());
        }
    }
}

#[test]
fn test_deterministic() {
    let first = enumerate_all().unwrap();
    let second = enumerate_all().unwrap();

    assert_eq!(first.digest(), second.digest());
    assert_eq!(first.stats(), second.stats());
    let keys = |e: &Enumeration| e.iter().map(|c| (c.key(), c.len())).collect::<Vec<_>>();
    assert_eq!(keys(&first), keys(&second));
}

#[test]
fn test_digest_depends_on_order() {
    assert_ne!(run_ab().digest(), enumerate(Color::B, Color::A).unwrap().digest());
}

#[test]
fn test_invalid_players() {
    assert!(enumerate(Color::A, Color::A).is_err());
    assert!(enumerate(Color::Empty, Color::B).is_err());
}
