//! Search-level properties: determinism, order independence, deadline
//! respect, failure isolation and empty input.
//!
//! Run with: `cargo test --test search_properties`

mod common;

use common::{finder, record, Script, ScriptedCollector};
use person_finder::collector::CollectorOutcome;
use person_finder::search::{merge, rank, CanonicalProfile, IdentityKey};
use person_finder::{generate, SearchConfig};
use rand::seq::SliceRandom;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use uuid::Uuid;

#[test]
fn test_generate_is_deterministic() {
    for name in ["Jordan Lee", "  ana  maría  de la cruz ", "X Æ A-12", "O'Neil"] {
        let first = generate(name, Some("Austin, TX"), Some("Acme"));
        let second = generate(name, Some("Austin, TX"), Some("Acme"));
        assert_eq!(first, second);
        assert!(!first.is_empty());
        assert!(first.len() <= person_finder::query::MAX_QUERIES);
    }
}

/// Singleton ids are fresh on every merge; blank them so profiles compare
/// by content, then put them in ranked order.
fn normalize(profiles: Vec<CanonicalProfile>) -> Vec<CanonicalProfile> {
    let profiles = profiles
        .into_iter()
        .map(|mut profile| {
            profile.provenance.clear();
            if profile.key.is_singleton() {
                profile.key = IdentityKey::Singleton { id: Uuid::nil() };
            }
            profile
        })
        .collect();
    rank(profiles, 0.0)
}

#[test]
fn test_merge_is_order_independent() {
    let mut records = Vec::new();
    for i in 0..40u64 {
        let source = if i % 3 == 0 { "linkedin" } else { "instagram" };
        let key = format!("user{}", i % 7);
        records.push(
            record(source, &key, (i % 10) as f64 / 10.0)
                .with_bio(format!("bio variant {}", i % 4))
                .with_counts(i * 13 % 50, i % 9, i)
                .with_flags(i % 11 == 0, false)
                .with_provenance(format!("query {}", i)),
        );
    }
    for i in 0..6u64 {
        records.push(
            record("directory", "", 0.5)
                .with_bio(format!("listing {}", i % 3))
                .with_location("Austin, TX"),
        );
    }

    let expected = normalize(merge(&records));
    assert_eq!(expected.len(), 20);
    assert_eq!(expected.iter().filter(|p| p.key.is_singleton()).count(), 6);

    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        records.shuffle(&mut rng);
        assert_eq!(normalize(merge(&records)), expected);
    }
}

#[tokio::test]
async fn test_duplicates_merge_to_max_counts_and_confidence() {
    let a = record("instagram", "jordanlee", 0.8).with_counts(100, 0, 0);
    let b = record("instagram", "jordanlee", 0.5).with_counts(120, 0, 0);

    let result = finder(
        vec![
            ScriptedCollector::new("a", Script::Records(vec![a])),
            ScriptedCollector::new("b", Script::Records(vec![b])),
        ],
        SearchConfig::default(),
    )
    .search("Jordan Lee", None, None, Duration::from_secs(5))
    .await;

    assert_eq!(result.profiles.len(), 1);
    assert_eq!(result.profiles[0].confidence, 0.8);
    assert_eq!(result.profiles[0].followers, 120);
    assert_eq!(result.profiles[0].evidence, 2);
    assert_eq!(result.confidence(), 0.8);
}

#[tokio::test]
async fn test_search_respects_deadline() {
    let finder = finder(
        vec![
            ScriptedCollector::new("hang-1", Script::Hang),
            ScriptedCollector::new("hang-2", Script::Hang),
            ScriptedCollector::new(
                "quick",
                Script::Records(vec![record("instagram", "jordanlee", 0.9)]),
            ),
        ],
        SearchConfig::default(),
    );

    let started = Instant::now();
    let result = finder
        .search("Jordan Lee", None, None, Duration::from_millis(200))
        .await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(190), "returned early: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(700), "overran deadline: {:?}", elapsed);
    assert_eq!(result.report("hang-1").unwrap().outcome, CollectorOutcome::PartialTimeout);
    assert_eq!(result.report("hang-2").unwrap().outcome, CollectorOutcome::PartialTimeout);
    assert!(result.report("quick").unwrap().outcome.is_completed());
    assert_eq!(result.profiles.len(), 1);
}

#[tokio::test]
async fn test_queued_collectors_past_deadline_are_not_admitted() {
    let late = ScriptedCollector::new("late", Script::Records(vec![]));
    let late_calls = late.calls();
    let finder = finder(
        vec![ScriptedCollector::new("hang", Script::Hang), late],
        SearchConfig::new().with_max_in_flight(1),
    );

    let result = finder
        .search("Jordan Lee", None, None, Duration::from_millis(100))
        .await;

    let report = result.report("late").unwrap();
    assert_eq!(report.outcome, CollectorOutcome::PartialTimeout);
    assert!(!report.admitted);
    assert_eq!(late_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failures_are_isolated() {
    let result = finder(
        vec![
            ScriptedCollector::new("blocked", Script::Fail("captcha wall".into())),
            ScriptedCollector::new("crashes", Script::Panic),
            ScriptedCollector::new(
                "slow-but-fine",
                Script::Delayed(
                    Duration::from_millis(30),
                    vec![record("linkedin", "jordan-lee", 0.7)],
                ),
            ),
            ScriptedCollector::new(
                "fine",
                Script::Records(vec![record("instagram", "jordanlee", 0.9)]),
            ),
        ],
        SearchConfig::default(),
    )
    .search("Jordan Lee", None, None, Duration::from_secs(5))
    .await;

    assert_eq!(result.failed_collectors().count(), 2);
    assert!(result.report("blocked").unwrap().outcome.is_failed());
    assert_eq!(
        result.report("crashes").unwrap().outcome,
        CollectorOutcome::Failed("collector panicked".into())
    );
    assert_eq!(result.profiles.len(), 2);
    assert_eq!(result.profiles[0].source, "instagram");
    assert_eq!(result.profiles[1].source, "linkedin");
}

#[tokio::test]
async fn test_empty_inputs_give_empty_results() {
    let empty_name = finder(
        vec![ScriptedCollector::new(
            "a",
            Script::Records(vec![record("instagram", "jordanlee", 0.9)]),
        )],
        SearchConfig::default(),
    )
    .search("", None, None, Duration::from_secs(1))
    .await;
    assert!(empty_name.profiles.is_empty());
    assert_eq!(empty_name.confidence(), 0.0);

    let all_failing = finder(
        vec![
            ScriptedCollector::new("a", Script::Fail("down".into())),
            ScriptedCollector::new("b", Script::Fail("down".into())),
        ],
        SearchConfig::default(),
    )
    .search("Jordan Lee", None, None, Duration::from_secs(1))
    .await;
    assert!(all_failing.profiles.is_empty());
    assert_eq!(all_failing.confidence(), 0.0);
    assert_eq!(all_failing.collectors.len(), 2);
}

#[tokio::test]
async fn test_output_order_is_deterministic() {
    let records = vec![
        record("twitter", "jlee", 0.5),
        record("instagram", "jlee", 0.5),
        record("instagram", "jordanlee", 0.9),
        record("facebook", "jordan.lee", 0.5),
    ];

    let mut orders = Vec::new();
    for split in 0..records.len() {
        let (left, right) = records.split_at(split);
        let result = finder(
            vec![
                ScriptedCollector::new("left", Script::Delayed(Duration::from_millis(10), left.to_vec())),
                ScriptedCollector::new("right", Script::Records(right.to_vec())),
            ],
            SearchConfig::default(),
        )
        .search("Jordan Lee", None, None, Duration::from_secs(5))
        .await;

        let order: Vec<String> = result
            .profiles
            .iter()
            .map(|p| format!("{}:{}", p.source, p.stable_key))
            .collect();
        orders.push(order);
    }

    assert_eq!(
        orders[0],
        vec![
            "instagram:jordanlee",
            "facebook:jordan.lee",
            "instagram:jlee",
            "twitter:jlee"
        ]
    );
    assert!(orders.iter().all(|o| o == &orders[0]));
}

#[tokio::test]
async fn test_unbounded_deadline_returns_result() {
    let result = finder(
        vec![ScriptedCollector::new(
            "a",
            Script::Records(vec![record("instagram", "jordanlee", 0.9)]),
        )],
        SearchConfig::default(),
    )
    .search("Jordan Lee", None, None, Duration::MAX)
    .await;

    assert_eq!(result.profiles.len(), 1);
    assert!(result.report("a").unwrap().outcome.is_completed());
}

#[tokio::test]
async fn test_keyless_profiles_rank_the_same_every_run() {
    let first = record("directory", "", 0.5).with_bio("aaa");
    let second = record("directory", "", 0.5).with_bio("bbb");

    for _ in 0..20 {
        let result = finder(
            vec![
                ScriptedCollector::new("one", Script::Records(vec![second.clone()])),
                ScriptedCollector::new("two", Script::Records(vec![first.clone()])),
            ],
            SearchConfig::default(),
        )
        .search("Jordan Lee", None, None, Duration::from_secs(5))
        .await;

        let bios: Vec<&str> = result.profiles.iter().map(|p| p.bio.as_str()).collect();
        assert_eq!(bios, vec!["aaa", "bbb"]);
        assert!(result.profiles.iter().all(|p| p.key.is_singleton()));
    }
}
