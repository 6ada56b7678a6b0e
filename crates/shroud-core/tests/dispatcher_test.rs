//! Dispatcher tests
//!
//! Batch completeness, shuffle uniformity and policy isolation, checked
//! through a recording analyzer.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use parking_lot::Mutex;
use shroud_core::{
    Analyzer, Ciphertext, DispatcherConfig, RoutingPolicy, ShuffleDispatcher, ShuffledBatch,
    SubmitOutcome,
};

#[derive(Default)]
struct RecordingAnalyzer {
    batches: Mutex<Vec<ShuffledBatch>>,
}

impl RecordingAnalyzer {
    fn take(&self) -> Vec<ShuffledBatch> {
        std::mem::take(&mut *self.batches.lock())
    }
}

impl Analyzer for RecordingAnalyzer {
    fn send(&self, batch: ShuffledBatch) {
        self.batches.lock().push(batch);
    }
}

fn dispatcher(threshold: usize, seed: u64) -> ShuffleDispatcher<Arc<RecordingAnalyzer>> {
    ShuffleDispatcher::with_seed(
        DispatcherConfig::with_threshold(threshold),
        Arc::new(RecordingAnalyzer::default()),
        seed,
    )
    .unwrap()
}

fn ct(policy: RoutingPolicy, n: u32) -> Ciphertext {
    let mut bytes = policy.metric_id.to_be_bytes().to_vec();
    bytes.extend_from_slice(&policy.day_index.to_be_bytes());
    bytes.extend_from_slice(&n.to_be_bytes());
    Ciphertext::from(bytes)
}

fn policy_of(ciphertext: &Ciphertext) -> RoutingPolicy {
    let bytes = ciphertext.as_bytes();
    let metric = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
    let day = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
    RoutingPolicy::new(metric, day)
}

#[test]
fn threshold_four_sends_one_permutation() {
    let dispatcher = dispatcher(4, 11);
    let policy = RoutingPolicy::new(3, 19_000);
    let input: Vec<_> = (1..=4).map(|n| ct(policy, n)).collect();

    for (i, ciphertext) in input.iter().cloned().enumerate() {
        let outcome = dispatcher.submit(policy, ciphertext).unwrap();
        if i < 3 {
            assert_eq!(outcome, SubmitOutcome::Buffered { pending: i + 1 });
        } else {
            assert_eq!(outcome, SubmitOutcome::Flushed { batch_size: 4 });
        }
    }

    let batches = dispatcher.analyzer().take();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].policy(), policy);

    let mut sent = batches[0].ciphertexts().to_vec();
    let mut expected = input;
    sent.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
    expected.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
    assert_eq!(sent, expected);
    assert_eq!(dispatcher.pending(&policy), 0);
}

#[test]
fn k_thresholds_produce_k_complete_batches() {
    let threshold = 7;
    let rounds = 5;
    let dispatcher = dispatcher(threshold, 5);
    let policy = RoutingPolicy::new(1, 2);

    let total = (threshold * rounds) as u32;
    for n in 0..total {
        dispatcher.submit(policy, ct(policy, n)).unwrap();
    }

    let batches = dispatcher.analyzer().take();
    assert_eq!(batches.len(), rounds);
    assert!(batches.iter().all(|batch| batch.len() == threshold));

    let sent: HashSet<_> =
        batches.into_iter().flat_map(|batch| batch.into_parts().1).collect();
    let expected: HashSet<_> = (0..total).map(|n| ct(policy, n)).collect();
    assert_eq!(sent, expected);
    assert_eq!(dispatcher.pending(&policy), 0);
}

#[test]
fn below_threshold_never_flushes() {
    let dispatcher = dispatcher(10, 1);
    let policy = RoutingPolicy::new(8, 8);

    for n in 0..9 {
        dispatcher.submit(policy, ct(policy, n)).unwrap();
    }

    assert!(dispatcher.analyzer().take().is_empty());
    assert_eq!(dispatcher.pending(&policy), 9);
}

/// Chi-squared goodness of fit over the 6 orderings of a 3-element batch.
///
/// 5 degrees of freedom; 25.74 is the 0.9999 quantile, so a correct shuffle
/// fails this about once in ten thousand seeds.
#[test]
fn shuffle_is_uniform_over_orderings() {
    const TRIALS: usize = 6000;
    const CRITICAL: f64 = 25.74;

    let dispatcher = dispatcher(3, 0xC0FFEE);
    let policy = RoutingPolicy::new(0, 0);
    let items = [ct(policy, 0), ct(policy, 1), ct(policy, 2)];

    for _ in 0..TRIALS {
        for item in &items {
            dispatcher.submit(policy, item.clone()).unwrap();
        }
    }

    let mut counts: HashMap<Vec<Ciphertext>, usize> = HashMap::new();
    for batch in dispatcher.analyzer().take() {
        *counts.entry(batch.into_parts().1).or_default() += 1;
    }
    assert_eq!(counts.len(), 6, "some ordering never occurred");

    let expected = TRIALS as f64 / 6.0;
    let chi_squared: f64 = counts
        .values()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum();
    assert!(chi_squared < CRITICAL, "chi-squared {chi_squared:.2} over {counts:?}");
}

#[test]
fn first_arrival_is_not_pinned_to_first_position() {
    let dispatcher = dispatcher(8, 99);
    let policy = RoutingPolicy::new(5, 5);

    let mut first_in_place = 0;
    for round in 0..200u32 {
        for n in 0..8 {
            dispatcher.submit(policy, ct(policy, round * 8 + n)).unwrap();
        }
        let batch = dispatcher.analyzer().take().remove(0);
        if batch.ciphertexts()[0] == ct(policy, round * 8) {
            first_in_place += 1;
        }
    }

    // Expected about 25 of 200
    assert!(first_in_place < 60, "first arrival stayed first {first_in_place} times");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_policies_stay_isolated() {
    const POLICIES: u32 = 4;
    const TASKS_PER_POLICY: u32 = 4;
    const PER_TASK: u32 = 30;
    const THRESHOLD: usize = 8;

    let dispatcher = Arc::new(dispatcher(THRESHOLD, 2024));

    let mut handles = Vec::new();
    for metric in 0..POLICIES {
        for task in 0..TASKS_PER_POLICY {
            let dispatcher = Arc::clone(&dispatcher);
            handles.push(tokio::spawn(async move {
                let policy = RoutingPolicy::new(metric, 1);
                for n in 0..PER_TASK {
                    dispatcher.submit(policy, ct(policy, task * PER_TASK + n)).unwrap();
                    tokio::task::yield_now().await;
                }
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let per_policy = (TASKS_PER_POLICY * PER_TASK) as usize;
    let batches = dispatcher.analyzer().take();
    assert_eq!(batches.len(), POLICIES as usize * (per_policy / THRESHOLD));

    let mut seen: HashMap<RoutingPolicy, HashSet<Ciphertext>> = HashMap::new();
    for batch in batches {
        assert_eq!(batch.len(), THRESHOLD);
        let policy = batch.policy();
        for ciphertext in batch.ciphertexts() {
            assert_eq!(policy_of(ciphertext), policy, "batch for {policy} mixed policies");
            assert!(seen.entry(policy).or_default().insert(ciphertext.clone()), "duplicate");
        }
    }

    for metric in 0..POLICIES {
        let policy = RoutingPolicy::new(metric, 1);
        let delivered = seen.get(&policy).map_or(0, HashSet::len);
        assert_eq!(delivered + dispatcher.pending(&policy), per_policy);
    }
}
