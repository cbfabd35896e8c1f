//! End-to-end engine tests over scripted lookup sources.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use doi_resolver::{
    DateRange, DateSource, Doi, InputBatch, LookupOutcome, ProgressFn, Resolver, ResolverConfig,
    ResolvedDate, ResultSet, YearMonth,
};
use tokio_util::sync::CancellationToken;

fn resolved(y: i64, m: i64) -> LookupOutcome {
    LookupOutcome::Resolved(ResolvedDate::from_date_parts(&[y, m]).unwrap())
}

/// Maps each DOI to a fixed outcome; unknown DOIs are `NotFound`.
struct Table {
    outcomes: HashMap<String, LookupOutcome>,
    calls: AtomicUsize,
}

impl Table {
    fn new(entries: &[(&str, LookupOutcome)]) -> Self {
        Self {
            outcomes: entries
                .iter()
                .map(|(id, outcome)| (id.to_string(), outcome.clone()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DateSource for Table {
    async fn lookup(&self, doi: &Doi) -> LookupOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .get(doi.as_str())
            .cloned()
            .unwrap_or(LookupOutcome::NotFound)
    }
}

fn config() -> ResolverConfig {
    ResolverConfig {
        concurrency: 4,
        max_attempts: 2,
        base_delay: Duration::from_millis(1),
        ..ResolverConfig::default()
    }
}

#[tokio::test]
async fn run_enumerates_every_token_exactly_once() {
    let source = Arc::new(Table::new(&[
        ("10.1000/a", resolved(2020, 1)),
        ("10.1000/b", resolved(2019, 5)),
    ]));
    let resolver = Resolver::with_source(config(), source).unwrap();

    let batches = vec![InputBatch {
        source: "papers.csv".to_string(),
        tokens: vec![
            "10.1000/a".to_string(),
            "https://doi.org/10.1000/B".to_string(),
            "not-a-doi".to_string(),
            "10.1000/missing".to_string(),
        ],
    }];
    let results = resolver
        .run(batches, None, CancellationToken::new())
        .await;

    assert_eq!(results.len(), 4);
    assert_eq!(results.get("10.1000/a").unwrap().outcome, resolved(2020, 1));
    // Prefixed, upper-cased token normalized into the same record key.
    assert_eq!(results.get("10.1000/b").unwrap().outcome, resolved(2019, 5));
    assert_eq!(
        results.get("not-a-doi").unwrap().outcome,
        LookupOutcome::InvalidIdentifier
    );
    assert_eq!(
        results.get("10.1000/missing").unwrap().outcome,
        LookupOutcome::NotFound
    );
}

#[tokio::test]
async fn duplicate_dois_across_batches_resolve_once_and_reattribute() {
    let source = Arc::new(Table::new(&[("10.1000/shared", resolved(2021, 6))]));
    let calls = |s: &Arc<Table>| s.calls.load(Ordering::SeqCst);

    let resolver = Resolver::with_source(config(), Arc::clone(&source) as Arc<dyn DateSource>)
        .unwrap();
    let batches = vec![
        InputBatch {
            source: "a.csv".to_string(),
            tokens: vec!["10.1000/shared".to_string()],
        },
        InputBatch {
            source: "b.csv".to_string(),
            tokens: vec!["DOI:10.1000/SHARED".to_string()],
        },
    ];
    let results = resolver
        .run(batches, None, CancellationToken::new())
        .await;

    assert_eq!(results.len(), 1);
    let record = results.get("10.1000/shared").unwrap();
    assert_eq!(record.outcome, resolved(2021, 6));
    assert_eq!(record.source, "b.csv", "later batch wins attribution");
    assert_eq!(calls(&source), 1, "one lookup despite two occurrences");
}

#[tokio::test]
async fn progress_counts_unique_dois() {
    let source = Arc::new(Table::new(&[("10.1000/a", resolved(2020, 1))]));
    let resolver = Resolver::with_source(config(), source).unwrap();

    let reports = Arc::new(Mutex::new(Vec::new()));
    let progress: ProgressFn = {
        let reports = Arc::clone(&reports);
        Arc::new(move |done, total| reports.lock().unwrap().push((done, total)))
    };
    let batches = vec![InputBatch {
        source: "a.csv".to_string(),
        tokens: vec![
            "10.1000/a".to_string(),
            "10.1000/A".to_string(),
            "junk".to_string(),
            "10.1000/b".to_string(),
        ],
    }];
    resolver
        .run(batches, Some(progress), CancellationToken::new())
        .await;

    let reports = reports.lock().unwrap();
    // Two unique valid DOIs; the duplicate and the invalid token do not count.
    assert_eq!(reports.last(), Some(&(2, 2)));
}

#[tokio::test]
async fn filter_projects_resolved_records_in_range() {
    let source = Arc::new(Table::new(&[
        ("10.1000/early", resolved(2019, 5)),
        ("10.1000/hit", resolved(2020, 1)),
    ]));
    let resolver = Resolver::with_source(config(), source).unwrap();
    let batches = vec![InputBatch {
        source: "a.csv".to_string(),
        tokens: vec![
            "10.1000/early".to_string(),
            "10.1000/hit".to_string(),
            "10.1000/missing".to_string(),
        ],
    }];
    let results: ResultSet = resolver
        .run(batches, None, CancellationToken::new())
        .await;

    let range = DateRange {
        start: Some(YearMonth::new(2020, 1).unwrap()),
        end: Some(YearMonth::new(2020, 12).unwrap()),
    };
    let filtered = results.filter(&range);
    assert_eq!(filtered.len(), 1);
    assert!(filtered.get("10.1000/hit").is_some());
    assert_eq!(results.len(), 3, "unfiltered set keeps every record");
}

#[tokio::test]
async fn cancellation_after_partial_progress_yields_full_record_set() {
    /// Resolves the first `fast` lookups immediately, then hangs forever.
    struct FastThenStuck {
        fast: usize,
        started: AtomicUsize,
    }

    #[async_trait]
    impl DateSource for FastThenStuck {
        async fn lookup(&self, _doi: &Doi) -> LookupOutcome {
            if self.started.fetch_add(1, Ordering::SeqCst) < self.fast {
                resolved(2020, 1)
            } else {
                std::future::pending().await
            }
        }
    }

    let total = 8;
    let fast = 3;
    let cancel = CancellationToken::new();
    let progress: ProgressFn = {
        let cancel = cancel.clone();
        Arc::new(move |done, _total| {
            if done == fast {
                cancel.cancel();
            }
        })
    };

    let source = Arc::new(FastThenStuck {
        fast,
        started: AtomicUsize::new(0),
    });
    let resolver = Resolver::with_source(
        ResolverConfig {
            concurrency: 2,
            ..config()
        },
        source,
    )
    .unwrap();
    let batches = vec![InputBatch {
        source: "a.csv".to_string(),
        tokens: (0..total).map(|i| format!("10.1000/item{i}")).collect(),
    }];

    let results = tokio::time::timeout(
        Duration::from_secs(5),
        resolver.run(batches, Some(progress), cancel.clone()),
    )
    .await
    .expect("cancelled run must return within the grace period");

    assert_eq!(results.len(), total);
    let completed = results
        .iter()
        .filter(|r| r.outcome.resolved().is_some())
        .count();
    let cancelled = results
        .iter()
        .filter(|r| r.outcome == LookupOutcome::Cancelled)
        .count();
    assert_eq!(completed, fast);
    assert_eq!(cancelled, total - fast);
}
