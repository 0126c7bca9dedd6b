//! Regression tests for warpscan-batch.
//!
//! Verify that partitioned parallel runs produce exactly one row per pair,
//! agree with a sequential evaluation, and handle skipped pairs,
//! cancellation, and sink failures without losing or duplicating rows.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tempfile::TempDir;

use warpscan_batch::{BatchConfig, BatchError, BatchRunner, CancelFlag, Partitioning};
use warpscan_dtw::{Dtw, DtwError, Manhattan, Point, Sequence};
use warpscan_io::{
    CsvResultSink, Dataset, IoError, MemorySink, ResultRow, RowRange, RowSink, SequenceKey,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn random_dataset(n: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let slots = (0..n)
        .map(|s| {
            let len = rng.gen_range(3..12);
            let points = (0..len)
                .map(|_| Point::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)))
                .collect();
            (SequenceKey::new(format!("{}", 5000 + s)), Sequence::new(points))
        })
        .collect();
    Dataset::new(slots)
}

fn sequential_costs(dataset: &Dataset) -> HashMap<(String, String), f64> {
    let dtw = Dtw::euclidean();
    let slots: Vec<_> = dataset.iter().collect();
    let mut costs = HashMap::new();
    for i in 0..slots.len() {
        for j in (i + 1)..slots.len() {
            let cost = dtw.cost(slots[i].1.points(), slots[j].1.points()).unwrap();
            costs.insert((slots[i].0.to_string(), slots[j].0.to_string()), cost.value());
        }
    }
    costs
}

fn run_to_memory(dataset: &Dataset, config: BatchConfig) -> (Vec<ResultRow>, warpscan_batch::BatchSummary) {
    let sink = MemorySink::new();
    let summary = BatchRunner::new(config).run(dataset, &sink, &CancelFlag::new()).unwrap();
    (sink.into_rows(), summary)
}

/// Sink that fails every append after the first `ok` succeed.
struct FailingSink {
    ok: usize,
    seen: Mutex<usize>,
}

impl RowSink for FailingSink {
    fn append(&self, _row: &ResultRow) -> Result<(), IoError> {
        let mut seen = self.seen.lock().unwrap();
        *seen += 1;
        if *seen > self.ok {
            return Err(IoError::SinkPoisoned {
                path: "failing.csv".into(),
            });
        }
        Ok(())
    }
}

/// Sink that raises the cancel flag after its first append.
struct CancellingSink {
    inner: MemorySink,
    cancel: CancelFlag,
}

impl RowSink for CancellingSink {
    fn append(&self, row: &ResultRow) -> Result<(), IoError> {
        self.inner.append(row)?;
        self.cancel.cancel();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Exactly-once coverage
// ---------------------------------------------------------------------------

/// Four sequences over four workers: six rows, six distinct fingerprints.
#[test]
fn four_sequences_four_workers_six_rows() {
    let ds = random_dataset(4, 7);
    let (rows, summary) = run_to_memory(&ds, BatchConfig::new());

    assert_eq!(summary.pairs_total, 6);
    assert_eq!(summary.rows_written, 6);
    assert_eq!(rows.len(), 6);
    assert!(summary.is_complete());

    let fingerprints: HashSet<_> = rows.iter().map(|r| r.fingerprint).collect();
    assert_eq!(fingerprints.len(), 6, "duplicate fingerprint in output");

    // The last worker owns i = 3, which has no partner j > 3.
    assert_eq!(summary.workers.len(), 4);
    assert_eq!(summary.workers[3].rows_written, 0);
}

/// Any partitioning yields the same rows and costs as a sequential loop.
#[test]
fn partitioning_does_not_change_results() {
    let ds = random_dataset(23, 42);
    let expected = sequential_costs(&ds);

    let configs = [
        Partitioning::Even(1),
        Partitioning::Even(3),
        Partitioning::Even(8),
        Partitioning::Explicit(vec![0..5, 5..6, 6..23]),
    ];
    for partitioning in configs {
        let config = BatchConfig::new().with_partitioning(partitioning.clone()).unwrap();
        let (rows, summary) = run_to_memory(&ds, config);
        assert_eq!(rows.len(), expected.len(), "{partitioning:?}");
        assert_eq!(summary.rows_written, expected.len());

        for row in &rows {
            let key = (row.key1.to_string(), row.key2.to_string());
            let cost = expected
                .get(&key)
                .unwrap_or_else(|| panic!("unexpected pair {key:?} under {partitioning:?}"));
            assert_eq!(row.cost.value().to_bits(), cost.to_bits());
            assert_eq!((row.range1, row.range2), (RowRange::All, RowRange::All));
        }
    }
}

/// Key order in each row follows slot order: key1 always has the lower index.
#[test]
fn key1_precedes_key2_in_slot_order() {
    let ds = random_dataset(9, 3);
    let (rows, _) = run_to_memory(&ds, BatchConfig::new());
    for row in rows {
        let i = ds.position(row.key1.as_str()).unwrap();
        let j = ds.position(row.key2.as_str()).unwrap();
        assert!(i < j);
    }
}

#[test]
fn manhattan_metric_applied() {
    let ds = Dataset::new(vec![
        (SequenceKey::from("a"), Sequence::new(vec![Point::new(0.0, 0.0)])),
        (SequenceKey::from("b"), Sequence::new(vec![Point::new(3.0, 4.0)])),
    ]);
    let (rows, _) = run_to_memory(&ds, BatchConfig::new());
    assert_eq!(rows[0].cost.value(), 5.0);

    let sink = MemorySink::new();
    BatchRunner::new(BatchConfig::new().with_metric(Manhattan))
        .run(&ds, &sink, &CancelFlag::new())
        .unwrap();
    assert_eq!(sink.into_rows()[0].cost.value(), 7.0);
}

// ---------------------------------------------------------------------------
// Skipped pairs
// ---------------------------------------------------------------------------

/// An empty sequence fails every pair it takes part in; the rest are written.
#[test]
fn empty_sequence_pairs_skipped() {
    let mut slots: Vec<_> = random_dataset(4, 11).iter().map(|(k, s)| (k.clone(), s.clone())).collect();
    slots.insert(2, (SequenceKey::from("empty"), Sequence::default()));
    let ds = Dataset::new(slots);

    let (rows, summary) = run_to_memory(&ds, BatchConfig::new());
    assert_eq!(summary.pairs_total, 10);
    assert_eq!(summary.rows_written, 6);
    assert_eq!(rows.len(), 6);
    assert_eq!(summary.skipped.len(), 4);
    assert!(!summary.is_complete());
    for skipped in &summary.skipped {
        assert!(skipped.i == 2 || skipped.j == 2);
        assert!(matches!(skipped.reason, DtwError::EmptySequence { .. }));
    }
    assert!(rows.iter().all(|r| r.key1.as_str() != "empty" && r.key2.as_str() != "empty"));
}

/// Sequences shorter than the window are skipped, not fatal.
#[test]
fn window_too_large_pairs_skipped() {
    let ds = Dataset::new(vec![
        (SequenceKey::from("long1"), Sequence::new((0..6).map(|i| Point::new(i as f64, 0.0)).collect())),
        (SequenceKey::from("short"), Sequence::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)])),
        (SequenceKey::from("long2"), Sequence::new((0..5).map(|i| Point::new(i as f64, 1.0)).collect())),
    ]);
    let config = BatchConfig::new().with_window(4).unwrap();
    let (rows, summary) = run_to_memory(&ds, config);

    assert_eq!(rows.len(), 1);
    assert_eq!((rows[0].key1.as_str(), rows[0].key2.as_str()), ("long1", "long2"));
    assert!(matches!(rows[0].range1, RowRange::Labels(_)));
    assert_eq!(summary.skipped.len(), 2);
    assert!(summary
        .skipped
        .iter()
        .all(|s| matches!(s.reason, DtwError::WindowTooLarge { window: 4, .. })));
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn cancelled_before_start_writes_nothing() {
    let ds = random_dataset(6, 5);
    let cancel = CancelFlag::new();
    cancel.cancel();
    let sink = MemorySink::new();
    let summary = BatchRunner::new(BatchConfig::new()).run(&ds, &sink, &cancel).unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.rows_written, 0);
    assert!(sink.is_empty());
}

#[test]
fn cancelled_mid_run_keeps_rows_written() {
    let ds = random_dataset(6, 5);
    let cancel = CancelFlag::new();
    let sink = CancellingSink {
        inner: MemorySink::new(),
        cancel: cancel.clone(),
    };
    let config = BatchConfig::new().with_partitioning(Partitioning::Even(1)).unwrap();
    let summary = BatchRunner::new(config).run(&ds, &sink, &cancel).unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.rows_written, 1);
    assert_eq!(sink.inner.len(), 1);
}

// ---------------------------------------------------------------------------
// Sink failures and configuration errors
// ---------------------------------------------------------------------------

#[test]
fn sink_failure_is_fatal() {
    let ds = random_dataset(5, 9);
    let sink = FailingSink {
        ok: 3,
        seen: Mutex::new(0),
    };
    let config = BatchConfig::new().with_partitioning(Partitioning::Even(2)).unwrap();
    let result = BatchRunner::new(config).run(&ds, &sink, &CancelFlag::new());
    assert!(matches!(result, Err(BatchError::Sink(IoError::SinkPoisoned { .. }))));
}

#[test]
fn explicit_partition_must_cover_dataset() {
    let ds = random_dataset(10, 1);
    let config = BatchConfig::new()
        .with_partitioning(Partitioning::Explicit(vec![0..4, 4..8]))
        .unwrap();
    let sink = MemorySink::new();
    let result = BatchRunner::new(config).run(&ds, &sink, &CancelFlag::new());
    assert!(matches!(result, Err(BatchError::InvalidPartition { n: 10, .. })));
    assert!(sink.is_empty());
}

// ---------------------------------------------------------------------------
// CSV output
// ---------------------------------------------------------------------------

#[test]
fn csv_output_has_header_and_one_line_per_pair() {
    let ds = random_dataset(8, 21);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("result.csv");
    let sink = CsvResultSink::create(&path).unwrap();
    let summary = BatchRunner::new(BatchConfig::new())
        .run(&ds, &sink, &CancelFlag::new())
        .unwrap();
    drop(sink);

    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("fingerprint,Project1,Project2,DTW,range1,range2"));
    assert_eq!(lines.count(), summary.rows_written);
    assert_eq!(summary.rows_written, 28);
}
