//! End-to-end integration tests: dataset file -> pairwise DTW -> result CSV.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use warpscan_dtw::{Dtw, WindowedMatcher};
use warpscan_io::{
    CsvResultSink, Dataset, DatasetReader, IoError, PairFingerprint, ResultRow, RowSink,
    SequenceKey,
};

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Sequentially align every pair `i < j` and append the rows.
fn write_all_pairs(dataset: &Dataset, sink: &impl RowSink, window: Option<usize>) -> usize {
    let dtw = Dtw::euclidean();
    let mut written = 0;
    for i in 0..dataset.len() {
        for j in (i + 1)..dataset.len() {
            let (k1, s1) = dataset.get(i).unwrap();
            let (k2, s2) = dataset.get(j).unwrap();
            let row = match window {
                None => ResultRow::full(
                    k1.clone(),
                    k2.clone(),
                    dtw.cost(s1.points(), s2.points()).unwrap(),
                ),
                Some(w) => {
                    let found = WindowedMatcher::new(w, dtw).unwrap().best_match(s1, s2).unwrap();
                    ResultRow::windowed(k1.clone(), k2.clone(), &found)
                }
            };
            sink.append(&row).unwrap();
            written += 1;
        }
    }
    written
}

fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    assert_eq!(
        rdr.headers().unwrap().iter().collect::<Vec<_>>(),
        vec!["fingerprint", "Project1", "Project2", "DTW", "range1", "range2"]
    );
    rdr.records().map(|r| r.unwrap()).collect()
}

// ---------------------------------------------------------------------------
// Full DTW
// ---------------------------------------------------------------------------

#[test]
fn json_full_round_trip() {
    let dataset = DatasetReader::new(&fixture_path("projects_4.json"))
        .read()
        .expect("fixture should parse");
    assert_eq!(dataset.len(), 4);
    assert_eq!(dataset.pair_count(), 6);

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("result.csv");
    let sink = CsvResultSink::create(&out).unwrap();
    assert_eq!(write_all_pairs(&dataset, &sink, None), 6);
    drop(sink);

    let rows = read_rows(&out);
    assert_eq!(rows.len(), 6);

    // Identical sequences align at zero cost.
    assert_eq!(&rows[0][1], "1001");
    assert_eq!(&rows[0][2], "1002");
    assert_eq!(&rows[0][3], "0");

    // (1003, 1004) is the 3√2 example.
    let last = &rows[5];
    assert_eq!((&last[1], &last[2]), ("1003", "1004"));
    let cost: f64 = last[3].parse().unwrap();
    assert!((cost - 3.0 * 2f64.sqrt()).abs() < 1e-12);
    assert_eq!((&last[4], &last[5]), ("All", "All"));

    // Fingerprints match a recomputation and are unique per pair.
    let mut seen = std::collections::HashSet::new();
    for row in &rows {
        let expected = PairFingerprint::of(&SequenceKey::from(&row[1]), &SequenceKey::from(&row[2]));
        assert_eq!(&row[0], expected.to_string());
        assert!(seen.insert(row[0].to_string()), "duplicate fingerprint {}", &row[0]);
    }
}

#[test]
fn csv_and_json_fixtures_agree() {
    let from_json = DatasetReader::new(&fixture_path("projects_4.json")).read().unwrap();
    let from_csv = DatasetReader::new(&fixture_path("projects_4.csv")).read().unwrap();

    assert_eq!(from_json.len(), from_csv.len());
    for ((k1, s1), (k2, s2)) in from_json.iter().zip(from_csv.iter()) {
        assert_eq!(k1, k2);
        assert_eq!(s1.points(), s2.points());
    }
    // Explicit labels survive both loaders.
    assert_eq!(from_json.get(2).unwrap().1.labels(), &[7, 9]);
    assert_eq!(from_csv.get(2).unwrap().1.labels(), &[7, 9]);
}

// ---------------------------------------------------------------------------
// Windowed DTW
// ---------------------------------------------------------------------------

#[test]
fn windowed_rows_carry_label_ranges() {
    let dataset = DatasetReader::new(&fixture_path("projects_4.json")).read().unwrap();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("windowed.csv");
    let sink = CsvResultSink::create(&out).unwrap();
    write_all_pairs(&dataset, &sink, Some(2));
    drop(sink);

    let rows = read_rows(&out);
    assert_eq!(rows.len(), 6);
    for row in &rows {
        assert!(row[4].starts_with('['), "range1 was {}", &row[4]);
        assert!(row[5].starts_with('['), "range2 was {}", &row[5]);
    }
    // 1003 carries labels 7 and 9: its only window is [7, 9].
    let row = rows.iter().find(|r| &r[1] == "1003").unwrap();
    assert_eq!(&row[4], "[7, 9]");
}

// ---------------------------------------------------------------------------
// Rejected inputs
// ---------------------------------------------------------------------------

#[test]
fn duplicate_key_fixture_rejected() {
    let result = DatasetReader::new(&fixture_path("duplicate_key.json")).read();
    match result {
        Err(IoError::DuplicateKey { key, first_slot, second_slot, .. }) => {
            assert_eq!(key, "alpha");
            assert_eq!((first_slot, second_slot), (0, 1));
        }
        other => panic!("expected DuplicateKey, got {other:?}"),
    }
}

#[test]
fn output_file_truncated_on_create() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("result.csv");
    fs::write(&out, "stale\ncontent\n").unwrap();

    let sink = CsvResultSink::create(&out).unwrap();
    drop(sink);
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "fingerprint,Project1,Project2,DTW,range1,range2\n"
    );
}
