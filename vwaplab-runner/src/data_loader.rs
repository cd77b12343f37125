//! Minute-bar loading, dataset hashing, and synthetic data.
//!
//! Bar files are headered CSVs with at least `timestamp`, `avg_price`, and
//! `volume` columns; extra columns are ignored. In-core data sparsity
//! (short or quiet sessions) is a silent skip downstream, but a structurally
//! bad FILE is a hard error here: missing columns, unparseable timestamps,
//! out-of-order rows, or non-finite values all abort the run before any
//! session is processed.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use vwaplab_core::domain::{partition_sessions, Bar};

/// Errors from the bar-file layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot parse bar file: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot write bar file: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {row}: cannot parse timestamp '{value}' (expected YYYY-MM-DD HH:MM[:SS])")]
    Timestamp { row: usize, value: String },

    #[error("row {row}: invalid price or volume (price must be finite and positive, volume finite and non-negative)")]
    Value { row: usize },

    #[error("row {row}: timestamps must be strictly increasing")]
    OutOfOrder { row: usize },

    #[error("bar file '{}' contains no rows", path.display())]
    Empty { path: PathBuf },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    avg_price: f64,
    volume: f64,
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .ok()
}

/// Load an ordered bar series from a CSV file.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut bars: Vec<Bar> = Vec::new();

    for (i, result) in reader.deserialize::<CsvRow>().enumerate() {
        // Row 1 is the header.
        let row = i + 2;
        let record = result?;

        let timestamp = match parse_timestamp(&record.timestamp) {
            Some(ts) => ts,
            None => {
                return Err(LoadError::Timestamp {
                    row,
                    value: record.timestamp,
                })
            }
        };
        let bar = Bar {
            timestamp,
            avg_price: record.avg_price,
            volume: record.volume,
        };
        if !bar.is_sane() {
            return Err(LoadError::Value { row });
        }
        if let Some(previous) = bars.last() {
            if bar.timestamp <= previous.timestamp {
                return Err(LoadError::OutOfOrder { row });
            }
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(bars)
}

/// Write bars to a CSV file in the format [`load_bars`] reads.
///
/// Prices and volumes use Rust's shortest-roundtrip float formatting, so a
/// write/load cycle reproduces the input bit-exactly.
pub fn write_bars_csv(bars: &[Bar], path: &Path) -> Result<(), LoadError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["timestamp", "avg_price", "volume"])?;
    for bar in bars {
        writer.write_record(&[
            bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            bar.avg_price.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Compute a deterministic BLAKE3 hash over all bar data.
///
/// Covers timestamps and the little-endian bytes of every price and volume,
/// so any change to the dataset changes the hash.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.timestamp.to_string().as_bytes());
        hasher.update(&bar.avg_price.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Generate synthetic minute bars for testing/development.
///
/// `days` weekday sessions starting 2024-01-02, each `bars_per_day` minutes
/// from 09:30. Prices follow a gentle random walk from 100.0; volume traces
/// the usual U-shaped intraday profile (busy open and close, quiet lunch)
/// with multiplicative noise. Fully determined by `seed`.
pub fn generate_synthetic_days(days: usize, bars_per_day: usize, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(days * bars_per_day);
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid fixed date");
    let mut price = 100.0_f64;

    for _ in 0..days {
        while matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            date += chrono::Duration::days(1);
        }
        let open = date.and_hms_opt(9, 30, 0).expect("valid fixed time");

        for i in 0..bars_per_day {
            let drift: f64 = rng.gen_range(-0.001..0.001);
            price = (price * (1.0 + drift)).max(1.0);

            let t = i as f64 / (bars_per_day.max(2) - 1) as f64;
            let profile = 1.0 + 1.5 * (2.0 * t - 1.0).powi(2);
            let volume = 2_000.0 * profile * rng.gen_range(0.5..1.5);

            bars.push(Bar {
                timestamp: open + chrono::Duration::minutes(i as i64),
                avg_price: price,
                volume,
            });
        }
        date += chrono::Duration::days(1);
    }
    bars
}

/// Chronological train/test split on a session boundary.
///
/// The test side takes the last `ceil(n_sessions * test_fraction)` sessions;
/// the train side keeps the rest. Returns zero-copy slices of the input, so
/// no bar is ever duplicated or reordered.
pub fn split_sessions(bars: &[Bar], test_fraction: f64) -> (&[Bar], &[Bar]) {
    let sessions = partition_sessions(bars);
    if sessions.is_empty() {
        return (bars, &bars[bars.len()..]);
    }

    let test_count = ((sessions.len() as f64 * test_fraction).ceil() as usize).min(sessions.len());
    let train_sessions = sessions.len() - test_count;
    let boundary: usize = sessions[..train_sessions].iter().map(|s| s.len()).sum();
    bars.split_at(boundary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn synthetic_days_are_deterministic() {
        let a = generate_synthetic_days(3, 60, 7);
        let b = generate_synthetic_days(3, 60, 7);
        assert_eq!(a, b);

        let c = generate_synthetic_days(3, 60, 8);
        assert_ne!(a, c);
    }

    #[test]
    fn synthetic_days_form_distinct_weekday_sessions() {
        let bars = generate_synthetic_days(5, 30, 1);
        let sessions = partition_sessions(&bars);
        assert_eq!(sessions.len(), 5);
        for session in &sessions {
            assert_eq!(session.len(), 30);
            let weekday = session.date.weekday();
            assert!(!matches!(
                weekday,
                chrono::Weekday::Sat | chrono::Weekday::Sun
            ));
        }
    }

    #[test]
    fn csv_roundtrip_is_bit_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        let bars = generate_synthetic_days(2, 45, 3);

        write_bars_csv(&bars, &path).unwrap();
        let loaded = load_bars(&path).unwrap();
        assert_eq!(bars, loaded);
    }

    #[test]
    fn loader_rejects_out_of_order_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(
            &path,
            "timestamp,avg_price,volume\n\
             2024-01-02 09:31:00,100.0,500\n\
             2024-01-02 09:30:00,101.0,600\n",
        )
        .unwrap();

        let err = load_bars(&path).unwrap_err();
        assert!(matches!(err, LoadError::OutOfOrder { row: 3 }));
    }

    #[test]
    fn loader_rejects_bad_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(
            &path,
            "timestamp,avg_price,volume\n01/02/2024 09:30,100.0,500\n",
        )
        .unwrap();

        let err = load_bars(&path).unwrap_err();
        assert!(matches!(err, LoadError::Timestamp { row: 2, .. }));
    }

    #[test]
    fn loader_rejects_non_finite_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(
            &path,
            "timestamp,avg_price,volume\n2024-01-02 09:30:00,NaN,500\n",
        )
        .unwrap();

        let err = load_bars(&path).unwrap_err();
        assert!(matches!(err, LoadError::Value { row: 2 }));
    }

    #[test]
    fn loader_accepts_minute_precision_and_extra_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(
            &path,
            "timestamp,open,avg_price,volume\n\
             2024-01-02 09:30,99.5,100.0,500\n\
             2024-01-02 09:31,99.9,100.5,600\n",
        )
        .unwrap();

        let bars = load_bars(&path).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].avg_price, 100.0);
        assert_eq!(bars[1].volume, 600.0);
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(&path, "timestamp,avg_price,volume\n").unwrap();

        let err = load_bars(&path).unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
    }

    #[test]
    fn dataset_hash_tracks_content() {
        let bars = generate_synthetic_days(2, 30, 5);
        assert_eq!(dataset_hash(&bars), dataset_hash(&bars));

        let mut tweaked = bars.clone();
        tweaked[17].volume += 1.0;
        assert_ne!(dataset_hash(&bars), dataset_hash(&tweaked));
    }

    #[test]
    fn split_respects_session_boundaries() {
        let bars = generate_synthetic_days(10, 20, 2);
        let (train, test) = split_sessions(&bars, 0.2);

        // ceil(10 * 0.2) = 2 test sessions.
        assert_eq!(partition_sessions(train).len(), 8);
        assert_eq!(partition_sessions(test).len(), 2);
        assert_eq!(train.len() + test.len(), bars.len());

        // Every test bar is strictly later than every train bar.
        let last_train = train.last().unwrap().timestamp;
        let first_test = test.first().unwrap().timestamp;
        assert!(first_test > last_train);
    }

    #[test]
    fn split_rounds_test_sessions_up() {
        let bars = generate_synthetic_days(3, 10, 2);
        let (train, test) = split_sessions(&bars, 0.5);
        // ceil(3 * 0.5) = 2
        assert_eq!(partition_sessions(train).len(), 1);
        assert_eq!(partition_sessions(test).len(), 2);
    }

    #[test]
    fn split_of_empty_series_is_empty() {
        let (train, test) = split_sessions(&[], 0.2);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }
}
