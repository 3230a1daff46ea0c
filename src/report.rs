//! Result-log export.

use crate::domain::ResultRecord;
use crate::error::AppError;
use std::io::Write;
use std::path::Path;

/// Serialize the result log as CSV, one row per accepted tick.
pub fn write_csv<W: Write>(records: &[ResultRecord], writer: W) -> Result<(), AppError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the result log to a CSV file.
pub fn write_csv_file<P: AsRef<Path>>(records: &[ResultRecord], path: P) -> Result<(), AppError> {
    let file = std::fs::File::create(path)?;
    write_csv(records, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, TsRecv};

    fn record(ts: i64, position: i32) -> ResultRecord {
        ResultRecord {
            ts_recv: TsRecv::new(ts),
            bid_px: Decimal::from_str_exact("4500").unwrap(),
            ask_px: Decimal::from_str_exact("4500.25").unwrap(),
            skew: 1.0,
            position,
            trade_count: 1,
            fees: Decimal::from_str_exact("0.44").unwrap(),
            pnl: Decimal::from_str_exact("-12.94").unwrap(),
        }
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let records = vec![record(1, 1), record(2, 0)];
        let mut buf = Vec::new();
        write_csv(&records, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ts_recv,bid_px,ask_px,skew,position,trade_count,fees,pnl"
        );
        assert_eq!(lines.clone().count(), 2);
        let first = lines.next().unwrap();
        assert!(first.starts_with("1,"));
        assert!(first.contains("4500.25"));
    }

    #[test]
    fn test_write_csv_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strategy_log.csv");
        write_csv_file(&[record(1, 1)], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
