//! CSV export of impact entries.

use crate::catalog::metric_info;
use crate::{ImpactEntry, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: i64,
    metric_type: String,
    value: f64,
    unit: &'static str,
    description: String,
    created_at: String,
}

impl From<&ImpactEntry> for CsvRow {
    fn from(entry: &ImpactEntry) -> Self {
        CsvRow {
            id: entry.id,
            metric_type: entry.metric_type.to_string(),
            value: entry.value,
            unit: metric_info(entry.metric_type).unit,
            description: entry.description.clone(),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// Write all entries to a CSV file and return the row count.
///
/// The file is replaced, not appended; the export is a snapshot of what the
/// backend returned.
pub fn entries_to_csv(entries: &[ImpactEntry], csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(csv_path)?;
    let mut writer = csv::Writer::from_writer(file);

    for entry in entries {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} entries to {:?}", entries.len(), csv_path);
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricType;
    use chrono::Utc;

    fn test_entry(id: i64, metric: MetricType, value: f64) -> ImpactEntry {
        ImpactEntry {
            id,
            metric_type: metric,
            value,
            description: format!("entry {}", id),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_export_writes_all_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("entries.csv");

        let entries = vec![
            test_entry(1, MetricType::Carbon, 5.0),
            test_entry(2, MetricType::Water, 120.0),
            test_entry(3, MetricType::Digital, 3.5),
        ];
        let count = entries_to_csv(&entries, &csv_path).unwrap();
        assert_eq!(count, 3);

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        let records: Vec<csv::StringRecord> =
            reader.into_records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(&records[0][1], "carbon");
        assert_eq!(&records[0][3], "kg CO2");
        assert_eq!(&records[1][3], "L");
    }

    #[test]
    fn test_export_replaces_previous_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("entries.csv");

        entries_to_csv(&[test_entry(1, MetricType::Energy, 1.0)], &csv_path).unwrap();
        entries_to_csv(&[test_entry(2, MetricType::Energy, 2.0)], &csv_path).unwrap();

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        let records: Vec<csv::StringRecord> =
            reader.into_records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "2");
    }

    #[test]
    fn test_export_empty_list() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("empty.csv");

        let count = entries_to_csv(&[], &csv_path).unwrap();
        assert_eq!(count, 0);
        assert!(csv_path.exists());
    }
}
