//! CSV history report adapter implementing ReportPort.
//!
//! One row per timeline entry, one column per configured currency holding the
//! smoothed score with four decimals, or an empty cell while undefined.

use crate::domain::engine::StrengthReport;
use crate::domain::error::StrengthError;
use crate::ports::report_port::ReportPort;
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvReportAdapter;

fn csv_error(path: &Path, e: csv::Error) -> StrengthError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => StrengthError::Io(io),
        other => StrengthError::Data {
            reason: format!("failed to write {}: {:?}", path.display(), other),
        },
    }
}

pub fn history_rows(report: &StrengthReport) -> Vec<Vec<String>> {
    report
        .timeline
        .iter()
        .enumerate()
        .map(|(i, ts)| {
            let mut row = Vec::with_capacity(report.currencies.len() + 1);
            row.push(ts.format(TIMESTAMP_FORMAT).to_string());
            row.extend(report.currencies.iter().map(|s| {
                s.smoothed
                    .value_at(i)
                    .map(|v| format!("{:.4}", v))
                    .unwrap_or_default()
            }));
            row
        })
        .collect()
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &StrengthReport, output_path: &Path) -> Result<(), StrengthError> {
        let mut writer =
            csv::Writer::from_path(output_path).map_err(|e| csv_error(output_path, e))?;

        let mut header = vec!["timestamp".to_string()];
        header.extend(report.currencies.iter().map(|s| s.currency.to_string()));
        writer
            .write_record(&header)
            .map_err(|e| csv_error(output_path, e))?;

        for row in history_rows(report) {
            writer
                .write_record(&row)
                .map_err(|e| csv_error(output_path, e))?;
        }

        writer.flush()?;
        tracing::info!(path = %output_path.display(), rows = report.timeline.len(), "history written");
        Ok(())
    }
}
