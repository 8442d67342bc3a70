//! Report generation port trait.

use crate::domain::engine::StrengthReport;
use crate::domain::error::StrengthError;
use std::path::Path;

/// Port for writing computed strength history.
pub trait ReportPort {
    fn write(&self, report: &StrengthReport, output_path: &Path) -> Result<(), StrengthError>;
}
