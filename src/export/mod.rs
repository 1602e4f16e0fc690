pub mod csv;

use anyhow::Result;
use std::path::PathBuf;

use crate::core::session::AttemptInterval;

pub use self::csv::CsvExporter;

/// Persists the completed attempts of a finished session.
pub trait RecordExporter {
    /// Called once per session with attempts in closure order. Returns where
    /// the record was written.
    fn export(&self, intervals: &[AttemptInterval]) -> Result<PathBuf>;
}
