//! CSV output backend.
//!
//! Creates one file, `observations.csv`, in the configured output directory.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{ObservationRecord, OutputResult};

/// Writes observation records to a single CSV file.
pub struct CsvWriter {
    records: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) `observations.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut records = Writer::from_path(dir.join("observations.csv"))?;
        records.write_record(["time_ms", "agent_id", "group", "key", "value"])?;

        Ok(Self { records, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_records(&mut self, records: &[ObservationRecord]) -> OutputResult<()> {
        for record in records {
            self.records.write_record(&[
                record.time_ms.to_string(),
                record.agent_id.0.to_string(),
                record.group.as_str().to_string(),
                record.key.clone(),
                record.value.clone(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.records.flush()?;
        Ok(())
    }
}
