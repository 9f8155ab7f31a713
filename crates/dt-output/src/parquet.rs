//! Parquet output backend (feature `parquet`).
//!
//! Creates a single `observations.parquet` file in the configured output
//! directory.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{StringBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{ObservationRecord, OutputResult};

fn observation_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("time_ms", DataType::UInt64, false),
        Field::new("agent_id", DataType::UInt32, false),
        Field::new("group", DataType::Utf8, false),
        Field::new("key", DataType::Utf8, false),
        Field::new("value", DataType::Utf8, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder().set_compression(Compression::SNAPPY).build()
}

/// Writes observation records to a single Parquet file.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    writer: Option<ArrowWriter<File>>,
    schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create `observations.parquet` in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let schema = observation_schema();
        let file = File::create(dir.join("observations.parquet"))?;
        let writer = ArrowWriter::try_new(file, Arc::clone(&schema), Some(snappy_props()))?;

        Ok(Self { writer: Some(writer), schema })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_records(&mut self, records: &[ObservationRecord]) -> OutputResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        let mut time_ms = UInt64Builder::new();
        let mut agent_ids = UInt32Builder::new();
        let mut groups = StringBuilder::new();
        let mut keys = StringBuilder::new();
        let mut values = StringBuilder::new();

        for record in records {
            time_ms.append_value(record.time_ms);
            agent_ids.append_value(record.agent_id.0);
            groups.append_value(record.group.as_str());
            keys.append_value(&record.key);
            values.append_value(&record.value);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.schema),
            vec![
                Arc::new(time_ms.finish()),
                Arc::new(agent_ids.finish()),
                Arc::new(groups.finish()),
                Arc::new(keys.finish()),
                Arc::new(values.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.writer.take() {
            w.close()?;
        }
        Ok(())
    }
}
