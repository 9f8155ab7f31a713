//! `dt-output` — observation sink (§6) for the rust_dt_pcm core.
//!
//! Three backends are provided behind Cargo features, all writing the same
//! unified [`ObservationRecord`] shape:
//!
//! | Feature   | Backend     | File created           |
//! |-----------|-------------|-------------------------|
//! | *(none)*  | CSV         | `observations.csv`      |
//! | `sqlite`  | SQLite      | `output.db`              |
//! | `parquet` | Parquet     | `observations.parquet`  |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `dt_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dt_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::new(writer, &config);
//! sim.add_observer(Box::new(obs));
//! sim.run().unwrap();
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{ObservationGroup, ObservationRecord};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
