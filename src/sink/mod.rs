//! Result sinks: where completed runs go.
//!
//! The simulation core never touches the filesystem. A [`ResultSink`] receives
//! each [`CompletedRun`](crate::run::CompletedRun) once the run has stopped.
//!
//! ```text
//! <base>/
//! ├── incoming/
//! │   └── <YYYY-MM-DD>/
//! │       ├── results_<id>.csv
//! │       └── metadata_<id>.json
//! ├── processed/
//! ├── archive/
//! └── failed/
//! ```

mod file;
mod memory;
mod traits;

pub use file::{FileSink, OUTPUT_DIRECTORIES};
pub use memory::MemorySink;
pub use traits::{PersistedRun, ResultSink};
