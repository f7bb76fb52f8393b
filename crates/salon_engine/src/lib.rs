//! Salon engine: HTTP page source, full-collection loading and effect execution.
mod collect;
mod engine;
mod fetch;
mod persist;
mod types;

pub use collect::fetch_all;
pub use engine::{EngineError, EngineHandle};
pub use fetch::{ClientSettings, NoProgress, PageSource, ProgressSink, ReqwestPageSource};
pub use persist::{export_records, prepare_dir, write_atomic, PersistError};
pub use types::{EngineEvent, FailureKind, FetchError, PageProgress};
