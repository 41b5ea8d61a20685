//! Missing-attachment cleanup over live scenes and stored assets.
//!
//! [`AssetCleanupOrchestrator`] is the entry point. It exposes the two host
//! operations, [`scan_and_report`](AssetCleanupOrchestrator::scan_and_report)
//! and [`scan_and_clean`](AssetCleanupOrchestrator::scan_and_clean), over a
//! [`Scope`] that is either the current live scene or every stored asset of
//! the configured kind.
//!
//! Everything the orchestrator needs from its host is injected at
//! construction: the [`AssetStore`](slotsweep_storage::AssetStore), an
//! [`EditingSession`], a [`LogSink`] and a [`ProgressSink`].

pub mod error;
pub mod loaded;
pub mod log;
pub mod options;
pub mod orchestrator;
pub mod progress;
pub mod scene;
pub mod session;

pub use error::CleanError;
pub use loaded::LoadedAsset;
pub use log::{LogEntry, LogLevel, LogSink, RecordingLog, TracingLog};
pub use options::CleanOptions;
pub use orchestrator::{AssetCleanupOrchestrator, CleanSummary, ScanReport, Scope};
pub use progress::{NoProgress, ProgressSink};
pub use scene::{InMemoryScene, LiveScene, UNDO_LABEL};
pub use session::{same_asset_path, EditingSession, FixedEditingSession, NoEditingSession};
