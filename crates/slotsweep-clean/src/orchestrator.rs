//! The cleanup orchestrator.
//!
//! For stored assets, each asset moves through
//! `Discovered -> (Skipped | Loaded) -> Scanned -> (Unchanged | Modified) -> Released`:
//!
//! - **Discovered**: returned by `find_assets` for the configured kind and
//!   resolved to a path.
//! - **Skipped**: the path is open in the host's editing session. A warning
//!   is logged and the asset is never loaded.
//! - **Loaded**: an independent copy is held in a [`LoadedAsset`] scope,
//!   which unloads it on every exit path.
//! - **Modified**: broken slots were removed from the copy, which is saved
//!   back. A failed save is logged and the asset is left out of the totals.
//!
//! One asset's failure never stops the batch. The store is committed at
//! most once per run, after the last asset, and only if something was
//! saved. Cancellation through the [`ProgressSink`] is honoured only at the
//! top of an asset iteration.

use serde::Serialize;

use slotsweep_core::{
    remove_all_broken, remove_broken, scan, ObjectGraph, RemovalResult, ScanResult,
};
use slotsweep_storage::AssetStore;

use crate::error::CleanError;
use crate::loaded::LoadedAsset;
use crate::log::{LogSink, TracingLog};
use crate::options::CleanOptions;
use crate::progress::{NoProgress, ProgressSink};
use crate::scene::{LiveScene, UNDO_LABEL};
use crate::session::{same_asset_path, EditingSession};

/// What an operation runs over.
pub enum Scope<'a> {
    /// The resident scene.
    CurrentScene(&'a mut dyn LiveScene),
    /// Every stored asset of the configured kind.
    AllStoredAssets,
}

/// Outcome of [`AssetCleanupOrchestrator::scan_and_report`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub result: ScanResult,
    pub assets_examined: usize,
    /// Paths whose contents could not be loaded.
    pub failed_assets: Vec<String>,
    pub cancelled: bool,
}

/// Outcome of [`AssetCleanupOrchestrator::scan_and_clean`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    /// Broken slots removed and, for assets, successfully saved.
    pub removed_components: usize,
    /// Nodes that lost at least one slot.
    pub affected_nodes: usize,
    /// Assets rewritten.
    pub removed_assets: usize,
    /// Assets loaded and processed, whether or not they changed.
    pub assets_examined: usize,
    /// Assets left alone because they were open for editing.
    pub skipped_assets: Vec<String>,
    /// Assets that could not be loaded or saved.
    pub failed_assets: Vec<String>,
    pub cancelled: bool,
}

/// Scans and cleans broken attachment slots through injected host services.
pub struct AssetCleanupOrchestrator<S, E, L = TracingLog, P = NoProgress> {
    store: S,
    session: E,
    log: L,
    progress: P,
    options: CleanOptions,
}

impl<S: AssetStore, E: EditingSession> AssetCleanupOrchestrator<S, E> {
    /// Creates an orchestrator that logs through `tracing` and reports no
    /// progress.
    pub fn new(store: S, session: E) -> Self {
        AssetCleanupOrchestrator {
            store,
            session,
            log: TracingLog,
            progress: NoProgress,
            options: CleanOptions::default(),
        }
    }
}

impl<S, E, L, P> AssetCleanupOrchestrator<S, E, L, P>
where
    S: AssetStore,
    E: EditingSession,
    L: LogSink,
    P: ProgressSink,
{
    /// Replaces the log sink.
    pub fn with_log<L2: LogSink>(self, log: L2) -> AssetCleanupOrchestrator<S, E, L2, P> {
        AssetCleanupOrchestrator {
            store: self.store,
            session: self.session,
            log,
            progress: self.progress,
            options: self.options,
        }
    }

    /// Replaces the progress sink.
    pub fn with_progress<P2: ProgressSink>(
        self,
        progress: P2,
    ) -> AssetCleanupOrchestrator<S, E, L, P2> {
        AssetCleanupOrchestrator {
            store: self.store,
            session: self.session,
            log: self.log,
            progress,
            options: self.options,
        }
    }

    pub fn with_options(mut self, options: CleanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }

    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // -----------------------------------------------------------------------
    // Host operations
    // -----------------------------------------------------------------------

    /// Reports broken slots without changing anything.
    pub fn scan_and_report(&mut self, scope: Scope<'_>) -> Result<ScanReport, CleanError> {
        match scope {
            Scope::CurrentScene(scene) => Ok(self.report_scene(&*scene)),
            Scope::AllStoredAssets => {
                let outcome = self.report_assets();
                self.progress.clear();
                outcome
            }
        }
    }

    /// Removes broken slots and persists the result.
    pub fn scan_and_clean(&mut self, scope: Scope<'_>) -> Result<CleanSummary, CleanError> {
        match scope {
            Scope::CurrentScene(scene) => {
                let removal = self.clean_scene(scene)?;
                Ok(CleanSummary {
                    removed_components: removal.removed_attachment_count,
                    affected_nodes: removal.affected_node_count,
                    ..CleanSummary::default()
                })
            }
            Scope::AllStoredAssets => {
                let outcome = self.clean_assets();
                self.progress.clear();
                outcome
            }
        }
    }

    // -----------------------------------------------------------------------
    // Live scene
    // -----------------------------------------------------------------------

    fn report_scene(&mut self, scene: &dyn LiveScene) -> ScanReport {
        let result = scan(scene.forest());
        for entry in &result.nodes {
            self.log.info(
                &format!(
                    "Missing script found in object: {} ({} slot(s))",
                    entry.path, entry.broken_count
                ),
                Some(&entry.path),
            );
        }
        if result.is_clean() {
            self.log.info("No missing scripts found in the scene.", None);
        } else {
            self.log.info(
                &format!(
                    "Found {} missing script(s) on {} object(s).",
                    result.broken_attachment_count, result.broken_node_count
                ),
                None,
            );
        }
        ScanReport {
            result,
            ..ScanReport::default()
        }
    }

    fn clean_scene(&mut self, scene: &mut dyn LiveScene) -> Result<RemovalResult, CleanError> {
        let mut removal = RemovalResult::default();
        for id in scene.forest().depth_first() {
            let broken = scene
                .forest()
                .node(id)
                .map(|node| node.broken_count())
                .unwrap_or(0);
            if broken == 0 {
                continue;
            }
            scene.record_undo(id, UNDO_LABEL);
            removal.record(remove_broken(scene.forest_mut(), id)?);
        }

        if removal.changed {
            scene.mark_dirty();
            self.log.info(
                &format!(
                    "Deleted {} missing script(s) from {} object(s).",
                    removal.removed_attachment_count, removal.affected_node_count
                ),
                None,
            );
        } else {
            self.log.info("No missing scripts found to delete.", None);
        }
        Ok(removal)
    }

    // -----------------------------------------------------------------------
    // Stored assets
    // -----------------------------------------------------------------------

    fn report_assets(&mut self) -> Result<ScanReport, CleanError> {
        let ids = self.store.find_assets(&self.options.asset_kind)?;
        let mut report = ScanReport::default();
        if ids.is_empty() {
            self.log_nothing_found();
            return Ok(report);
        }

        let total = ids.len();
        for (index, id) in ids.into_iter().enumerate() {
            let path = match self.store.id_to_path(id) {
                Ok(path) => path,
                Err(e) => {
                    self.log.error(&format!("Failed to resolve {}: {}", id, e), None);
                    report.failed_assets.push(id.to_string());
                    continue;
                }
            };
            if !self.report_progress("Scanning", &path, index, total) {
                report.cancelled = true;
                break;
            }

            let result = match LoadedAsset::load(&mut self.store, &path) {
                Ok(loaded) => scan(loaded.forest()),
                Err(e) => {
                    self.log
                        .error(&format!("Failed to load {}: {}", path, e), Some(&path));
                    report.failed_assets.push(path);
                    continue;
                }
            };
            report.assets_examined += 1;

            for entry in &result.nodes {
                self.log.info(
                    &format!(
                        "Missing script found in asset {}: {} ({} slot(s))",
                        path, entry.path, entry.broken_count
                    ),
                    Some(&path),
                );
            }
            report.result.merge_prefixed(&path, result);
        }
        if !report.cancelled {
            self.progress.report("Done", 1.0);
        }

        self.log.info(
            &format!(
                "Found {} missing script(s) on {} object(s) across {} asset(s).",
                report.result.broken_attachment_count,
                report.result.broken_node_count,
                report.assets_examined
            ),
            None,
        );
        Ok(report)
    }

    fn clean_assets(&mut self) -> Result<CleanSummary, CleanError> {
        let ids = self.store.find_assets(&self.options.asset_kind)?;
        let mut summary = CleanSummary::default();
        if ids.is_empty() {
            self.log_nothing_found();
            return Ok(summary);
        }

        let total = ids.len();
        for (index, id) in ids.into_iter().enumerate() {
            let path = match self.store.id_to_path(id) {
                Ok(path) => path,
                Err(e) => {
                    self.log.error(&format!("Failed to resolve {}: {}", id, e), None);
                    summary.failed_assets.push(id.to_string());
                    continue;
                }
            };
            if !self.report_progress("Cleaning", &path, index, total) {
                summary.cancelled = true;
                break;
            }

            let open_path = self.session.currently_open_asset_path();
            if open_path
                .as_deref()
                .is_some_and(|open| same_asset_path(open, &path))
            {
                self.log.warning(
                    &format!("Skipping {}: it is open in an editing session.", path),
                    Some(&path),
                );
                summary.skipped_assets.push(path);
                continue;
            }

            match self.clean_one(&path) {
                Ok(removal) => {
                    summary.assets_examined += 1;
                    if removal.changed {
                        summary.removed_components += removal.removed_attachment_count;
                        summary.affected_nodes += removal.affected_node_count;
                        summary.removed_assets += 1;
                        self.log.info(
                            &format!(
                                "Removed {} missing script(s) from {}.",
                                removal.removed_attachment_count, path
                            ),
                            Some(&path),
                        );
                    } else {
                        tracing::debug!(asset = %path, "no missing scripts");
                    }
                }
                Err(e) => {
                    self.log
                        .error(&format!("Failed to clean {}: {}", path, e), Some(&path));
                    summary.failed_assets.push(path);
                }
            }
        }

        if summary.removed_assets > 0 && self.options.commit_on_change {
            self.store.commit_and_refresh()?;
        }
        if !summary.cancelled {
            self.progress.report("Done", 1.0);
        }

        self.log.info(
            &format!(
                "Removed {} missing script(s) from {} asset(s); {} skipped, {} failed.",
                summary.removed_components,
                summary.removed_assets,
                summary.skipped_assets.len(),
                summary.failed_assets.len()
            ),
            None,
        );
        Ok(summary)
    }

    /// Load, strip and (if changed) save one asset. The loaded copy is
    /// released when `loaded` goes out of scope, whichever way this returns.
    fn clean_one(&mut self, path: &str) -> Result<RemovalResult, CleanError> {
        let mut loaded = LoadedAsset::load(&mut self.store, path)?;
        let removal = remove_all_broken(loaded.forest_mut())?;
        tracing::debug!(
            asset = loaded.path(),
            removed = removal.removed_attachment_count,
            nodes = removal.affected_node_count,
            "stripped loaded copy"
        );
        if removal.changed {
            loaded.save()?;
        }
        Ok(removal)
    }

    fn log_nothing_found(&mut self) {
        let message = format!("No {} assets found.", self.options.asset_kind);
        self.log.info(&message, None);
    }

    /// Reports `(index, total)` and returns whether to keep going.
    fn report_progress(&mut self, verb: &str, path: &str, index: usize, total: usize) -> bool {
        let fraction = index as f32 / total as f32;
        let keep_going = self.progress.report(
            &format!("{} {}/{}: {}", verb, index + 1, total, path),
            fraction,
        );
        if !keep_going {
            self.log.info(
                &format!("Cancelled after {} of {} asset(s).", index, total),
                None,
            );
        }
        keep_going
    }
}
