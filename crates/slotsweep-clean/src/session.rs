//! The editing-session capability.
//!
//! A host may have one asset open for interactive editing. Saving over it
//! would silently discard the unsaved in-memory edits, so the orchestrator
//! asks the session which path is open and skips that asset.

/// Reports the asset currently open for interactive editing, if any.
pub trait EditingSession {
    fn currently_open_asset_path(&self) -> Option<String>;
}

/// A host with no editing session.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEditingSession;

impl EditingSession for NoEditingSession {
    fn currently_open_asset_path(&self) -> Option<String> {
        None
    }
}

/// A session with a fixed open path, as configured by the caller.
#[derive(Debug, Clone, Default)]
pub struct FixedEditingSession {
    pub open_path: Option<String>,
}

impl FixedEditingSession {
    pub fn open(path: impl Into<String>) -> Self {
        FixedEditingSession {
            open_path: Some(path.into()),
        }
    }
}

impl EditingSession for FixedEditingSession {
    fn currently_open_asset_path(&self) -> Option<String> {
        self.open_path.clone()
    }
}

/// Compares two asset paths after normalization: surrounding whitespace is
/// ignored, `\` is treated as `/`, a leading `./` is dropped, and case is
/// folded.
pub fn same_asset_path(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    path.strip_prefix("./")
        .unwrap_or(&path)
        .to_lowercase()
}
