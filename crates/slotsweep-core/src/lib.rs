pub mod error;
pub mod forest;
pub mod graph;
pub mod id;
pub mod node;
pub mod remove;
pub mod scan;

// Re-export commonly used types
pub use error::CoreError;
pub use forest::Forest;
pub use graph::ObjectGraph;
pub use id::NodeId;
pub use node::{AttachmentHandle, AttachmentSlot, SceneNode};
pub use remove::{remove_all_broken, remove_broken, RemovalResult};
pub use scan::{full_path, scan, scan_with, BrokenNode, ScanOptions, ScanResult};
