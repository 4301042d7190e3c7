//! Domain logic - pure release rules independent of git operations

pub mod change;
pub mod tag;
pub mod version;

pub use change::{ChangeEntry, ChangeStatus, ChangeSummary};
pub use tag::{ReleaseTag, TagPattern};
pub use version::{strip_version_marker, BumpClass, SemanticVersion};
