//! # Stockloc Cache
//!
//! 增量重算與變更集：欄位變更標記相依的衍生值，由上而下重算，
//! 提交前執行驗證，整批變更要嘛全部生效、要嘛全部不生效。

pub mod dirty_tracking;
pub mod incremental;

// Re-export 主要類型
pub use dirty_tracking::DirtyTracker;
pub use incremental::{ChangeSet, CommitReport, LocationChange, LocationStore};
