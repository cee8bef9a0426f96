//! # Stockloc Calculation
//!
//! 儲位衍生值與驗證：區域解析、儲格名稱生成、揀貨區名稱唯一性

pub mod area;
pub mod naming;
pub mod template;
pub mod uniqueness;

// Re-export 主要類型
pub use area::AreaResolver;
pub use naming::NameTemplateResolver;
pub use template::NameTemplate;
pub use uniqueness::{ZoneScopeIndex, ZoneUniquenessChecker};
