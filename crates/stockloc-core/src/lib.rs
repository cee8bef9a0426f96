//! # Stockloc Core
//!
//! 儲位分類（揀貨區 / 區域 / 儲格）核心資料模型與類型定義

pub mod config;
pub mod location;
pub mod snapshot;
pub mod tree;
pub mod zone;

// Re-export 主要類型
pub use config::LocationConfig;
pub use location::{Location, LocationKind, PlacementField};
pub use snapshot::{FieldSnapshot, FieldValue};
pub use tree::LocationTree;
pub use zone::PickingZone;

use uuid::Uuid;

/// 儲位錯誤類型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("名稱格式引用了不存在的欄位: {field}")]
    TemplateField { field: String },

    #[error("無效的名稱格式 \"{template}\": {reason}")]
    TemplateSyntax { template: String, reason: String },

    #[error("欄位 {field} 無法套用格式 \"{spec}\": {reason}")]
    TemplateFormat {
        field: String,
        spec: String,
        reason: String,
    },

    #[error("同一揀貨區內已存在名稱為 \"{name}\" 的儲位，請使用其他名稱")]
    DuplicateNameInZone {
        name: String,
        zone: Uuid,
        location: Uuid,
        conflicting: Uuid,
    },

    #[error("儲位層級出現循環或超過最大深度: {0}")]
    CyclicHierarchy(Uuid),

    #[error("找不到儲位: {0}")]
    LocationNotFound(Uuid),

    #[error("找不到揀貨區: {0}")]
    ZoneNotFound(Uuid),

    #[error("欄位 {field} 的值類型錯誤，應為 {expected}")]
    InvalidFieldValue {
        field: String,
        expected: &'static str,
    },

    #[error("變更集已過期：儲位樹在此期間已被其他變更提交")]
    ConcurrentModification,

    #[error("配置錯誤: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LocationError>;
