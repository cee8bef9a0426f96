//! 揀貨區模型

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 揀貨區
///
/// 與 `kind = zone` 的儲位節點是不同概念：儲位可以直接透過
/// `picking_zone_id` 連結到揀貨區，不受其在樹中的位置影響。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingZone {
    /// 揀貨區ID
    pub id: Uuid,

    /// 名稱
    pub name: String,

    /// 代碼
    pub code: Option<String>,

    /// 從此揀貨區出庫時使用的作業類型
    pub picking_type: Option<String>,
}

impl PickingZone {
    /// 創建新的揀貨區
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: None,
            picking_type: None,
        }
    }

    /// 建構器模式：設置代碼
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// 建構器模式：設置作業類型
    pub fn with_picking_type(mut self, picking_type: impl Into<String>) -> Self {
        self.picking_type = Some(picking_type.into());
        self
    }
}
