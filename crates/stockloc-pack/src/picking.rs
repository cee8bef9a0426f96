//! 出貨單模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 作業明細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLine {
    /// 明細ID
    pub id: Uuid,

    /// 產品ID
    pub product_id: String,

    /// 已完成數量
    pub qty_done: Decimal,

    /// 產品計量單位的精度
    pub uom_rounding: Decimal,

    /// 已裝入的包裹
    pub result_package_id: Option<Uuid>,
}

impl MoveLine {
    /// 創建新的作業明細（預設精度 0.01）
    pub fn new(product_id: impl Into<String>, qty_done: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product_id.into(),
            qty_done,
            uom_rounding: Decimal::new(1, 2),
            result_package_id: None,
        }
    }

    /// 建構器模式：設置計量單位精度
    pub fn with_uom_rounding(mut self, rounding: Decimal) -> Self {
        self.uom_rounding = rounding;
        self
    }

    /// 建構器模式：設置已裝入的包裹
    pub fn with_result_package(mut self, package_id: Uuid) -> Self {
        self.result_package_id = Some(package_id);
        self
    }
}

/// 出貨單
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picking {
    /// 出貨單ID
    pub id: Uuid,

    /// 單號
    pub name: String,

    /// 作業明細
    pub move_lines: Vec<MoveLine>,

    /// 包裹數量
    pub nbr_packages: u32,
}

impl Picking {
    /// 創建新的出貨單
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            move_lines: Vec::new(),
            nbr_packages: 1,
        }
    }

    /// 建構器模式：添加作業明細
    pub fn with_move_line(mut self, line: MoveLine) -> Self {
        self.move_lines.push(line);
        self
    }

    /// 建構器模式：設置包裹數量
    pub fn with_nbr_packages(mut self, nbr_packages: u32) -> Self {
        self.nbr_packages = nbr_packages;
        self
    }
}
